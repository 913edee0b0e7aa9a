//! Provision the Notion database schema

use boardport_core::Secrets;
use boardport_notion::{schema, NotionClient};
use clap::{Args, Subcommand};

/// Arguments for the schema command
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// Declare the full board property set on a database
    Init {
        /// Target Notion database id
        database_id: String,
    },

    /// Add the date properties holding the source item's created/updated dates
    AddDates {
        /// Target Notion database id
        database_id: String,
    },
}

impl SchemaArgs {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let secrets = Secrets::load()?;
        let token = secrets.notion_token().ok_or_else(|| {
            anyhow::anyhow!(
                "Notion token not found. Set NOTION_TOKEN or add it to the secrets file"
            )
        })?;
        let client = NotionClient::new(token);

        let (database_id, properties) = match &self.command {
            SchemaCommand::Init { database_id } => (database_id, schema::board_properties()),
            SchemaCommand::AddDates { database_id } => (database_id, schema::date_properties()),
        };

        client.update_database(database_id, &properties).await?;

        println!("Database properties updated successfully!");
        for (name, kind) in schema::describe(&properties) {
            println!("- {} ({})", name, kind);
        }

        Ok(())
    }
}
