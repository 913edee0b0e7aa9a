//! Replay a snapshot into a Notion database

use std::path::PathBuf;

use boardport_core::{ProjectSnapshot, Secrets};
use boardport_notion::{write_failed_items, ImportOptions, Importer, NotionClient};
use clap::Args;
use tracing::{info, warn};

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Snapshot file produced by `boardport dump`
    pub snapshot_file: PathBuf,

    /// Target Notion database id
    pub database_id: String,

    /// Archive every existing page in the database before importing
    #[arg(long)]
    pub clear: bool,

    /// Single-select field mapped to the status property
    #[arg(long, default_value = "Status")]
    pub status_field: String,

    /// Single-select field mapped to the priority property
    #[arg(long, default_value = "Priority")]
    pub priority_field: String,

    /// Single-select field mapped to the size property
    #[arg(long, default_value = "Size")]
    pub size_field: String,

    /// URL property receiving the item's GitHub URL
    #[arg(long, default_value = "GitHub URL")]
    pub url_field: String,

    /// Property receiving label names
    #[arg(long, default_value = "Labels")]
    pub labels_field: String,

    /// Date property receiving the item's creation date
    #[arg(long, default_value = "Created")]
    pub created_field: String,

    /// Date property receiving the item's last update date
    #[arg(long, default_value = "Updated")]
    pub updated_field: String,

    /// Iteration-backed date properties (repeatable)
    #[arg(
        long = "date-field",
        default_values_t = [String::from("Release Date"), String::from("Design Date")]
    )]
    pub date_fields: Vec<String>,

    /// Checkbox property to tick on every imported page
    #[arg(long)]
    pub imported_field: Option<String>,

    /// Page creation attempts before an item is recorded as failed
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Maximum number of content blocks per page
    #[arg(long, default_value_t = 100)]
    pub max_blocks: usize,

    /// Where to write items that exhausted their retries
    #[arg(long, default_value = "failed-items.json")]
    pub failed_items_file: PathBuf,
}

impl ImportArgs {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let data = std::fs::read_to_string(&self.snapshot_file).map_err(|e| {
            anyhow::anyhow!("Could not read {}: {}", self.snapshot_file.display(), e)
        })?;
        let snapshot: ProjectSnapshot = serde_json::from_str(&data)?;

        let secrets = Secrets::load()?;
        let token = secrets.notion_token().ok_or_else(|| {
            anyhow::anyhow!(
                "Notion token not found. Set NOTION_TOKEN or add it to the secrets file"
            )
        })?;

        let client = NotionClient::new(token);
        let options = ImportOptions {
            status_field: self.status_field.clone(),
            priority_field: self.priority_field.clone(),
            size_field: self.size_field.clone(),
            url_field: self.url_field.clone(),
            labels_field: self.labels_field.clone(),
            created_field: self.created_field.clone(),
            updated_field: self.updated_field.clone(),
            date_fields: self.date_fields.clone(),
            imported_field: self.imported_field.clone(),
            clear: self.clear,
            max_attempts: self.retries,
            max_blocks: self.max_blocks,
            ..ImportOptions::default()
        };

        let importer = Importer::new(&client, &self.database_id, options).await?;
        let report = importer.run(&snapshot).await?;

        info!(
            created = report.created,
            failed = report.failed(),
            skipped_archived = report.skipped_archived,
            "Import finished"
        );

        if !report.failed_items.is_empty() {
            for item in &report.failed_items {
                warn!(title = %item.title, created_at = %item.created_at, "Failed item");
            }
            write_failed_items(&self.failed_items_file, &report.failed_items)?;
            info!(
                path = %self.failed_items_file.display(),
                "Failed items saved for retry"
            );
        }

        Ok(())
    }
}
