//! Boardport CLI - migrate GitHub Projects (v2) boards into Notion
//!
//! `dump` exports a project board to a JSON snapshot, `import` replays a
//! snapshot into a Notion database, and `schema` provisions the database
//! properties the importer writes into.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{DumpArgs, ImportArgs, SchemaArgs};

/// Boardport: GitHub Projects to Notion migration
#[derive(Parser, Debug)]
#[command(name = "boardport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a GitHub project board as a JSON snapshot on stdout
    Dump(DumpArgs),

    /// Replay a snapshot into a Notion database
    Import(ImportArgs),

    /// Provision the Notion database schema
    Schema(SchemaArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // diagnostics go to stderr so `dump` can write the snapshot to stdout
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Dump(args) => args.execute().await,
        Commands::Import(args) => args.execute().await,
        Commands::Schema(args) => args.execute().await,
    }
}
