//! Boardport Notion - replays project snapshots into a Notion database
//!
//! This crate owns the Notion side of the pipeline: the REST client, the
//! snapshot-to-page replicator, markdown-to-block conversion, and the
//! database schema provisioning payloads.

mod blocks;
mod client;
mod error;
mod import;
mod retry;
pub mod schema;

pub use blocks::{fallback_paragraph, markdown_to_blocks, render_markdown, RICH_TEXT_LIMIT};
pub use client::{DatabaseSchema, NotionClient, PropertySpec, QueryPage};
pub use error::{Error, Result};
pub use import::{FailedItem, ImportOptions, ImportReport, Importer, write_failed_items};
