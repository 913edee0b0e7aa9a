//! Error types for Notion operations

use thiserror::Error;

/// Result type for Notion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during Notion operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP error
    #[error("Notion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the API
    #[error("Notion API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
