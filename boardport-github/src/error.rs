//! Error types for GitHub export operations

use thiserror::Error;

/// Result type for GitHub export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting a project
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP error
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the API
    #[error("GitHub request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Errors reported in the GraphQL response envelope
    #[error("GraphQL errors: {0}")]
    Graphql(String),

    /// URL does not address a GitHub project
    #[error("not a GitHub project URL: {0}")]
    InvalidProjectUrl(String),

    /// Project missing or not accessible with the supplied token
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// GraphQL response carried no data
    #[error("GraphQL response missing data")]
    MissingData,

    /// Response body did not match the expected shape
    #[error("parse error: {0}")]
    Parse(String),
}
