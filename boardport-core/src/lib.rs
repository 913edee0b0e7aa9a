//! Boardport Core - shared types for the boardport migration toolkit
//!
//! This crate holds the project snapshot model (the JSON interchange format
//! between the exporter and the importer) and credential loading.

pub mod error;
pub mod secrets;
pub mod snapshot;
pub mod summary;

pub use error::{Error, Result};
pub use secrets::Secrets;
pub use snapshot::{
    Actor, Comment, Connection, Content, DraftIssue, FieldMap, FieldRef, FieldValue, IssueContent,
    Label, NodeList, ProjectField, ProjectItem, ProjectSnapshot, ProjectView,
};
pub use summary::SnapshotSummary;
