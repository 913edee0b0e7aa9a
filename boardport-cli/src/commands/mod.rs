//! CLI command implementations

pub mod dump;
pub mod import;
pub mod schema;

pub use dump::DumpArgs;
pub use import::ImportArgs;
pub use schema::SchemaArgs;
