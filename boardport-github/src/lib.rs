//! Boardport GitHub - project board export for boardport
//!
//! This crate dumps a GitHub Projects (v2) board into a [`ProjectSnapshot`]
//! by walking the GraphQL items connection page by page.
//!
//! [`ProjectSnapshot`]: boardport_core::ProjectSnapshot

mod client;
mod error;
mod export;
mod locator;

pub use client::GitHubClient;
pub use error::{Error, Result};
pub use export::{ASSIGNEE_PAGE_SIZE, COMMENT_PAGE_SIZE, ITEM_PAGE_SIZE, LABEL_PAGE_SIZE};
pub use locator::ProjectRef;
