//! Project URL classification
//!
//! Project URLs are matched on their literal path segments, not parsed as
//! URLs: anything not shaped `https://github.com/orgs/<org>/projects/<n>` or
//! `https://github.com/<owner>/<repo>/projects/<n>` is rejected before any
//! network call is made.

use std::fmt;

use crate::{Error, Result};

/// A classified project address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    /// Organization-level project
    Org { org: String, number: u64 },
    /// Repository-level project
    Repo {
        owner: String,
        repo: String,
        number: u64,
    },
}

impl ProjectRef {
    /// Classify a project URL by its path segments
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = || Error::InvalidProjectUrl(url.to_string());

        let parts: Vec<&str> = url.split('/').collect();
        // https://github.com/orgs/acme/projects/5 splits into
        // ["https:", "", "github.com", "orgs", "acme", "projects", "5"]
        if parts.len() < 7 {
            return Err(invalid());
        }
        if parts[2] != "github.com" || parts[5] != "projects" {
            return Err(invalid());
        }

        let number: u64 = parts[6].parse().map_err(|_| invalid())?;

        if parts[3] == "orgs" {
            if parts[4].is_empty() {
                return Err(invalid());
            }
            Ok(ProjectRef::Org {
                org: parts[4].to_string(),
                number,
            })
        } else {
            if parts[3].is_empty() || parts[4].is_empty() {
                return Err(invalid());
            }
            Ok(ProjectRef::Repo {
                owner: parts[3].to_string(),
                repo: parts[4].to_string(),
                number,
            })
        }
    }

    /// Project number within its owner
    pub fn number(&self) -> u64 {
        match self {
            ProjectRef::Org { number, .. } | ProjectRef::Repo { number, .. } => *number,
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectRef::Org { org, number } => write!(f, "orgs/{}/projects/{}", org, number),
            ProjectRef::Repo {
                owner,
                repo,
                number,
            } => write!(f, "{}/{}/projects/{}", owner, repo, number),
        }
    }
}
