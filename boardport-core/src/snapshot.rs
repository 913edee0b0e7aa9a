//! Project snapshot model
//!
//! These types mirror the GitHub Projects (v2) GraphQL response shape and
//! serialize with the same camelCase field names, so the JSON file written by
//! `boardport dump` is a stable interchange format: a snapshot produced by one
//! version of the exporter can be replayed by another version of the importer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A complete dump of one GitHub project board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub id: String,
    pub title: String,
    pub short_description: Option<String>,
    pub readme: Option<String>,
    pub number: u64,
    pub public: bool,
    pub closed: bool,
    pub url: String,
    /// Board items in board order; pagination appends, never reorders
    pub items: Connection<ProjectItem>,
    pub views: NodeList<ProjectView>,
    pub fields: NodeList<ProjectField>,
}

/// A GraphQL connection carrying a total count alongside its nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub total_count: u64,
    pub nodes: Vec<T>,
}

/// A GraphQL node list without a count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeList<T> {
    pub nodes: Vec<T>,
}

impl<T> Default for NodeList<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

/// One entry on the project board
///
/// `content` is `None` for items with no backing issue or pull request;
/// the summary counts those as drafts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_archived: bool,
    pub content: Option<Content>,
    #[serde(default)]
    pub field_values: NodeList<FieldValue>,
}

/// The content backing a project item, discriminated by GraphQL typename
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum Content {
    DraftIssue(DraftIssue),
    Issue(IssueContent),
    PullRequest(IssueContent),
}

impl Content {
    /// Web URL of the backing issue or pull request
    pub fn url(&self) -> Option<&str> {
        match self {
            Content::DraftIssue(_) => None,
            Content::Issue(c) | Content::PullRequest(c) => Some(&c.url),
        }
    }

    /// Labels attached to the backing issue or pull request
    pub fn labels(&self) -> &[Label] {
        match self {
            Content::DraftIssue(_) => &[],
            Content::Issue(c) | Content::PullRequest(c) => &c.labels.nodes,
        }
    }
}

/// A draft issue that exists only on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftIssue {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Issue or pull request content (the two share a shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueContent {
    pub id: String,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub state: String,
    pub url: String,
    pub comments: Connection<Comment>,
    pub author: Option<Actor>,
    #[serde(default)]
    pub assignees: NodeList<Actor>,
    #[serde(default)]
    pub labels: NodeList<Label>,
}

/// An issue or pull request comment, ordered by creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<Actor>,
}

/// A GitHub account reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
}

/// An issue label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
}

/// A typed custom field value attached to an item
///
/// The GraphQL query matches one inline fragment per value kind; nodes that
/// match none of them come back as empty objects and land in `Empty`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text { text: String, field: FieldRef },
    Number { number: f64, field: FieldRef },
    Date { date: String, field: FieldRef },
    SingleSelect { name: String, field: FieldRef },
    Iteration { title: String, field: FieldRef },
    Empty {},
}

impl FieldValue {
    /// Name of the field this value belongs to
    pub fn field_name(&self) -> Option<&str> {
        match self {
            FieldValue::Text { field, .. }
            | FieldValue::Number { field, .. }
            | FieldValue::Date { field, .. }
            | FieldValue::SingleSelect { field, .. }
            | FieldValue::Iteration { field, .. } => Some(&field.name),
            FieldValue::Empty {} => None,
        }
    }

    /// The selected option name, for single-select values
    pub fn select_name(&self) -> Option<&str> {
        match self {
            FieldValue::SingleSelect { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The iteration title, for iteration values
    pub fn iteration_title(&self) -> Option<&str> {
        match self {
            FieldValue::Iteration { title, .. } => Some(title),
            _ => None,
        }
    }
}

/// The owning field of a field value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRef {
    pub name: String,
}

/// Name-keyed lookup over an item's field values, built once per item
///
/// Lookups are case-sensitive; a name miss yields `None`, never an error.
/// When a name occurs more than once the first value wins.
#[derive(Debug)]
pub struct FieldMap<'a> {
    values: HashMap<&'a str, &'a FieldValue>,
}

impl<'a> FieldMap<'a> {
    pub fn new(field_values: &'a NodeList<FieldValue>) -> Self {
        let mut values = HashMap::new();
        for value in &field_values.nodes {
            if let Some(name) = value.field_name() {
                values.entry(name).or_insert(value);
            }
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&'a FieldValue> {
        self.values.get(name).copied()
    }
}

/// A saved board view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub layout: String,
}

/// A custom field definition on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectField {
    SingleSelect(SingleSelectField),
    Iteration(IterationField),
    Common(FieldCommon),
    Empty {},
}

impl ProjectField {
    pub fn name(&self) -> Option<&str> {
        match self {
            ProjectField::SingleSelect(f) => Some(&f.name),
            ProjectField::Iteration(f) => Some(&f.name),
            ProjectField::Common(f) => Some(&f.name),
            ProjectField::Empty {} => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCommon {
    pub id: String,
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleSelectField {
    pub id: String,
    pub name: String,
    pub data_type: String,
    pub options: Vec<FieldOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationField {
    pub id: String,
    pub name: String,
    pub data_type: String,
    pub configuration: IterationConfiguration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationConfiguration {
    pub iterations: Vec<Iteration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Iteration {
    pub id: String,
    pub title: String,
    pub start_date: String,
    pub duration: u32,
}
