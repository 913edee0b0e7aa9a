//! Snapshot-to-Notion replication
//!
//! The importer walks a project snapshot and creates one Notion page per
//! non-archived item. Failures are two-tier: anything wrong with the run's
//! preconditions (unreadable schema, bad credentials) aborts, while a single
//! item failing (page creation exhausting its retries, an unsupported
//! property type) is logged and the run continues. The failed items are
//! reported at the end for a manual retry pass.

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use boardport_core::{Content, FieldMap, FieldValue, ProjectItem, ProjectSnapshot};

use crate::blocks::{fallback_paragraph, markdown_to_blocks, render_markdown};
use crate::client::{DatabaseSchema, NotionClient};
use crate::{retry, Result};

/// Notion's title length limit
const TITLE_LIMIT: usize = 2000;

/// Replicator configuration
///
/// Field names address the snapshot's custom fields and the destination
/// properties at the same time; every one of them can be overridden.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Single-select field mapped to a select/multi-select property
    pub status_field: String,
    pub priority_field: String,
    pub size_field: String,
    /// URL property receiving the content's web URL
    pub url_field: String,
    /// Property receiving label names
    pub labels_field: String,
    /// Date properties receiving the item's created/updated dates
    pub created_field: String,
    pub updated_field: String,
    /// Iteration-backed fields whose titles carry a date token
    pub date_fields: Vec<String>,
    /// Checkbox property ticked on every imported page
    pub imported_field: Option<String>,
    /// Archive all existing pages before importing
    pub clear: bool,
    /// Page creation attempts before an item is recorded as failed
    pub max_attempts: u32,
    /// Content block cap per page, to stay under the API's request limit
    pub max_blocks: usize,
    /// Fixed delay between page creations, for rate limiting
    pub throttle: Duration,
    /// Linear backoff unit between retry attempts
    pub backoff_unit: Duration,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            status_field: "Status".to_string(),
            priority_field: "Priority".to_string(),
            size_field: "Size".to_string(),
            url_field: "GitHub URL".to_string(),
            labels_field: "Labels".to_string(),
            created_field: "Created".to_string(),
            updated_field: "Updated".to_string(),
            date_fields: vec!["Release Date".to_string(), "Design Date".to_string()],
            imported_field: None,
            clear: false,
            max_attempts: 3,
            max_blocks: 100,
            throttle: Duration::from_millis(200),
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// An item whose page creation exhausted its retries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedItem {
    pub title: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Outcome of one import run
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub created: usize,
    pub skipped_archived: usize,
    pub cleared: usize,
    pub failed_items: Vec<FailedItem>,
}

impl ImportReport {
    pub fn failed(&self) -> usize {
        self.failed_items.len()
    }
}

/// Replays a snapshot into one Notion database
pub struct Importer<'a> {
    client: &'a NotionClient,
    database_id: String,
    schema: DatabaseSchema,
    options: ImportOptions,
}

impl<'a> Importer<'a> {
    /// Fetch the destination schema and build an importer over it
    ///
    /// The schema is read once and treated as read-only for the run.
    pub async fn new(
        client: &'a NotionClient,
        database_id: impl Into<String>,
        options: ImportOptions,
    ) -> Result<Importer<'a>> {
        let database_id = database_id.into();
        let schema = client.retrieve_database(&database_id).await?;
        info!(
            database_id = %database_id,
            properties = schema.properties.len(),
            "Loaded database schema"
        );
        Ok(Self {
            client,
            database_id,
            schema,
            options,
        })
    }

    /// Run the import
    ///
    /// Per-item failures are recorded and skipped; only precondition
    /// failures (like the clear pass being unable to query the database)
    /// abort the run.
    pub async fn run(&self, snapshot: &ProjectSnapshot) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        if self.options.clear {
            report.cleared = self.clear_database().await?;
        }

        let total = snapshot.items.nodes.len();
        info!(total, "Processing project items");

        for item in &snapshot.items.nodes {
            if item.is_archived {
                debug!(id = %item.id, "Skipping archived item");
                report.skipped_archived += 1;
                continue;
            }

            let (payload, title) = self.build_payload(item);
            if self.create_with_retry(&payload, &title).await {
                report.created += 1;
            } else {
                report.failed_items.push(FailedItem {
                    title,
                    created_at: item.created_at,
                });
            }

            let done = report.created + report.failed();
            if done % 10 == 0 {
                info!(
                    done,
                    total,
                    created = report.created,
                    failed = report.failed(),
                    "Import progress"
                );
            }

            sleep(self.options.throttle).await;
        }

        info!(
            created = report.created,
            failed = report.failed(),
            skipped_archived = report.skipped_archived,
            "Import completed"
        );

        Ok(report)
    }

    /// Archive every page currently in the destination database
    ///
    /// Individual archive failures are logged and skipped.
    pub async fn clear_database(&self) -> Result<usize> {
        info!("Clearing existing pages");

        let mut cleared = 0;
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .client
                .query_database_page(&self.database_id, cursor.as_deref())
                .await?;

            for page_id in page.page_ids {
                match self.client.archive_page(&page_id).await {
                    Ok(()) => {
                        cleared += 1;
                        if cleared % 10 == 0 {
                            info!(cleared, "Archived pages");
                        }
                    }
                    Err(e) => error!(page_id = %page_id, error = %e, "Failed to archive page"),
                }
            }

            if !page.has_more {
                break;
            }
            cursor = page.next_cursor;
            if cursor.is_none() {
                break;
            }
        }

        info!(cleared, "Cleared existing pages");
        Ok(cleared)
    }

    /// Build the page payload for one item
    fn build_payload(&self, item: &ProjectItem) -> (Value, String) {
        let title = page_title(item);
        let mut properties = Map::new();

        // the title property may be named anything
        if let Some(title_property) = self.schema.title_property() {
            properties.insert(
                title_property.to_string(),
                json!({
                    "title": [ { "text": { "content": truncate_chars(&title, TITLE_LIMIT) } } ]
                }),
            );
        }

        let fields = FieldMap::new(&item.field_values);

        for name in [
            &self.options.status_field,
            &self.options.priority_field,
            &self.options.size_field,
        ] {
            if let Some(value) = fields.get(name).and_then(FieldValue::select_name) {
                if let Some(property) = self.select_or_multi(name, &[value]) {
                    properties.insert(name.clone(), property);
                }
            }
        }

        for name in &self.options.date_fields {
            if !self.schema.has_property(name) {
                continue;
            }
            if let Some(iteration_title) = fields.get(name).and_then(FieldValue::iteration_title) {
                // the date token is optional; without one the property is omitted
                if let Some(date) = extract_date(iteration_title) {
                    properties.insert(name.clone(), json!({ "date": { "start": date } }));
                }
            }
        }

        if let Some(url) = item.content.as_ref().and_then(Content::url) {
            if self.schema.has_property(&self.options.url_field) {
                properties.insert(self.options.url_field.clone(), json!({ "url": url }));
            }
        }

        if let Some(content) = &item.content {
            let labels = content.labels();
            if !labels.is_empty() {
                let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
                if let Some(property) = self.select_or_multi(&self.options.labels_field, &names) {
                    properties.insert(self.options.labels_field.clone(), property);
                }
            }
        }

        if self.schema.has_property(&self.options.created_field) {
            properties.insert(
                self.options.created_field.clone(),
                json!({ "date": { "start": item.created_at.format("%Y-%m-%d").to_string() } }),
            );
        }
        if self.schema.has_property(&self.options.updated_field) {
            properties.insert(
                self.options.updated_field.clone(),
                json!({ "date": { "start": item.updated_at.format("%Y-%m-%d").to_string() } }),
            );
        }

        if let Some(name) = &self.options.imported_field {
            if self.schema.has_property(name) {
                properties.insert(name.clone(), json!({ "checkbox": true }));
            }
        }

        let mut payload = json!({
            "parent": { "database_id": self.database_id },
            "properties": properties,
        });

        if let Some(content) = &item.content {
            let markdown = render_markdown(content);
            if !markdown.trim().is_empty() {
                let mut blocks = markdown_to_blocks(&markdown);
                if blocks.is_empty() {
                    warn!(title = %title, "Conversion produced no blocks, falling back to a plain paragraph");
                    blocks = vec![fallback_paragraph(&markdown)];
                }
                if blocks.len() > self.options.max_blocks {
                    warn!(
                        title = %title,
                        blocks = blocks.len(),
                        cap = self.options.max_blocks,
                        "Content too long, truncating blocks"
                    );
                    blocks.truncate(self.options.max_blocks);
                }
                payload["children"] = Value::Array(blocks);
            }
        }

        (payload, title)
    }

    /// Map select-style values onto the destination property's declared type
    ///
    /// Returns `None` (with a warning) when the property is missing from the
    /// schema or declares a type that cannot take these values; the page is
    /// still created without it.
    fn select_or_multi(&self, name: &str, values: &[&str]) -> Option<Value> {
        let kind = self.schema.property_type(name)?;
        match kind {
            "select" => values.first().map(|v| json!({ "select": { "name": v } })),
            "multi_select" => Some(json!({
                "multi_select": values.iter().map(|v| json!({ "name": v })).collect::<Vec<_>>()
            })),
            other => {
                warn!(property = name, kind = other, "Unsupported property type for select value");
                None
            }
        }
    }

    async fn create_with_retry(&self, payload: &Value, title: &str) -> bool {
        let result = retry::with_backoff(
            self.options.max_attempts,
            self.options.backoff_unit,
            || self.client.create_page(payload),
        )
        .await;

        match result {
            Ok(()) => {
                info!(title = %title, "Created page");
                true
            }
            Err(e) => {
                error!(
                    title = %title,
                    attempts = self.options.max_attempts,
                    error = %e,
                    "Failed to create page"
                );
                false
            }
        }
    }
}

/// Display title for an item: the content title, a typed placeholder, or a
/// fixed fallback when there is no content at all
fn page_title(item: &ProjectItem) -> String {
    match &item.content {
        None => "Untitled".to_string(),
        Some(Content::DraftIssue(draft)) => {
            if draft.title.is_empty() {
                "Untitled".to_string()
            } else {
                draft.title.clone()
            }
        }
        Some(Content::Issue(c)) => {
            if c.title.is_empty() {
                format!("Issue #{}", c.number)
            } else {
                c.title.clone()
            }
        }
        Some(Content::PullRequest(c)) => {
            if c.title.is_empty() {
                format!("PullRequest #{}", c.number)
            } else {
                c.title.clone()
            }
        }
    }
}

/// First `YYYY-MM-DD` token in an iteration title, if any
fn extract_date(title: &str) -> Option<&str> {
    static DATE: OnceLock<Regex> = OnceLock::new();
    let re = DATE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid date pattern"));
    re.find(title).map(|m| m.as_str())
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Write the failed-items file for a later manual retry pass
pub fn write_failed_items(path: &Path, items: &[FailedItem]) -> Result<()> {
    let json = serde_json::to_string_pretty(items)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardport_core::snapshot::{Connection, DraftIssue, FieldRef, IssueContent, Label, NodeList};
    use chrono::TimeZone;

    fn schema(properties: Value) -> DatabaseSchema {
        serde_json::from_value(json!({ "id": "db-1", "properties": properties })).unwrap()
    }

    fn default_schema() -> DatabaseSchema {
        schema(json!({
            "Name": { "id": "t", "type": "title" },
            "Status": { "id": "a", "type": "select" },
            "Priority": { "id": "b", "type": "select" },
            "Labels": { "id": "c", "type": "multi_select" },
            "GitHub URL": { "id": "d", "type": "url" },
            "Release Date": { "id": "e", "type": "date" },
            "Created": { "id": "f", "type": "date" },
            "Updated": { "id": "g", "type": "date" }
        }))
    }

    fn importer(client: &NotionClient, schema: DatabaseSchema) -> Importer<'_> {
        Importer {
            client,
            database_id: "db-1".to_string(),
            schema,
            options: ImportOptions::default(),
        }
    }

    fn item(content: Option<Content>, field_values: Vec<FieldValue>) -> ProjectItem {
        ProjectItem {
            id: "PVTI_1".to_string(),
            item_type: "ISSUE".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 9, 30, 23, 15, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 10, 2, 8, 0, 0).unwrap(),
            is_archived: false,
            content,
            field_values: NodeList { nodes: field_values },
        }
    }

    fn issue(title: &str, body: &str) -> Content {
        Content::Issue(IssueContent {
            id: "I_1".to_string(),
            number: 42,
            title: title.to_string(),
            body: body.to_string(),
            state: "OPEN".to_string(),
            url: "https://github.com/acme/web/issues/42".to_string(),
            comments: Connection {
                total_count: 0,
                nodes: vec![],
            },
            author: None,
            assignees: NodeList::default(),
            labels: NodeList {
                nodes: vec![Label {
                    name: "bug".to_string(),
                    color: "d73a4a".to_string(),
                }],
            },
        })
    }

    fn select(field: &str, value: &str) -> FieldValue {
        FieldValue::SingleSelect {
            name: value.to_string(),
            field: FieldRef {
                name: field.to_string(),
            },
        }
    }

    #[test]
    fn extracts_first_date_token() {
        assert_eq!(extract_date("2024-10-01 - 2024-10-31"), Some("2024-10-01"));
        assert_eq!(extract_date("Sprint 12 (2024-11-05)"), Some("2024-11-05"));
        assert_eq!(extract_date("Sprint 12"), None);
        assert_eq!(extract_date(""), None);
    }

    #[test]
    fn titles_fall_back_by_content_kind() {
        assert_eq!(page_title(&item(None, vec![])), "Untitled");
        assert_eq!(
            page_title(&item(Some(issue("Fix flaky test", "")), vec![])),
            "Fix flaky test"
        );
        assert_eq!(page_title(&item(Some(issue("", "")), vec![])), "Issue #42");
        assert_eq!(
            page_title(&item(
                Some(Content::DraftIssue(DraftIssue {
                    title: String::new(),
                    body: String::new(),
                })),
                vec![]
            )),
            "Untitled"
        );
    }

    #[test]
    fn builds_full_payload() {
        let client = NotionClient::new("test-token");
        let importer = importer(&client, default_schema());

        let item = item(
            Some(issue("Fix login", "Some body")),
            vec![
                select("Status", "In Progress"),
                select("Priority", "High"),
                FieldValue::Iteration {
                    title: "2024-10-01 - 2024-10-31".to_string(),
                    field: FieldRef {
                        name: "Release Date".to_string(),
                    },
                },
            ],
        );

        let (payload, title) = importer.build_payload(&item);
        assert_eq!(title, "Fix login");
        assert_eq!(payload["parent"]["database_id"], "db-1");

        let properties = &payload["properties"];
        assert_eq!(
            properties["Name"]["title"][0]["text"]["content"],
            "Fix login"
        );
        assert_eq!(properties["Status"]["select"]["name"], "In Progress");
        assert_eq!(properties["Priority"]["select"]["name"], "High");
        assert_eq!(
            properties["Labels"]["multi_select"][0]["name"],
            "bug"
        );
        assert_eq!(
            properties["GitHub URL"]["url"],
            "https://github.com/acme/web/issues/42"
        );
        assert_eq!(
            properties["Release Date"]["date"]["start"],
            "2024-10-01"
        );
        assert_eq!(properties["Created"]["date"]["start"], "2024-09-30");
        assert_eq!(properties["Updated"]["date"]["start"], "2024-10-02");

        let children = payload["children"].as_array().unwrap();
        assert!(!children.is_empty());
    }

    #[test]
    fn skips_properties_missing_from_schema() {
        let client = NotionClient::new("test-token");
        let importer = importer(
            &client,
            schema(json!({ "Name": { "id": "t", "type": "title" } })),
        );

        let item = item(
            Some(issue("Fix login", "")),
            vec![
                select("Status", "In Progress"),
                FieldValue::Iteration {
                    title: "2024-10-01 - 2024-10-31".to_string(),
                    field: FieldRef {
                        name: "Release Date".to_string(),
                    },
                },
            ],
        );

        let (payload, _) = importer.build_payload(&item);
        let properties = payload["properties"].as_object().unwrap();
        assert!(properties.contains_key("Name"));
        assert!(!properties.contains_key("Status"));
        assert!(!properties.contains_key("Release Date"));
        assert!(!properties.contains_key("GitHub URL"));
        assert!(!properties.contains_key("Labels"));
    }

    #[test]
    fn unsupported_property_type_is_skipped() {
        let client = NotionClient::new("test-token");
        let importer = importer(
            &client,
            schema(json!({
                "Name": { "id": "t", "type": "title" },
                "Status": { "id": "a", "type": "number" }
            })),
        );

        let item = item(Some(issue("Fix login", "")), vec![select("Status", "Todo")]);
        let (payload, _) = importer.build_payload(&item);
        assert!(payload["properties"].get("Status").is_none());
    }

    #[test]
    fn labels_map_by_declared_type() {
        let client = NotionClient::new("test-token");

        // multi-select takes every label
        let importer_multi = importer(&client, default_schema());
        let (payload, _) = importer_multi.build_payload(&item(Some(issue("T", "")), vec![]));
        assert_eq!(payload["properties"]["Labels"]["multi_select"][0]["name"], "bug");

        // a select property takes the first label only
        let importer_select = importer(
            &client,
            schema(json!({
                "Name": { "id": "t", "type": "title" },
                "Labels": { "id": "c", "type": "select" }
            })),
        );
        let (payload, _) = importer_select.build_payload(&item(Some(issue("T", "")), vec![]));
        assert_eq!(payload["properties"]["Labels"]["select"]["name"], "bug");
    }

    #[test]
    fn date_field_without_token_is_omitted() {
        let client = NotionClient::new("test-token");
        let importer = importer(&client, default_schema());

        let item = item(
            Some(issue("T", "")),
            vec![FieldValue::Iteration {
                title: "Sprint 12".to_string(),
                field: FieldRef {
                    name: "Release Date".to_string(),
                },
            }],
        );

        let (payload, _) = importer.build_payload(&item);
        assert!(payload["properties"].get("Release Date").is_none());
    }

    #[test]
    fn long_titles_are_truncated() {
        let client = NotionClient::new("test-token");
        let importer = importer(&client, default_schema());

        let long = "t".repeat(TITLE_LIMIT + 100);
        let (payload, title) = importer.build_payload(&item(Some(issue(&long, "")), vec![]));
        assert_eq!(title.len(), TITLE_LIMIT + 100);
        assert_eq!(
            payload["properties"]["Name"]["title"][0]["text"]["content"]
                .as_str()
                .unwrap()
                .len(),
            TITLE_LIMIT
        );
    }

    #[test]
    fn block_count_is_capped() {
        let client = NotionClient::new("test-token");
        let importer = importer(&client, default_schema());

        // 150 paragraphs convert to 150 blocks
        let body: String = (0..150)
            .map(|n| format!("paragraph {}\n\n", n))
            .collect();
        let (payload, _) = importer.build_payload(&item(Some(issue("Long", &body)), vec![]));

        let children = payload["children"].as_array().unwrap();
        assert_eq!(children.len(), importer.options.max_blocks);
        // block 0 is the URL line; body paragraphs follow in order up to the cap
        assert_eq!(
            children[1]["paragraph"]["rich_text"][0]["text"]["content"],
            "paragraph 0"
        );
    }

    #[test]
    fn items_without_content_have_no_children() {
        let client = NotionClient::new("test-token");
        let importer = importer(&client, default_schema());
        let (payload, _) = importer.build_payload(&item(None, vec![]));
        assert!(payload.get("children").is_none());
    }

    #[test]
    fn failed_items_serialize_with_camel_case_timestamp() {
        let failed = FailedItem {
            title: "Fix login".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 9, 30, 23, 15, 0).unwrap(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["title"], "Fix login");
        assert_eq!(json["createdAt"], "2024-09-30T23:15:00Z");
    }

    #[test]
    fn writes_failed_items_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed-items.json");

        let items = vec![FailedItem {
            title: "Fix login".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 9, 30, 23, 15, 0).unwrap(),
        }];
        write_failed_items(&path, &items).unwrap();

        let written: Vec<FailedItem> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].title, "Fix login");
    }
}
