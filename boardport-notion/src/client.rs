//! REST client for the Notion API

use std::collections::HashMap;

use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{Error, Result};

const BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Pages fetched per query page when paginating a database
const QUERY_PAGE_SIZE: u32 = 100;

/// Notion API client
///
/// The integration token is supplied at construction so callers control
/// where credentials come from.
pub struct NotionClient {
    http: reqwest::Client,
    token: String,
}

impl NotionClient {
    /// Create a new client with the given integration token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", BASE_URL, path))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            // Notion error bodies carry a human-readable message field
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
                .unwrap_or(body);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch a database's property schema
    pub async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseSchema> {
        debug!(database_id, "Retrieving database schema");
        let value = self
            .send(self.request(Method::GET, &format!("/databases/{}", database_id)))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Declare or patch properties on a database
    ///
    /// Only the named properties are touched; the API leaves unrelated
    /// existing properties alone.
    pub async fn update_database(&self, database_id: &str, properties: &Value) -> Result<()> {
        debug!(database_id, "Updating database properties");
        let body = json!({ "properties": properties });
        self.send(
            self.request(Method::PATCH, &format!("/databases/{}", database_id))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    /// Create a page
    pub async fn create_page(&self, payload: &Value) -> Result<()> {
        self.send(self.request(Method::POST, "/pages").json(payload))
            .await?;
        Ok(())
    }

    /// Fetch one page of a database query, for pagination
    pub async fn query_database_page(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<QueryPage> {
        let mut body = json!({ "page_size": QUERY_PAGE_SIZE });
        if let Some(cursor) = start_cursor {
            body["start_cursor"] = json!(cursor);
        }

        let value = self
            .send(
                self.request(Method::POST, &format!("/databases/{}/query", database_id))
                    .json(&body),
            )
            .await?;

        let page_ids = value
            .get("results")
            .and_then(Value::as_array)
            .map(|results| {
                results
                    .iter()
                    .filter_map(|page| page.get("id").and_then(Value::as_str))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(QueryPage {
            page_ids,
            has_more: value
                .get("has_more")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            next_cursor: value
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }

    /// Archive a page (Notion's delete)
    pub async fn archive_page(&self, page_id: &str) -> Result<()> {
        let body = json!({ "archived": true });
        self.send(
            self.request(Method::PATCH, &format!("/pages/{}", page_id))
                .json(&body),
        )
        .await?;
        Ok(())
    }
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient").finish_non_exhaustive()
    }
}

/// One page of database query results
#[derive(Debug, Clone)]
pub struct QueryPage {
    pub page_ids: Vec<String>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// A database's property schema, fetched once and read-only for a run
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSchema {
    pub id: String,
    pub properties: HashMap<String, PropertySpec>,
}

/// One declared property
#[derive(Debug, Clone, Deserialize)]
pub struct PropertySpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl DatabaseSchema {
    /// Declared type of a property, if the schema has it
    pub fn property_type(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.kind.as_str())
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Name of the title property (it may be named anything)
    pub fn title_property(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|(_, spec)| spec.kind == "title")
            .map(|(name, _)| name.as_str())
    }
}
