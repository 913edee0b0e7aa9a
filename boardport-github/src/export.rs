//! Project snapshot export
//!
//! One root query fetches the project's metadata, fields, views, and first
//! page of items; follow-up queries walk the items connection with a cursor
//! until the API reports no further page. Pages are appended in arrival
//! order, so the snapshot keeps the board's item ordering.
//!
//! Comment, label, and assignee lists are fetched with a single fixed-size
//! page each and are not paginated further. This is a documented
//! completeness ceiling, surfaced through the page-size constants below.

use boardport_core::{Connection, NodeList, ProjectField, ProjectItem, ProjectSnapshot, ProjectView};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{Error, GitHubClient, ProjectRef, Result};

/// Items fetched per page of the items connection
pub const ITEM_PAGE_SIZE: u32 = 100;
/// Comments fetched per item; longer threads are truncated
pub const COMMENT_PAGE_SIZE: u32 = 100;
/// Labels fetched per item; longer lists are truncated
pub const LABEL_PAGE_SIZE: u32 = 20;
/// Assignees fetched per item
pub const ASSIGNEE_PAGE_SIZE: u32 = 10;

const FIELD_VALUE_PAGE_SIZE: u32 = 20;
const FIELD_PAGE_SIZE: u32 = 20;
const VIEW_PAGE_SIZE: u32 = 20;

/// Project response minus the accumulated item list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectPayload {
    id: String,
    title: String,
    short_description: Option<String>,
    readme: Option<String>,
    number: u64,
    public: bool,
    closed: bool,
    url: String,
    items: ItemPage,
    views: NodeList<ProjectView>,
    fields: NodeList<ProjectField>,
}

/// One page of the items connection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemPage {
    #[allow(dead_code)]
    total_count: u64,
    nodes: Vec<ProjectItem>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

impl GitHubClient {
    /// Export a complete project board as a snapshot
    ///
    /// Any GraphQL error or a missing project aborts the export; there is no
    /// partial output.
    pub async fn export_project(&self, project: &ProjectRef) -> Result<ProjectSnapshot> {
        let (root_query, page_query, mut variables, root_path) = match project {
            ProjectRef::Org { org, number } => (
                org_root_query(),
                org_page_query(),
                json!({ "owner": org, "number": number }),
                "/organization/projectV2",
            ),
            ProjectRef::Repo {
                owner,
                repo,
                number,
            } => (
                repo_root_query(),
                repo_page_query(),
                json!({ "owner": owner, "repo": repo, "number": number }),
                "/repository/projectV2",
            ),
        };
        let items_path = format!("{}/items", root_path);

        info!(project = %project, "Exporting project");

        let data: Value = self.graphql(&root_query, &variables).await?;
        let payload: ProjectPayload = decode(&data, root_path)?
            .ok_or_else(|| Error::ProjectNotFound(project.to_string()))?;

        let ProjectPayload {
            id,
            title,
            short_description,
            readme,
            number,
            public,
            closed,
            url,
            items,
            views,
            fields,
        } = payload;

        let ItemPage {
            nodes: mut all_items,
            mut page_info,
            ..
        } = items;

        while page_info.has_next_page {
            let cursor = page_info.end_cursor.ok_or_else(|| {
                Error::Parse("page reported a next page without a cursor".to_string())
            })?;
            variables["cursor"] = json!(cursor);

            let data: Value = self.graphql(&page_query, &variables).await?;
            let page: ItemPage = decode(&data, &items_path)?
                .ok_or_else(|| Error::ProjectNotFound(project.to_string()))?;

            debug!(count = page.nodes.len(), "Fetched item page");
            all_items = append_page(all_items, page.nodes);
            page_info = page.page_info;
        }

        info!(title = %title, items = all_items.len(), "Export complete");

        Ok(ProjectSnapshot {
            id,
            title,
            short_description,
            readme,
            number,
            public,
            closed,
            url,
            items: Connection {
                total_count: all_items.len() as u64,
                nodes: all_items,
            },
            views,
            fields,
        })
    }
}

/// Append a page of items; pages arrive in board order and are never reordered
fn append_page(mut acc: Vec<ProjectItem>, page: Vec<ProjectItem>) -> Vec<ProjectItem> {
    acc.extend(page);
    acc
}

/// Decode the value at a JSON pointer path, treating null/missing as absent
fn decode<T: DeserializeOwned>(data: &Value, path: &str) -> Result<Option<T>> {
    match data.pointer(path) {
        None | Some(Value::Null) => Ok(None),
        Some(node) => serde_json::from_value(node.clone())
            .map(Some)
            .map_err(|e| Error::Parse(format!("unexpected response shape: {}", e))),
    }
}

fn issue_selection() -> String {
    format!(
        r#"id
number
title
body
state
url
comments(first: {comments}) {{
  totalCount
  nodes {{
    id
    body
    createdAt
    author {{
      login
    }}
  }}
}}
author {{
  login
}}
assignees(first: {assignees}) {{
  nodes {{
    login
  }}
}}
labels(first: {labels}) {{
  nodes {{
    name
    color
  }}
}}"#,
        comments = COMMENT_PAGE_SIZE,
        assignees = ASSIGNEE_PAGE_SIZE,
        labels = LABEL_PAGE_SIZE,
    )
}

fn item_selection() -> String {
    format!(
        r#"id
type
createdAt
updatedAt
isArchived
content {{
  __typename
  ... on DraftIssue {{
    title
    body
  }}
  ... on Issue {{
    {issue}
  }}
  ... on PullRequest {{
    {issue}
  }}
}}
fieldValues(first: {field_values}) {{
  nodes {{
    ... on ProjectV2ItemFieldTextValue {{
      text
      field {{
        ... on ProjectV2FieldCommon {{
          name
        }}
      }}
    }}
    ... on ProjectV2ItemFieldNumberValue {{
      number
      field {{
        ... on ProjectV2FieldCommon {{
          name
        }}
      }}
    }}
    ... on ProjectV2ItemFieldDateValue {{
      date
      field {{
        ... on ProjectV2FieldCommon {{
          name
        }}
      }}
    }}
    ... on ProjectV2ItemFieldSingleSelectValue {{
      name
      field {{
        ... on ProjectV2FieldCommon {{
          name
        }}
      }}
    }}
    ... on ProjectV2ItemFieldIterationValue {{
      title
      field {{
        ... on ProjectV2FieldCommon {{
          name
        }}
      }}
    }}
  }}
}}"#,
        issue = issue_selection(),
        field_values = FIELD_VALUE_PAGE_SIZE,
    )
}

fn items_connection(with_cursor: bool) -> String {
    let after = if with_cursor { ", after: $cursor" } else { "" };
    format!(
        r#"items(first: {size}{after}) {{
  totalCount
  nodes {{
    {item}
  }}
  pageInfo {{
    hasNextPage
    endCursor
  }}
}}"#,
        size = ITEM_PAGE_SIZE,
        after = after,
        item = item_selection(),
    )
}

fn project_selection() -> String {
    format!(
        r#"id
title
shortDescription
readme
number
public
closed
url
{items}
views(first: {views}) {{
  nodes {{
    id
    name
    layout
  }}
}}
fields(first: {fields}) {{
  nodes {{
    ... on ProjectV2Field {{
      id
      name
      dataType
    }}
    ... on ProjectV2SingleSelectField {{
      id
      name
      dataType
      options {{
        id
        name
        color
      }}
    }}
    ... on ProjectV2IterationField {{
      id
      name
      dataType
      configuration {{
        iterations {{
          id
          title
          startDate
          duration
        }}
      }}
    }}
  }}
}}"#,
        items = items_connection(false),
        views = VIEW_PAGE_SIZE,
        fields = FIELD_PAGE_SIZE,
    )
}

fn org_root_query() -> String {
    format!(
        r#"query($owner: String!, $number: Int!) {{
  organization(login: $owner) {{
    projectV2(number: $number) {{
      {project}
    }}
  }}
}}"#,
        project = project_selection(),
    )
}

fn repo_root_query() -> String {
    format!(
        r#"query($owner: String!, $repo: String!, $number: Int!) {{
  repository(owner: $owner, name: $repo) {{
    projectV2(number: $number) {{
      {project}
    }}
  }}
}}"#,
        project = project_selection(),
    )
}

fn org_page_query() -> String {
    format!(
        r#"query($owner: String!, $number: Int!, $cursor: String!) {{
  organization(login: $owner) {{
    projectV2(number: $number) {{
      {items}
    }}
  }}
}}"#,
        items = items_connection(true),
    )
}

fn repo_page_query() -> String {
    format!(
        r#"query($owner: String!, $repo: String!, $number: Int!, $cursor: String!) {{
  repository(owner: $owner, name: $repo) {{
    projectV2(number: $number) {{
      {items}
    }}
  }}
}}"#,
        items = items_connection(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_json(id: &str) -> Value {
        json!({
            "id": id,
            "type": "ISSUE",
            "createdAt": "2024-09-30T12:00:00Z",
            "updatedAt": "2024-09-30T12:00:00Z",
            "isArchived": false,
            "content": null,
            "fieldValues": { "nodes": [] }
        })
    }

    fn items(ids: &[&str]) -> Vec<ProjectItem> {
        ids.iter()
            .map(|id| serde_json::from_value(item_json(id)).unwrap())
            .collect()
    }

    #[test]
    fn append_preserves_arrival_order() {
        let merged = append_page(items(&["a", "b"]), items(&["c", "d"]));
        let merged = append_page(merged, items(&["e"]));
        let order: Vec<&str> = merged.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d", "e"]);

        // concatenating pages equals one hypothetical unlimited page
        let single = items(&["a", "b", "c", "d", "e"]);
        let single_order: Vec<&str> = single.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, single_order);
    }

    #[test]
    fn decode_treats_null_and_missing_as_absent() {
        let data = json!({ "organization": { "projectV2": null } });
        let missing: Option<PageInfo> = decode(&data, "/organization/projectV2").unwrap();
        assert!(missing.is_none());

        let data = json!({ "organization": null });
        let missing: Option<PageInfo> = decode(&data, "/organization/projectV2").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn decode_item_page() {
        let data = json!({
            "repository": {
                "projectV2": {
                    "items": {
                        "totalCount": 240,
                        "nodes": [ item_json("x") ],
                        "pageInfo": { "hasNextPage": true, "endCursor": "Y3Vyc29y" }
                    }
                }
            }
        });

        let page: ItemPage = decode(&data, "/repository/projectV2/items")
            .unwrap()
            .unwrap();
        assert_eq!(page.nodes.len(), 1);
        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("Y3Vyc29y"));
    }

    #[test]
    fn queries_target_the_right_root() {
        assert!(org_root_query().contains("organization(login: $owner)"));
        assert!(repo_root_query().contains("repository(owner: $owner, name: $repo)"));
        assert!(org_page_query().contains("after: $cursor"));
        assert!(repo_page_query().contains("after: $cursor"));
        assert!(!org_root_query().contains("$cursor"));
    }

    #[test]
    fn item_selection_requests_typename_and_caps() {
        let selection = item_selection();
        assert!(selection.contains("__typename"));
        assert!(selection.contains("comments(first: 100)"));
        assert!(selection.contains("labels(first: 20)"));
        assert!(selection.contains("assignees(first: 10)"));
    }
}
