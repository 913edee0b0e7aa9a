//! Database schema provisioning payloads
//!
//! Each payload declares only the properties it owns; the Notion API leaves
//! unrelated existing properties untouched, so re-running a declaration with
//! identical input is idempotent by property name.

use serde_json::{json, Value};

/// The full board property set: workflow selects, people, dates, labels,
/// the source URL, and Notion-managed timestamps
pub fn board_properties() -> Value {
    json!({
        "Status": {
            "type": "select",
            "select": {
                "options": [
                    { "name": "Backlog", "color": "gray" },
                    { "name": "Todo", "color": "yellow" },
                    { "name": "In Progress", "color": "blue" },
                    { "name": "In Review", "color": "purple" },
                    { "name": "QA", "color": "red" },
                    { "name": "Done", "color": "green" }
                ]
            }
        },
        "Priority": {
            "type": "select",
            "select": {
                "options": [
                    { "name": "Urgent", "color": "red" },
                    { "name": "High", "color": "orange" },
                    { "name": "Medium", "color": "yellow" },
                    { "name": "Low", "color": "green" }
                ]
            }
        },
        "Size": {
            "type": "select",
            "select": {
                "options": [
                    { "name": "XS", "color": "gray" },
                    { "name": "S", "color": "blue" },
                    { "name": "M", "color": "purple" },
                    { "name": "L", "color": "pink" },
                    { "name": "XL", "color": "red" }
                ]
            }
        },
        "Assignees": {
            "type": "people",
            "people": {}
        },
        "Release Date": {
            "type": "date",
            "date": {}
        },
        "Design Date": {
            "type": "date",
            "date": {}
        },
        "Labels": {
            "type": "multi_select",
            "multi_select": {
                "options": []
            }
        },
        "GitHub URL": {
            "type": "url",
            "url": {}
        },
        "Added": {
            "type": "created_time",
            "created_time": {}
        },
        "Edited": {
            "type": "last_edited_time",
            "last_edited_time": {}
        }
    })
}

/// The follow-up pair of date properties holding the source item's own
/// created/updated dates
pub fn date_properties() -> Value {
    json!({
        "Created": {
            "type": "date",
            "date": {}
        },
        "Updated": {
            "type": "date",
            "date": {}
        }
    })
}

/// Property names with their declared types, for reporting
pub fn describe(properties: &Value) -> Vec<(String, String)> {
    properties
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(name, spec)| {
                    let kind = spec
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string();
                    (name.clone(), kind)
                })
                .collect()
        })
        .unwrap_or_default()
}
