//! Diagnostic counts over a project snapshot

use crate::snapshot::{Content, ProjectField, ProjectSnapshot};

/// Item and comment totals for one snapshot
///
/// Items without backing content count as drafts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub draft_issues: usize,
    pub issues: usize,
    pub pull_requests: usize,
    pub comments: usize,
    /// Option count of the board's `Status` field, when one exists
    pub status_options: Option<usize>,
}

impl SnapshotSummary {
    pub fn of(snapshot: &ProjectSnapshot) -> Self {
        let mut summary = SnapshotSummary::default();

        for item in &snapshot.items.nodes {
            match &item.content {
                None | Some(Content::DraftIssue(_)) => summary.draft_issues += 1,
                Some(Content::Issue(c)) => {
                    summary.issues += 1;
                    summary.comments += c.comments.nodes.len();
                }
                Some(Content::PullRequest(c)) => {
                    summary.pull_requests += 1;
                    summary.comments += c.comments.nodes.len();
                }
            }
        }

        summary.status_options = snapshot.fields.nodes.iter().find_map(|field| match field {
            ProjectField::SingleSelect(f) if f.name == "Status" => Some(f.options.len()),
            other if other.name() == Some("Status") => Some(0),
            _ => None,
        });

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{
        Comment, Connection, Content, DraftIssue, FieldCommon, FieldOption, IssueContent,
        NodeList, ProjectItem, SingleSelectField,
    };
    use chrono::{TimeZone, Utc};

    fn item(content: Option<Content>) -> ProjectItem {
        ProjectItem {
            id: "PVTI_1".to_string(),
            item_type: "ISSUE".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 9, 30, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 9, 30, 12, 0, 0).unwrap(),
            is_archived: false,
            content,
            field_values: NodeList::default(),
        }
    }

    fn issue_content(comment_count: usize) -> IssueContent {
        IssueContent {
            id: "I_1".to_string(),
            number: 1,
            title: "Issue".to_string(),
            body: String::new(),
            state: "OPEN".to_string(),
            url: "https://github.com/acme/web/issues/1".to_string(),
            comments: Connection {
                total_count: comment_count as u64,
                nodes: (0..comment_count)
                    .map(|n| Comment {
                        id: format!("C_{}", n),
                        body: "note".to_string(),
                        created_at: Utc.with_ymd_and_hms(2024, 9, 30, 12, 0, 0).unwrap(),
                        author: None,
                    })
                    .collect(),
            },
            author: None,
            assignees: NodeList::default(),
            labels: NodeList::default(),
        }
    }

    fn snapshot(items: Vec<ProjectItem>, fields: Vec<ProjectField>) -> ProjectSnapshot {
        ProjectSnapshot {
            id: "PVT_1".to_string(),
            title: "Roadmap".to_string(),
            short_description: None,
            readme: None,
            number: 1,
            public: false,
            closed: false,
            url: "https://github.com/orgs/acme/projects/1".to_string(),
            items: Connection {
                total_count: items.len() as u64,
                nodes: items,
            },
            views: NodeList::default(),
            fields: NodeList { nodes: fields },
        }
    }

    #[test]
    fn counts_items_by_kind() {
        let snapshot = snapshot(
            vec![
                item(None),
                item(Some(Content::DraftIssue(DraftIssue {
                    title: "Draft".to_string(),
                    body: String::new(),
                }))),
                item(Some(Content::Issue(issue_content(2)))),
                item(Some(Content::PullRequest(issue_content(3)))),
            ],
            vec![],
        );

        let summary = SnapshotSummary::of(&snapshot);
        assert_eq!(summary.draft_issues, 2);
        assert_eq!(summary.issues, 1);
        assert_eq!(summary.pull_requests, 1);
        assert_eq!(summary.comments, 5);
        assert_eq!(summary.status_options, None);
    }

    #[test]
    fn reports_status_field_options() {
        let status = ProjectField::SingleSelect(SingleSelectField {
            id: "F1".to_string(),
            name: "Status".to_string(),
            data_type: "SINGLE_SELECT".to_string(),
            options: vec![
                FieldOption {
                    id: "o1".to_string(),
                    name: "Todo".to_string(),
                    color: "GRAY".to_string(),
                },
                FieldOption {
                    id: "o2".to_string(),
                    name: "Done".to_string(),
                    color: "GREEN".to_string(),
                },
            ],
        });

        let summary = SnapshotSummary::of(&snapshot(vec![], vec![status]));
        assert_eq!(summary.status_options, Some(2));

        let plain = ProjectField::Common(FieldCommon {
            id: "F1".to_string(),
            name: "Status".to_string(),
            data_type: "TEXT".to_string(),
        });
        let summary = SnapshotSummary::of(&snapshot(vec![], vec![plain]));
        assert_eq!(summary.status_options, Some(0));
    }
}
