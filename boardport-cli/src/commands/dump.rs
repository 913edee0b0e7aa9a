//! Export a GitHub project board as a JSON snapshot

use boardport_core::{Secrets, SnapshotSummary};
use boardport_github::{GitHubClient, ProjectRef};
use clap::Args;
use tracing::info;

/// Arguments for the dump command
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Project URL (https://github.com/orgs/<org>/projects/<n> or
    /// https://github.com/<owner>/<repo>/projects/<n>)
    pub project_url: String,
}

impl DumpArgs {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let project = ProjectRef::parse(&self.project_url)?;

        let secrets = Secrets::load()?;
        let token = secrets.github_token().ok_or_else(|| {
            anyhow::anyhow!(
                "GitHub token not found. Set GITHUB_TOKEN or add it to the secrets file"
            )
        })?;

        let client = GitHubClient::new(token);
        let snapshot = client.export_project(&project).await?;

        info!(
            title = %snapshot.title,
            items = snapshot.items.total_count,
            "Found project"
        );

        let summary = SnapshotSummary::of(&snapshot);
        if let Some(options) = summary.status_options {
            info!(options, "Found Status field");
        }

        println!("{}", serde_json::to_string_pretty(&snapshot)?);

        info!(
            draft_issues = summary.draft_issues,
            issues = summary.issues,
            pull_requests = summary.pull_requests,
            comments = summary.comments,
            "Export summary"
        );

        Ok(())
    }
}
