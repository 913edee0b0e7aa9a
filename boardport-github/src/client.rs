//! GraphQL client for the GitHub API

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{Error, Result};

const GRAPHQL_URL: &str = "https://api.github.com/graphql";
const USER_AGENT: &str = "boardport";

/// GraphQL query response wrapper
#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

/// GraphQL error
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct GraphqlError {
    message: String,
    /// Path segments mix strings and indices
    #[serde(default)]
    path: Vec<Value>,
}

/// GitHub GraphQL API client
///
/// The token is supplied at construction so callers control where
/// credentials come from.
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
}

impl GitHubClient {
    /// Create a new client with the given bearer token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
        }
    }

    /// Execute a GraphQL query
    pub(crate) async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: &Value,
    ) -> Result<T> {
        debug!(?variables, "Sending GraphQL query");

        let request_body = json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .http
            .post(GRAPHQL_URL)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            return Err(Error::Status { status, body });
        }

        let graphql_response: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Failed to parse GraphQL response: {}", e)))?;

        if let Some(errors) = graphql_response.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::Graphql(messages.join(", ")));
        }

        graphql_response.data.ok_or(Error::MissingData)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient").finish_non_exhaustive()
    }
}
