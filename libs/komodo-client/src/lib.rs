//! Komodo read API models
//!
//! Only the pieces of the Komodo `/read` surface the importer consults.

use serde::{Deserialize, Serialize};

/// Envelope for a `/read` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadRequest {
    /// Request name, e.g. `ListRepos`
    #[serde(rename = "type")]
    pub request: String,

    /// Request parameters
    pub params: serde_json::Value,
}

impl ReadRequest {
    /// A request that takes no parameters
    pub fn without_params(request: &str) -> Self {
        Self {
            request: request.to_string(),
            params: serde_json::json!({}),
        }
    }
}

/// Mongo-style object id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectId {
    #[serde(rename = "$oid", default)]
    pub oid: String,
}

/// Repo summary returned by `ListRepos`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoListItem {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub tags: Vec<String>,

    pub info: RepoListItemInfo,
}

/// Git coordinates recorded on a Repo resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoListItemInfo {
    /// Provider domain, e.g. `github.com`
    #[serde(default)]
    pub git_provider: String,

    /// Repo path, e.g. `foxxmd/komodo-import`
    #[serde(default)]
    pub repo: String,

    #[serde(default)]
    pub branch: String,

    #[serde(default)]
    pub repo_link: String,

    #[serde(default)]
    pub server_id: String,
}

/// Git provider account returned by `ListGitProviderAccounts`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitProviderAccount {
    #[serde(rename = "_id", default)]
    pub id: Option<ObjectId>,

    pub domain: String,

    #[serde(default = "default_true")]
    pub https: bool,

    #[serde(default)]
    pub username: String,
}

fn default_true() -> bool {
    true
}

/// Error body returned by the API on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(default)]
    pub trace: Vec<String>,
}
