//! Stack records and candidates

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::app::options::StackOptions;
use crate::errors::ImportError;
use crate::utils::remove_empty_keys;

/// How a candidate folder was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveredVia {
    /// Working dir of a compose project known to the daemon
    Compose,
    /// Child folder of the scan dir
    Folder,
}

/// What a live compose project says about a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeMeta {
    pub project_name: String,
    /// Compose files relative to the working dir
    pub compose_files: Vec<String>,
}

/// A folder that may become a stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackCandidate {
    /// Folder as seen by this process
    pub path: PathBuf,
    /// Stack name, the folder's final component
    pub name: String,
    pub discovered_via: DiscoveredVia,
    pub compose: Option<ComposeMeta>,
}

impl StackCandidate {
    pub fn new(path: PathBuf, discovered_via: DiscoveredVia) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            path,
            name,
            discovered_via,
            compose: None,
        }
    }

    pub fn with_compose(mut self, compose: Option<ComposeMeta>) -> Self {
        self.compose = compose;
        self
    }

    /// Compose project name, when it differs from the stack name
    pub fn project_name(&self) -> Option<String> {
        self.compose
            .as_ref()
            .map(|c| c.project_name.clone())
            .filter(|p| *p != self.name)
    }
}

/// Where a git stack's repository comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RepoRef {
    /// An existing Komodo Repo resource
    Linked { linked_repo: String },
    /// Repository coordinates written into the stack itself
    Standalone {
        /// Omitted for github.com
        git_provider: Option<String>,
        git_account: Option<String>,
        /// Only written when false
        git_https: Option<bool>,
        repo: String,
        branch: String,
    },
}

/// The `config` table of a stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StackConfig {
    pub server: String,
    pub project_name: Option<String>,
    pub run_directory: Option<String>,
    pub files_on_host: Option<bool>,
    pub file_paths: Option<Vec<String>>,
    pub env_file_path: Option<String>,
    pub additional_env_files: Option<Vec<String>>,
    pub environment: Option<String>,
    pub registry_provider: Option<String>,
    pub registry_account: Option<String>,
    pub auto_update: Option<bool>,
    pub poll_for_updates: Option<bool>,
    #[serde(flatten)]
    pub repo: Option<RepoRef>,
}

impl StackConfig {
    /// Config carrying the values shared by every stack
    pub fn from_options(options: &StackOptions) -> Self {
        Self {
            server: options.server.clone(),
            registry_provider: options.registry_provider.clone(),
            registry_account: options.registry_account.clone(),
            auto_update: options.auto_update,
            poll_for_updates: options.poll_for_updates,
            ..Default::default()
        }
    }
}

/// One `[[stack]]` entry of a resource sync file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TomlStack {
    pub name: String,
    pub config: StackConfig,
}

impl TomlStack {
    /// JSON form with absent and empty values removed
    pub fn to_value(&self) -> Result<Value, ImportError> {
        let value = serde_json::to_value(self)?;
        Ok(remove_empty_keys(value).unwrap_or(Value::Null))
    }
}
