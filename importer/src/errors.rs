//! Error types for the importer

use thiserror::Error;

/// Main error type for the importer
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::ser::Error),

    #[error("Glob error: {0}")]
    GlobError(#[from] globset::Error),

    #[error("Directory walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Git error: {0}")]
    GitError(#[from] GitDetectError),

    #[error("Compose error: {0}")]
    ComposeError(String),

    #[error("Komodo API error: {0}")]
    KomodoApiError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ImportError {
    fn from(err: anyhow::Error) -> Self {
        ImportError::Internal(format!("{:#}", err))
    }
}

/// Why a folder could not be used as a git-backed stack
#[derive(Error, Debug)]
pub enum GitDetectError {
    #[error("No .git folder found")]
    NotAGitRepo,

    #[error("Could not determine tracked branch (git status: {raw})")]
    NoTrackedBranch { raw: String },

    #[error("Could not parse remote branch ({raw})")]
    NoRemoteBranch { raw: String },

    #[error("Unexpected error running `{command}`: {message}")]
    Unexpected { command: String, message: String },
}

impl GitDetectError {
    /// Expected outcomes of probing a folder, as opposed to git itself failing
    pub fn is_classified(&self) -> bool {
        !matches!(self, GitDetectError::Unexpected { .. })
    }
}

/// Why a builder did not produce a stack for a candidate
#[derive(Error, Debug)]
pub enum DiscoveryOutcome {
    /// No usable repository in the folder or above it
    #[error("{0}")]
    NotGitBacked(String),

    /// git itself failed while probing the folder
    #[error("Git detection failed: {0}")]
    DetectionFailed(GitDetectError),

    #[error("{0}")]
    BuildFailed(#[from] ImportError),
}

impl From<GitDetectError> for DiscoveryOutcome {
    fn from(err: GitDetectError) -> Self {
        if err.is_classified() {
            DiscoveryOutcome::NotGitBacked(err.to_string())
        } else {
            DiscoveryOutcome::DetectionFailed(err)
        }
    }
}
