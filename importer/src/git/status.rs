//! `git status -sb` header parsing

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `## local...remote/branch [ahead 1]`
static TRACKED_BRANCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^## (?P<branch>\S+?)\.\.\.(?P<remote>[^/\s]+)/(?P<remote_branch>\S+)")
        .expect("valid tracked branch regex")
});

/// `## local` with no upstream
static LOCAL_BRANCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^## (?P<branch>\S+)").expect("valid local branch regex"));

const NO_COMMITS: &str = "No commits yet";

/// Branch tracking state of a working copy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitBranchStatus {
    pub branch: Option<String>,
    pub remote: Option<String>,
    pub remote_branch: Option<String>,
    /// First line of the status output, always set
    pub raw: String,
}

/// Parse the header line of `git status -sb`.
///
/// `remote` and `remote_branch` are only ever set together.
pub fn parse_git_status(output: &str) -> GitBranchStatus {
    let raw = output.lines().next().unwrap_or_default().trim_end().to_string();

    if raw.contains(NO_COMMITS) {
        return GitBranchStatus {
            raw,
            ..Default::default()
        };
    }

    if let Some(caps) = TRACKED_BRANCH_RE.captures(&raw) {
        return GitBranchStatus {
            branch: Some(caps["branch"].to_string()),
            remote: Some(caps["remote"].to_string()),
            remote_branch: Some(caps["remote_branch"].to_string()),
            raw,
        };
    }

    if let Some(caps) = LOCAL_BRANCH_RE.captures(&raw) {
        return GitBranchStatus {
            branch: Some(caps["branch"].to_string()),
            raw,
            ..Default::default()
        };
    }

    GitBranchStatus {
        raw,
        ..Default::default()
    }
}
