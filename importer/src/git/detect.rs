//! Git repository detection
//!
//! Shells out to the `git` executable rather than reading `.git` directly,
//! so worktrees, gitfiles and packed refs all behave the way git says they do.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, trace};

use crate::errors::GitDetectError;
use crate::filesys::dir::Dir;
use crate::git::remote::{parse_remotes, select_remote, RemoteInfo};
use crate::git::status::{parse_git_status, GitBranchStatus};

const NOT_A_REPO: &str = "not a git repository";

/// A working copy with a tracked upstream branch and a resolvable remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRepoInfo {
    pub status: GitBranchStatus,
    pub remote: RemoteInfo,
}

impl GitRepoInfo {
    /// Remote branch the working copy tracks
    pub fn remote_branch(&self) -> &str {
        self.status.remote_branch.as_deref().unwrap_or_default()
    }
}

/// Determine whether `dir` is a git working copy usable as a stack source
pub async fn detect_git_repo(dir: &Path) -> Result<GitRepoInfo, GitDetectError> {
    if !Dir::new(dir).has_git_entry().await {
        return Err(GitDetectError::NotAGitRepo);
    }
    debug!("Detected .git in {}, trying to parse as git-based stack", dir.display());

    let status_out = run_git(dir, &["status", "-sb"]).await?;
    let status = parse_git_status(&status_out);
    trace!("git status: {:?}", status);

    if status.branch.is_none() && status.remote.is_none() {
        return Err(GitDetectError::NoTrackedBranch { raw: status.raw });
    }
    let Some(remote_name) = status.remote.clone() else {
        return Err(GitDetectError::NoRemoteBranch { raw: status.raw });
    };

    let remotes_out = run_git(dir, &["remote", "-v"]).await?;
    let remotes = parse_remotes(&remotes_out);
    let Some(remote) = select_remote(&remotes, &remote_name) else {
        return Err(GitDetectError::NoRemoteBranch {
            raw: format!("{} (remote '{}' is not listed by git remote)", status.raw, remote_name),
        });
    };

    Ok(GitRepoInfo { status, remote })
}

/// Nearest ancestor of `dir` (excluding `dir` itself) holding a `.git` entry
pub async fn find_enclosing_repo(dir: &Path) -> Option<PathBuf> {
    let mut current = Dir::new(dir).parent();
    while let Some(candidate) = current {
        if candidate.has_git_entry().await {
            return Some(candidate.path().to_path_buf());
        }
        current = candidate.parent();
    }
    None
}

async fn run_git(dir: &Path, args: &[&str]) -> Result<String, GitDetectError> {
    let command = format!("git {}", args.join(" "));

    // scanned folders are frequently owned by another uid than the importer
    let output = Command::new("git")
        .current_dir(dir)
        .args(["-c", "safe.directory=*"])
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .await
        .map_err(|e| GitDetectError::Unexpected {
            command: command.clone(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if stderr.contains(NOT_A_REPO) {
            return Err(GitDetectError::NotAGitRepo);
        }
        return Err(GitDetectError::Unexpected {
            command,
            message: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
