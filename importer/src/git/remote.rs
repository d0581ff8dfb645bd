//! Git remotes and remote URL parsing

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// `origin  https://github.com/foo/bar.git (fetch)`
static REMOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<remote>\S+)\s+(?P<url>\S+)\s+\((?P<kind>\w+)\)").expect("valid remote regex")
});

/// `git@github.com:foo/bar.git`
static SCP_LIKE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[^@/\s]+@)?(?P<host>[^:/\s]+):(?P<path>[^/].*)$").expect("valid scp regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    Fetch,
    Push,
}

/// One line of `git remote -v`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInfo {
    pub remote: String,
    pub url: String,
    pub kind: RemoteKind,
}

/// Repository coordinates derived from a remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepo {
    /// Provider domain, including a non-default port
    pub domain: String,
    /// Repository path without leading slash or `.git`
    pub repo: String,
    /// Whether cloning happens over https (plain `http://` remotes are not)
    pub https: bool,
}

/// Parse the output of `git remote -v`, skipping lines that do not fit
pub fn parse_remotes(output: &str) -> Vec<RemoteInfo> {
    output
        .lines()
        .filter_map(|line| {
            let caps = REMOTE_RE.captures(line.trim())?;
            let kind = match &caps["kind"] {
                "fetch" => RemoteKind::Fetch,
                "push" => RemoteKind::Push,
                _ => return None,
            };
            Some(RemoteInfo {
                remote: caps["remote"].to_string(),
                url: caps["url"].to_string(),
                kind,
            })
        })
        .collect()
}

/// Find the named remote, preferring its fetch URL over its push URL
pub fn select_remote(remotes: &[RemoteInfo], name: &str) -> Option<RemoteInfo> {
    remotes
        .iter()
        .find(|r| r.remote == name && r.kind == RemoteKind::Fetch)
        .or_else(|| {
            remotes
                .iter()
                .find(|r| r.remote == name && r.kind == RemoteKind::Push)
        })
        .cloned()
}

/// Split a remote URL into provider domain and repository path.
///
/// Local path remotes have no provider and yield `None`.
pub fn remote_repo_from_url(remote_url: &str) -> Option<RemoteRepo> {
    if let Ok(parsed) = Url::parse(remote_url) {
        let host = parsed.host_str()?;
        let domain = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        return Some(RemoteRepo {
            domain,
            repo: clean_repo_path(parsed.path())?,
            https: parsed.scheme() != "http",
        });
    }

    let caps = SCP_LIKE_RE.captures(remote_url)?;
    Some(RemoteRepo {
        domain: caps["host"].to_string(),
        repo: clean_repo_path(&caps["path"])?,
        https: true,
    })
}

fn clean_repo_path(path: &str) -> Option<String> {
    let trimmed = path.trim_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
