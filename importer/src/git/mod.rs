//! Git working copy inspection

pub mod detect;
pub mod remote;
pub mod status;

pub use detect::{detect_git_repo, find_enclosing_repo, GitRepoInfo};
pub use remote::{remote_repo_from_url, RemoteInfo, RemoteKind, RemoteRepo};
pub use status::{parse_git_status, GitBranchStatus};
