//! Stack discovery and config synthesis

pub mod builder;
pub mod files_on_server;
pub mod git_stack;
pub mod models;
pub mod select;

pub use builder::{RunSummary, StackBuilder};
pub use files_on_server::build_file_stack;
pub use git_stack::{build_git_stack, GitStackContext};
pub use models::{ComposeMeta, DiscoveredVia, RepoRef, StackCandidate, StackConfig, TomlStack};
