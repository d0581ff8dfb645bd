//! Komodo Import Library
//!
//! Discovers container workloads on a host (compose projects, git
//! repositories and plain folders of compose files) and generates Komodo
//! Stack resources for them.

pub mod app;
pub mod docker;
pub mod errors;
pub mod export;
pub mod filesys;
pub mod git;
pub mod komodo;
pub mod logs;
pub mod stacks;
pub mod utils;
