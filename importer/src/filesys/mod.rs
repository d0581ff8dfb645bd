//! Filesystem helpers

pub mod dir;
pub mod file;
pub mod glob;
pub mod paths;
