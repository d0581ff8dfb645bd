//! Directory operations

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::errors::ImportError;
use crate::filesys::file::File;

/// A directory wrapper with path
#[derive(Debug, Clone)]
pub struct Dir {
    path: PathBuf,
}

impl Dir {
    /// Create a new directory reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check the directory can be listed by this process
    pub async fn assert_readable(&self) -> Result<(), ImportError> {
        match fs::read_dir(&self.path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ImportError::ConfigError(
                format!("No directory exists at {}", self.path.display()),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(ImportError::ConfigError(format!(
                    "Directory exists at {} but application does not have permission to read it",
                    self.path.display()
                )))
            }
            Err(e) => Err(ImportError::ConfigError(format!(
                "Directory at {} is not accessible: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Names of immediate subdirectories, sorted. Dot-folders are skipped
    /// unless `hidden` is set.
    pub async fn list_dir_names(&self, hidden: bool) -> Result<Vec<String>, ImportError> {
        let mut dirs = Vec::new();
        let mut entries = fs::read_dir(&self.path).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !hidden && name.starts_with('.') {
                continue;
            }
            dirs.push(name);
        }

        dirs.sort();
        Ok(dirs)
    }

    /// Whether a `.git` entry (folder or gitfile) is present
    pub async fn has_git_entry(&self) -> bool {
        fs::symlink_metadata(self.path.join(".git")).await.is_ok()
    }

    /// Get a file within this directory
    pub fn file(&self, name: &str) -> File {
        File::new(self.path.join(name))
    }

    /// Parent directory, if any
    pub fn parent(&self) -> Option<Dir> {
        self.path.parent().map(Dir::new)
    }
}
