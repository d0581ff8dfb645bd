//! Mount, host and scan directory resolution
//!
//! The importer usually runs in a container with the host's workload tree
//! bind-mounted somewhere. Three views of that tree are tracked:
//!
//! * `mount` is where this process sees the tree,
//! * `host` is where the target platform (running on the host) sees it,
//! * `scan` is the subtree of `mount` that is actually walked.
//!
//! Any path found under `mount` has to be translated to its `host` form
//! before it is written into a record.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::errors::ImportError;
use crate::filesys::dir::Dir;

/// Directory values as configured, before resolution
#[derive(Debug, Clone, Default)]
pub struct DirectoryValues {
    pub mount: String,
    pub host: Option<String>,
    pub scan: Option<String>,
}

/// Resolved directory views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub mount: PathBuf,
    pub host: PathBuf,
    pub scan: PathBuf,
}

impl DirectoryConfig {
    /// Translate a path under `mount` into the equivalent path under `host`.
    /// Paths outside `mount` are returned unchanged.
    pub fn to_host_path(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.mount) {
            Ok(rest) if rest.as_os_str().is_empty() => self.host.clone(),
            Ok(rest) => self.host.join(rest),
            Err(_) => path.to_path_buf(),
        }
    }

    /// Translate a host path into the path this process can read, if it
    /// lies under `host`
    pub fn from_host_path(&self, path: &Path) -> Option<PathBuf> {
        let rest = path.strip_prefix(&self.host).ok()?;
        if rest.as_os_str().is_empty() {
            Some(self.mount.clone())
        } else {
            Some(self.mount.join(rest))
        }
    }
}

/// Resolve configured directories into real paths.
///
/// Fails with [`ImportError::ConfigError`] when `mount` or a distinct
/// `scan` cannot be read. `host` is never checked since it names a path on
/// another machine.
pub async fn resolve_directories(values: &DirectoryValues) -> Result<DirectoryConfig, ImportError> {
    let mount_val = values.mount.trim();
    if mount_val.is_empty() {
        return Err(ImportError::ConfigError("Mount directory must be set".to_string()));
    }

    let mount = fs::canonicalize(mount_val).await.map_err(|e| {
        ImportError::ConfigError(format!("Could not resolve mount directory {}: {}", mount_val, e))
    })?;
    Dir::new(&mount).assert_readable().await?;

    let host = match values.host.as_deref().map(str::trim) {
        None | Some("") => mount.clone(),
        Some(h) if same_path(h, mount_val) || Path::new(h) == mount => mount.clone(),
        Some(h) => PathBuf::from(h),
    };

    let scan = match values.scan.as_deref().map(str::trim) {
        None | Some("") => mount.clone(),
        Some(s) if same_path(s, mount_val) => mount.clone(),
        Some(s) => {
            let candidate = mount.join(s);
            let resolved = fs::canonicalize(&candidate).await.map_err(|e| {
                ImportError::ConfigError(format!(
                    "Could not resolve scan directory {}: {}",
                    candidate.display(),
                    e
                ))
            })?;
            if !resolved.starts_with(&mount) {
                return Err(ImportError::ConfigError(format!(
                    "Scan directory {} is not inside mount directory {}",
                    resolved.display(),
                    mount.display()
                )));
            }
            Dir::new(&resolved).assert_readable().await?;
            resolved
        }
    };

    Ok(DirectoryConfig { mount, host, scan })
}

fn same_path(a: &str, b: &str) -> bool {
    let trim = |s: &str| {
        let t = s.trim_end_matches('/');
        if t.is_empty() {
            "/".to_string()
        } else {
            t.to_string()
        }
    };
    trim(a) == trim(b)
}
