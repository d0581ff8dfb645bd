//! Glob matching over the scanned tree

use std::io::ErrorKind;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::errors::ImportError;
use crate::filesys::dir::Dir;

/// Compile a glob where `*` does not cross `/` and `**` does
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher, ImportError> {
    let glob = GlobBuilder::new(pattern.trim())
        .literal_separator(true)
        .build()?;
    Ok(glob.compile_matcher())
}

/// Find files under `dir` matching `pattern`, returned as `/`-separated
/// paths relative to `dir`.
///
/// Hidden files are candidates like any other, symlinks to files included.
/// `.git` folders are not descended into and folders this process may not
/// read are skipped. Results come back in walk order, which is sorted by file
/// name within each directory.
pub fn find_files_recursive(pattern: &str, dir: &Path) -> Result<Vec<String>, ImportError> {
    let matcher = compile_glob(pattern)?;
    let mut found = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == ".git"));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_permission_denied(&e) => {
                debug!(
                    "Skipping unreadable path {}: {}",
                    e.path().map(|p| p.display().to_string()).unwrap_or_default(),
                    e
                );
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let rel = to_slash_path(rel);
        if matcher.is_match(&rel) {
            trace!("{} matched {}", rel, pattern);
            found.push(rel);
        }
    }

    Ok(found)
}

/// Immediate, non-hidden subfolders of `dir` whose names match `include`
/// and do not match `exclude`
pub async fn find_folders(
    dir: &Path,
    include: &str,
    exclude: Option<&str>,
) -> Result<Vec<String>, ImportError> {
    let include = compile_glob(include)?;
    let exclude = exclude.map(compile_glob).transpose()?;

    let names = Dir::new(dir).list_dir_names(false).await?;
    Ok(names
        .into_iter()
        .filter(|name| include.is_match(name))
        .filter(|name| exclude.as_ref().map(|g| !g.is_match(name)).unwrap_or(true))
        .collect())
}

fn is_permission_denied(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == ErrorKind::PermissionDenied)
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
