//! Compose and env file selection

use std::cmp::Ordering;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::errors::ImportError;
use crate::filesys::file::File;
use crate::filesys::glob::find_files_recursive;

pub const DEFAULT_COMPOSE_GLOB: &str = "**/{compose,docker-compose}*.{yaml,yml}";

pub const DEFAULT_ENV_GLOB: &str = "**/*.env";

pub const DEFAULT_KOMODO_ENV_NAME: &str = ".komodoEnv";

/// Komodo's own default compose file
const KOMODO_DEFAULT_COMPOSE: &str = "compose.yaml";

/// Order compose paths so the most likely "main" file comes first.
///
/// Shallower paths win, then names without `docker` in them, then shorter
/// names. Remaining ties fall back to the path itself so the order is total.
pub fn sort_compose_paths(paths: &[String]) -> Vec<String> {
    let mut sorted = paths.to_vec();
    sorted.sort_by(|a, b| compare_compose_paths(a, b));
    sorted
}

fn compare_compose_paths(a: &str, b: &str) -> Ordering {
    let depth = |p: &str| p.split('/').count();
    let stem = |p: &str| {
        Path::new(p)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    };
    let (stem_a, stem_b) = (stem(a), stem(b));

    depth(a)
        .cmp(&depth(b))
        .then_with(|| stem_a.contains("docker").cmp(&stem_b.contains("docker")))
        .then_with(|| stem_a.len().cmp(&stem_b.len()))
        .then_with(|| a.cmp(b))
}

/// Pick compose files under `dir`.
///
/// The default glob selects the single best match, any other glob selects
/// every match. `None` means either nothing matched or the only selection is
/// Komodo's own default, which does not need to be written out.
pub fn select_compose_files(glob: &str, dir: &Path) -> Result<Option<Vec<String>>, ImportError> {
    let found = find_files_recursive(glob, dir)?;
    if found.is_empty() {
        warn!("Did not find any files matching compose glob {}", glob);
        return Ok(None);
    }

    let sorted = sort_compose_paths(&found);
    info!(
        "Found {} files matching compose glob:\n{}",
        sorted.len(),
        sorted.join("\n")
    );

    if glob.trim() != DEFAULT_COMPOSE_GLOB {
        info!("Using file(s): {}", sorted.join(", "));
        return Ok(Some(sorted));
    }
    Ok(without_komodo_default(sorted.into_iter().take(1).collect()))
}

/// `None` when `files` is only Komodo's default compose file, which does not
/// need to be written out
pub fn without_komodo_default(files: Vec<String>) -> Option<Vec<String>> {
    if files.is_empty() {
        return None;
    }
    if files.len() == 1 && files[0] == KOMODO_DEFAULT_COMPOSE {
        info!("Using file: compose.yaml but not writing to file_paths since this is the Komodo default");
        return None;
    }
    info!("Using file(s): {}", files.join(", "));
    Some(files)
}

/// Find env files under `dir`, hidden files included, in walk order
pub fn select_env_files(glob: &str, dir: &Path) -> Result<Option<Vec<String>>, ImportError> {
    let found = find_files_recursive(glob, dir)?;
    if found.is_empty() {
        debug!("No env files matched {}", glob);
        return Ok(None);
    }
    info!("Found {} matching env files:\n{}", found.len(), found.join("\n"));
    Ok(Some(found))
}

/// How env files become stack config
#[derive(Debug, Clone)]
pub struct EnvOptions<'a> {
    pub env_file_glob: &'a str,
    /// Inline file contents instead of referencing the files
    pub write_env: bool,
    pub komodo_env_name: &'a str,
    /// Prepended to referenced files, for folders below a repository root
    pub path_prefix: Option<&'a str>,
}

/// Env-related part of a stack config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub env_file_path: Option<String>,
    pub additional_env_files: Option<Vec<String>>,
    pub environment: Option<String>,
}

/// Build the env part of a stack config from the env files under `dir`
pub async fn parse_env_config(
    dir: &Path,
    options: &EnvOptions<'_>,
) -> Result<EnvConfig, ImportError> {
    let Some(files) = select_env_files(options.env_file_glob, dir)? else {
        return Ok(EnvConfig::default());
    };

    if !options.write_env {
        info!("Using {} for Komodo-written env file", options.komodo_env_name);
        let files = files
            .into_iter()
            .map(|f| match options.path_prefix {
                Some(prefix) if !prefix.is_empty() => {
                    format!("{}/{}", prefix.trim_end_matches('/'), f)
                }
                _ => f,
            })
            .collect();
        return Ok(EnvConfig {
            env_file_path: Some(options.komodo_env_name.to_string()),
            additional_env_files: Some(files),
            environment: None,
        });
    }

    let mut contents = Vec::with_capacity(files.len());
    for f in &files {
        let text = File::new(dir.join(f)).read_string().await?;
        if text.trim().is_empty() {
            debug!("Skipping empty env file {}", f);
            continue;
        }
        contents.push(text);
    }
    info!("Writing contents of {} env files to Stack environment", contents.len());

    Ok(EnvConfig {
        environment: (!contents.is_empty()).then(|| contents.join("\n")),
        ..Default::default()
    })
}
