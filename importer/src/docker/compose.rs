//! Compose projects recovered from container labels

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::docker::Container;

pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";
pub const COMPOSE_WORKING_DIR_LABEL: &str = "com.docker.compose.project.working_dir";
pub const COMPOSE_CONFIG_FILES_LABEL: &str = "com.docker.compose.project.config_files";

/// A compose project as the host's daemon knows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeCandidate {
    pub project_name: String,
    /// Host path the project was brought up from
    pub working_dir: PathBuf,
    /// Absolute host paths of the project's compose files
    pub compose_file_paths: Vec<String>,
    pub state: Option<String>,
}

impl ComposeCandidate {
    /// Compose files relative to the working dir. Files outside it keep
    /// their absolute path.
    pub fn relative_compose_files(&self) -> Vec<String> {
        self.compose_file_paths
            .iter()
            .map(|p| match Path::new(p).strip_prefix(&self.working_dir) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/"),
                _ => p.clone(),
            })
            .collect()
    }
}

/// Collapse containers into one candidate per compose project, in the
/// order projects are first seen.
///
/// A container missing the working dir or config files label disqualifies
/// its whole project; later containers of that project are not consulted.
pub fn consolidate_compose_stacks(containers: &[Container]) -> Vec<ComposeCandidate> {
    debug!("Finding Compose projects for reference...");

    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates = Vec::new();

    for c in containers {
        let Some(name) = c.labels.get(COMPOSE_PROJECT_LABEL) else {
            continue;
        };
        if !seen.insert(name.as_str()) {
            continue;
        }

        let Some(working_dir) = c.labels.get(COMPOSE_WORKING_DIR_LABEL) else {
            warn!(
                "Cannot use {} compose project because {} label is missing",
                name, COMPOSE_WORKING_DIR_LABEL
            );
            continue;
        };
        let Some(config_files) = c.labels.get(COMPOSE_CONFIG_FILES_LABEL) else {
            warn!(
                "Cannot use {} compose project because {} label is missing",
                name, COMPOSE_CONFIG_FILES_LABEL
            );
            continue;
        };

        debug!("Found Project '{}' at working dir '{}'", name, working_dir);
        candidates.push(ComposeCandidate {
            project_name: name.clone(),
            working_dir: PathBuf::from(working_dir),
            compose_file_paths: config_files
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            state: c.state.clone(),
        });
    }

    debug!("Found {} Compose projects", candidates.len());
    candidates
}
