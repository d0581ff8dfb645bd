//! Stack discovery driver
//!
//! Enumerates candidate folders, either from live compose projects or from
//! the children of the scan dir, and builds one stack per folder. Each
//! folder is tried as a git stack first and falls back to a Files-On-Server
//! stack. A folder that fails to build is logged and skipped.

use std::path::Path;
use std::sync::Arc;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::app::options::{DiscoveryOptions, StackOptions, StackSource};
use crate::docker::{
    consolidate_compose_stacks, ComposeCandidate, ContainerSource, COMPOSE_PROJECT_LABEL,
};
use crate::errors::{DiscoveryOutcome, ImportError};
use crate::filesys::glob::{compile_glob, find_folders};
use crate::filesys::paths::DirectoryConfig;
use crate::komodo::CachedRegistry;
use crate::stacks::files_on_server::build_file_stack;
use crate::stacks::git_stack::{build_git_stack, GitStackContext};
use crate::stacks::models::{ComposeMeta, DiscoveredVia, StackCandidate, TomlStack};

/// Folders Komodo itself manages on a periphery host
static KOMODO_INTERNAL_DIRS: Lazy<GlobSet> = Lazy::new(|| {
    let mut builder = GlobSetBuilder::new();
    for pattern in [
        "**/komodo/{stacks,repos,builds}",
        "**/komodo/{stacks,repos,builds}/**",
    ] {
        builder.add(
            GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .expect("valid internal ignore glob"),
        );
    }
    builder.build().expect("valid internal ignore globset")
});

/// Counts for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub built: usize,
    pub failed: usize,
}

/// Drives discovery and building for one run
pub struct StackBuilder {
    options: StackOptions,
    discovery: DiscoveryOptions,
    dirs: DirectoryConfig,
    containers: Arc<dyn ContainerSource>,
    registry: Option<Arc<CachedRegistry>>,
}

impl StackBuilder {
    pub fn new(
        options: StackOptions,
        discovery: DiscoveryOptions,
        dirs: DirectoryConfig,
        containers: Arc<dyn ContainerSource>,
        registry: Option<Arc<CachedRegistry>>,
    ) -> Self {
        Self {
            options,
            discovery,
            dirs,
            containers,
            registry,
        }
    }

    /// Discover candidates and build a stack for each, in discovery order
    pub async fn build_stacks(&self) -> Result<(Vec<TomlStack>, RunSummary), ImportError> {
        let projects = self.compose_projects().await;

        let candidates = match self.discovery.stacks_from {
            StackSource::Compose => {
                info!("Using parsed Compose projects to generate Stacks");
                self.candidates_from_compose(&projects)?
            }
            StackSource::Dir => {
                info!("Using child folders in SCAN_DIR to generate Stacks");
                self.candidates_from_dirs(&projects).await?
            }
        };

        info!("Env Glob: {}", self.options.env_file_glob);
        info!(
            "Write .env to Komodo Environment -- Dir Stack: {} | Git Stack: {}",
            self.options.write_env.dir, self.options.write_env.git
        );

        let mut stacks = Vec::with_capacity(candidates.len());
        let mut summary = RunSummary::default();

        for candidate in &candidates {
            let span = info_span!("stack", folder = %candidate.name);
            match self.build_candidate(candidate).instrument(span).await {
                Ok(stack) => {
                    stacks.push(stack);
                    summary.built += 1;
                }
                Err(e) => {
                    error!(
                        "Unable to build Stack for folder {}: {}",
                        candidate.path.display(),
                        e
                    );
                    summary.failed += 1;
                }
            }
        }

        info!("Built {} Stacks, {} failed", summary.built, summary.failed);
        Ok((stacks, summary))
    }

    async fn build_candidate(
        &self,
        candidate: &StackCandidate,
    ) -> Result<TomlStack, DiscoveryOutcome> {
        let ctx = GitStackContext {
            options: &self.options,
            registry: self.registry.as_deref(),
            probe_parents: self.discovery.probe_parents,
        };

        match build_git_stack(candidate, &ctx).await {
            Ok(stack) => return Ok(stack),
            Err(DiscoveryOutcome::NotGitBacked(reason)) => {
                debug!("Falling back to Files-On-Server => {}", reason);
            }
            Err(DiscoveryOutcome::DetectionFailed(e)) => {
                error!(
                    "Unable to build Git Stack for folder {}, falling back to Files-On-Server: {}",
                    candidate.path.display(),
                    e
                );
            }
            Err(e @ DiscoveryOutcome::BuildFailed(_)) => return Err(e),
        }

        build_file_stack(candidate, &self.dirs, &self.options)
            .await
            .map_err(DiscoveryOutcome::from)
    }

    async fn compose_projects(&self) -> Vec<ComposeCandidate> {
        let containers = self.containers.list_containers(COMPOSE_PROJECT_LABEL).await;
        if containers.is_empty() {
            return Vec::new();
        }
        consolidate_compose_stacks(&containers)
    }

    fn candidates_from_compose(
        &self,
        projects: &[ComposeCandidate],
    ) -> Result<Vec<StackCandidate>, ImportError> {
        info!("Compose Working Dir Glob: {}", self.discovery.compose_dir_glob);
        info!(
            "Compose Working Dir Ignore Glob: {}",
            self.discovery.compose_dir_ignore_glob.as_deref().unwrap_or("N/A")
        );

        let include = compile_glob(&self.discovery.compose_dir_glob)?;
        let exclude = self
            .discovery
            .compose_dir_ignore_glob
            .as_deref()
            .map(compile_glob)
            .transpose()?;

        let mut candidates = Vec::new();
        for project in projects {
            let name = &project.project_name;
            let working_dir = project.working_dir.to_string_lossy();

            let Some(mount_path) = self.dirs.from_host_path(&project.working_dir) else {
                warn!(
                    "Compose project '{}' working dir '{}' is not present in Host Dir, cannot use project",
                    name, working_dir
                );
                continue;
            };
            if !include.is_match(&project.working_dir) {
                debug!(
                    "Compose project '{}' working dir '{}' did not match glob",
                    name, working_dir
                );
                continue;
            }
            if exclude.as_ref().is_some_and(|g| g.is_match(&project.working_dir)) {
                debug!(
                    "Compose project '{}' working dir '{}' matches ignore glob, skipping",
                    name, working_dir
                );
                continue;
            }
            if KOMODO_INTERNAL_DIRS.is_match(&project.working_dir) {
                debug!(
                    "Compose project '{}' working dir '{}' is in known komodo directory, skipping",
                    name, working_dir
                );
                continue;
            }

            debug!(
                "Compose project '{}' is valid! Host Working Dir => {} | Mount Path => {}",
                name,
                working_dir,
                mount_path.display()
            );
            candidates.push(
                StackCandidate::new(mount_path, DiscoveredVia::Compose)
                    .with_compose(Some(compose_meta(project))),
            );
        }

        debug!("Got {} valid compose project directories", candidates.len());
        Ok(candidates)
    }

    async fn candidates_from_dirs(
        &self,
        projects: &[ComposeCandidate],
    ) -> Result<Vec<StackCandidate>, ImportError> {
        info!("Folder Glob: {}", self.discovery.folder_glob);
        info!(
            "Folder Ignore Glob: {}",
            self.discovery.folder_ignore_glob.as_deref().unwrap_or("N/A")
        );

        let folders = find_folders(
            &self.dirs.scan,
            &self.discovery.folder_glob,
            self.discovery.folder_ignore_glob.as_deref(),
        )
        .await?;
        debug!(
            "Got {} folders in {}: {}",
            folders.len(),
            self.dirs.scan.display(),
            folders.join(", ")
        );

        Ok(folders
            .into_iter()
            .map(|name| self.dirs.scan.join(name))
            .filter(|path| {
                let internal = KOMODO_INTERNAL_DIRS.is_match(path);
                if internal {
                    debug!("Folder {} is a known komodo directory, skipping", path.display());
                }
                !internal
            })
            .map(|path| {
                let compose = self.project_for(projects, &path).map(compose_meta);
                StackCandidate::new(path, DiscoveredVia::Folder).with_compose(compose)
            })
            .collect())
    }

    /// Live compose project whose working dir is `path`
    fn project_for<'p>(
        &self,
        projects: &'p [ComposeCandidate],
        path: &Path,
    ) -> Option<&'p ComposeCandidate> {
        projects
            .iter()
            .find(|p| self.dirs.from_host_path(&p.working_dir).as_deref() == Some(path))
    }
}

fn compose_meta(project: &ComposeCandidate) -> ComposeMeta {
    ComposeMeta {
        project_name: project.project_name.clone(),
        compose_files: project.relative_compose_files(),
    }
}
