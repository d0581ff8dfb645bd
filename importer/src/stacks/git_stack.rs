//! Stacks backed by a git repository

use std::path::Path;

use tracing::{debug, info};

use crate::app::options::StackOptions;
use crate::errors::{DiscoveryOutcome, GitDetectError};
use crate::git::{detect_git_repo, find_enclosing_repo, remote_repo_from_url, GitRepoInfo};
use crate::komodo::{match_git_data, CachedRegistry, ProviderMatch};
use crate::stacks::models::{RepoRef, StackCandidate, StackConfig, TomlStack};
use crate::stacks::select::{
    parse_env_config, select_compose_files, without_komodo_default, EnvOptions,
};

const DEFAULT_PROVIDER_DOMAIN: &str = "github.com";

/// Shared inputs for git stack builds
#[derive(Clone, Copy)]
pub struct GitStackContext<'a> {
    pub options: &'a StackOptions,
    pub registry: Option<&'a CachedRegistry>,
    /// Look for an enclosing repository when the folder is not one itself
    pub probe_parents: bool,
}

/// A repository and where the candidate sits inside it
struct LocatedRepo {
    info: GitRepoInfo,
    /// Candidate path relative to the repository root, `None` at the root
    run_directory: Option<String>,
}

/// Build a stack that Komodo clones from the candidate's git remote.
///
/// Folders without a usable repository yield
/// [`DiscoveryOutcome::NotGitBacked`] so the caller can fall back to a
/// Files-On-Server stack.
pub async fn build_git_stack(
    candidate: &StackCandidate,
    ctx: &GitStackContext<'_>,
) -> Result<TomlStack, DiscoveryOutcome> {
    let located = locate_repo(&candidate.path, ctx.probe_parents).await?;
    let git = &located.info;
    info!(
        "Found git Stack '{}' tracking {}/{} at {}",
        candidate.name,
        git.remote.remote,
        git.remote_branch(),
        git.remote.url
    );

    let repo = repo_ref(ctx.registry, git).await?;

    let options = ctx.options;
    let mut config = StackConfig::from_options(options);
    config.repo = Some(repo);
    config.run_directory = located.run_directory.clone();
    config.project_name = candidate.project_name();

    config.file_paths = match candidate.compose.as_ref() {
        Some(meta) if !meta.compose_files.is_empty() => {
            without_komodo_default(meta.compose_files.clone())
        }
        _ => select_compose_files(&options.compose_file_glob, &candidate.path)?,
    };

    let env = parse_env_config(
        &candidate.path,
        &EnvOptions {
            env_file_glob: &options.env_file_glob,
            write_env: options.write_env.git,
            komodo_env_name: &options.komodo_env_name,
            path_prefix: located.run_directory.as_deref(),
        },
    )
    .await?;
    config.env_file_path = env.env_file_path;
    config.additional_env_files = env.additional_env_files;
    config.environment = env.environment;

    info!("Stack config complete");
    Ok(TomlStack {
        name: candidate.name.clone(),
        config,
    })
}

async fn locate_repo(path: &Path, probe_parents: bool) -> Result<LocatedRepo, DiscoveryOutcome> {
    match detect_git_repo(path).await {
        Ok(info) => Ok(LocatedRepo {
            info,
            run_directory: None,
        }),
        Err(GitDetectError::NotAGitRepo) if probe_parents => {
            let Some(root) = find_enclosing_repo(path).await else {
                return Err(DiscoveryOutcome::NotGitBacked(
                    "No .git folder found in folder or any parent".to_string(),
                ));
            };
            debug!("Folder is inside repository at {}", root.display());
            let info = detect_git_repo(&root).await?;
            Ok(LocatedRepo {
                info,
                run_directory: relative_run_directory(&root, path),
            })
        }
        Err(e) => Err(e.into()),
    }
}

fn relative_run_directory(root: &Path, path: &Path) -> Option<String> {
    let joined = path
        .strip_prefix(root)
        .ok()?
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    (!joined.is_empty()).then_some(joined)
}

async fn repo_ref(
    registry: Option<&CachedRegistry>,
    git: &GitRepoInfo,
) -> Result<RepoRef, DiscoveryOutcome> {
    let matched = match_git_data(registry, git).await?;

    if let Some(linked) = matched.linked_repo {
        info!("Linking to existing Komodo Repo '{}'", linked.name);
        return Ok(RepoRef::Linked {
            linked_repo: linked.name,
        });
    }
    if let Some(hint) = matched.hint.as_deref() {
        info!("Using standalone repo: {}", hint);
    }

    let Some(remote) = remote_repo_from_url(&git.remote.url) else {
        return Err(DiscoveryOutcome::NotGitBacked(format!(
            "Could not determine provider and repository from remote URL {}",
            git.remote.url
        )));
    };

    let git_account = match &matched.provider {
        ProviderMatch::Account(account) if !account.username.is_empty() => {
            Some(account.username.clone())
        }
        _ => None,
    };
    let git_provider = (!remote.domain.eq_ignore_ascii_case(DEFAULT_PROVIDER_DOMAIN))
        .then(|| remote.domain.clone());

    Ok(RepoRef::Standalone {
        git_provider,
        git_account,
        git_https: (!remote.https).then_some(false),
        repo: remote.repo,
        branch: git.remote_branch().to_string(),
    })
}
