//! Cross-referencing a detected git remote with known Komodo resources

use komodo_client::{GitProviderAccount, RepoListItem};
use tracing::debug;

use crate::errors::ImportError;
use crate::git::GitRepoInfo;
use crate::komodo::registry::CachedRegistry;

const DEFAULT_PROVIDER_DOMAIN: &str = "github.com";

/// How the remote's git provider is known to Komodo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderMatch {
    /// A registered provider account whose domain appears in the remote
    Account(GitProviderAccount),
    /// github.com, which Komodo handles without a registered account
    DefaultGithub,
    /// No account matches, stack is built as a standalone repo without one
    Unregistered,
}

/// Result of matching a remote against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryMatch {
    pub provider: ProviderMatch,
    pub linked_repo: Option<RepoListItem>,
    /// Why no linked repo was found
    pub hint: Option<String>,
}

/// Match a detected repository against known Repo resources and provider
/// accounts.
///
/// Without a registry no repo can be linked and the provider is judged by
/// the remote URL alone.
pub async fn match_git_data(
    registry: Option<&CachedRegistry>,
    git: &GitRepoInfo,
) -> Result<RegistryMatch, ImportError> {
    let url = git.remote.url.to_lowercase();

    let Some(registry) = registry else {
        return Ok(RegistryMatch {
            provider: fallback_provider(&url),
            linked_repo: None,
            hint: Some(
                "Komodo API is not configured so Repo resources cannot be linked".to_string(),
            ),
        });
    };

    let (linked_repo, hint) = match_repo(registry.repos().await?, &url, git.remote_branch());
    let provider = registry
        .git_providers()
        .await?
        .iter()
        .find(|p| !p.domain.is_empty() && url.contains(&p.domain.to_lowercase()))
        .cloned()
        .map(ProviderMatch::Account)
        .unwrap_or_else(|| fallback_provider(&url));

    if provider == ProviderMatch::Unregistered {
        debug!(
            "No Komodo Git Provider account matches remote {}, using standalone repo without provider account",
            git.remote.url
        );
    }

    Ok(RegistryMatch {
        provider,
        linked_repo,
        hint,
    })
}

fn match_repo(
    repos: &[RepoListItem],
    url: &str,
    remote_branch: &str,
) -> (Option<RepoListItem>, Option<String>) {
    let candidates: Vec<&RepoListItem> = repos
        .iter()
        .filter(|r| !r.info.repo.is_empty() && !r.info.git_provider.is_empty())
        .filter(|r| {
            url.contains(&r.info.repo.to_lowercase())
                && url.contains(&r.info.git_provider.to_lowercase())
        })
        .collect();

    if candidates.is_empty() {
        return (
            None,
            Some("No existing Komodo Repo resource matches the remote".to_string()),
        );
    }

    match candidates
        .into_iter()
        .find(|r| r.info.branch.eq_ignore_ascii_case(remote_branch))
    {
        Some(repo) => (Some(repo.clone()), None),
        None => (
            None,
            Some(
                "There are existing Komodo Repo resources that match the remote but none have a matching branch"
                    .to_string(),
            ),
        ),
    }
}

fn fallback_provider(url: &str) -> ProviderMatch {
    if url.contains(DEFAULT_PROVIDER_DOMAIN) {
        ProviderMatch::DefaultGithub
    } else {
        ProviderMatch::Unregistered
    }
}
