//! Known Repo resources and git provider accounts

use std::sync::Arc;

use async_trait::async_trait;
use komodo_client::{GitProviderAccount, RepoListItem};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::errors::ImportError;
use crate::komodo::client::{KomodoApiOptions, KomodoClient};

/// Source of Repo resources and git provider accounts
#[async_trait]
pub trait KomodoRegistry: Send + Sync {
    async fn list_repos(&self) -> Result<Vec<RepoListItem>, ImportError>;

    async fn list_git_provider_accounts(&self) -> Result<Vec<GitProviderAccount>, ImportError>;
}

/// Builds the HTTP client on first use, so runs that never look up a git
/// remote never touch the API
pub struct LazyKomodo {
    options: KomodoApiOptions,
    client: OnceCell<KomodoClient>,
}

impl LazyKomodo {
    pub fn new(options: KomodoApiOptions) -> Self {
        Self {
            options,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&KomodoClient, ImportError> {
        self.client
            .get_or_try_init(|| async { KomodoClient::new(&self.options) })
            .await
    }
}

#[async_trait]
impl KomodoRegistry for LazyKomodo {
    async fn list_repos(&self) -> Result<Vec<RepoListItem>, ImportError> {
        self.client().await?.list_repos().await
    }

    async fn list_git_provider_accounts(&self) -> Result<Vec<GitProviderAccount>, ImportError> {
        self.client().await?.list_git_provider_accounts().await
    }
}

/// Fetches each list once and serves it for the rest of the run
pub struct CachedRegistry {
    inner: Arc<dyn KomodoRegistry>,
    repos: OnceCell<Vec<RepoListItem>>,
    providers: OnceCell<Vec<GitProviderAccount>>,
}

impl CachedRegistry {
    pub fn new(inner: Arc<dyn KomodoRegistry>) -> Self {
        Self {
            inner,
            repos: OnceCell::new(),
            providers: OnceCell::new(),
        }
    }

    /// Registry backed by the Komodo API described by `options`
    pub fn from_options(options: KomodoApiOptions) -> Self {
        Self::new(Arc::new(LazyKomodo::new(options)))
    }

    pub async fn repos(&self) -> Result<&[RepoListItem], ImportError> {
        let repos = self
            .repos
            .get_or_try_init(|| async {
                let repos = self.inner.list_repos().await?;
                debug!("Fetched {} Komodo Repos", repos.len());
                Ok::<_, ImportError>(repos)
            })
            .await?;
        Ok(repos.as_slice())
    }

    pub async fn git_providers(&self) -> Result<&[GitProviderAccount], ImportError> {
        let providers = self
            .providers
            .get_or_try_init(|| async {
                let providers = self.inner.list_git_provider_accounts().await?;
                debug!("Fetched {} Komodo Git Provider accounts", providers.len());
                Ok::<_, ImportError>(providers)
            })
            .await?;
        Ok(providers.as_slice())
    }
}
