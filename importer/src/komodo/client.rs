//! Komodo read API client

use async_trait::async_trait;
use komodo_client::{ErrorResponse, GitProviderAccount, ReadRequest, RepoListItem};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::errors::ImportError;
use crate::komodo::address::normalize_web_address;
use crate::komodo::registry::KomodoRegistry;

/// Connection settings for the Komodo API
#[derive(Debug, Clone, Default)]
pub struct KomodoApiOptions {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<SecretString>,
}

impl KomodoApiOptions {
    /// Whether an API address was configured at all
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

/// HTTP client for the Komodo read API
pub struct KomodoClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: SecretString,
}

impl KomodoClient {
    /// Create a new client, failing if any connection setting is missing
    pub fn new(options: &KomodoApiOptions) -> Result<Self, ImportError> {
        let Some(url) = options.url.as_deref() else {
            return Err(ImportError::ConfigError(
                "Cannot use Komodo API because env KOMODO_URL is missing".to_string(),
            ));
        };
        let Some(api_key) = options.api_key.clone() else {
            return Err(ImportError::ConfigError(
                "Cannot use Komodo API because env API_KEY is missing".to_string(),
            ));
        };
        let Some(api_secret) = options.api_secret.clone() else {
            return Err(ImportError::ConfigError(
                "Cannot use Komodo API because env API_SECRET is missing".to_string(),
            ));
        };

        let url_data = normalize_web_address(url)?;
        debug!("KOMODO_URL: {} | Normalized: {}", url, url_data.normal);

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: url_data.normal,
            api_key,
            api_secret,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a parameterless `/read` request
    pub async fn read<T: DeserializeOwned>(&self, request: &str) -> Result<T, ImportError> {
        let url = format!("{}/read", self.base_url);
        debug!("POST {} ({})", url, request);

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .header("X-Api-Secret", self.api_secret.expose_secret())
            .json(&ReadRequest::without_params(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            error!("Komodo {} failed: {} - {}", request, status, message);
            return Err(ImportError::KomodoApiError(format!(
                "(HTTP {}) {}: {}",
                status.as_u16(),
                request,
                message
            )));
        }

        let body = response.json().await?;
        Ok(body)
    }
}

#[async_trait]
impl KomodoRegistry for KomodoClient {
    async fn list_repos(&self) -> Result<Vec<RepoListItem>, ImportError> {
        self.read("ListRepos").await
    }

    async fn list_git_provider_accounts(&self) -> Result<Vec<GitProviderAccount>, ImportError> {
        self.read("ListGitProviderAccounts").await
    }
}
