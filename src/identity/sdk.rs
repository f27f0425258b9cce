//! Vendor SDK loading
//!
//! Each provider owns one [`SdkLoader`]. The script is fetched at most once per
//! loader; callers that arrive while a fetch is running wait for it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::{is_placeholder_id, AuthError, ProviderKind};

/// Fetches a vendor script body
#[async_trait]
pub trait ScriptFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the script cannot be downloaded
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpScriptFetcher {
    client: reqwest::Client,
}

impl HttpScriptFetcher {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScriptFetcher for HttpScriptFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("Fetching vendor script from: {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?
            .error_for_status()
            .with_context(|| format!("Script request to {url} was rejected"))?;
        response
            .text()
            .await
            .with_context(|| format!("Failed to read script body from {url}"))
    }
}

/// Confirms one vendor SDK is reachable and checks its application id
///
/// The browser loads and runs the vendor script itself. The server only
/// downloads it once to prove the URL serves a script, keeps the byte
/// length for logging and never executes or forwards the body.
pub struct SdkLoader {
    provider: ProviderKind,
    script_url: String,
    app_id: String,
    fetcher: Arc<dyn ScriptFetcher>,
    script: OnceCell<usize>,
}

impl SdkLoader {
    #[must_use]
    pub fn new(
        provider: ProviderKind,
        script_url: impl Into<String>,
        app_id: impl Into<String>,
        fetcher: Arc<dyn ScriptFetcher>,
    ) -> Self {
        Self {
            provider,
            script_url: script_url.into(),
            app_id: app_id.into(),
            fetcher,
            script: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.script.initialized()
    }

    /// Check the script is reachable once, then validate the application id
    ///
    /// A failed fetch is not cached; the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns `ScriptLoad` or `Initialization`
    pub async fn ensure_loaded(&self) -> Result<(), AuthError> {
        self.script
            .get_or_try_init(|| async {
                let body = self.fetcher.fetch(&self.script_url).await.map_err(|e| {
                    log::warn!("Failed to load {} SDK: {e:#}", self.provider);
                    AuthError::ScriptLoad {
                        provider: self.provider,
                        reason: format!("{e:#}"),
                    }
                })?;
                log::info!("Loaded {} SDK ({} bytes)", self.provider, body.len());
                Ok::<usize, AuthError>(body.len())
            })
            .await?;

        if is_placeholder_id(&self.app_id) {
            log::warn!("{} application id is missing or a placeholder", self.provider);
            return Err(AuthError::Initialization(self.provider));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SdkLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkLoader")
            .field("provider", &self.provider)
            .field("script_url", &self.script_url)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
