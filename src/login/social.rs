use std::sync::Arc;

use crate::identity::{AuthError, AuthOutcome, IdentityProvider, ProviderGrant, ProviderKind};

/// The configured social providers
///
/// Google may have two variants: the backend-verified one runs first and the
/// decode-only one is the fallback.
#[derive(Clone, Default)]
pub struct SocialProviders {
    pub google_verified: Option<Arc<dyn IdentityProvider>>,
    pub google_basic: Option<Arc<dyn IdentityProvider>>,
    pub facebook: Option<Arc<dyn IdentityProvider>>,
}

impl SocialProviders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_google_verified(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.google_verified = Some(provider);
        self
    }

    #[must_use]
    pub fn with_google_basic(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.google_basic = Some(provider);
        self
    }

    #[must_use]
    pub fn with_facebook(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.facebook = Some(provider);
        self
    }

    /// Load every configured SDK, logging failures
    pub async fn preload(&self) {
        for provider in [&self.google_verified, &self.google_basic, &self.facebook]
            .into_iter()
            .flatten()
        {
            if let Err(e) = provider.load().await {
                log::warn!("{} SDK not ready: {e}", provider.kind());
            }
        }
    }

    /// Authenticate `grant` with the provider for `kind`
    ///
    /// # Errors
    ///
    /// Returns the last provider's error, or `NotConfigured` when no provider
    /// for `kind` exists
    pub async fn authenticate(
        &self,
        kind: ProviderKind,
        grant: ProviderGrant,
    ) -> Result<AuthOutcome, AuthError> {
        match kind {
            ProviderKind::Google => self.authenticate_google(grant).await,
            ProviderKind::Facebook => match &self.facebook {
                Some(provider) => provider.authenticate(grant).await,
                None => Err(AuthError::NotConfigured(kind)),
            },
        }
    }

    async fn authenticate_google(&self, grant: ProviderGrant) -> Result<AuthOutcome, AuthError> {
        if let Some(verified) = &self.google_verified {
            match verified.authenticate(grant.clone()).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if self.google_basic.is_some() => {
                    log::warn!("Google verified login failed, falling back to token decode: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        match &self.google_basic {
            Some(basic) => basic.authenticate(grant).await,
            None => Err(AuthError::NotConfigured(ProviderKind::Google)),
        }
    }
}

impl std::fmt::Debug for SocialProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialProviders")
            .field("google_verified", &self.google_verified.is_some())
            .field("google_basic", &self.google_basic.is_some())
            .field("facebook", &self.facebook.is_some())
            .finish()
    }
}
