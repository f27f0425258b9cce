use async_trait::async_trait;
use std::sync::Arc;

use super::sdk::SdkLoader;
use super::token::decode_google_credential;
use super::{AuthError, AuthOutcome, IdentityProvider, ProviderGrant, ProviderKind};
use crate::backend::BackendClient;
use crate::models::{AuthMethod, PersonalInfo, UserSession};

const GOOGLE_SUCCESS_MESSAGE: &str = "Google login successful";
const BACKEND_REJECTED_MESSAGE: &str = "Backend authentication failed";

/// Google Identity Services login
///
/// The `basic` variant reads the profile straight from the ID token. The
/// `verified` variant hands the token to the backend and uses the user it
/// returns.
pub struct GoogleIdentity {
    loader: SdkLoader,
    backend: Option<Arc<dyn BackendClient>>,
}

impl GoogleIdentity {
    #[must_use]
    pub fn basic(loader: SdkLoader) -> Self {
        Self {
            loader,
            backend: None,
        }
    }

    #[must_use]
    pub fn verified(loader: SdkLoader, backend: Arc<dyn BackendClient>) -> Self {
        Self {
            loader,
            backend: Some(backend),
        }
    }

    #[must_use]
    pub fn is_backend_verified(&self) -> bool {
        self.backend.is_some()
    }

    fn decode_locally(credential: &str) -> Result<AuthOutcome, AuthError> {
        let profile = decode_google_credential(credential)?;
        let personal_info = PersonalInfo::new(profile.name, profile.email).with_photo(profile.picture);
        Ok(AuthOutcome {
            user: UserSession::new(AuthMethod::Google, &profile.sub, personal_info),
            message: GOOGLE_SUCCESS_MESSAGE.to_string(),
            is_new_user: false,
            token: None,
        })
    }

    async fn verify_with_backend(
        backend: &dyn BackendClient,
        credential: &str,
    ) -> Result<AuthOutcome, AuthError> {
        let envelope = backend.verify_google_token(credential).await.map_err(|e| {
            log::error!("Google token verification request failed: {e}");
            AuthError::Network(e.to_string())
        })?;

        if !envelope.is_success() {
            return Err(AuthError::Backend(envelope.message_or(BACKEND_REJECTED_MESSAGE)));
        }

        let message = envelope.message_or(GOOGLE_SUCCESS_MESSAGE);
        let user = UserSession::from_backend(envelope.data).map_err(|e| {
            log::error!("Backend returned an unreadable Google user: {e}");
            AuthError::Backend(BACKEND_REJECTED_MESSAGE.to_string())
        })?;

        Ok(AuthOutcome {
            user,
            message,
            is_new_user: envelope.is_new_user.unwrap_or(false),
            token: envelope.token,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn load(&self) -> Result<(), AuthError> {
        self.loader.ensure_loaded().await
    }

    async fn authenticate(&self, grant: ProviderGrant) -> Result<AuthOutcome, AuthError> {
        self.load().await?;

        let credential = match grant {
            ProviderGrant::Google { credential } => credential,
            ProviderGrant::Failed { error } => return Err(AuthError::Consent(error)),
            ProviderGrant::Facebook { .. } => {
                return Err(AuthError::InvalidToken(
                    "expected a Google credential".to_string(),
                ))
            }
        };

        match &self.backend {
            Some(backend) => Self::verify_with_backend(backend.as_ref(), &credential).await,
            None => Self::decode_locally(&credential),
        }
    }
}

impl std::fmt::Debug for GoogleIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleIdentity")
            .field("loader", &self.loader)
            .field("backend_verified", &self.is_backend_verified())
            .finish()
    }
}
