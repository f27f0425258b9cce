use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::sdk::SdkLoader;
use super::{AuthError, AuthOutcome, IdentityProvider, ProviderGrant, ProviderKind};
use crate::models::{nullable_string, AuthMethod, PersonalInfo, UserSession};

const FACEBOOK_SUCCESS_MESSAGE: &str = "Facebook login successful";
const FACEBOOK_CANCELLED_MESSAGE: &str = "Facebook login cancelled or failed";
const PROFILE_FIELDS: &str = "name,email,picture.type(large)";

/// `/me` response from the Graph API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FacebookProfile {
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub email: String,
    #[serde(default)]
    pub picture: Option<FacebookPicture>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FacebookPicture {
    #[serde(default)]
    pub data: FacebookPictureData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FacebookPictureData {
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
}

impl FacebookProfile {
    #[must_use]
    pub fn photo_url(&self) -> &str {
        self.picture.as_ref().map_or("", |picture| picture.data.url.as_str())
    }
}

/// Graph API profile reads
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the Graph request fails or the body is unreadable
    async fn profile(&self, access_token: &str) -> Result<FacebookProfile>;
}

#[derive(Debug, Clone)]
pub struct HttpGraphClient {
    client: reqwest::Client,
    api_base: String,
}

impl HttpGraphClient {
    /// `api_base` includes the version, e.g. `https://graph.facebook.com/v18.0`
    #[must_use]
    pub fn new(client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GraphClient for HttpGraphClient {
    async fn profile(&self, access_token: &str) -> Result<FacebookProfile> {
        let url = format!("{}/me", self.api_base);
        self.client
            .get(&url)
            .query(&[("fields", PROFILE_FIELDS), ("access_token", access_token)])
            .send()
            .await
            .context("Graph profile request failed")?
            .error_for_status()
            .context("Graph profile request was rejected")?
            .json::<FacebookProfile>()
            .await
            .context("Graph profile response was unreadable")
    }
}

/// Facebook JS SDK login followed by a Graph profile read
pub struct FacebookIdentity {
    loader: SdkLoader,
    graph: Arc<dyn GraphClient>,
}

impl FacebookIdentity {
    #[must_use]
    pub fn new(loader: SdkLoader, graph: Arc<dyn GraphClient>) -> Self {
        Self { loader, graph }
    }
}

#[async_trait]
impl IdentityProvider for FacebookIdentity {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Facebook
    }

    async fn load(&self) -> Result<(), AuthError> {
        self.loader.ensure_loaded().await
    }

    async fn authenticate(&self, grant: ProviderGrant) -> Result<AuthOutcome, AuthError> {
        self.load().await?;

        let auth_response = match grant {
            ProviderGrant::Facebook {
                auth_response: Some(auth_response),
            } => auth_response,
            ProviderGrant::Facebook {
                auth_response: None,
            } => return Err(AuthError::Consent(FACEBOOK_CANCELLED_MESSAGE.to_string())),
            ProviderGrant::Failed { error } => return Err(AuthError::Consent(error)),
            ProviderGrant::Google { .. } => {
                return Err(AuthError::InvalidToken(
                    "expected a Facebook authorization response".to_string(),
                ))
            }
        };

        let profile = self
            .graph
            .profile(&auth_response.access_token)
            .await
            .map_err(|e| {
                log::warn!("Facebook profile read failed: {e:#}");
                AuthError::Network(format!("{e:#}"))
            })?;

        let personal_info =
            PersonalInfo::new(profile.name.clone(), profile.email.clone()).with_photo(profile.photo_url());

        Ok(AuthOutcome {
            user: UserSession::new(AuthMethod::Facebook, &auth_response.user_id, personal_info),
            message: FACEBOOK_SUCCESS_MESSAGE.to_string(),
            is_new_user: false,
            token: None,
        })
    }
}

impl std::fmt::Debug for FacebookIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacebookIdentity")
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_photo_url_is_optional() {
        let with_photo: FacebookProfile = serde_json::from_str(
            r#"{"name":"Face Book","picture":{"data":{"url":"https://fb.example/p.jpg"}}}"#,
        )
        .unwrap();
        assert_eq!(with_photo.photo_url(), "https://fb.example/p.jpg");
        assert_eq!(with_photo.email, "");

        let without: FacebookProfile = serde_json::from_str(r#"{"name":"Face Book"}"#).unwrap();
        assert_eq!(without.photo_url(), "");
    }
}
