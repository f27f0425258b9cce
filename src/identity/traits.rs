//! Identity provider abstractions
//!
//! The browser runs the vendor popup and relays its result as a
//! [`ProviderGrant`]. Providers turn a grant into a normalized
//! [`UserSession`] without knowing anything about session storage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::AuthError;
use crate::models::UserSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Facebook,
}

impl ProviderKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            other => Err(format!("Unknown identity provider: {other}")),
        }
    }
}

/// Facebook `authResponse` from `FB.login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacebookAuthResponse {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// What the vendor popup produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderGrant {
    /// Google Identity Services credential (an ID token)
    Google { credential: String },
    /// `None` when the user closed the dialog or denied consent
    Facebook { auth_response: Option<FacebookAuthResponse> },
    /// The vendor's own error text, e.g. `popup_blocked`
    Failed { error: String },
}

/// A successful provider login
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub user: UserSession,
    pub message: String,
    pub is_new_user: bool,
    pub token: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Load and initialize the vendor SDK
    ///
    /// Repeated and concurrent calls share one script load.
    ///
    /// # Errors
    ///
    /// Returns `ScriptLoad` when the script cannot be fetched and
    /// `Initialization` when the application id is missing or a placeholder
    async fn load(&self) -> Result<(), AuthError>;

    /// Turn a vendor grant into a storefront user
    ///
    /// # Errors
    ///
    /// Returns an error for failed grants, undecodable tokens, backend
    /// rejections and transport failures
    async fn authenticate(&self, grant: ProviderGrant) -> Result<AuthOutcome, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("google".parse::<ProviderKind>(), Ok(ProviderKind::Google));
        assert_eq!("Facebook".parse::<ProviderKind>(), Ok(ProviderKind::Facebook));
        assert!("apple".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_facebook_auth_response_field_names() {
        let response: FacebookAuthResponse =
            serde_json::from_str(r#"{"userID":"42","accessToken":"EAAB"}"#).unwrap();
        assert_eq!(response.user_id, "42");
        assert_eq!(response.access_token, "EAAB");
    }
}
