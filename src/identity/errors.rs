use super::ProviderKind;

pub const POPUP_BLOCKED_MESSAGE: &str = "Popup was blocked. Please allow popups and try again.";
pub const CANCELLED_MESSAGE: &str = "Authentication was cancelled.";
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";
pub const GENERIC_AUTH_MESSAGE: &str = "Authentication failed. Please try again.";

/// Social login failures
///
/// None of these are fatal; the login modal shows [`AuthError::humanize`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("failed to load the {provider} SDK: {reason}")]
    ScriptLoad { provider: ProviderKind, reason: String },
    #[error("failed to initialize {0} authentication")]
    Initialization(ProviderKind),
    #[error("{0}")]
    Consent(String),
    #[error("invalid ID token: {0}")]
    InvalidToken(String),
    #[error("{0}")]
    Backend(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("{0} login is not configured")]
    NotConfigured(ProviderKind),
}

impl AuthError {
    /// User-facing text for this failure
    #[must_use]
    pub fn humanize(&self) -> &'static str {
        humanize_error_text(&self.to_string())
    }
}

/// Map raw vendor or adapter error text to a user-facing message
#[must_use]
pub fn humanize_error_text(text: &str) -> &'static str {
    if text.contains("popup_blocked") {
        POPUP_BLOCKED_MESSAGE
    } else if text.contains("cancelled") {
        CANCELLED_MESSAGE
    } else if text.contains("network") {
        NETWORK_MESSAGE
    } else {
        GENERIC_AUTH_MESSAGE
    }
}
