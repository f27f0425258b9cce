use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope shared by every backend endpoint
///
/// `status` is the application-level code and may differ from the HTTP status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "isNewUser", default, skip_serializing_if = "Option::is_none")]
    pub is_new_user: Option<bool>,
}

impl ApiEnvelope {
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>, data: Value) -> Self {
        Self {
            status,
            message: Some(message.into()),
            data,
            token: None,
            is_new_user: None,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == 200
    }

    /// The backend message, or `fallback` when it is absent or blank
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}
