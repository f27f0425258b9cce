//! Client-held identity records
//!
//! `UserSession` keeps the exact JSON layout the storefront persists under
//! `LennyUserDetail`, so backend payloads and locally built sessions share
//! one type. Unknown backend keys survive a round trip through `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::nullable_string;

/// How a session was established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Google,
    Facebook,
    Email,
    Mobile,
}

impl AuthMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
            Self::Email => "email",
            Self::Mobile => "mobile",
        }
    }
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity method reported to the checkout collaborator
///
/// `ExistingUser` is used when a stored session carries no `authMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    Google,
    Facebook,
    Email,
    Mobile,
    ExistingUser,
}

impl From<AuthMethod> for LoginMethod {
    fn from(method: AuthMethod) -> Self {
        match method {
            AuthMethod::Google => Self::Google,
            AuthMethod::Facebook => Self::Facebook,
            AuthMethod::Email => Self::Email,
            AuthMethod::Mobile => Self::Mobile,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub photo: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub gender: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub dob: String,
}

impl PersonalInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = photo.into();
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfileData {
    pub personal_info: PersonalInfo,
    pub addresses: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<AuthMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The session record for the current visit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub data: UserProfileData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserSession {
    /// Build a session whose `_id` and `userId` are both `{method}_{provider_id}`
    #[must_use]
    pub fn new(method: AuthMethod, provider_id: &str, personal_info: PersonalInfo) -> Self {
        let id = format!("{method}_{provider_id}");
        Self {
            id: id.clone(),
            user_id: id,
            data: UserProfileData {
                personal_info,
                addresses: Vec::new(),
                auth_method: Some(method),
                google_id: (method == AuthMethod::Google).then(|| provider_id.to_string()),
                facebook_id: (method == AuthMethod::Facebook).then(|| provider_id.to_string()),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// Parse a backend user payload, tolerating missing and null fields
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a JSON object
    pub fn from_backend(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[must_use]
    pub fn auth_method(&self) -> Option<AuthMethod> {
        self.data.auth_method
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.data.personal_info.phone
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.data.personal_info.email
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.data.personal_info.name
    }
}

/// Payload of the login success callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub method: AuthMethod,
    pub user_data: UserSession,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl LoginData {
    #[must_use]
    pub fn new(method: AuthMethod, user_data: UserSession) -> Self {
        Self {
            method,
            user_data,
            is_new_user: false,
            mobile_number: None,
            email: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_session_uses_provider_prefixed_ids() {
        let session = UserSession::new(
            AuthMethod::Google,
            "1234567890",
            PersonalInfo::new("Google User", "google@example.com"),
        );

        assert_eq!(session.id, "google_1234567890");
        assert_eq!(session.user_id, "google_1234567890");
        assert_eq!(session.data.google_id.as_deref(), Some("1234567890"));
        assert!(session.data.facebook_id.is_none());
        assert_eq!(session.auth_method(), Some(AuthMethod::Google));
    }

    #[test]
    fn test_session_serializes_storefront_layout() {
        let session = UserSession::new(
            AuthMethod::Facebook,
            "42",
            PersonalInfo::new("Face Book", "fb@example.com"),
        );
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["_id"], "facebook_42");
        assert_eq!(value["userId"], "facebook_42");
        assert_eq!(value["data"]["authMethod"], "facebook");
        assert_eq!(value["data"]["facebookId"], "42");
        assert_eq!(value["data"]["personalInfo"]["name"], "Face Book");
        assert_eq!(value["data"]["addresses"], json!([]));
        assert!(value["data"].get("googleId").is_none());
    }

    #[test]
    fn test_backend_payload_with_nulls_and_extra_fields() {
        let payload = json!({
            "_id": "65f0c1",
            "userId": "CUST-17",
            "token": "opaque",
            "data": {
                "personalInfo": { "name": "Asha", "email": null, "phone": "9876543210" },
                "wallet": 120
            }
        });

        let session = UserSession::from_backend(payload).unwrap();
        assert_eq!(session.id, "65f0c1");
        assert_eq!(session.email(), "");
        assert_eq!(session.phone(), "9876543210");
        assert!(session.auth_method().is_none());
        assert_eq!(session.extra["token"], "opaque");
        assert_eq!(session.data.extra["wallet"], 120);
    }
}
