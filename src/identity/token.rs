use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

use super::AuthError;
use crate::models::nullable_string;

/// Profile claims carried in a Google ID token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub picture: String,
}

/// Read the profile claims from an ID token without verifying its signature
///
/// # Errors
///
/// Returns `InvalidToken` if the token is not three dot-separated segments,
/// the payload is not base64, or the claims lack `sub`
pub fn decode_google_credential(token: &str) -> Result<GoogleProfile, AuthError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::InvalidToken("Invalid JWT format".to_string()));
    }

    let payload_b64 = parts[1];
    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .or_else(|_| general_purpose::URL_SAFE.decode(payload_b64))
        .or_else(|_| general_purpose::STANDARD.decode(payload_b64))
        .map_err(|_| AuthError::InvalidToken("Base64 decode failed".to_string()))?;

    serde_json::from_slice(&payload_bytes)
        .map_err(|e| AuthError::InvalidToken(format!("Unreadable claims: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(payload: &str) -> String {
        format!(
            "eyJhbGciOiJSUzI1NiJ9.{}.signature",
            general_purpose::URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_decodes_profile_claims() {
        let token = token_with(
            r#"{"sub":"1234567890","name":"Google User","email":"google@example.com","picture":"https://lh3.example/p.png"}"#,
        );
        let profile = decode_google_credential(&token).unwrap();
        assert_eq!(profile.sub, "1234567890");
        assert_eq!(profile.name, "Google User");
        assert_eq!(profile.picture, "https://lh3.example/p.png");
    }

    #[test]
    fn test_missing_picture_defaults_to_empty() {
        let token = token_with(r#"{"sub":"1","name":null,"email":"a@b.co"}"#);
        let profile = decode_google_credential(&token).unwrap();
        assert_eq!(profile.name, "");
        assert_eq!(profile.picture, "");
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert!(matches!(
            decode_google_credential("only.two"),
            Err(AuthError::InvalidToken(_))
        ));
        assert!(matches!(
            decode_google_credential("a.!!!.c"),
            Err(AuthError::InvalidToken(_))
        ));
        assert!(matches!(
            decode_google_credential(&token_with(r#"{"name":"No Sub"}"#)),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
