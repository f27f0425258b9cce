//! Social identity providers
//!
//! Vendor SDK state lives behind [`IdentityProvider`]. Google and Facebook
//! each load their script once, initialize with a configured application id,
//! and normalize a vendor grant into a `UserSession`.
//!
//! # Modules
//!
//! - [`traits`] - Provider trait, grants and outcomes
//! - [`sdk`] - One-time vendor script loading
//! - [`token`] - Google ID token payload decoding
//! - [`google`] - Google basic and backend-verified login
//! - [`facebook`] - Facebook login with a Graph profile read
//! - [`errors`] - `AuthError` and user-facing message mapping

pub mod errors;
pub mod facebook;
pub mod google;
pub mod sdk;
pub mod token;
pub mod traits;

pub use errors::{humanize_error_text, AuthError};
pub use facebook::{
    FacebookIdentity, FacebookPicture, FacebookPictureData, FacebookProfile, GraphClient,
    HttpGraphClient,
};
pub use google::GoogleIdentity;
pub use sdk::{HttpScriptFetcher, ScriptFetcher, SdkLoader};
pub use token::{decode_google_credential, GoogleProfile};
pub use traits::{AuthOutcome, FacebookAuthResponse, IdentityProvider, ProviderGrant, ProviderKind};

/// An application id that was never filled in
#[must_use]
pub fn is_placeholder_id(app_id: &str) -> bool {
    let trimmed = app_id.trim();
    trimmed.is_empty() || trimmed.contains("your-")
}

/// Warn about unconfigured provider ids
///
/// Returns `true` when both ids look real.
pub fn validate_environment(google_client_id: &str, facebook_app_id: &str) -> bool {
    let mut warnings = Vec::new();
    if is_placeholder_id(google_client_id) {
        warnings.push("Google Client ID not properly configured");
    }
    if is_placeholder_id(facebook_app_id) {
        warnings.push("Facebook App ID not properly configured");
    }

    for warning in &warnings {
        log::warn!("Social auth configuration: {warning}");
    }
    warnings.is_empty()
}
