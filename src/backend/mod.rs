//! Storefront backend API
//!
//! Every endpoint answers with an [`ApiEnvelope`](crate::models::ApiEnvelope).
//! The application-level `status` in that envelope decides success, so
//! non-2xx bodies are parsed as envelopes too.
//!
//! # Modules
//!
//! - [`client`] - The `BackendClient` trait and its reqwest implementation

pub mod client;

pub use client::{BackendClient, HttpBackend};

pub const OTP_REQUEST_PATH: &str = "customer/auth/login";
pub const OTP_VERIFY_PATH: &str = "customer/auth/verify-otp";
pub const GOOGLE_LOGIN_PATH: &str = "customer/auth/google-login";
pub const CATEGORY_PRODUCTS_PATH: &str = "customer/product/category-product-list";

/// Backend transport errors
///
/// These never carry user-facing text; callers show a generic message.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("backend response could not be decoded: {0}")]
    Decode(String),
}
