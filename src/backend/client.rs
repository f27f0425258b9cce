use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use url::Url;

use super::{
    BackendError, CATEGORY_PRODUCTS_PATH, GOOGLE_LOGIN_PATH, OTP_REQUEST_PATH, OTP_VERIFY_PATH,
};
use crate::models::{ApiEnvelope, ProductQuery};

/// Typed access to the storefront backend
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Ask the backend to send a one-time code to `phone`
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body is not an envelope
    async fn request_otp(&self, phone: &str) -> Result<ApiEnvelope, BackendError>;

    /// Check a one-time code; `otp` is sent as a JSON number
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body is not an envelope
    async fn verify_otp(&self, phone: &str, otp: u32) -> Result<ApiEnvelope, BackendError>;

    /// Exchange a Google ID token for a storefront user
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body is not an envelope
    async fn verify_google_token(&self, id_token: &str) -> Result<ApiEnvelope, BackendError>;

    /// Products for a category and filter set
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body is not an envelope
    async fn category_products(&self, query: &ProductQuery) -> Result<ApiEnvelope, BackendError>;
}

/// reqwest-backed client rooted at `backend.base_url`
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, BackendError> {
        // Relative joins drop the last path segment unless it ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Self {
            client,
            base_url: Url::parse(&normalized)?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiEnvelope, BackendError> {
        let url = self.base_url.join(path)?;
        log::debug!("POST {url}");

        let response = self.client.post(url.clone()).json(body).send().await?;
        let http_status = response.status();
        let bytes = response.bytes().await?;

        let mut envelope: ApiEnvelope = serde_json::from_slice(&bytes).map_err(|e| {
            log::error!("Backend returned a non-envelope body from {url} (HTTP {http_status}): {e}");
            BackendError::Decode(e.to_string())
        })?;

        if envelope.status == 0 {
            envelope.status = http_status.as_u16();
        }
        if !http_status.is_success() {
            log::warn!(
                "Backend answered {url} with HTTP {http_status}, envelope status {}",
                envelope.status
            );
        }
        Ok(envelope)
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn request_otp(&self, phone: &str) -> Result<ApiEnvelope, BackendError> {
        self.post(OTP_REQUEST_PATH, &json!({ "phone": phone })).await
    }

    async fn verify_otp(&self, phone: &str, otp: u32) -> Result<ApiEnvelope, BackendError> {
        self.post(OTP_VERIFY_PATH, &json!({ "phone": phone, "otp": otp }))
            .await
    }

    async fn verify_google_token(&self, id_token: &str) -> Result<ApiEnvelope, BackendError> {
        self.post(GOOGLE_LOGIN_PATH, &json!({ "googleToken": id_token }))
            .await
    }

    async fn category_products(&self, query: &ProductQuery) -> Result<ApiEnvelope, BackendError> {
        self.post(CATEGORY_PRODUCTS_PATH, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let backend = HttpBackend::new("https://api.example.com/v1").unwrap();
        assert_eq!(backend.base_url().as_str(), "https://api.example.com/v1/");
        assert_eq!(
            backend.base_url().join(OTP_VERIFY_PATH).unwrap().as_str(),
            "https://api.example.com/v1/customer/auth/verify-otp"
        );
    }

    #[test]
    fn test_relative_base_url_is_rejected() {
        assert!(matches!(
            HttpBackend::new("not a url"),
            Err(BackendError::Url(_))
        ));
    }
}
