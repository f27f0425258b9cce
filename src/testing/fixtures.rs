//! Test fixtures providing pre-built test objects

use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use super::constants::{
    TEST_EMAIL, TEST_FACEBOOK_APP_ID, TEST_GOOGLE_CLIENT_ID, TEST_PHONE, TEST_USER_NAME,
};
use super::mock::{MockBackend, MockGraphClient, MockReply, MockScriptFetcher, RecordingSink};
use crate::backend::BackendClient;
use crate::booking::BookingFlow;
use crate::handlers::state::build_social_providers;
use crate::handlers::AppState;
use crate::login::{LocalUserRegistry, LoginModal, LoginOptions, LoginServices, SocialProviders};
use crate::models::{AuthMethod, PersonalInfo, PriceDetails, Product, UserSession};
use crate::session::{MemoryStore, SessionManager};
use crate::settings::StorefrontSettings;

/// Collaborators behind a fixture-built login or booking
pub struct TestHarness {
    pub backend: Arc<MockBackend>,
    pub fetcher: Arc<MockScriptFetcher>,
    pub graph: Arc<MockGraphClient>,
    pub sink: Arc<RecordingSink>,
    pub session: Arc<SessionManager>,
}

impl TestHarness {
    #[must_use]
    pub fn new(backend: MockBackend) -> Self {
        Self {
            backend: Arc::new(backend),
            fetcher: Arc::new(MockScriptFetcher::new()),
            graph: Arc::new(MockGraphClient::returning(
                "Facebook User",
                "fb@example.com",
                "https://graph.example/picture.jpg",
            )),
            sink: Arc::new(RecordingSink::new()),
            session: TestFixtures::session_manager(),
        }
    }

    /// Providers built the same way production wires them, over the mocks
    #[must_use]
    pub fn social(&self) -> Arc<SocialProviders> {
        let backend: Arc<dyn BackendClient> = self.backend.clone();
        Arc::new(build_social_providers(
            &TestFixtures::settings(),
            self.fetcher.clone(),
            self.graph.clone(),
            &backend,
        ))
    }

    #[must_use]
    pub fn services(&self) -> LoginServices {
        LoginServices {
            backend: self.backend.clone(),
            registry: Arc::new(LocalUserRegistry::new(Arc::new(MemoryStore::new()))),
            social: self.social(),
        }
    }

    #[must_use]
    pub fn login_modal(&self) -> LoginModal {
        LoginModal::new(
            Arc::clone(&self.session),
            self.services(),
            TestFixtures::login_options(),
        )
    }

    #[must_use]
    pub fn booking_flow(&self) -> BookingFlow {
        BookingFlow::new(Arc::clone(&self.session), self.login_modal(), self.sink.clone())
    }

    /// An `AppState` over the same mocks, with an in-memory registry
    #[must_use]
    pub fn app_state(&self) -> AppState {
        self.app_state_with(TestFixtures::settings())
    }

    #[must_use]
    pub fn app_state_with(&self, settings: StorefrontSettings) -> AppState {
        let services = self.services();
        AppState::new(
            settings,
            services.backend,
            services.registry,
            services.social,
            self.sink.clone(),
        )
    }
}

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Settings with real-looking provider ids and insecure cookies
    #[must_use]
    pub fn settings() -> StorefrontSettings {
        let mut settings = StorefrontSettings::default();
        settings.backend.base_url = "http://backend.test/api/v1/".to_string();
        settings.identity.google_client_id = Some(TEST_GOOGLE_CLIENT_ID.to_string());
        settings.identity.facebook_app_id = Some(TEST_FACEBOOK_APP_ID.to_string());
        settings.cookies.secure = false;
        settings.catalog.price_debounce_ms = 300;
        settings
    }

    #[must_use]
    pub fn login_options() -> LoginOptions {
        LoginOptions {
            countdown_seconds: 60,
            auto_submit_delay: Duration::from_millis(100),
        }
    }

    #[must_use]
    pub fn session_manager() -> Arc<SessionManager> {
        Arc::new(SessionManager::new(Arc::new(MemoryStore::new())))
    }

    /// A session as the backend returns it after an OTP login
    #[must_use]
    pub fn mobile_user(phone: &str) -> UserSession {
        UserSession::from_backend(Self::mobile_user_json(phone)).unwrap_or_else(|_| {
            UserSession::new(
                AuthMethod::Mobile,
                phone,
                PersonalInfo::new(TEST_USER_NAME, TEST_EMAIL).with_phone(phone),
            )
        })
    }

    #[must_use]
    pub fn mobile_user_json(phone: &str) -> Value {
        json!({
            "_id": format!("6650{phone}"),
            "userId": format!("6650{phone}"),
            "data": {
                "personalInfo": {
                    "name": TEST_USER_NAME,
                    "email": null,
                    "photo": null,
                    "phone": phone,
                    "gender": null,
                    "dob": null
                },
                "addresses": [],
                "authMethod": "mobile"
            },
            "loyaltyPoints": 120
        })
    }

    /// verify-otp answer for an existing account
    #[must_use]
    pub fn otp_login_reply(phone: &str) -> MockReply {
        MockReply::with_data(200, "OTP verified. Login successful.", Self::mobile_user_json(phone))
    }

    /// verify-otp answer for a phone without an account
    #[must_use]
    pub fn otp_new_account_reply(phone: &str) -> MockReply {
        MockReply::with_data(200, "OTP verified successfully", json!({ "phone": phone }))
    }

    #[must_use]
    pub fn default_phone() -> &'static str {
        TEST_PHONE
    }

    /// An unsigned ID token carrying the given profile claims
    #[must_use]
    pub fn google_id_token(sub: &str, name: &str, email: &str, picture: &str) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let claims = json!({
            "iss": "https://accounts.google.com",
            "aud": TEST_GOOGLE_CLIENT_ID,
            "sub": sub,
            "name": name,
            "email": email,
            "picture": picture,
        });
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.test-signature")
    }

    #[must_use]
    pub fn product(id: &str, price: f64, discounted_price: Option<f64>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Decor {id}"),
            price_details: PriceDetails {
                price: Some(price),
                discounted_price,
            },
            ..Product::default()
        }
    }

    /// category-product-list answer with the given products and bounds
    #[must_use]
    pub fn product_list_reply(products: &[Product], min_price: f64, max_price: f64) -> MockReply {
        MockReply::with_data(
            200,
            "Products fetched",
            json!({
                "data": products,
                "minPrice": min_price,
                "maxPrice": max_price,
            }),
        )
    }
}
