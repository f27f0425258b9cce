//! Testing utilities for the storefront core
//!
//! Enabled for unit tests and, through the `testing` feature, for the
//! integration tests under `tests/`.
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built settings, users, products and ID tokens
//! - [`mock`] - Scripted backend, Graph client, script fetcher and completion sink
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront::testing::{MockBackend, TestFixtures, TestHarness};
//!
//! let harness = TestHarness::new(
//!     MockBackend::new().with_otp_verification(TestFixtures::otp_login_reply("9876543210")),
//! );
//! let flow = harness.booking_flow();
//! assert!(!flow.step().is_open());
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::{TestFixtures, TestHarness};
pub use mock::{
    BackendCall, MockBackend, MockGraphClient, MockReply, MockScriptFetcher, RecordingSink,
};

/// Common test constants
pub mod constants {
    pub const TEST_EMAIL: &str = "test@example.com";

    pub const TEST_USER_NAME: &str = "Test User";

    /// A valid Indian mobile number
    pub const TEST_PHONE: &str = "9876543210";

    pub const TEST_GOOGLE_CLIENT_ID: &str = "1234567890-storefront.apps.googleusercontent.com";

    pub const TEST_FACEBOOK_APP_ID: &str = "987654321012345";
}
