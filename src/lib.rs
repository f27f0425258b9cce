#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the storefront core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod backend;
pub mod booking;
pub mod catalog;
pub mod handlers;
pub mod identity;
pub mod login;
pub mod models;
pub mod session;
pub mod settings;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use booking::{BookingError, BookingFlow, WizardStep};
pub use handlers::{configure_services, AppState};
pub use login::{LoginError, LoginModal, LoginOutcome};
pub use models::{BookingCompletion, LoginData, UserSession};
pub use session::SessionManager;
pub use settings::StorefrontSettings;
