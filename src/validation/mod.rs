//! Validation Module
//!
//! Pure input checks used by the login flows.
//!
//! - [`core`] - Mobile, email, password and OTP format checks with their field messages
//! - [`forms`] - Field-scoped error collection and the email login/signup form

pub mod core;
pub mod forms;

pub use self::core::{is_valid_email, is_valid_mobile, is_valid_otp, is_valid_password, validate_mobile};
pub use self::forms::{EmailForm, EmailMode, Field, FieldErrors};
