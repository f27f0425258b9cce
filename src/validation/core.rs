//! Format checks for login input
//!
//! These checks never touch the network. The messages are the exact strings
//! shown next to the offending field.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MOBILE_LENGTH_MESSAGE: &str = "Please enter a valid 10-digit mobile number";
pub const MOBILE_PREFIX_MESSAGE: &str = "Please enter a valid Indian mobile number";
pub const OTP_MESSAGE: &str = "Please enter a valid 4-digit OTP";
pub const EMAIL_MESSAGE: &str = "Valid email required";
pub const PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";
pub const NAME_MESSAGE: &str = "Full name is required (minimum 2 characters)";
pub const CONFIRM_PASSWORD_MESSAGE: &str = "Passwords do not match";

/// Number of digits in a one-time code
pub const OTP_LENGTH: usize = 4;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MIN_NAME_LENGTH: usize = 2;

// Indian mobile numbers start with 6-9
static MOBILE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9][0-9]{9}$").unwrap());

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Check a 10-digit Indian mobile number
///
/// # Errors
///
/// Returns the field message for a wrong length first, then for a wrong prefix
/// or non-digit content.
pub fn validate_mobile(phone: &str) -> Result<(), &'static str> {
    if phone.chars().count() != 10 {
        return Err(MOBILE_LENGTH_MESSAGE);
    }
    if !MOBILE_PATTERN.is_match(phone) {
        return Err(MOBILE_PREFIX_MESSAGE);
    }
    Ok(())
}

#[must_use]
pub fn is_valid_mobile(phone: &str) -> bool {
    validate_mobile(phone).is_ok()
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[must_use]
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

#[must_use]
pub fn is_valid_full_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_NAME_LENGTH
}

/// A complete one-time code is exactly four ASCII digits
#[must_use]
pub fn is_valid_otp(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_length_checked_before_prefix() {
        assert_eq!(validate_mobile("98765"), Err(MOBILE_LENGTH_MESSAGE));
        assert_eq!(validate_mobile("98765432101"), Err(MOBILE_LENGTH_MESSAGE));
        assert_eq!(validate_mobile(""), Err(MOBILE_LENGTH_MESSAGE));
        assert_eq!(validate_mobile("5876543210"), Err(MOBILE_PREFIX_MESSAGE));
        assert_eq!(validate_mobile("98765abcde"), Err(MOBILE_PREFIX_MESSAGE));
        assert_eq!(validate_mobile("9876543210"), Ok(()));
        assert!(is_valid_mobile("6000000000"));
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.in"));
        assert!(!is_valid_email("asha@example"));
        assert!(!is_valid_email("asha example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_password_and_name_lengths() {
        assert!(!is_valid_password("12345"));
        assert!(is_valid_password("123456"));
        assert!(!is_valid_full_name("  A  "));
        assert!(is_valid_full_name(" Al "));
    }

    #[test]
    fn test_otp_shape() {
        assert!(is_valid_otp("0427"));
        assert!(!is_valid_otp("427"));
        assert!(!is_valid_otp("04a7"));
        assert!(!is_valid_otp("04270"));
    }
}
