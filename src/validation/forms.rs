use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::core::{
    is_valid_email, is_valid_full_name, is_valid_password, CONFIRM_PASSWORD_MESSAGE,
    EMAIL_MESSAGE, NAME_MESSAGE, PASSWORD_MESSAGE,
};

/// Login form fields that can carry an inline error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Mobile,
    Otp,
    Email,
    Password,
    Name,
    ConfirmPassword,
}

/// Field-scoped validation messages, in a stable order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    /// `Ok(())` when no field failed
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field carries a message
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.messages().collect::<Vec<_>>().join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FieldErrors {}

/// Sub-mode of the email login method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmailMode {
    #[default]
    Login,
    Signup,
}

impl EmailMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Signup,
            Self::Signup => Self::Login,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
}

impl EmailForm {
    /// Validate every field relevant to `mode`
    ///
    /// # Errors
    ///
    /// Returns all failing fields at once
    pub fn validate(&self, mode: EmailMode) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if !is_valid_email(&self.email) {
            errors.insert(Field::Email, EMAIL_MESSAGE);
        }
        if !is_valid_password(&self.password) {
            errors.insert(Field::Password, PASSWORD_MESSAGE);
        }
        if mode == EmailMode::Signup {
            if !is_valid_full_name(&self.full_name) {
                errors.insert(Field::Name, NAME_MESSAGE);
            }
            if self.password != self.confirm_password {
                errors.insert(Field::ConfirmPassword, CONFIRM_PASSWORD_MESSAGE);
            }
        }

        errors.into_result()
    }

    /// Drop everything except the email address
    pub fn clear_secrets(&mut self) {
        self.password.clear();
        self.confirm_password.clear();
        self.full_name.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str, confirm: &str, name: &str) -> EmailForm {
        EmailForm {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            full_name: name.to_string(),
        }
    }

    #[test]
    fn test_login_mode_ignores_signup_fields() {
        let valid = form("asha@example.com", "secret1", "", "");
        assert!(valid.validate(EmailMode::Login).is_ok());

        let errors = form("asha@", "123", "", "").validate(EmailMode::Login).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(Field::Email), Some(EMAIL_MESSAGE));
        assert_eq!(errors.get(Field::Password), Some(PASSWORD_MESSAGE));
    }

    #[test]
    fn test_signup_checks_name_and_confirmation() {
        let errors = form("asha@example.com", "secret1", "secret2", " A ")
            .validate(EmailMode::Signup)
            .unwrap_err();
        assert_eq!(errors.get(Field::Name), Some(NAME_MESSAGE));
        assert_eq!(errors.get(Field::ConfirmPassword), Some(CONFIRM_PASSWORD_MESSAGE));
        assert!(errors.get(Field::Email).is_none());

        assert!(form("asha@example.com", "secret1", "secret1", "Asha")
            .validate(EmailMode::Signup)
            .is_ok());
    }

    #[test]
    fn test_field_errors_serialize_as_camel_case_map() {
        let errors = FieldErrors::single(Field::ConfirmPassword, CONFIRM_PASSWORD_MESSAGE);
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value["confirmPassword"], CONFIRM_PASSWORD_MESSAGE);
    }
}
