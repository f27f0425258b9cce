//! Email login and signup against the account registry

use super::registry::UserRegistry;
use crate::models::{AuthMethod, PersonalInfo, UserSession};
use crate::session::SessionError;
use crate::validation::{EmailForm, EmailMode, FieldErrors};

pub const NO_ACCOUNT: &str = "No account found with this email. Please sign up first.";
pub const WRONG_PASSWORD: &str = "Incorrect password. Please try again.";
pub const ALREADY_REGISTERED: &str = "User already exists with this email. Please login instead.";

/// How an email submission ended
#[derive(Debug, Clone, PartialEq)]
pub enum EmailSubmission {
    LoggedIn(UserSession),
    SignedUp(UserSession),
    /// Unknown email; the form switched to signup
    SwitchedToSignup,
    /// Known email on signup; the form switched to login
    SwitchedToLogin,
    WrongPassword,
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("{0}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Registry(#[from] SessionError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailLogin {
    pub mode: EmailMode,
    pub form: EmailForm,
}

impl EmailLogin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip between login and signup, clearing everything but the email
    pub fn toggle(&mut self) {
        self.mode = self.mode.toggled();
        self.form.clear_secrets();
    }

    /// Validate the form and run it against `registry`
    ///
    /// # Errors
    ///
    /// Returns field errors for invalid input and registry errors for
    /// storage failures
    pub fn submit(&mut self, registry: &dyn UserRegistry) -> Result<EmailSubmission, EmailError> {
        self.form.validate(self.mode).map_err(EmailError::Invalid)?;

        match self.mode {
            EmailMode::Login => self.login(registry),
            EmailMode::Signup => self.signup(registry),
        }
    }

    fn login(&mut self, registry: &dyn UserRegistry) -> Result<EmailSubmission, EmailError> {
        let Some(account) = registry.find_by_email(&self.form.email)? else {
            log::info!("Email login for an unknown address, switching to signup");
            self.mode = EmailMode::Signup;
            return Ok(EmailSubmission::SwitchedToSignup);
        };

        if !registry.password_matches(&account, &self.form.password) {
            log::warn!("Email login with a wrong password for account {}", account.id);
            return Ok(EmailSubmission::WrongPassword);
        }

        Ok(EmailSubmission::LoggedIn(email_session(
            account.id,
            &account.full_name,
            &account.email,
        )))
    }

    fn signup(&mut self, registry: &dyn UserRegistry) -> Result<EmailSubmission, EmailError> {
        if registry.find_by_email(&self.form.email)?.is_some() {
            log::info!("Signup for a registered address, switching to login");
            self.mode = EmailMode::Login;
            self.form.confirm_password.clear();
            self.form.full_name.clear();
            return Ok(EmailSubmission::SwitchedToLogin);
        }

        let account = registry.create(&self.form.email, &self.form.password, &self.form.full_name)?;
        Ok(EmailSubmission::SignedUp(email_session(
            account.id,
            &account.full_name,
            &account.email,
        )))
    }
}

fn email_session(account_id: i64, full_name: &str, email: &str) -> UserSession {
    UserSession::new(
        AuthMethod::Email,
        &account_id.to_string(),
        PersonalInfo::new(full_name, email),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::login::registry::LocalUserRegistry;
    use crate::session::MemoryStore;
    use std::sync::Arc;

    fn filled(mode: EmailMode) -> EmailLogin {
        EmailLogin {
            mode,
            form: EmailForm {
                email: "asha@example.com".to_string(),
                password: "secret1".to_string(),
                confirm_password: "secret1".to_string(),
                full_name: "Asha Rao".to_string(),
            },
        }
    }

    #[test]
    fn test_toggle_clears_secrets_but_keeps_email() {
        let mut login = filled(EmailMode::Login);
        login.toggle();
        assert_eq!(login.mode, EmailMode::Signup);
        assert_eq!(login.form.email, "asha@example.com");
        assert!(login.form.password.is_empty());
        assert!(login.form.confirm_password.is_empty());
        assert!(login.form.full_name.is_empty());
    }

    #[test]
    fn test_signup_then_login() {
        let registry = LocalUserRegistry::new(Arc::new(MemoryStore::new()));

        let mut signup = filled(EmailMode::Signup);
        let EmailSubmission::SignedUp(created) = signup.submit(&registry).unwrap() else {
            panic!("expected a signup");
        };
        assert!(created.id.starts_with("email_"));
        assert_eq!(created.name(), "Asha Rao");

        let mut login = filled(EmailMode::Login);
        let EmailSubmission::LoggedIn(session) = login.submit(&registry).unwrap() else {
            panic!("expected a login");
        };
        assert_eq!(session.id, created.id);
        assert_eq!(session.auth_method(), Some(AuthMethod::Email));
    }

    #[test]
    fn test_unknown_email_switches_to_signup() {
        let registry = LocalUserRegistry::new(Arc::new(MemoryStore::new()));
        let mut login = filled(EmailMode::Login);
        assert_eq!(login.submit(&registry).unwrap(), EmailSubmission::SwitchedToSignup);
        assert_eq!(login.mode, EmailMode::Signup);
    }

    #[test]
    fn test_existing_email_on_signup_switches_to_login() {
        let registry = LocalUserRegistry::new(Arc::new(MemoryStore::new()));
        registry.create("asha@example.com", "secret1", "Asha Rao").unwrap();

        let mut signup = filled(EmailMode::Signup);
        assert_eq!(signup.submit(&registry).unwrap(), EmailSubmission::SwitchedToLogin);
        assert_eq!(signup.mode, EmailMode::Login);
        assert!(signup.form.confirm_password.is_empty());
        assert!(signup.form.full_name.is_empty());
        assert_eq!(signup.form.password, "secret1");
    }

    #[test]
    fn test_wrong_password_stays_in_login() {
        let registry = LocalUserRegistry::new(Arc::new(MemoryStore::new()));
        registry.create("asha@example.com", "secret1", "Asha Rao").unwrap();

        let mut login = filled(EmailMode::Login);
        login.form.password = "secret2".to_string();
        assert_eq!(login.submit(&registry).unwrap(), EmailSubmission::WrongPassword);
        assert_eq!(login.mode, EmailMode::Login);
    }

    #[test]
    fn test_invalid_form_never_reaches_registry() {
        let registry = LocalUserRegistry::new(Arc::new(MemoryStore::new()));
        let mut login = filled(EmailMode::Login);
        login.form.email = "not-an-email".to_string();
        assert!(matches!(login.submit(&registry), Err(EmailError::Invalid(_))));
        assert!(registry.find_by_email("not-an-email").unwrap().is_none());
    }
}
