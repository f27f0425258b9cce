//! Login modal
//!
//! The authentication sub-state-machine driven by the booking wizard. Mobile
//! OTP, email and social logins converge on one success contract: the
//! session is stored, the modal resets and the caller receives
//! [`LoginOutcome::Success`].
//!
//! # Modules
//!
//! - [`mobile`] - Phone entry and OTP verification
//! - [`otp`] - The four-box OTP input
//! - [`timer`] - Resend countdown
//! - [`email`] - Email login and signup
//! - [`registry`] - Placeholder email account registry
//! - [`social`] - Google and Facebook provider selection

pub mod email;
pub mod mobile;
pub mod otp;
pub mod registry;
pub mod social;
pub mod timer;

pub use email::{EmailLogin, EmailSubmission};
pub use mobile::{MobileLogin, MobileStep, OtpChallenge, OtpVerification};
pub use otp::{DigitOutcome, OtpInput};
pub use registry::{LocalUserRegistry, RegisteredUser, UserRegistry};
pub use social::SocialProviders;
pub use timer::{format_timer, Countdown};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::BackendClient;
use crate::identity::{ProviderGrant, ProviderKind};
use crate::models::{AuthMethod, LoginData, UserSession};
use crate::session::{SessionError, SessionManager};
use crate::validation::{EmailForm, EmailMode, FieldErrors};
use email::EmailError;

const LOGIN_SUCCESS: &str = "Login successful!";
const ACCOUNT_CREATED: &str = "Account created successfully!";
const ACCOUNT_CREATION_FAILED: &str = "Failed to create account. Please try again.";
const EMAIL_LOGIN_FAILED: &str = "Login failed. Please try again.";

/// Which login method the modal shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoginChannel {
    #[default]
    Mobile,
    Email,
    Social,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the visitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Result of a modal operation that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// The modal stays open
    Pending,
    /// A session was stored; the modal has reset
    Success(LoginData),
    /// The phone was verified but has no account yet
    NewAccount { phone_number: String, details: Value },
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("another login action is in progress")]
    Busy,
    #[error("{operation} is not available in the current login step")]
    WrongState { operation: &'static str },
    #[error("{0}")]
    Validation(FieldErrors),
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Collaborators the modal calls out to
#[derive(Clone)]
pub struct LoginServices {
    pub backend: Arc<dyn BackendClient>,
    pub registry: Arc<dyn UserRegistry>,
    pub social: Arc<SocialProviders>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOptions {
    pub countdown_seconds: u32,
    pub auto_submit_delay: Duration,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            countdown_seconds: 60,
            auto_submit_delay: Duration::from_millis(100),
        }
    }
}

/// Serializable snapshot of the modal for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub channel: LoginChannel,
    pub phone_number: String,
    pub otp_sent: bool,
    pub otp_digits: Vec<String>,
    pub otp_focus: usize,
    pub countdown: u32,
    pub countdown_label: String,
    pub can_resend: bool,
    pub email_mode: EmailMode,
    pub email: String,
    pub errors: FieldErrors,
    pub notice: Option<Notice>,
    pub awaiting_account: bool,
}

pub struct LoginModal {
    session: Arc<SessionManager>,
    services: LoginServices,
    options: LoginOptions,
    channel: LoginChannel,
    mobile: MobileLogin,
    email: EmailLogin,
    errors: FieldErrors,
    notice: Option<Notice>,
    // Phone verified without an account, waiting for account creation
    pending_account: Option<String>,
}

impl LoginModal {
    #[must_use]
    pub fn new(session: Arc<SessionManager>, services: LoginServices, options: LoginOptions) -> Self {
        let mobile = MobileLogin::new(session.remembered_phone());
        Self {
            session,
            services,
            options,
            channel: LoginChannel::Mobile,
            mobile,
            email: EmailLogin::new(),
            errors: FieldErrors::new(),
            notice: None,
            pending_account: None,
        }
    }

    /// Discard all in-progress state without writing a session
    pub fn reset(&mut self) {
        self.reset_form();
        self.pending_account = None;
    }

    fn reset_form(&mut self) {
        self.channel = LoginChannel::Mobile;
        self.mobile = MobileLogin::new(self.session.remembered_phone());
        self.email = EmailLogin::new();
        self.errors.clear();
        self.notice = None;
    }

    /// Switch method, clearing errors and the fields of the method left behind
    pub fn select_channel(&mut self, channel: LoginChannel) {
        if channel != self.channel {
            match self.channel {
                LoginChannel::Mobile => {
                    self.mobile = MobileLogin::new(self.session.remembered_phone());
                }
                LoginChannel::Email => self.email = EmailLogin::new(),
                LoginChannel::Social => {}
            }
            self.channel = channel;
        }
        self.errors.clear();
        self.notice = None;
    }

    #[must_use]
    pub const fn channel(&self) -> LoginChannel {
        self.channel
    }

    #[must_use]
    pub fn mobile(&self) -> &MobileLogin {
        &self.mobile
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn fail(&mut self, errors: FieldErrors) -> LoginError {
        if let Some(message) = errors.messages().next() {
            self.notice = Some(Notice::error(message));
        }
        self.errors = errors.clone();
        LoginError::Validation(errors)
    }

    fn reject(&mut self, message: impl Into<String>) -> LoginError {
        let message = message.into();
        self.notice = Some(Notice::error(message.clone()));
        LoginError::Rejected(message)
    }

    /// Store the session, reset the modal and hand back the success payload
    fn finish(
        &mut self,
        mut data: LoginData,
        phone: Option<&str>,
        message: &str,
    ) -> Result<LoginOutcome, LoginError> {
        self.session
            .store_user_session(&data.user_data, data.method, phone)?;
        if data.method == AuthMethod::Mobile && data.mobile_number.is_none() {
            data.mobile_number = phone.map(ToString::to_string);
        }
        log::info!("{} login completed for {}", data.method, data.user_data.id);
        self.reset();
        self.notice = Some(Notice::success(message));
        Ok(LoginOutcome::Success(data))
    }

    /// Validate the phone number and request an OTP
    ///
    /// # Errors
    ///
    /// Returns `Validation` with a mobile field error; the modal stays on
    /// phone entry
    pub async fn submit_phone(&mut self, phone: &str) -> Result<LoginOutcome, LoginError> {
        self.channel = LoginChannel::Mobile;
        self.errors.clear();
        match self
            .mobile
            .submit_phone(
                phone,
                self.services.backend.as_ref(),
                self.options.countdown_seconds,
            )
            .await
        {
            Ok(message) => {
                self.notice = Some(Notice::success(message));
                Ok(LoginOutcome::Pending)
            }
            Err(errors) => Err(self.fail(errors)),
        }
    }

    /// Type into OTP box `index`; a complete code is verified after a short delay
    ///
    /// # Errors
    ///
    /// Returns `WrongState` before an OTP was sent, and the verification
    /// errors of [`LoginModal::verify_otp`] for a complete code
    pub async fn input_otp_digit(
        &mut self,
        index: usize,
        value: &str,
    ) -> Result<LoginOutcome, LoginError> {
        match self.mobile.input_digit(index, value) {
            None => Err(LoginError::WrongState {
                operation: "input_otp_digit",
            }),
            Some(DigitOutcome::Rejected | DigitOutcome::Updated) => Ok(LoginOutcome::Pending),
            Some(DigitOutcome::Complete(code)) => {
                tokio::time::sleep(self.options.auto_submit_delay).await;
                self.verify_code(Some(code)).await
            }
        }
    }

    /// # Errors
    ///
    /// Returns `WrongState` before an OTP was sent
    pub fn otp_backspace(&mut self, index: usize) -> Result<LoginOutcome, LoginError> {
        self.mobile
            .backspace(index)
            .map(|_| LoginOutcome::Pending)
            .ok_or(LoginError::WrongState {
                operation: "otp_backspace",
            })
    }

    /// Verify the digits typed so far
    ///
    /// # Errors
    ///
    /// Returns `Validation` with an OTP field error for a malformed or
    /// rejected code, and `WrongState` before an OTP was sent
    pub async fn verify_otp(&mut self) -> Result<LoginOutcome, LoginError> {
        self.verify_code(None).await
    }

    async fn verify_code(&mut self, code: Option<String>) -> Result<LoginOutcome, LoginError> {
        self.errors.clear();
        let verification = match self
            .mobile
            .verify(code, self.services.backend.as_ref())
            .await
        {
            Ok(Some(verification)) => verification,
            Ok(None) => {
                return Err(LoginError::WrongState {
                    operation: "verify_otp",
                })
            }
            Err(errors) => return Err(self.fail(errors)),
        };

        match verification {
            OtpVerification::Verified { phone_number, user } => {
                let mut data = LoginData::new(AuthMethod::Mobile, user);
                data.mobile_number = Some(phone_number.clone());
                self.finish(data, Some(&phone_number), LOGIN_SUCCESS)
            }
            OtpVerification::NewAccount {
                phone_number,
                details,
            } => {
                self.reset_form();
                self.pending_account = Some(phone_number.clone());
                Ok(LoginOutcome::NewAccount {
                    phone_number,
                    details,
                })
            }
        }
    }

    /// Request a new OTP once the countdown reaches zero
    ///
    /// # Errors
    ///
    /// Returns `Rejected` when the backend refuses, and `WrongState` before
    /// an OTP was sent
    pub async fn resend_otp(&mut self) -> Result<LoginOutcome, LoginError> {
        if self.mobile.challenge().is_none() {
            return Err(LoginError::WrongState {
                operation: "resend_otp",
            });
        }
        match self
            .mobile
            .resend(
                self.services.backend.as_ref(),
                self.options.countdown_seconds,
            )
            .await
        {
            Ok(Some(message)) => {
                self.errors.clear();
                self.notice = Some(Notice::success(message));
                Ok(LoginOutcome::Pending)
            }
            Ok(None) => Ok(LoginOutcome::Pending),
            Err(message) => Err(self.reject(message)),
        }
    }

    /// Return from the OTP step to phone entry
    pub fn change_number(&mut self) {
        self.mobile.change_number();
        self.errors.clear();
    }

    pub fn toggle_email_mode(&mut self) {
        self.channel = LoginChannel::Email;
        self.email.toggle();
        self.errors.clear();
        self.notice = None;
    }

    /// Submit the email form in its current mode
    ///
    /// # Errors
    ///
    /// Returns `Validation` for invalid fields and `Rejected` for an unknown
    /// email, a wrong password or an already registered email
    pub async fn submit_email(&mut self, form: EmailForm) -> Result<LoginOutcome, LoginError> {
        self.channel = LoginChannel::Email;
        self.errors.clear();
        self.email.form = form;
        let mode = self.email.mode;

        let submission = match self.email.submit(self.services.registry.as_ref()) {
            Ok(submission) => submission,
            Err(EmailError::Invalid(errors)) => return Err(self.fail(errors)),
            Err(EmailError::Registry(e)) => {
                log::error!("Email account registry failed: {e}");
                let message = match mode {
                    EmailMode::Login => EMAIL_LOGIN_FAILED,
                    EmailMode::Signup => ACCOUNT_CREATION_FAILED,
                };
                return Err(self.reject(message));
            }
        };

        match submission {
            EmailSubmission::LoggedIn(user) => {
                let mut data = LoginData::new(AuthMethod::Email, user);
                data.email = Some(self.email.form.email.clone());
                self.finish(data, None, LOGIN_SUCCESS)
            }
            EmailSubmission::SignedUp(user) => {
                let mut data = LoginData::new(AuthMethod::Email, user);
                data.email = Some(self.email.form.email.clone());
                data.is_new_user = true;
                self.finish(data, None, ACCOUNT_CREATED)
            }
            EmailSubmission::SwitchedToSignup => Err(self.reject(email::NO_ACCOUNT)),
            EmailSubmission::SwitchedToLogin => Err(self.reject(email::ALREADY_REGISTERED)),
            EmailSubmission::WrongPassword => Err(self.reject(email::WRONG_PASSWORD)),
        }
    }

    /// Complete a login with a relayed vendor grant
    ///
    /// # Errors
    ///
    /// Returns `Rejected` with the humanized provider failure
    pub async fn social_login(
        &mut self,
        provider: ProviderKind,
        grant: ProviderGrant,
    ) -> Result<LoginOutcome, LoginError> {
        self.channel = LoginChannel::Social;
        self.errors.clear();

        match self.services.social.authenticate(provider, grant).await {
            Ok(outcome) => {
                let method = match provider {
                    ProviderKind::Google => AuthMethod::Google,
                    ProviderKind::Facebook => AuthMethod::Facebook,
                };
                let mut data = LoginData::new(method, outcome.user);
                data.is_new_user = outcome.is_new_user;
                self.finish(data, None, &outcome.message)
            }
            Err(e) => {
                log::warn!("{provider} login failed: {e}");
                Err(self.reject(e.humanize()))
            }
        }
    }

    /// Finish a login after the account-creation collaborator produced `user`
    ///
    /// # Errors
    ///
    /// Returns `WrongState` unless an OTP verification found no account
    pub fn account_created(&mut self, user: UserSession) -> Result<LoginOutcome, LoginError> {
        let Some(phone_number) = self.pending_account.clone() else {
            return Err(LoginError::WrongState {
                operation: "account_created",
            });
        };

        let mut data = LoginData::new(AuthMethod::Mobile, user);
        data.is_new_user = true;
        data.mobile_number = Some(phone_number.clone());
        self.finish(data, Some(&phone_number), ACCOUNT_CREATED)
    }

    #[must_use]
    pub fn view(&self) -> LoginView {
        let challenge = self.mobile.challenge();
        let countdown = challenge.map_or(0, |challenge| challenge.countdown.remaining());
        LoginView {
            channel: self.channel,
            phone_number: self.mobile.phone_number().to_string(),
            otp_sent: challenge.is_some(),
            otp_digits: challenge.map_or_else(|| OtpInput::new().boxes(), |c| c.input.boxes()),
            otp_focus: challenge.map_or(0, |challenge| challenge.input.focus()),
            countdown,
            countdown_label: format_timer(countdown),
            can_resend: challenge.is_some() && countdown == 0,
            email_mode: self.email.mode,
            email: self.email.form.email.clone(),
            errors: self.errors.clone(),
            notice: self.notice.clone(),
            awaiting_account: self.pending_account.is_some(),
        }
    }
}

impl std::fmt::Debug for LoginModal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginModal")
            .field("channel", &self.channel)
            .field("mobile", &self.mobile)
            .field("email_mode", &self.email.mode)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
