//! Mobile OTP login: `EnterPhone -> AwaitOtp -> Verified`

use serde_json::Value;

use super::otp::{DigitOutcome, OtpInput};
use super::timer::Countdown;
use crate::backend::BackendClient;
use crate::models::UserSession;
use crate::validation::core::{is_valid_otp, validate_mobile, OTP_MESSAGE};
use crate::validation::{Field, FieldErrors};

pub const OTP_SEND_FAILED: &str = "Failed to send OTP. Please try again.";
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const INVALID_OTP: &str = "Invalid OTP. Please try again.";
pub const VERIFICATION_FAILED: &str = "Verification failed. Please try again.";
pub const RESEND_FAILED: &str = "Failed to resend OTP. Please try again.";
pub const OTP_RESENT: &str = "OTP resent successfully!";

/// Suffix of the verify-otp message for accounts that already exist
const EXISTING_USER_SUFFIX: &str = "Login successful.";

/// An OTP sent to `phone_number` and not yet verified
#[derive(Debug)]
pub struct OtpChallenge {
    pub phone_number: String,
    pub input: OtpInput,
    pub countdown: Countdown,
}

#[derive(Debug, Default)]
pub enum MobileStep {
    #[default]
    EnterPhone,
    AwaitOtp(OtpChallenge),
}

/// What a verify-otp answer means for the login
#[derive(Debug, Clone, PartialEq)]
pub enum OtpVerification {
    /// The account exists; the backend returned its user
    Verified { phone_number: String, user: UserSession },
    /// The phone is new; account creation takes over with the backend payload
    NewAccount { phone_number: String, details: Value },
}

#[derive(Debug, Default)]
pub struct MobileLogin {
    phone_number: String,
    step: MobileStep,
}

impl MobileLogin {
    #[must_use]
    pub fn new(prefill: Option<String>) -> Self {
        Self {
            phone_number: prefill.unwrap_or_default(),
            step: MobileStep::EnterPhone,
        }
    }

    #[must_use]
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    #[must_use]
    pub fn step(&self) -> &MobileStep {
        &self.step
    }

    #[must_use]
    pub fn challenge(&self) -> Option<&OtpChallenge> {
        match &self.step {
            MobileStep::AwaitOtp(challenge) => Some(challenge),
            MobileStep::EnterPhone => None,
        }
    }

    fn challenge_mut(&mut self) -> Option<&mut OtpChallenge> {
        match &mut self.step {
            MobileStep::AwaitOtp(challenge) => Some(challenge),
            MobileStep::EnterPhone => None,
        }
    }

    /// Validate `phone` and request an OTP for it
    ///
    /// On success the challenge starts with a fresh countdown and the return
    /// value is the confirmation notice.
    ///
    /// # Errors
    ///
    /// Returns a mobile field error for invalid input, a backend rejection or
    /// a transport failure. No request is sent for invalid input.
    pub async fn submit_phone(
        &mut self,
        phone: &str,
        backend: &dyn BackendClient,
        countdown_seconds: u32,
    ) -> Result<String, FieldErrors> {
        self.phone_number = phone.trim().to_string();
        validate_mobile(&self.phone_number).map_err(|message| {
            log::warn!("Rejected mobile number input");
            FieldErrors::single(Field::Mobile, message)
        })?;

        match backend.request_otp(&self.phone_number).await {
            Ok(envelope) if envelope.is_success() => {
                log::info!("OTP requested for a mobile login");
                self.step = MobileStep::AwaitOtp(OtpChallenge {
                    phone_number: self.phone_number.clone(),
                    input: OtpInput::new(),
                    countdown: Countdown::start(countdown_seconds),
                });
                Ok(format!("OTP sent to +91 {}", self.phone_number))
            }
            Ok(envelope) => {
                log::warn!("OTP request rejected with status {}", envelope.status);
                Err(FieldErrors::single(
                    Field::Mobile,
                    envelope.message_or(OTP_SEND_FAILED),
                ))
            }
            Err(e) => {
                log::error!("OTP request failed: {e}");
                Err(FieldErrors::single(Field::Mobile, GENERIC_FAILURE))
            }
        }
    }

    /// Type into one OTP box; `None` when no OTP has been sent
    pub fn input_digit(&mut self, index: usize, value: &str) -> Option<DigitOutcome> {
        self.challenge_mut()
            .map(|challenge| challenge.input.input(index, value))
    }

    /// `None` when no OTP has been sent
    pub fn backspace(&mut self, index: usize) -> Option<bool> {
        self.challenge_mut()
            .map(|challenge| challenge.input.backspace(index))
    }

    /// Verify `code`, or the digits typed so far when `code` is `None`
    ///
    /// Returns `Ok(None)` when no OTP has been sent.
    ///
    /// # Errors
    ///
    /// Returns an OTP field error for a malformed code, an invalid code
    /// (digits are cleared and focus returns to the first box) or any other
    /// backend answer.
    pub async fn verify(
        &mut self,
        code: Option<String>,
        backend: &dyn BackendClient,
    ) -> Result<Option<OtpVerification>, FieldErrors> {
        let Some(challenge) = self.challenge_mut() else {
            return Ok(None);
        };

        let code = code.unwrap_or_else(|| challenge.input.code());
        if !is_valid_otp(&code) {
            return Err(FieldErrors::single(Field::Otp, OTP_MESSAGE));
        }
        let otp: u32 = code
            .parse()
            .map_err(|_| FieldErrors::single(Field::Otp, OTP_MESSAGE))?;
        let phone_number = challenge.phone_number.clone();

        let envelope = match backend.verify_otp(&phone_number, otp).await {
            Ok(envelope) => envelope,
            Err(e) => {
                log::error!("OTP verification request failed: {e}");
                return Err(FieldErrors::single(Field::Otp, VERIFICATION_FAILED));
            }
        };

        match envelope.status {
            400 => {
                log::warn!("OTP rejected by backend");
                challenge.input.clear();
                Err(FieldErrors::single(Field::Otp, envelope.message_or(INVALID_OTP)))
            }
            200 => {
                let is_existing = envelope
                    .message
                    .as_deref()
                    .is_some_and(|message| message.ends_with(EXISTING_USER_SUFFIX));
                if !is_existing {
                    log::info!("OTP verified for a phone without an account");
                    return Ok(Some(OtpVerification::NewAccount {
                        phone_number,
                        details: serde_json::to_value(&envelope).unwrap_or(Value::Null),
                    }));
                }

                let user = UserSession::from_backend(envelope.data).map_err(|e| {
                    log::error!("Backend returned an unreadable user after OTP login: {e}");
                    FieldErrors::single(Field::Otp, VERIFICATION_FAILED)
                })?;
                Ok(Some(OtpVerification::Verified { phone_number, user }))
            }
            status => {
                log::warn!("Unexpected OTP verification status {status}");
                Err(FieldErrors::single(Field::Otp, VERIFICATION_FAILED))
            }
        }
    }

    /// Request a new OTP once the countdown has run out
    ///
    /// Returns `Ok(None)` while the countdown is still running or when no OTP
    /// has been sent, and the confirmation notice on success.
    ///
    /// # Errors
    ///
    /// Returns the resend failure message for any rejection or transport failure
    pub async fn resend(
        &mut self,
        backend: &dyn BackendClient,
        countdown_seconds: u32,
    ) -> Result<Option<&'static str>, &'static str> {
        let Some(challenge) = self.challenge_mut() else {
            return Ok(None);
        };
        if challenge.countdown.is_running() {
            return Ok(None);
        }

        match backend.request_otp(&challenge.phone_number).await {
            Ok(envelope) if envelope.is_success() => {
                challenge.countdown.restart(countdown_seconds);
                challenge.input.clear();
                log::info!("OTP resent for a mobile login");
                Ok(Some(OTP_RESENT))
            }
            Ok(envelope) => {
                log::warn!("OTP resend rejected with status {}", envelope.status);
                Err(RESEND_FAILED)
            }
            Err(e) => {
                log::error!("OTP resend failed: {e}");
                Err(RESEND_FAILED)
            }
        }
    }

    /// Leave the OTP step and return to phone entry, keeping the number
    pub fn change_number(&mut self) {
        self.step = MobileStep::EnterPhone;
    }
}
