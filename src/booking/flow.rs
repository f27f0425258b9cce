use chrono::NaiveDate;
use std::sync::Arc;

use super::sink::CompletionSink;
use super::state::{ConfirmedBooking, WizardStep};
use super::summary::BookingSummary;
use super::BookingError;
use crate::login::{LoginModal, LoginOutcome, LoginView};
use crate::models::{
    BookingCompletion, BookingDetails, LoginData, LoginIdentity, LoginMethod, Product,
    SelectedItem, TimeSlot,
};
use crate::session::SessionManager;

/// Rendering format of the selected date, e.g. `Wednesday, October 14, 2026`
pub const DATE_FORMAT: &str = "%A, %B %-d, %Y";

#[must_use]
pub fn format_booking_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Serializable snapshot of the wizard
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub step: WizardStep,
    pub step_number: Option<u8>,
    pub product: Option<Product>,
    pub details: BookingDetails,
    pub summary: BookingSummary,
    pub login: Option<LoginView>,
}

/// The four-step booking wizard for one visitor
///
/// Steps move `DateSelection -> TimeSelection -> Customization -> Login`.
/// Completion hands a [`BookingCompletion`] to the sink and closes the wizard.
pub struct BookingFlow {
    step: WizardStep,
    details: BookingDetails,
    product: Option<Product>,
    session: Arc<SessionManager>,
    login: LoginModal,
    sink: Arc<dyn CompletionSink>,
}

impl BookingFlow {
    #[must_use]
    pub fn new(session: Arc<SessionManager>, login: LoginModal, sink: Arc<dyn CompletionSink>) -> Self {
        Self {
            step: WizardStep::Closed,
            details: BookingDetails::default(),
            product: None,
            session,
            login,
            sink,
        }
    }

    #[must_use]
    pub const fn step(&self) -> &WizardStep {
        &self.step
    }

    #[must_use]
    pub const fn details(&self) -> &BookingDetails {
        &self.details
    }

    #[must_use]
    pub const fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    #[must_use]
    pub const fn login(&self) -> &LoginModal {
        &self.login
    }

    pub fn login_mut(&mut self) -> &mut LoginModal {
        &mut self.login
    }

    fn invalid(&self, operation: &'static str) -> BookingError {
        log::warn!("Booking {operation} rejected in step {}", self.step);
        BookingError::InvalidTransition {
            from: self.step.name(),
            operation,
        }
    }

    fn reset(&mut self) {
        self.step = WizardStep::Closed;
        self.details = BookingDetails::default();
        self.product = None;
        self.login.reset();
    }

    /// Start a fresh booking for `product`, discarding anything collected before
    pub fn open(&mut self, product: Product) {
        log::info!("Booking opened for product {}", product.id);
        self.reset();
        self.product = Some(product);
        self.step = WizardStep::DateSelection;
    }

    /// Discard everything and hide the wizard
    pub fn close(&mut self) {
        if self.step.is_open() {
            log::info!("Booking closed at step {}", self.step);
        }
        self.reset();
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `DateSelection`
    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        if self.step != WizardStep::DateSelection {
            return Err(self.invalid("select_date"));
        }
        let formatted = format_booking_date(date);
        self.details.selected_date = Some(formatted.clone());
        self.step = WizardStep::TimeSelection { date: formatted };
        Ok(())
    }

    /// Pick `slot`; returns `false` and changes nothing for an unavailable slot
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `TimeSelection`
    pub fn select_time_slot(&mut self, slot: &TimeSlot) -> Result<bool, BookingError> {
        let WizardStep::TimeSelection { date } = &self.step else {
            return Err(self.invalid("select_time_slot"));
        };
        if !slot.available {
            log::debug!("Ignoring unavailable slot {}", slot.id);
            return Ok(false);
        }
        self.details.selected_time_slot = Some(slot.clone());
        self.step = WizardStep::Customization {
            date: date.clone(),
            slot: slot.clone(),
        };
        Ok(true)
    }

    /// Record the add-ons and either complete right away or move to login
    ///
    /// A stored session completes the booking immediately and returns the
    /// emitted completion; otherwise the wizard moves to `Login` and returns
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `Customization`
    pub fn confirm_customizations(
        &mut self,
        customizations: Vec<SelectedItem>,
        recommended: Vec<SelectedItem>,
    ) -> Result<Option<BookingCompletion>, BookingError> {
        let WizardStep::Customization { date, slot } = &self.step else {
            return Err(self.invalid("confirm_customizations"));
        };
        let booking = ConfirmedBooking {
            date: date.clone(),
            slot: slot.clone(),
        };
        self.details.selected_customizations = customizations;
        self.details.selected_recommended_items = recommended;

        if let Some(user) = self.session.current_session() {
            let method = user.auth_method().map_or(LoginMethod::ExistingUser, Into::into);
            log::info!("Visitor already signed in, completing booking as {}", user.id);
            return Ok(Some(self.emit(booking, LoginIdentity { user, method })));
        }

        self.login.reset();
        self.step = WizardStep::Login { booking };
        Ok(None)
    }

    /// Complete the booking with the login modal's success payload
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `Login`
    pub fn complete_login(&mut self, login_data: LoginData) -> Result<BookingCompletion, BookingError> {
        let WizardStep::Login { booking } = &self.step else {
            return Err(self.invalid("complete_login"));
        };
        let booking = booking.clone();
        let identity = LoginIdentity {
            method: login_data.method.into(),
            user: login_data.user_data,
        };
        Ok(self.emit(booking, identity))
    }

    /// Feed a login modal outcome back into the wizard
    ///
    /// A success while the wizard waits on login completes the booking. Any
    /// other outcome, or a login made outside the wizard, leaves it alone.
    ///
    /// # Errors
    ///
    /// Never fails for outcomes the modal actually produces in `Login`
    pub fn on_login_outcome(
        &mut self,
        outcome: &LoginOutcome,
    ) -> Result<Option<BookingCompletion>, BookingError> {
        match outcome {
            LoginOutcome::Success(data) if matches!(self.step, WizardStep::Login { .. }) => {
                self.complete_login(data.clone()).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn emit(&mut self, booking: ConfirmedBooking, login_data: LoginIdentity) -> BookingCompletion {
        let mut details = std::mem::take(&mut self.details);
        details.selected_date = Some(booking.date);
        details.selected_time_slot = Some(booking.slot);
        let completion = BookingCompletion {
            details,
            login_data,
        };
        self.sink.booking_completed(&completion);
        self.reset();
        completion
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` while closed
    pub fn back(&mut self) -> Result<(), BookingError> {
        let Some(previous) = self.step.previous() else {
            return Err(self.invalid("back"));
        };
        if matches!(self.step, WizardStep::Login { .. }) {
            self.login.reset();
        }
        self.step = previous;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `Login`
    pub fn edit_date(&mut self) -> Result<(), BookingError> {
        self.edit("edit_date", |_| WizardStep::DateSelection)
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `Login`
    pub fn edit_time(&mut self) -> Result<(), BookingError> {
        self.edit("edit_time", |booking| WizardStep::TimeSelection { date: booking.date })
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `Login`
    pub fn edit_customizations(&mut self) -> Result<(), BookingError> {
        self.edit("edit_customizations", |booking| WizardStep::Customization {
            date: booking.date,
            slot: booking.slot,
        })
    }

    fn edit(
        &mut self,
        operation: &'static str,
        target: impl FnOnce(ConfirmedBooking) -> WizardStep,
    ) -> Result<(), BookingError> {
        let WizardStep::Login { booking } = &self.step else {
            return Err(self.invalid(operation));
        };
        self.step = target(booking.clone());
        self.login.reset();
        Ok(())
    }

    #[must_use]
    pub fn summary(&self) -> BookingSummary {
        BookingSummary::new(self.product.as_ref(), &self.details)
    }

    #[must_use]
    pub fn view(&self) -> BookingView {
        BookingView {
            step: self.step.clone(),
            step_number: self.step.number(),
            product: self.product.clone(),
            details: self.details.clone(),
            summary: self.summary(),
            login: matches!(self.step, WizardStep::Login { .. }).then(|| self.login.view()),
        }
    }
}

impl std::fmt::Debug for BookingFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingFlow")
            .field("step", &self.step)
            .field("details", &self.details)
            .field("product", &self.product.as_ref().map(|p| &p.id))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_format_matches_storefront_display() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        assert_eq!(format_booking_date(date), "Wednesday, October 14, 2026");
        let date = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        assert_eq!(format_booking_date(date), "Tuesday, March 3, 2026");
    }
}
