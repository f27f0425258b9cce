//! Booking wizard
//!
//! # Modules
//!
//! - [`state`] - Wizard steps and their backward transitions
//! - [`flow`] - The `BookingFlow` state machine
//! - [`summary`] - Side panel totals
//! - [`sink`] - Where completed bookings go

pub mod flow;
pub mod sink;
pub mod state;
pub mod summary;

pub use flow::{format_booking_date, BookingFlow, BookingView, DATE_FORMAT};
pub use sink::{CompletionSink, LoggingSink};
pub use state::{ConfirmedBooking, WizardStep};
pub use summary::BookingSummary;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("{operation} is not allowed from the {from} step")]
    InvalidTransition {
        from: &'static str,
        operation: &'static str,
    },
    #[error("unknown time slot {0}")]
    UnknownSlot(u32),
    #[error("no product selected for booking")]
    NoProduct,
}
