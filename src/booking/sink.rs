use crate::models::BookingCompletion;

/// Receives finished bookings; the checkout collaborator sits behind this
pub trait CompletionSink: Send + Sync {
    fn booking_completed(&self, completion: &BookingCompletion);
}

/// Sink that only logs the completion
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSink;

impl CompletionSink for LoggingSink {
    fn booking_completed(&self, completion: &BookingCompletion) {
        log::info!(
            "Booking completed for {} on {} ({})",
            completion.login_data.user.id,
            completion.details.selected_date.as_deref().unwrap_or_default(),
            completion
                .details
                .selected_time_slot
                .as_ref()
                .map(|slot| slot.time.as_str())
                .unwrap_or_default(),
        );
        if log::log_enabled!(log::Level::Debug) {
            match serde_json::to_string(completion) {
                Ok(json) => log::debug!("Booking completion payload: {json}"),
                Err(e) => log::debug!("Booking completion payload not serializable: {e}"),
            }
        }
    }
}
