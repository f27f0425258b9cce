use serde::Serialize;

use crate::models::TimeSlot;

/// Date and slot that are both known once the visitor reaches login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmedBooking {
    pub date: String,
    pub slot: TimeSlot,
}

/// Where the booking wizard currently is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum WizardStep {
    #[default]
    Closed,
    DateSelection,
    TimeSelection {
        date: String,
    },
    Customization {
        date: String,
        slot: TimeSlot,
    },
    Login {
        booking: ConfirmedBooking,
    },
}

impl WizardStep {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::DateSelection => "dateSelection",
            Self::TimeSelection { .. } => "timeSelection",
            Self::Customization { .. } => "customization",
            Self::Login { .. } => "login",
        }
    }

    /// 1-based position in the wizard, `None` while closed
    #[must_use]
    pub const fn number(&self) -> Option<u8> {
        match self {
            Self::Closed => None,
            Self::DateSelection => Some(1),
            Self::TimeSelection { .. } => Some(2),
            Self::Customization { .. } => Some(3),
            Self::Login { .. } => Some(4),
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// The step `back()` leads to; `DateSelection` stays put
    #[must_use]
    pub fn previous(&self) -> Option<Self> {
        match self {
            Self::Closed => None,
            Self::DateSelection => Some(Self::DateSelection),
            Self::TimeSelection { .. } => Some(Self::DateSelection),
            Self::Customization { date, .. } => Some(Self::TimeSelection { date: date.clone() }),
            Self::Login { booking } => Some(Self::Customization {
                date: booking.date.clone(),
                slot: booking.slot.clone(),
            }),
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> TimeSlot {
        TimeSlot::new(2, "03:00 PM to 06:00 PM", true)
    }

    #[test]
    fn test_previous_walks_back_one_step() {
        let login = WizardStep::Login {
            booking: ConfirmedBooking {
                date: "Wednesday, October 14, 2026".to_string(),
                slot: slot(),
            },
        };
        let customization = login.previous().unwrap();
        assert_eq!(
            customization,
            WizardStep::Customization {
                date: "Wednesday, October 14, 2026".to_string(),
                slot: slot(),
            }
        );
        let time = customization.previous().unwrap();
        assert_eq!(time.number(), Some(2));
        assert_eq!(time.previous(), Some(WizardStep::DateSelection));
        assert_eq!(WizardStep::DateSelection.previous(), Some(WizardStep::DateSelection));
        assert_eq!(WizardStep::Closed.previous(), None);
    }

    #[test]
    fn test_serializes_with_step_tag() {
        let value = serde_json::to_value(WizardStep::TimeSelection {
            date: "Wednesday, October 14, 2026".to_string(),
        })
        .unwrap();
        assert_eq!(value["step"], "timeSelection");
        assert_eq!(value["date"], "Wednesday, October 14, 2026");
        assert_eq!(serde_json::to_value(WizardStep::Closed).unwrap()["step"], "closed");
    }
}
