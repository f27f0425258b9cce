use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::user::{LoginMethod, UserSession};

/// A bookable delivery window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: u32,
    pub time: String,
    pub available: bool,
}

impl TimeSlot {
    #[must_use]
    pub fn new(id: u32, time: impl Into<String>, available: bool) -> Self {
        Self {
            id,
            time: time.into(),
            available,
        }
    }
}

static TIME_SLOTS: Lazy<Vec<TimeSlot>> = Lazy::new(|| {
    vec![
        TimeSlot::new(1, "12:00 PM to 03:00 PM", true),
        TimeSlot::new(2, "03:00 PM to 06:00 PM", true),
        TimeSlot::new(3, "06:00 PM to 09:00 PM", true),
    ]
});

impl TimeSlot {
    /// The fixed slot catalog offered on every date
    #[must_use]
    pub fn catalog() -> &'static [TimeSlot] {
        &TIME_SLOTS
    }

    #[must_use]
    pub fn find(id: u32) -> Option<&'static TimeSlot> {
        TIME_SLOTS.iter().find(|slot| slot.id == id)
    }
}

/// A customization or recommended add-on picked in step 3
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedItem {
    pub name: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl SelectedItem {
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }

    /// `price × quantity`, counting a zero quantity as one
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity.max(1))
    }
}

/// Selections accumulated across the wizard steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub selected_date: Option<String>,
    pub selected_time_slot: Option<TimeSlot>,
    #[serde(default)]
    pub selected_customizations: Vec<SelectedItem>,
    #[serde(default)]
    pub selected_recommended_items: Vec<SelectedItem>,
}

impl BookingDetails {
    #[must_use]
    pub fn extras_total(&self) -> f64 {
        self.selected_customizations
            .iter()
            .chain(&self.selected_recommended_items)
            .map(SelectedItem::line_total)
            .sum()
    }
}

/// Identity attached to a completed booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginIdentity {
    pub user: UserSession,
    pub method: LoginMethod,
}

/// Payload emitted to the checkout collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCompletion {
    #[serde(flatten)]
    pub details: BookingDetails,
    pub login_data: LoginIdentity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_three_available_slots() {
        let slots = TimeSlot::catalog();
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|slot| slot.available));
        assert_eq!(slots[1].time, "03:00 PM to 06:00 PM");
        assert_eq!(TimeSlot::find(3).map(|s| s.time.as_str()), Some("06:00 PM to 09:00 PM"));
        assert!(TimeSlot::find(4).is_none());
    }

    #[test]
    fn test_zero_quantity_counts_once() {
        let item = SelectedItem::new("Balloon arch", 450.0, 0);
        assert!((item.line_total() - 450.0).abs() < f64::EPSILON);

        let details = BookingDetails {
            selected_customizations: vec![SelectedItem::new("Name banner", 200.0, 2)],
            selected_recommended_items: vec![item],
            ..BookingDetails::default()
        };
        assert!((details.extras_total() - 850.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completion_flattens_details() {
        let completion = BookingCompletion {
            details: BookingDetails {
                selected_date: Some("Wednesday, October 14, 2026".to_string()),
                selected_time_slot: TimeSlot::find(1).cloned(),
                ..BookingDetails::default()
            },
            login_data: LoginIdentity {
                user: UserSession::default(),
                method: LoginMethod::ExistingUser,
            },
        };

        let value = serde_json::to_value(&completion).unwrap();
        assert_eq!(value["selectedDate"], "Wednesday, October 14, 2026");
        assert_eq!(value["selectedTimeSlot"]["id"], 1);
        assert_eq!(value["loginData"]["method"], "existing_user");
    }
}
