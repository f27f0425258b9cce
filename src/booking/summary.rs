use serde::Serialize;

use crate::models::{BookingDetails, Product, SelectedItem};

pub const NO_DATE: &str = "No date selected";
pub const NO_TIME: &str = "No time selected";

/// Side panel shown beside every wizard step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub product_name: Option<String>,
    pub date: String,
    pub time: String,
    pub items: Vec<SelectedItem>,
    pub base_price: f64,
    pub total: f64,
}

impl BookingSummary {
    /// Summarize `details` for `product`; the total is base price plus every add-on line
    #[must_use]
    pub fn new(product: Option<&Product>, details: &BookingDetails) -> Self {
        let base_price = product.map_or(0.0, Product::effective_price);
        let items = details
            .selected_customizations
            .iter()
            .chain(&details.selected_recommended_items)
            .cloned()
            .collect();

        Self {
            product_name: product.map(|p| p.name.clone()),
            date: details
                .selected_date
                .clone()
                .unwrap_or_else(|| NO_DATE.to_string()),
            time: details
                .selected_time_slot
                .as_ref()
                .map_or_else(|| NO_TIME.to_string(), |slot| slot.time.clone()),
            items,
            base_price,
            total: base_price + details.extras_total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceDetails, TimeSlot};

    #[test]
    fn test_empty_details_use_placeholders() {
        let summary = BookingSummary::new(None, &BookingDetails::default());
        assert_eq!(summary.date, NO_DATE);
        assert_eq!(summary.time, NO_TIME);
        assert!(summary.total.abs() < f64::EPSILON);
        assert!(summary.product_name.is_none());
    }

    #[test]
    fn test_total_adds_items_to_effective_price() {
        let product = Product {
            id: "p1".to_string(),
            name: "Pastel Birthday Decor".to_string(),
            price_details: PriceDetails {
                price: Some(2999.0),
                discounted_price: Some(2499.0),
            },
            ..Product::default()
        };
        let details = BookingDetails {
            selected_date: Some("Wednesday, October 14, 2026".to_string()),
            selected_time_slot: TimeSlot::find(3).cloned(),
            selected_customizations: vec![SelectedItem::new("Name banner", 200.0, 2)],
            selected_recommended_items: vec![SelectedItem::new("Fog entry", 750.0, 0)],
        };

        let summary = BookingSummary::new(Some(&product), &details);
        assert_eq!(summary.time, "06:00 PM to 09:00 PM");
        assert_eq!(summary.items.len(), 2);
        assert!((summary.total - (2499.0 + 400.0 + 750.0)).abs() < f64::EPSILON);
    }
}
