//! Storefront data model
//!
//! Wire-compatible shapes shared by the booking wizard, the login flows, the
//! product listing and the backend client.

pub mod api;
pub mod booking;
pub mod product;
pub mod user;

pub use api::ApiEnvelope;
pub use booking::{BookingCompletion, BookingDetails, LoginIdentity, SelectedItem, TimeSlot};
pub use product::{PriceDetails, Product, ProductListResponse, ProductQuery};
pub use user::{AuthMethod, LoginData, LoginMethod, PersonalInfo, UserProfileData, UserSession};

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Deserialize a string that the backend may send as `null`
pub(crate) fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Deserialize a price the backend may send as a number, a numeric string or `null`
pub(crate) fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<RawPrice>::deserialize(deserializer)? {
        Some(RawPrice::Number(value)) => Some(value),
        Some(RawPrice::Text(text)) => text.trim().parse::<f64>().ok(),
        None => None,
    })
}
