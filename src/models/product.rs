use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient_price;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDetails {
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_price", skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<f64>,
}

impl PriceDetails {
    /// The price a customer pays: the discount when it is non-zero, else the list price
    #[must_use]
    pub fn effective(&self) -> f64 {
        [self.discounted_price, self.price]
            .into_iter()
            .flatten()
            .find(|value| *value != 0.0)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price_details: PriceDetails,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    #[must_use]
    pub fn effective_price(&self) -> f64 {
        self.price_details.effective()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductListResponse {
    pub data: Vec<Product>,
    #[serde(deserialize_with = "lenient_price")]
    pub min_price: Option<f64>,
    #[serde(deserialize_with = "lenient_price")]
    pub max_price: Option<f64>,
}

/// Body of `customer/product/category-product-list`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: String,
    pub subcategory: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<bool>,
}
