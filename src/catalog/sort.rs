use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::Product;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Backend order
    #[default]
    Recommended,
    PriceLowToHigh,
    PriceHighToLow,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::PriceLowToHigh => "priceLowToHigh",
            Self::PriceHighToLow => "priceHighToLow",
        }
    }

    /// A sorted copy of `products`; equal prices keep their fetched order
    #[must_use]
    pub fn apply(self, products: &[Product]) -> Vec<Product> {
        let mut sorted = products.to_vec();
        match self {
            Self::Recommended => {}
            Self::PriceLowToHigh => sorted.sort_by(|a, b| by_price(a, b)),
            Self::PriceHighToLow => sorted.sort_by(|a, b| by_price(b, a)),
        }
        sorted
    }
}

fn by_price(a: &Product, b: &Product) -> Ordering {
    a.effective_price().total_cmp(&b.effective_price())
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
