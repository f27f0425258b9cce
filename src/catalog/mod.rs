//! Product listing view
//!
//! # Modules
//!
//! - [`listing`] - Filters, fetched products and derived display order
//! - [`sort`] - Sort keys
//! - [`debounce`] - Trailing-edge debounce for the price slider

pub mod debounce;
pub mod listing;
pub mod sort;

pub use debounce::Debouncer;
pub use listing::{
    debounced_price_change, FilterUpdate, ListingView, PriceBounds, ProductFilters, ProductListing,
};
pub use sort::SortKey;

use crate::backend::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("product list rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("product list could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unknown product {0}")]
    UnknownProduct(String),
}
