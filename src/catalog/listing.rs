use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use super::debounce::Debouncer;
use super::sort::SortKey;
use super::CatalogError;
use crate::backend::BackendClient;
use crate::models::{Product, ProductListResponse, ProductQuery};

pub const DEFAULT_MIN_PRICE: f64 = 0.0;
pub const DEFAULT_MAX_PRICE: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    pub category: String,
    pub subcategory: String,
    pub city: String,
    pub min_price: f64,
    pub max_price: f64,
    pub same_day: bool,
    pub discount: bool,
}

impl ProductFilters {
    #[must_use]
    pub fn new(min_price: f64, max_price: f64) -> Self {
        Self {
            category: String::new(),
            subcategory: String::new(),
            city: String::new(),
            min_price,
            max_price,
            same_day: false,
            discount: false,
        }
    }
}

impl Default for ProductFilters {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PRICE, DEFAULT_MAX_PRICE)
    }
}

/// Partial filter change from the client; absent fields stay as they are
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterUpdate {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub city: Option<String>,
    pub same_day: Option<bool>,
    pub discount: Option<bool>,
}

impl FilterUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.subcategory.is_none()
            && self.city.is_none()
            && self.same_day.is_none()
            && self.discount.is_none()
    }
}

/// Slider range reported by the first listing that carried one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub filters: ProductFilters,
    pub sort: SortKey,
    pub bounds: Option<PriceBounds>,
    pub count: usize,
    pub products: Vec<Product>,
}

/// Filterable, sortable product list for one visitor
#[derive(Debug, Clone, Default)]
pub struct ProductListing {
    filters: ProductFilters,
    default_max: f64,
    sort: SortKey,
    fetched: Vec<Product>,
    displayed: Vec<Product>,
    bounds: Option<PriceBounds>,
    // Price limits are only sent once the visitor moved the slider
    price_touched: bool,
}

impl ProductListing {
    #[must_use]
    pub fn new(filters: ProductFilters) -> Self {
        Self {
            default_max: filters.max_price,
            filters,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn filters(&self) -> &ProductFilters {
        &self.filters
    }

    #[must_use]
    pub const fn sort(&self) -> SortKey {
        self.sort
    }

    #[must_use]
    pub const fn bounds(&self) -> Option<PriceBounds> {
        self.bounds
    }

    /// Products in display order
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.displayed
    }

    /// The body sent to `category-product-list` for the current filters
    #[must_use]
    pub fn query(&self) -> ProductQuery {
        ProductQuery {
            category: self.filters.category.clone(),
            subcategory: self.filters.subcategory.clone(),
            city: self.filters.city.clone(),
            min_price: self.price_touched.then_some(self.filters.min_price),
            max_price: self.price_touched.then_some(self.filters.max_price),
            same_day: Some(self.filters.same_day),
            discount: Some(self.filters.discount),
        }
    }

    /// Re-run the backend query and re-derive the displayed list
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures, a non-200 envelope or an
    /// unreadable product list. The previous products stay displayed.
    pub async fn fetch(&mut self, backend: &dyn BackendClient) -> Result<&[Product], CatalogError> {
        let query = self.query();
        let envelope = backend.category_products(&query).await?;
        if !envelope.is_success() {
            log::warn!("Product list rejected with status {}", envelope.status);
            return Err(CatalogError::Rejected {
                status: envelope.status,
                message: envelope.message_or("Failed to load products"),
            });
        }

        let response = parse_list(envelope.data)?;
        log::info!(
            "Fetched {} products for {}/{} in {}",
            response.data.len(),
            query.category,
            query.subcategory,
            query.city
        );
        self.absorb(response);
        Ok(&self.displayed)
    }

    fn absorb(&mut self, response: ProductListResponse) {
        if self.bounds.is_none() {
            if let (Some(min), Some(max)) = (response.min_price, response.max_price) {
                self.bounds = Some(PriceBounds { min, max });
            }
        }
        if !self.price_touched {
            if let Some(min) = response.min_price.filter(|_| self.filters.min_price == 0.0) {
                self.filters.min_price = min;
            }
            if let Some(max) = response.max_price.filter(|_| self.filters.max_price == self.default_max) {
                self.filters.max_price = max;
            }
        }
        self.fetched = response.data;
        self.displayed = self.sort.apply(&self.fetched);
    }

    /// # Errors
    ///
    /// See [`ProductListing::fetch`]
    pub async fn set_category(
        &mut self,
        backend: &dyn BackendClient,
        category: &str,
        subcategory: &str,
    ) -> Result<(), CatalogError> {
        self.filters.category = category.to_string();
        self.filters.subcategory = subcategory.to_string();
        self.fetch(backend).await.map(|_| ())
    }

    /// # Errors
    ///
    /// See [`ProductListing::fetch`]
    pub async fn set_city(&mut self, backend: &dyn BackendClient, city: &str) -> Result<(), CatalogError> {
        self.filters.city = city.to_string();
        self.fetch(backend).await.map(|_| ())
    }

    /// # Errors
    ///
    /// See [`ProductListing::fetch`]
    pub async fn set_same_day(&mut self, backend: &dyn BackendClient, same_day: bool) -> Result<(), CatalogError> {
        self.filters.same_day = same_day;
        self.fetch(backend).await.map(|_| ())
    }

    /// # Errors
    ///
    /// See [`ProductListing::fetch`]
    pub async fn set_discount(&mut self, backend: &dyn BackendClient, discount: bool) -> Result<(), CatalogError> {
        self.filters.discount = discount;
        self.fetch(backend).await.map(|_| ())
    }

    /// Apply several filter changes with a single fetch
    ///
    /// # Errors
    ///
    /// See [`ProductListing::fetch`]
    pub async fn apply_filters(
        &mut self,
        backend: &dyn BackendClient,
        update: FilterUpdate,
    ) -> Result<(), CatalogError> {
        if let Some(category) = update.category {
            self.filters.category = category;
        }
        if let Some(subcategory) = update.subcategory {
            self.filters.subcategory = subcategory;
        }
        if let Some(city) = update.city {
            self.filters.city = city;
        }
        if let Some(same_day) = update.same_day {
            self.filters.same_day = same_day;
        }
        if let Some(discount) = update.discount {
            self.filters.discount = discount;
        }
        self.fetch(backend).await.map(|_| ())
    }

    /// Record a slider move without fetching; negative inputs keep the old value
    pub fn set_price_range(&mut self, min_price: f64, max_price: f64) {
        if min_price >= 0.0 {
            self.filters.min_price = min_price;
        }
        if max_price >= 0.0 {
            self.filters.max_price = max_price;
        }
        self.price_touched = true;
    }

    /// Re-order the fetched list; never fetches
    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.displayed = sort.apply(&self.fetched);
    }

    #[must_use]
    pub fn select_product(&self, id: &str) -> Option<&Product> {
        self.fetched.iter().find(|product| product.id == id)
    }

    #[must_use]
    pub fn view(&self) -> ListingView {
        ListingView {
            filters: self.filters.clone(),
            sort: self.sort,
            bounds: self.bounds,
            count: self.displayed.len(),
            products: self.displayed.clone(),
        }
    }
}

/// The envelope `data` is either the list object or a bare product array
fn parse_list(data: Value) -> Result<ProductListResponse, CatalogError> {
    match data {
        Value::Null => Ok(ProductListResponse::default()),
        Value::Array(_) => Ok(ProductListResponse {
            data: serde_json::from_value(data)?,
            ..ProductListResponse::default()
        }),
        other => Ok(serde_json::from_value(other)?),
    }
}

/// Record a price change and fetch once the debounce window passes quietly
///
/// The listing lock is released while waiting, so later changes in the burst
/// can land. Returns `true` when this call performed the fetch.
///
/// # Errors
///
/// See [`ProductListing::fetch`]
pub async fn debounced_price_change(
    listing: &Mutex<ProductListing>,
    debouncer: &Debouncer,
    backend: &dyn BackendClient,
    min_price: f64,
    max_price: f64,
) -> Result<bool, CatalogError> {
    listing.lock().await.set_price_range(min_price, max_price);

    if !debouncer.settle().await {
        log::debug!("Price change superseded within {:?}", debouncer.delay());
        return Ok(false);
    }

    listing.lock().await.fetch(backend).await?;
    Ok(true)
}
