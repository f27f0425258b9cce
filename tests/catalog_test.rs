//! Product listing against a scripted backend

use std::time::Duration;

use storefront::catalog::{
    debounced_price_change, CatalogError, Debouncer, FilterUpdate, PriceBounds, ProductFilters,
    ProductListing, SortKey,
};
use storefront::testing::{MockBackend, MockReply, TestFixtures};
use tokio::sync::Mutex;

fn ids(listing: &ProductListing) -> Vec<&str> {
    listing.products().iter().map(|p| p.id.as_str()).collect()
}

fn three_products() -> MockReply {
    TestFixtures::product_list_reply(
        &[
            TestFixtures::product("mid", 2000.0, None),
            TestFixtures::product("cheap", 3000.0, Some(900.0)),
            TestFixtures::product("dear", 5000.0, None),
        ],
        900.0,
        5000.0,
    )
}

#[tokio::test]
async fn test_filter_change_fetches_and_keeps_sort() {
    let backend = MockBackend::new()
        .with_product_list(three_products())
        .with_product_list(three_products());
    let mut listing = ProductListing::new(ProductFilters::default());

    listing
        .set_category(&backend, "birthday-decoration", "kids")
        .await
        .unwrap();
    assert_eq!(ids(&listing), vec!["mid", "cheap", "dear"]);
    assert_eq!(listing.bounds(), Some(PriceBounds { min: 900.0, max: 5000.0 }));

    listing.set_sort(SortKey::PriceLowToHigh);
    assert_eq!(ids(&listing), vec!["cheap", "mid", "dear"]);
    assert_eq!(backend.product_queries().len(), 1);

    listing.set_city(&backend, "Delhi NCR").await.unwrap();
    assert_eq!(ids(&listing), vec!["cheap", "mid", "dear"]);

    let queries = backend.product_queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].category, "birthday-decoration");
    assert_eq!(queries[1].subcategory, "kids");
    assert_eq!(queries[1].city, "Delhi NCR");
    assert_eq!(queries[1].min_price, None);
}

#[tokio::test]
async fn test_apply_filters_is_a_single_fetch() {
    let backend = MockBackend::new();
    let mut listing = ProductListing::new(ProductFilters::default());
    listing
        .apply_filters(
            &backend,
            FilterUpdate {
                city: Some("Pune".to_string()),
                same_day: Some(true),
                discount: Some(true),
                ..FilterUpdate::default()
            },
        )
        .await
        .unwrap();

    let queries = backend.product_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].same_day, Some(true));
    assert_eq!(queries[0].discount, Some(true));
    assert!(listing.products().is_empty());
}

#[tokio::test]
async fn test_rejected_fetch_keeps_previous_products() {
    let backend = MockBackend::new()
        .with_product_list(three_products())
        .with_product_list(MockReply::status(500, "Internal error"));
    let mut listing = ProductListing::new(ProductFilters::default());
    listing.set_same_day(&backend, false).await.unwrap();

    let result = listing.set_discount(&backend, true).await;
    assert!(matches!(result, Err(CatalogError::Rejected { status: 500, .. })));
    assert_eq!(listing.products().len(), 3);

    backend.push_product_list(MockReply::Failure);
    assert!(matches!(
        listing.set_discount(&backend, false).await,
        Err(CatalogError::Backend(_))
    ));
    assert_eq!(listing.products().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_price_burst_fetches_once_with_last_range() {
    let backend = MockBackend::new().with_product_list(three_products());
    let listing = Mutex::new(ProductListing::new(ProductFilters::default()));
    let debouncer = Debouncer::new(Duration::from_millis(300));

    let first = debounced_price_change(&listing, &debouncer, &backend, 1000.0, 8000.0);
    let second = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        debounced_price_change(&listing, &debouncer, &backend, 1500.0, 8000.0).await
    };
    let third = async {
        tokio::time::sleep(Duration::from_millis(250)).await;
        debounced_price_change(&listing, &debouncer, &backend, 1500.0, 6000.0).await
    };
    let (first, second, third) = tokio::join!(first, second, third);

    assert!(!first.unwrap());
    assert!(!second.unwrap());
    assert!(third.unwrap());

    let queries = backend.product_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].min_price, Some(1500.0));
    assert_eq!(queries[0].max_price, Some(6000.0));

    // A touched range is never overwritten by the response bounds
    let listing = listing.lock().await;
    assert!((listing.filters().max_price - 6000.0).abs() < f64::EPSILON);
    assert_eq!(listing.bounds(), Some(PriceBounds { min: 900.0, max: 5000.0 }));
}

#[tokio::test(start_paused = true)]
async fn test_spaced_price_changes_each_fetch() {
    let backend = MockBackend::new();
    let listing = Mutex::new(ProductListing::new(ProductFilters::default()));
    let debouncer = Debouncer::new(Duration::from_millis(300));

    assert!(debounced_price_change(&listing, &debouncer, &backend, 100.0, 900.0)
        .await
        .unwrap());
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(debounced_price_change(&listing, &debouncer, &backend, 200.0, 900.0)
        .await
        .unwrap());
    assert_eq!(backend.product_queries().len(), 2);
}

#[tokio::test]
async fn test_bare_array_payload_and_detail_lookup() {
    let backend = MockBackend::new().with_product_list(MockReply::with_data(
        200,
        "Products fetched",
        serde_json::json!([
            { "_id": "p1", "name": "Unicorn theme", "priceDetails": { "price": "1499" } },
            { "_id": "p2", "name": "Jungle theme", "priceDetails": { "price": 2199, "discountedPrice": 0 } }
        ]),
    ));
    let mut listing = ProductListing::new(ProductFilters::default());
    listing.fetch(&backend).await.unwrap();

    assert_eq!(listing.bounds(), None);
    let product = listing.select_product("p2").unwrap();
    assert!((product.effective_price() - 2199.0).abs() < f64::EPSILON);
    assert!((listing.select_product("p1").unwrap().effective_price() - 1499.0).abs() < f64::EPSILON);
    assert!(listing.select_product("p3").is_none());

    listing.set_sort(SortKey::PriceHighToLow);
    let view = listing.view();
    assert_eq!(view.count, 2);
    assert_eq!(view.products[0].id, "p2");
}
