//! Listing reads, classification and advanced search.

use std::sync::atomic::Ordering;

use ev_market_client::catalog::{ProductFilter, SearchSource, partition_by_category, search_products};
use ev_market_core::{ProductId, ProductStatus, UserId};
use ev_market_integration_tests::{MockBackend, SELLER_ID};
use rust_decimal::Decimal;

fn ids(products: &[ev_market_core::Product]) -> Vec<i64> {
    products.iter().map(|p| p.id.as_i64()).collect()
}

#[tokio::test]
async fn test_list_normalizes_mixed_records() {
    let backend = MockBackend::start().await;
    let (client, _storage) = backend.client();

    let products = client.list_products().await.unwrap();
    assert_eq!(ids(&products), vec![1, 2, 3, 4, 5]);
    assert_eq!(products[2].title, "VinFast VF8");
    assert_eq!(products[2].price.map(|p| p.amount()), Some(Decimal::from(500_000_000)));
    assert_eq!(products[4].status(), ProductStatus::Sold);

    let (vehicles, batteries) = partition_by_category(products);
    assert_eq!(ids(&vehicles), vec![1, 2, 3, 5]);
    assert_eq!(ids(&batteries), vec![4]);
}

#[tokio::test]
async fn test_listing_is_cached() {
    let backend = MockBackend::start().await;
    let (client, _storage) = backend.client();

    client.list_products().await.unwrap();
    backend.state.requests.lock().unwrap().clear();
    client.list_products().await.unwrap();
    assert!(!backend.state.received("GET", "/api/Product"));

    client.invalidate_cache();
    client.list_products().await.unwrap();
    assert!(backend.state.received("GET", "/api/Product"));
}

#[tokio::test]
async fn test_get_product_and_not_found() {
    let backend = MockBackend::start().await;
    let (client, _storage) = backend.client();

    let battery = client.get_product(ProductId::new(4)).await.unwrap();
    assert_eq!(battery.cycle_count, Some(350));
    assert_eq!(battery.voltage, Some(48.0));

    let err = client.get_product(ProductId::new(404)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Không tìm thấy sản phẩm");
}

#[tokio::test]
async fn test_seller_listings() {
    let backend = MockBackend::start().await;
    let (client, _storage) = backend.client();

    let products = client.list_seller_products(UserId::new(SELLER_ID)).await.unwrap();
    assert_eq!(products.len(), 5);
    assert!(client.list_seller_products(UserId::new(99)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_search_still_gates_status() {
    let backend = MockBackend::start().await;
    let (client, _storage) = backend.client();

    let filter = ProductFilter {
        brand: Some("tesla".to_string()),
        ..ProductFilter::default()
    };
    let results = search_products(&client, &filter).await.unwrap();
    assert_eq!(results.source, SearchSource::Server);
    // The sold Roadster is returned by the server but never shown
    assert_eq!(ids(&results.products), vec![1, 2]);
}

#[tokio::test]
async fn test_search_falls_back_to_local_filter() {
    let backend = MockBackend::start().await;
    backend.state.search_available.store(false, Ordering::SeqCst);
    let (client, _storage) = backend.client();

    let filter = ProductFilter {
        brand: Some("Tesla".to_string()),
        min_price: Some(Decimal::from(500_000_000)),
        ..ProductFilter::default()
    };
    let results = search_products(&client, &filter).await.unwrap();
    assert_eq!(results.source, SearchSource::LocalFallback);
    assert_eq!(ids(&results.products), vec![2]);
    assert!(backend.state.received("GET", "/api/Product/search"));
    assert!(backend.state.received("GET", "/api/Product"));
}

#[tokio::test]
async fn test_local_battery_search() {
    let backend = MockBackend::start().await;
    backend.state.search_available.store(false, Ordering::SeqCst);
    let (client, _storage) = backend.client();

    let filter = ProductFilter {
        min_capacity: Some(100.0),
        voltage: Some("48".to_string()),
        min_battery_health: Some(90.0),
        ..ProductFilter::default()
    };
    let results = search_products(&client, &filter).await.unwrap();
    assert_eq!(ids(&results.products), vec![4]);
}
