//! Storefront catalog, stock and persisted cart against a mocked backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;
use trinket_store_client::storefront::{
    CartStorage, FileCartStorage, OwnerKey, StorefrontProduct,
};
use trinket_store_core::{ProductId, UserRole};
use trinket_store_integration_tests::{TestBackend, inventory_json, price_json, product_json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_catalog(backend: &TestBackend, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/products/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_json(1, "Caneca Azul", true),
            product_json(2, "Chaveiro", true),
        ])))
        .expect(expected_calls)
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prices/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([price_json(10, 1, 3490)])))
        .expect(expected_calls)
        .mount(&backend.server)
        .await;
}

fn caneca() -> StorefrontProduct {
    StorefrontProduct {
        id: ProductId::new(1),
        slug: "caneca-azul".to_string(),
        name: "Caneca Azul".to_string(),
        description: None,
        image: None,
        category: Some("canecas".to_string()),
        price_in_cents: Some(3490),
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_catalog_joins_prices_and_caches() {
    let backend = TestBackend::start().await;
    mount_catalog(&backend, 1).await;

    let catalog = &backend.context.storefront.catalog;
    let first = catalog.fetch(false).await;
    let second = catalog.fetch(false).await;

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].price_in_cents, Some(3490));
    assert_eq!(first[1].price_in_cents, None);
    assert_eq!(catalog.store().data(), first);
}

#[tokio::test]
async fn test_catalog_force_and_invalidate_refetch() {
    let backend = TestBackend::start().await;
    mount_catalog(&backend, 3).await;

    let catalog = &backend.context.storefront.catalog;
    catalog.fetch(false).await;
    catalog.fetch(true).await;
    catalog.invalidate().await;
    catalog.fetch(false).await;
}

#[tokio::test]
async fn test_catalog_failure_keeps_last_known_list() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/products/active"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([product_json(1, "Caneca", true)])),
        )
        .up_to_n_times(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/active"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prices/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&backend.server)
        .await;

    let catalog = &backend.context.storefront.catalog;
    assert_eq!(catalog.fetch(true).await.len(), 1);
    let stale = catalog.fetch(true).await;
    assert_eq!(stale.len(), 1);
    assert_eq!(catalog.store().error().unwrap().status, Some(500));
}

// =============================================================================
// Stock
// =============================================================================

#[tokio::test]
async fn test_inventory_is_cached_per_product() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/inventory/product/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inventory_json(5, 1, 4)))
        .expect(2)
        .mount(&backend.server)
        .await;

    let inventory = &backend.context.storefront.inventory;
    let snapshot = inventory.fetch_for_product(ProductId::new(1), false).await.unwrap();
    assert_eq!(snapshot.qty_on_hand, 4);
    inventory.fetch_for_product(ProductId::new(1), false).await.unwrap();
    inventory.fetch_for_product(ProductId::new(1), true).await.unwrap();

    assert_eq!(inventory.get(ProductId::new(1)).unwrap().qty_on_hand, 4);
    assert!(!inventory.snapshot().is_loading(ProductId::new(1)));
}

#[tokio::test]
async fn test_inventory_error_is_recorded() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/inventory/product/8"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&backend.server)
        .await;

    let inventory = &backend.context.storefront.inventory;
    let error = inventory.fetch_for_product(ProductId::new(8), false).await.unwrap_err();
    assert_eq!(error.status, Some(404));
    assert_eq!(inventory.snapshot().error, Some(error));
    assert!(inventory.get(ProductId::new(8)).is_none());
}

// =============================================================================
// Persisted cart
// =============================================================================

#[tokio::test]
async fn test_cart_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn CartStorage> = Arc::new(FileCartStorage::new(dir.path()));

    let backend = TestBackend::with_storage(storage.clone()).await;
    let cart = &backend.context.storefront.cart;
    cart.add_item(&caneca(), 5, 3).unwrap();
    assert_eq!(cart.snapshot().total_items(), 3);
    drop(backend);

    let backend = TestBackend::with_storage(storage).await;
    let state = backend.context.storefront.cart.snapshot();
    assert_eq!(state.owner, OwnerKey::Guest);
    assert_eq!(state.total_items(), 3);
    assert_eq!(state.total_amount_in_cents(), 3 * 3490);
}

#[tokio::test]
async fn test_sign_in_moves_guest_cart_to_user() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn CartStorage> = Arc::new(FileCartStorage::new(dir.path()));
    let backend = TestBackend::with_storage(storage.clone()).await;
    let cart = &backend.context.storefront.cart;
    cart.add_item(&caneca(), 2, 10).unwrap();

    backend.sign_in(42, UserRole::Customer).await;
    let owner = backend.context.sync_cart_owner().await;
    assert_eq!(owner, OwnerKey::user(42));
    assert_eq!(cart.snapshot().total_items(), 2);

    let guest = storage.load(&OwnerKey::Guest.storage_key()).unwrap();
    assert!(guest.is_none());
    let owned = storage.load(&owner.storage_key()).unwrap().unwrap();
    assert!(owned.contains("caneca-azul"));

    backend.context.sign_out().await;
    assert_eq!(cart.owner(), OwnerKey::Guest);
    assert!(!cart.snapshot().has_items());
}

#[tokio::test]
async fn test_corrupt_cart_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileCartStorage::new(dir.path());
    storage
        .save(&OwnerKey::Guest.storage_key(), "{not json")
        .unwrap();

    let backend = TestBackend::with_storage(Arc::new(storage)).await;
    assert!(!backend.context.storefront.cart.snapshot().has_items());
}
