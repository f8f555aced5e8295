//! Admin resource stores and mutation trackers against a mocked backend.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use trinket_store_client::admin::{InventoryFilters, ProductFilters, UserFilters};
use trinket_store_client::filter::Choice;
use trinket_store_client::types::{ProductPayload, SignUpRequest};
use trinket_store_core::{OrderId, OrderStatus, ProductId, ProductStatus, UserId, UserRole};
use trinket_store_integration_tests::{
    TestBackend, inventory_json, order_json, price_json, product_json, user_json,
};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_products_fetch_then_filter_locally() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_json(1, "Caneca Azul", true),
            product_json(2, "Caneca Verde", false),
            product_json(3, "Chaveiro Azul", true),
        ])))
        .expect(1)
        .mount(&backend.server)
        .await;

    let products = &backend.context.admin.products;
    products.fetch(None).await;
    let state = products.state();
    assert_eq!(state.data.len(), 3);
    assert!(!state.loading);
    assert!(state.error.is_none());

    products.set_filters(ProductFilters {
        search: "azul".to_string(),
        category: Choice::All,
        status: Choice::Only(ProductStatus::Active),
    });
    let ids: Vec<_> = products.filtered().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![ProductId::new(1), ProductId::new(3)]);
    // Filtering never touches the stored list.
    assert_eq!(products.state().data.len(), 3);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_data() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([product_json(1, "Caneca", true)])),
        )
        .up_to_n_times(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db offline"})))
        .mount(&backend.server)
        .await;

    let products = &backend.context.admin.products;
    products.fetch(None).await;
    products.fetch(None).await;

    let state = products.state();
    assert_eq!(state.data.len(), 1);
    let error = state.error.unwrap();
    assert_eq!(error.status, Some(500));
    assert_eq!(error.message, "db offline");
}

#[tokio::test]
async fn test_invalid_product_id_skips_request() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend.server)
        .await;

    backend.context.admin.product_details.fetch(ProductId::new(0)).await;
    backend.context.admin.prices.fetch(ProductId::new(-1)).await;
    assert!(backend.context.admin.product_details.store().data().is_none());
}

#[tokio::test]
async fn test_product_mutation_failure_returns_none() {
    let backend = TestBackend::start().await;
    Mock::given(method("PATCH"))
        .and(path("/products/9/activate"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "Slug em uso"})))
        .mount(&backend.server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/products/1/deactivate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(1, "Caneca", false)))
        .mount(&backend.server)
        .await;

    let mutations = &backend.context.admin.product_mutations;
    assert!(mutations.activate(ProductId::new(9)).await.is_none());
    let error = mutations.tracker().error().unwrap();
    assert_eq!(error.status, Some(409));
    assert_eq!(error.message, "Slug em uso");

    let product = mutations.deactivate(ProductId::new(1)).await.unwrap();
    assert_eq!(product.status(), ProductStatus::Inactive);
    assert!(mutations.tracker().error().is_none());
    assert!(!mutations.tracker().is_loading());
}

#[tokio::test]
async fn test_product_create_sends_normalized_payload() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .and(body_partial_json(json!({
            "nomeProduct": "Caneca Coração",
            "slugProduct": "caneca-coracao",
            "initialStock": 4,
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(product_json(7, "Caneca Coração", true)),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let payload = ProductPayload {
        name: "  Caneca   Coração ".to_string(),
        slug: String::new(),
        description: String::new(),
        image_url: String::new(),
        category: "canecas".to_string(),
        active: true,
        initial_stock: Some(4),
    };
    let product = backend
        .context
        .admin
        .product_mutations
        .create(&payload)
        .await
        .unwrap();
    assert_eq!(product.id, ProductId::new(7));
}

#[tokio::test]
async fn test_invalid_product_form_never_reaches_backend() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&backend.server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend.server)
        .await;

    let payload = ProductPayload {
        name: "Caneca".to_string(),
        slug: "Caneca Azul".to_string(),
        description: String::new(),
        image_url: String::new(),
        category: String::new(),
        active: true,
        initial_stock: None,
    };
    let mutations = &backend.context.admin.product_mutations;
    assert!(mutations.create(&payload).await.is_none());
    assert_eq!(mutations.tracker().error().unwrap().status, Some(400));

    let payload = ProductPayload {
        slug: "caneca".to_string(),
        image_url: "cdn/caneca.png".to_string(),
        ..payload
    };
    assert!(mutations.update(ProductId::new(1), &payload).await.is_none());
    let error = mutations.tracker().error().unwrap();
    assert!(error.message.contains("Image URL"));
    assert!(!mutations.tracker().is_loading());
}

// =============================================================================
// Prices and inventory
// =============================================================================

#[tokio::test]
async fn test_price_history_loads_list_and_current() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/prices/product/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            price_json(10, 4, 2990),
            price_json(11, 4, 3490),
        ])))
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prices/product/4/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(price_json(11, 4, 3490)))
        .mount(&backend.server)
        .await;

    let prices = &backend.context.admin.prices;
    prices.fetch(ProductId::new(4)).await;
    let history = prices.store().data();
    assert_eq!(history.prices.len(), 2);
    assert_eq!(history.current.unwrap().amount_in_cents, 3490);
}

#[tokio::test]
async fn test_inventory_filters_pick_endpoint() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/inventory/low-stock/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([inventory_json(1, 2, 3)])))
        .expect(1)
        .mount(&backend.server)
        .await;

    let filters = InventoryFilters {
        with_stock_only: true,
        low_stock_threshold: Some(5),
    };
    backend.context.admin.inventory.fetch(Some(filters)).await;
    assert_eq!(backend.context.admin.inventory.store().data().len(), 1);
}

// =============================================================================
// Orders and users
// =============================================================================

#[tokio::test]
async fn test_order_details_join_order_and_items() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json(
            12,
            3,
            "paid",
            5980,
            "2025-03-01T10:00:00Z",
        )))
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/order-items/order/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "idItems": 1,
            "orderId": 12,
            "productId": 4,
            "qtyItems": 2,
            "unitAmount": 2990,
            "subtotalAmount": 5980,
        }])))
        .mount(&backend.server)
        .await;

    let details = &backend.context.admin.order_details;
    details.fetch(OrderId::new(12)).await;
    let detail = details.store().data();
    assert_eq!(detail.order.unwrap().status, OrderStatus::Paid);
    assert_eq!(detail.items.len(), 1);
}

#[tokio::test]
async fn test_order_status_update_uses_query_parameter() {
    let backend = TestBackend::start().await;
    Mock::given(method("PATCH"))
        .and(path("/orders/12/status"))
        .and(query_param("status", "picked_up"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json(
            12,
            3,
            "picked_up",
            5980,
            "2025-03-01T10:00:00Z",
        )))
        .expect(1)
        .mount(&backend.server)
        .await;

    let order = backend
        .context
        .admin
        .order_mutations
        .update_status(OrderId::new(12), OrderStatus::PickedUp)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::PickedUp);
}

#[tokio::test]
async fn test_orders_with_unrecognized_status_still_load() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            order_json(1, 3, "paid", 1000, "2025-03-01T10:00:00Z"),
            order_json(2, 3, "refunded", 2500, "2025-03-02T10:00:00Z"),
        ])))
        .mount(&backend.server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend.server)
        .await;

    let orders = &backend.context.admin.orders;
    orders.fetch(None).await;
    let statuses: Vec<_> = orders.filtered().iter().map(|o| o.status).collect();
    assert_eq!(statuses.len(), 2);
    assert!(statuses.contains(&OrderStatus::Paid));
    assert!(statuses.contains(&OrderStatus::Unknown));

    let mutations = &backend.context.admin.order_mutations;
    assert!(
        mutations
            .update_status(OrderId::new(2), OrderStatus::Unknown)
            .await
            .is_none()
    );
    assert_eq!(mutations.tracker().error().unwrap().status, Some(400));
}

#[tokio::test]
async fn test_users_forward_search_and_role() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("search", "ana"))
        .and(query_param("role", "admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_json(1, "Ana Souza", "admin", Some("ana@trinket.store")),
        ])))
        .expect(1)
        .mount(&backend.server)
        .await;

    let users = &backend.context.admin.users;
    users
        .fetch(Some(UserFilters {
            search: " ana ".to_string(),
            role: Choice::Only(UserRole::Admin),
            ..UserFilters::default()
        }))
        .await;
    assert_eq!(users.filtered().len(), 1);
}

#[tokio::test]
async fn test_user_creation_checks_the_form_first() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_partial_json(json!({
            "email": "carla@mail.com",
            "name": "Carla Dias",
            "role": "customer",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "accessToken": "new-user-token",
            "user": user_json(8, "Carla Dias", "customer", Some("carla@mail.com")),
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let mutations = &backend.context.admin.user_mutations;
    let invalid = SignUpRequest {
        email: "carla.mail.com".to_string(),
        password: "s3cret".to_string(),
        name: "Carla Dias".to_string(),
        role: UserRole::Customer,
    };
    assert!(mutations.create(&invalid).await.is_none());
    assert_eq!(mutations.tracker().error().unwrap().status, Some(400));

    let valid = SignUpRequest {
        email: " Carla@Mail.com".to_string(),
        name: "Carla   Dias ".to_string(),
        ..invalid
    };
    let user = mutations.create(&valid).await.unwrap();
    assert_eq!(user.id, UserId::new(8));
    assert!(mutations.tracker().error().is_none());
}
