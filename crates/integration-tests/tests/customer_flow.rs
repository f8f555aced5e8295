//! Checkout, order history and payment polling against a mocked backend.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use trinket_store_client::storefront::{
    CheckoutError, CheckoutInput, ORDERS_UNAVAILABLE, OrderPoller, StorefrontProduct,
};
use trinket_store_core::{OrderId, OrderStatus, ProductId, UserId, UserRole};
use trinket_store_integration_tests::{TestBackend, order_json, product_json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn product(id: i64, price: i64) -> StorefrontProduct {
    StorefrontProduct {
        id: ProductId::new(id),
        slug: format!("item-{id}"),
        name: format!("Item {id}"),
        description: None,
        image: None,
        category: None,
        price_in_cents: Some(price),
    }
}

fn pix_response(order_id: i64, total: i64) -> serde_json::Value {
    json!({
        "order": order_json(order_id, 42, "pending", total, "2025-03-01T10:00:00Z"),
        "pix": {
            "paymentId": "pay_123",
            "status": "pending",
            "qrCode": "00020126580014br.gov.bcb.pix",
            "expiresAt": "2025-03-01T10:30:00Z",
        },
    })
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_empty_cart_never_reaches_backend() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .and(path("/checkout/pix"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&backend.server)
        .await;

    let input = CheckoutInput {
        user_id: UserId::new(42),
        items: Vec::new(),
        total_amount_in_cents: 0,
        description: None,
    };
    let result = backend.context.storefront.checkout.create_order_from_cart(&input).await;
    assert_eq!(result.unwrap_err(), CheckoutError::EmptyCart);
}

#[tokio::test]
async fn test_checkout_sends_cart_lines() {
    let backend = TestBackend::start().await;
    backend.sign_in(42, UserRole::Customer).await;
    Mock::given(method("POST"))
        .and(path("/checkout/pix"))
        .and(body_partial_json(json!({
            "userId": 42,
            "totalAmountInCents": 8970,
            "currency": "BRL",
            "items": [
                {"productId": 1, "qtyItems": 2, "unitAmount": 2990, "subtotalAmount": 5980},
                {"productId": 2, "qtyItems": 1, "unitAmount": 2990, "subtotalAmount": 2990},
            ],
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(pix_response(77, 8970)))
        .expect(1)
        .mount(&backend.server)
        .await;

    let storefront = &backend.context.storefront;
    storefront.cart.add_item(&product(1, 2990), 2, 5).unwrap();
    storefront.cart.add_item(&product(2, 2990), 1, 5).unwrap();
    let state = storefront.cart.snapshot();
    let input = CheckoutInput {
        user_id: UserId::new(42),
        total_amount_in_cents: state.total_amount_in_cents(),
        items: state.items,
        description: Some("Pedido Trinket".to_string()),
    };

    let response = storefront.checkout.create_order_from_cart(&input).await.unwrap();
    assert_eq!(response.order.id, OrderId::new(77));
    assert_eq!(response.pix.payment_id, "pay_123");
    assert_eq!(storefront.checkout.last_order().unwrap().status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_checkout_failure_is_returned_and_recorded() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .and(path("/checkout/pix"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Estoque insuficiente"})),
        )
        .mount(&backend.server)
        .await;

    let storefront = &backend.context.storefront;
    storefront.cart.add_item(&product(1, 2990), 1, 1).unwrap();
    let state = storefront.cart.snapshot();
    let input = CheckoutInput {
        user_id: UserId::new(42),
        total_amount_in_cents: state.total_amount_in_cents(),
        items: state.items,
        description: None,
    };

    let Err(CheckoutError::Api(error)) = storefront.checkout.create_order_from_cart(&input).await
    else {
        panic!("checkout should fail with the backend error");
    };
    assert_eq!(error.status, Some(400));
    assert_eq!(error.message, "Estoque insuficiente");
    assert!(storefront.checkout.last_order().is_none());
}

#[tokio::test]
async fn test_refresh_pix_payment() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/checkout/pix/pay_123/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pix_response(77, 2990)))
        .expect(1)
        .mount(&backend.server)
        .await;

    let response = backend
        .context
        .storefront
        .checkout
        .refresh_pix_payment("pay_123")
        .await
        .unwrap();
    assert_eq!(response.pix.qr_code.as_deref(), Some("00020126580014br.gov.bcb.pix"));
}

// =============================================================================
// Order history
// =============================================================================

#[tokio::test]
async fn test_history_is_newest_first_and_preloads_products() {
    let backend = TestBackend::start().await;
    let mut older = order_json(1, 42, "paid", 2990, "2025-02-01T10:00:00Z");
    older["items"] = json!([{
        "idItems": 1,
        "orderId": 1,
        "productId": 5,
        "qtyItems": 1,
        "unitAmount": 2990,
        "subtotalAmount": 2990,
    }]);
    Mock::given(method("GET"))
        .and(path("/orders/user/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            older,
            order_json(2, 42, "pending", 5980, "2025-03-01T10:00:00Z"),
        ])))
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(5, "Caneca", true)))
        .expect(1)
        .mount(&backend.server)
        .await;

    let orders = &backend.context.storefront.orders;
    let list = orders.fetch_orders(UserId::new(42)).await;
    let ids: Vec<_> = list.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![OrderId::new(2), OrderId::new(1)]);
    assert_eq!(orders.selected_order().unwrap().id, OrderId::new(2));

    orders.select_order(OrderId::new(1)).await;
    orders.select_order(OrderId::new(1)).await;
    let history = orders.history();
    assert_eq!(history.highlighted, Some(OrderId::new(1)));
    assert!(history.products.contains_key(&ProductId::new(5)));
}

#[tokio::test]
async fn test_history_failure_uses_fixed_message() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/user/42"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend.server)
        .await;

    let orders = &backend.context.storefront.orders;
    assert!(orders.fetch_orders(UserId::new(42)).await.is_empty());
    assert_eq!(orders.error_message(), Some(ORDERS_UNAVAILABLE));
}

#[tokio::test]
async fn test_cancel_removes_order_from_history() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/user/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            order_json(2, 42, "pending", 5980, "2025-03-01T10:00:00Z"),
        ])))
        .mount(&backend.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/orders/2/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&backend.server)
        .await;

    let orders = &backend.context.storefront.orders;
    orders.fetch_orders(UserId::new(42)).await;
    assert!(orders.cancel_order(OrderId::new(2)).await);
    assert!(orders.history().orders.is_empty());
    assert!(orders.selected_order().is_none());
}

// =============================================================================
// Polling
// =============================================================================

#[tokio::test]
async fn test_poller_stops_once_order_settles() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json(
            9,
            42,
            "pending",
            2990,
            "2025-03-01T10:00:00Z",
        )))
        .up_to_n_times(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json(
            9,
            42,
            "paid",
            2990,
            "2025-03-01T10:00:00Z",
        )))
        .mount(&backend.server)
        .await;

    let poller =
        OrderPoller::with_interval(backend.context.client().clone(), Duration::from_millis(20));
    let (tx, mut rx) = mpsc::unbounded_channel();
    assert!(poller.start(OrderId::new(9), OrderStatus::Pending, move |order| {
        let _ = tx.send(order.status);
    }));

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!((first, second), (OrderStatus::Pending, OrderStatus::Paid));
    // The task drops its sender once the order settles.
    assert!(rx.recv().await.is_none());
    assert!(poller.last_update().is_some());
    for _ in 0..50 {
        if !poller.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!poller.is_running());
}

#[tokio::test]
async fn test_poller_ignores_settled_orders() {
    let backend = TestBackend::start().await;
    let poller = &backend.context.storefront.poller;
    assert!(!poller.start(OrderId::new(9), OrderStatus::Paid, |_| {}));
    assert!(!poller.start(OrderId::new(0), OrderStatus::Pending, |_| {}));
    assert!(!poller.is_running());
}
