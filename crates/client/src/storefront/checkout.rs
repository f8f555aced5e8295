//! PIX checkout from the active cart.

use thiserror::Error;
use tracing::{info, instrument, warn};
use trinket_store_core::{CurrencyCode, UserId};

use super::cart::CartItem;
use crate::error::ApiError;
use crate::http::BackendClient;
use crate::store::{ResourceStore, StoreKey};
use crate::types::{Order, OrderItemPayload, PixCheckoutRequest, PixCheckoutResponse};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckoutError {
    #[error("There are no items in the cart to create an order")]
    EmptyCart,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What the buyer is paying for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutInput {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub total_amount_in_cents: i64,
    pub description: Option<String>,
}

/// Build the checkout body.
///
/// Each line is charged at least one unit and at most its stock (or one
/// unit when stock is unknown).
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` when there are no items.
pub fn build_pix_request(input: &CheckoutInput) -> Result<PixCheckoutRequest, CheckoutError> {
    if input.items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let items = input
        .items
        .iter()
        .map(|item| {
            let unit_amount = item.price_in_cents.unwrap_or(0);
            let quantity = item.quantity.max(1).min(item.available_stock.max(1));
            OrderItemPayload {
                product_id: item.product_id,
                quantity,
                unit_amount,
                subtotal_amount: unit_amount.saturating_mul(quantity),
            }
        })
        .collect();

    Ok(PixCheckoutRequest {
        user_id: input.user_id,
        total_amount_in_cents: input.total_amount_in_cents.max(0),
        currency: CurrencyCode::BRL.code().to_string(),
        description: input.description.clone(),
        items,
    })
}

/// Checkout flow; remembers the last order it created or refreshed.
#[derive(Debug)]
pub struct Checkout {
    client: BackendClient,
    store: ResourceStore<Option<Order>>,
}

impl Checkout {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::Checkout),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<Option<Order>> {
        &self.store
    }

    #[must_use]
    pub fn last_order(&self) -> Option<Order> {
        self.store.data()
    }

    /// Create a pending order and its PIX charge.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` before any request when there are
    /// no items, or the recorded `ApiError` when the backend call fails.
    #[instrument(skip(self, input), fields(user_id = %input.user_id, lines = input.items.len()))]
    pub async fn create_order_from_cart(
        &self,
        input: &CheckoutInput,
    ) -> Result<PixCheckoutResponse, CheckoutError> {
        let request = build_pix_request(input)?;
        let response = self
            .store
            .track(
                self.client.post::<_, PixCheckoutResponse>("/checkout/pix", &request),
                |last, response| *last = Some(response.order.clone()),
            )
            .await
            .inspect_err(|error| warn!(%error, "Checkout failed"))?;

        info!(
            order_id = %response.order.id,
            payment_id = %response.pix.payment_id,
            "Created PIX order"
        );
        Ok(response)
    }

    /// Re-read a PIX charge and its order.
    ///
    /// # Errors
    ///
    /// Returns the recorded `ApiError` when the backend call fails.
    #[instrument(skip(self))]
    pub async fn refresh_pix_payment(
        &self,
        payment_id: &str,
    ) -> Result<PixCheckoutResponse, ApiError> {
        let endpoint = format!("/checkout/pix/{}/refresh", urlencoding::encode(payment_id));
        self.store
            .track(
                self.client.get::<PixCheckoutResponse>(&endpoint),
                |last, response| *last = Some(response.order.clone()),
            )
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use trinket_store_core::ProductId;

    fn line(id: i64, price: Option<i64>, quantity: i64, stock: i64) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            slug: format!("item-{id}"),
            name: format!("Item {id}"),
            image: None,
            price_in_cents: price,
            quantity,
            available_stock: stock,
        }
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let input = CheckoutInput {
            user_id: UserId::new(1),
            items: Vec::new(),
            total_amount_in_cents: 0,
            description: None,
        };
        assert_eq!(build_pix_request(&input), Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_line_quantities_and_subtotals() {
        let input = CheckoutInput {
            user_id: UserId::new(3),
            items: vec![
                line(1, Some(2590), 2, 5),
                line(2, Some(1000), 0, 0),
                line(3, None, 9, 4),
            ],
            total_amount_in_cents: -10,
            description: Some("Pedido".to_string()),
        };
        let request = build_pix_request(&input).unwrap();
        assert_eq!(request.total_amount_in_cents, 0);
        assert_eq!(request.currency, "BRL");

        let lines: Vec<(i64, i64, i64)> = request
            .items
            .iter()
            .map(|i| (i.quantity, i.unit_amount, i.subtotal_amount))
            .collect();
        assert_eq!(lines, vec![(2, 2590, 5180), (1, 1000, 1000), (4, 0, 0)]);
    }

    #[test]
    fn test_line_subtotal_saturates() {
        let input = CheckoutInput {
            user_id: UserId::new(3),
            items: vec![line(1, Some(i64::MAX), 3, 3)],
            total_amount_in_cents: i64::MAX,
            description: None,
        };
        let request = build_pix_request(&input).unwrap();
        assert_eq!(request.items[0].subtotal_amount, i64::MAX);
    }

    #[test]
    fn test_request_wire_format() {
        let input = CheckoutInput {
            user_id: UserId::new(3),
            items: vec![line(1, Some(500), 1, 1)],
            total_amount_in_cents: 500,
            description: None,
        };
        let body = serde_json::to_value(build_pix_request(&input).unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "userId": 3,
                "totalAmountInCents": 500,
                "currency": "BRL",
                "items": [{"productId": 1, "qtyItems": 1, "unitAmount": 500, "subtotalAmount": 500}]
            })
        );
    }
}
