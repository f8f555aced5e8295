//! Order list, details and mutations.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use trinket_store_core::{OrderId, OrderStatus, UserId};

use crate::error::ApiError;
use crate::filter::{Choice, ListFilter, contains_ci};
use crate::http::{BackendClient, RequestOptions};
use crate::store::{MutationTracker, ResourceState, ResourceStore, StoreKey};
use crate::types::{CreateOrderPayload, Order, OrderItem};

/// Client-side filters for the order list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilters {
    pub status: Choice<OrderStatus>,
    /// Substring of the checkout reference.
    pub checkout_id: String,
    /// Substring of the payment reference.
    pub payment_intent: String,
    pub user_id: Option<UserId>,
}

impl ListFilter<Order> for OrderFilters {
    fn matches(&self, order: &Order) -> bool {
        self.status.admits(&order.status)
            && contains_ci(order.checkout_id.as_deref().unwrap_or_default(), &self.checkout_id)
            && contains_ci(
                order.payment_intent.as_deref().unwrap_or_default(),
                &self.payment_intent,
            )
            && self.user_id.is_none_or(|id| id == order.user_id)
    }
}

/// `GET /orders` with client-side filtering.
#[derive(Debug)]
pub struct OrdersList {
    client: BackendClient,
    store: ResourceStore<Vec<Order>, OrderFilters>,
}

impl OrdersList {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::OrdersList),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<Vec<Order>, OrderFilters> {
        &self.store
    }

    #[must_use]
    pub fn state(&self) -> ResourceState<Vec<Order>, OrderFilters> {
        self.store.snapshot()
    }

    #[instrument(skip(self, filters))]
    pub async fn fetch(&self, filters: Option<OrderFilters>) {
        if let Some(filters) = filters {
            self.store.set_filters(filters);
        }
        if let Err(error) = self.store.load(self.client.get("/orders")).await {
            debug!(%error, "Orders fetch failed");
        }
    }

    pub fn set_filters(&self, filters: OrderFilters) {
        self.store.set_filters(filters);
    }

    #[must_use]
    pub fn filtered(&self) -> Vec<Order> {
        let state = self.store.snapshot();
        state.filters.apply(&state.data)
    }
}

/// An order together with its lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDetail {
    pub order: Option<Order>,
    pub items: Vec<OrderItem>,
}

/// `GET /orders/{id}` and `GET /order-items/order/{id}`, fetched together.
#[derive(Debug)]
pub struct OrderDetails {
    client: BackendClient,
    store: ResourceStore<OrderDetail>,
}

impl OrderDetails {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::OrderDetails),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<OrderDetail> {
        &self.store
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, id: OrderId) {
        if !id.is_valid() {
            return;
        }
        let order_endpoint = format!("/orders/{id}");
        let items_endpoint = format!("/order-items/order/{id}");
        let request = async {
            let (order, items) = tokio::try_join!(
                self.client.get::<Order>(&order_endpoint),
                self.client.get::<Vec<OrderItem>>(&items_endpoint),
            )?;
            Ok::<_, ApiError>(OrderDetail {
                order: Some(order),
                items,
            })
        };
        if let Err(error) = self.store.load(request).await {
            debug!(%error, "Order details fetch failed");
        }
    }

    pub fn reset(&self) {
        self.store.reset();
    }
}

/// Order mutations. Each returns `None` on failure.
#[derive(Debug)]
pub struct OrderMutations {
    client: BackendClient,
    tracker: MutationTracker,
}

impl OrderMutations {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            tracker: MutationTracker::new(StoreKey::OrderMutations),
        }
    }

    #[must_use]
    pub const fn tracker(&self) -> &MutationTracker {
        &self.tracker
    }

    #[instrument(skip(self, payload), fields(user_id = %payload.user_id))]
    pub async fn create(&self, payload: &CreateOrderPayload) -> Option<Order> {
        self.tracker.handle(self.client.post("/orders", payload)).await
    }

    /// `PATCH /orders/{id}/status?status=<status>`. `Unknown` is refused
    /// locally with a 400.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Option<Order> {
        let endpoint = format!("/orders/{id}/status");
        self.tracker
            .handle(async {
                if status == OrderStatus::Unknown {
                    return Err(ApiError::validation("Pick a known order status."));
                }
                let options = RequestOptions::new(Method::PATCH).query("status", status.as_str());
                self.client.call(&endpoint, options).await
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(
        id: i64,
        user: i64,
        status: OrderStatus,
        checkout: &str,
        payment: Option<&str>,
    ) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(user),
            status,
            total_in_cents: 1000,
            currency: Some("BRL".to_string()),
            checkout_id: Some(checkout.to_string()),
            payment_intent: payment.map(ToString::to_string),
            pickup_qr_token: None,
            pix_qr_code_base64: None,
            pix_expires_at: None,
            created_at: None,
            items: None,
            user_name: None,
        }
    }

    fn orders() -> Vec<Order> {
        vec![
            order(1, 10, OrderStatus::Pending, "PIX-AB12", Some("998877")),
            order(2, 10, OrderStatus::Paid, "PIX-CD34", Some("112233")),
            order(3, 11, OrderStatus::Paid, "PIX-ab99", None),
        ]
    }

    #[test]
    fn test_status_filter() {
        let filters = OrderFilters {
            status: Choice::Only(OrderStatus::Paid),
            ..OrderFilters::default()
        };
        assert_eq!(filters.apply(&orders()).len(), 2);
    }

    #[test]
    fn test_reference_filters_are_substrings() {
        let filters = OrderFilters {
            checkout_id: "ab".to_string(),
            ..OrderFilters::default()
        };
        let ids: Vec<_> = filters.apply(&orders()).iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![OrderId::new(1), OrderId::new(3)]);

        let filters = OrderFilters {
            payment_intent: "2233".to_string(),
            ..OrderFilters::default()
        };
        assert_eq!(filters.apply(&orders()).len(), 1);
    }

    #[test]
    fn test_user_filter_and_idempotence() {
        let filters = OrderFilters {
            user_id: Some(UserId::new(10)),
            ..OrderFilters::default()
        };
        let once = filters.apply(&orders());
        assert_eq!(once.len(), 2);
        assert_eq!(filters.apply(&once), once);
    }
}
