//! Order line mutations.

use tracing::instrument;
use trinket_store_core::{OrderId, OrderItemId};

use crate::http::BackendClient;
use crate::store::{MutationTracker, StoreKey};
use crate::types::{OrderItem, OrderItemPayload, OrderItemUpdate};

/// Order line mutations. Each returns `None` on failure.
#[derive(Debug)]
pub struct OrderItemMutations {
    client: BackendClient,
    tracker: MutationTracker,
}

impl OrderItemMutations {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            tracker: MutationTracker::new(StoreKey::OrderItemMutations),
        }
    }

    #[must_use]
    pub const fn tracker(&self) -> &MutationTracker {
        &self.tracker
    }

    #[instrument(skip(self))]
    pub async fn add(&self, order_id: OrderId, payload: &OrderItemPayload) -> Option<OrderItem> {
        let endpoint = format!("/order-items/order/{order_id}");
        self.tracker.handle(self.client.post(&endpoint, payload)).await
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: OrderItemId, update: &OrderItemUpdate) -> Option<OrderItem> {
        let endpoint = format!("/order-items/{id}");
        self.tracker.handle(self.client.put(&endpoint, update)).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: OrderItemId) -> Option<()> {
        let endpoint = format!("/order-items/{id}");
        self.tracker.handle(self.client.delete(&endpoint)).await
    }

    /// Remove every line of an order.
    #[instrument(skip(self))]
    pub async fn clear(&self, order_id: OrderId) -> Option<()> {
        let endpoint = format!("/order-items/order/{order_id}");
        self.tracker.handle(self.client.delete(&endpoint)).await
    }
}
