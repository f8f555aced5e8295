//! A customer's order history.

use std::collections::HashMap;

use futures::future::join_all;
use reqwest::Method;
use tracing::{debug, instrument, warn};
use trinket_store_core::{OrderId, ProductId, UserId};

use crate::error::ApiError;
use crate::http::{BackendClient, RequestOptions};
use crate::store::{ResourceStore, StoreKey};
use crate::types::{Order, Product};

/// Shown when the history cannot be loaded.
pub const ORDERS_UNAVAILABLE: &str = "We couldn't load your orders right now.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderHistory {
    /// Newest first.
    pub orders: Vec<Order>,
    pub highlighted: Option<OrderId>,
    /// Products referenced by order lines, loaded on demand.
    pub products: HashMap<ProductId, Product>,
}

impl OrderHistory {
    /// The highlighted order, or the newest one.
    #[must_use]
    pub fn selected(&self) -> Option<&Order> {
        self.highlighted
            .and_then(|id| self.orders.iter().find(|order| order.id == id))
            .or_else(|| self.orders.first())
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by_key(|order| std::cmp::Reverse(order.created_at()));
}

#[derive(Debug)]
pub struct OrdersManager {
    client: BackendClient,
    store: ResourceStore<OrderHistory>,
}

impl OrdersManager {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::CustomerOrders),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<OrderHistory> {
        &self.store
    }

    #[must_use]
    pub fn history(&self) -> OrderHistory {
        self.store.data()
    }

    #[must_use]
    pub fn selected_order(&self) -> Option<Order> {
        self.store.data().selected().cloned()
    }

    /// Message for the last failed fetch, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.store.error().map(|_| ORDERS_UNAVAILABLE)
    }

    /// Load a user's orders. Returns an empty list on failure.
    #[instrument(skip(self))]
    pub async fn fetch_orders(&self, user_id: UserId) -> Vec<Order> {
        let endpoint = format!("/orders/user/{user_id}");
        let request = async {
            let mut orders: Vec<Order> = self.client.get(&endpoint).await?;
            newest_first(&mut orders);
            Ok::<_, ApiError>(orders)
        };
        let result = self
            .store
            .track(request, |history, orders: &Vec<Order>| {
                history.orders.clone_from(orders);
                if history.highlighted.is_none() {
                    history.highlighted = orders.first().map(|order| order.id);
                }
            })
            .await;

        result.unwrap_or_else(|error| {
            warn!(%error, "Order history fetch failed");
            Vec::new()
        })
    }

    /// Load the products on an order's lines that are not cached yet.
    #[instrument(skip(self))]
    pub async fn preload_items(&self, order_id: OrderId) {
        let history = self.store.data();
        let Some(order) = history.orders.iter().find(|order| order.id == order_id) else {
            return;
        };
        let mut missing: Vec<ProductId> = order
            .items
            .iter()
            .flatten()
            .map(|item| item.product_id)
            .filter(|id| !history.products.contains_key(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();

        let fetches = missing.into_iter().map(|product_id| async move {
            let endpoint = format!("/products/{product_id}");
            let result = self
                .client
                .call::<Product>(&endpoint, RequestOptions::new(Method::GET).silent())
                .await;
            (product_id, result)
        });

        for (product_id, result) in join_all(fetches).await {
            match result {
                Ok(product) => self.store.update(|history| {
                    history.products.insert(product_id, product);
                }),
                Err(error) => warn!(%product_id, %error, "Product on order not found"),
            }
        }
    }

    /// Highlight an order and load its products.
    pub async fn select_order(&self, order_id: OrderId) {
        self.store.update(|history| history.highlighted = Some(order_id));
        self.preload_items(order_id).await;
    }

    /// Replace an order in the list, or append it when it is new.
    pub fn update_order_in_list(&self, order: Order) {
        self.store.update(|history| {
            match history.orders.iter_mut().find(|o| o.id == order.id) {
                Some(existing) => *existing = order,
                None => history.orders.push(order),
            }
        });
    }

    /// Cancel a pending order. Returns whether the backend accepted it.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> bool {
        let endpoint = format!("/orders/{order_id}/cancel");
        if let Err(error) = self.client.delete(&endpoint).await {
            warn!(%error, "Order cancellation failed");
            return false;
        }
        self.store.update(|history| {
            history.orders.retain(|order| order.id != order_id);
            if history.highlighted == Some(order_id) {
                history.highlighted = history.orders.first().map(|order| order.id);
            }
        });
        debug!("Order canceled");
        true
    }
}
