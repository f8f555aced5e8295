//! Per-product stock snapshots for the storefront.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, instrument};
use trinket_store_core::ProductId;

use super::cache::{CacheKey, CacheValue, StorefrontCache};
use crate::error::ApiError;
use crate::http::BackendClient;
use crate::store::StoreKey;
use crate::types::InventoryRecord;

/// Stock on hand for one product at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    pub product_id: ProductId,
    /// Never negative.
    pub qty_on_hand: i64,
    pub updated_at: DateTime<Utc>,
}

impl InventorySnapshot {
    #[must_use]
    pub fn new(product_id: ProductId, qty_on_hand: i64) -> Self {
        Self {
            product_id,
            qty_on_hand: qty_on_hand.max(0),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryState {
    pub snapshots: HashMap<ProductId, InventorySnapshot>,
    /// Products with a fetch in flight.
    pub loading: HashSet<ProductId>,
    pub error: Option<ApiError>,
}

impl InventoryState {
    #[must_use]
    pub fn is_loading(&self, product_id: ProductId) -> bool {
        self.loading.contains(&product_id)
    }
}

#[derive(Debug)]
pub struct StorefrontInventory {
    client: BackendClient,
    cache: StorefrontCache,
    state: watch::Sender<InventoryState>,
}

impl StorefrontInventory {
    #[must_use]
    pub fn new(client: BackendClient, cache: StorefrontCache) -> Self {
        Self {
            client,
            cache,
            state: watch::Sender::new(InventoryState::default()),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> InventoryState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<InventorySnapshot> {
        self.state.borrow().snapshots.get(&product_id).cloned()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<InventoryState> {
        self.state.subscribe()
    }

    /// Stock for a product, from cache unless `force` is set or the cached
    /// snapshot expired.
    ///
    /// # Errors
    ///
    /// Returns the normalized error after recording it in the state.
    #[instrument(skip(self), fields(store = %StoreKey::StorefrontInventory))]
    pub async fn fetch_for_product(
        &self,
        product_id: ProductId,
        force: bool,
    ) -> Result<InventorySnapshot, ApiError> {
        if !force
            && let Some(CacheValue::Inventory(snapshot)) =
                self.cache.get(&CacheKey::Inventory(product_id)).await
        {
            debug!("Cache hit for inventory");
            return Ok(snapshot);
        }

        self.state.send_modify(|state| {
            state.loading.insert(product_id);
            state.error = None;
        });

        let result = self
            .client
            .get::<InventoryRecord>(&format!("/inventory/product/{product_id}"))
            .await;

        match result {
            Ok(record) => {
                let snapshot = InventorySnapshot::new(record.product_id, record.qty_on_hand);
                self.store(product_id, snapshot.clone()).await;
                self.state.send_modify(|state| {
                    state.loading.remove(&product_id);
                });
                Ok(snapshot)
            }
            Err(error) => {
                self.state.send_modify(|state| {
                    state.loading.remove(&product_id);
                    state.error = Some(error.clone());
                });
                debug!(%error, "Inventory fetch failed");
                Err(error)
            }
        }
    }

    /// Record a known stock level, e.g. after a checkout.
    pub async fn set_snapshot(&self, product_id: ProductId, qty_on_hand: i64) -> InventorySnapshot {
        let snapshot = InventorySnapshot::new(product_id, qty_on_hand);
        self.store(product_id, snapshot.clone()).await;
        snapshot
    }

    async fn store(&self, product_id: ProductId, snapshot: InventorySnapshot) {
        self.cache
            .insert(CacheKey::Inventory(product_id), CacheValue::Inventory(snapshot.clone()))
            .await;
        self.state.send_modify(|state| {
            state.snapshots.insert(product_id, snapshot);
        });
    }
}
