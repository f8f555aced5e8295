//! Inventory list, per-product record and stock mutations.

use tracing::{debug, instrument};
use trinket_store_core::{InventoryId, ProductId};

use crate::http::BackendClient;
use crate::store::{MutationTracker, ResourceStore, StoreKey};
use crate::types::{CreateInventoryPayload, InventoryRecord, UpdateInventoryPayload};

/// Server-side selection for the inventory list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryFilters {
    pub with_stock_only: bool,
    /// Only records at or below this quantity. Takes precedence over
    /// `with_stock_only`; zero means unset.
    pub low_stock_threshold: Option<u32>,
}

impl InventoryFilters {
    /// Endpoint serving this selection.
    #[must_use]
    pub fn endpoint(&self) -> String {
        match self.low_stock_threshold {
            Some(threshold) if threshold > 0 => format!("/inventory/low-stock/{threshold}"),
            _ if self.with_stock_only => "/inventory/in-stock".to_string(),
            _ => "/inventory".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct InventoryList {
    client: BackendClient,
    store: ResourceStore<Vec<InventoryRecord>, InventoryFilters>,
}

impl InventoryList {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::InventoryList),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<Vec<InventoryRecord>, InventoryFilters> {
        &self.store
    }

    /// Fetch the list from the endpoint the filters resolve to.
    #[instrument(skip(self))]
    pub async fn fetch(&self, filters: Option<InventoryFilters>) {
        if let Some(filters) = filters {
            self.store.set_filters(filters);
        }
        let endpoint = self.store.filters().endpoint();
        if let Err(error) = self.store.load(self.client.get(&endpoint)).await {
            debug!(%error, endpoint = %endpoint, "Inventory fetch failed");
        }
    }
}

/// `GET /inventory/product/{id}`.
#[derive(Debug)]
pub struct InventoryByProduct {
    client: BackendClient,
    store: ResourceStore<Option<InventoryRecord>>,
}

impl InventoryByProduct {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::InventoryByProduct),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<Option<InventoryRecord>> {
        &self.store
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, product_id: ProductId) {
        if !product_id.is_valid() {
            return;
        }
        let endpoint = format!("/inventory/product/{product_id}");
        if let Err(error) = self.store.load(self.client.get(&endpoint)).await {
            debug!(%error, "Inventory record fetch failed");
        }
    }

    pub fn reset(&self) {
        self.store.reset();
    }
}

/// Inventory mutations. Each returns `None` on failure.
#[derive(Debug)]
pub struct InventoryMutations {
    client: BackendClient,
    tracker: MutationTracker,
}

impl InventoryMutations {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            tracker: MutationTracker::new(StoreKey::InventoryMutations),
        }
    }

    #[must_use]
    pub const fn tracker(&self) -> &MutationTracker {
        &self.tracker
    }

    #[instrument(skip(self))]
    pub async fn create(&self, payload: &CreateInventoryPayload) -> Option<InventoryRecord> {
        self.tracker.handle(self.client.post("/inventory", payload)).await
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: InventoryId,
        payload: &UpdateInventoryPayload,
    ) -> Option<InventoryRecord> {
        let endpoint = format!("/inventory/{id}");
        self.tracker.handle(self.client.put(&endpoint, payload)).await
    }

    #[instrument(skip(self))]
    pub async fn add_stock(&self, id: InventoryId, quantity: u32) -> Option<InventoryRecord> {
        let endpoint = format!("/inventory/{id}/add-stock/{quantity}");
        self.tracker.handle(self.client.patch(&endpoint)).await
    }

    #[instrument(skip(self))]
    pub async fn remove_stock(&self, id: InventoryId, quantity: u32) -> Option<InventoryRecord> {
        let endpoint = format!("/inventory/{id}/remove-stock/{quantity}");
        self.tracker.handle(self.client.patch(&endpoint)).await
    }
}
