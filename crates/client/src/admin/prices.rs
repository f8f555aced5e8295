//! Per-product price history and price mutations.

use tracing::{debug, instrument};
use trinket_store_core::{PriceId, ProductId};

use crate::error::ApiError;
use crate::http::BackendClient;
use crate::store::{MutationTracker, ResourceStore, StoreKey};
use crate::types::{PricePayload, PriceUpdate, ProductPrice};

/// Every price of a product plus its current one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceHistory {
    pub prices: Vec<ProductPrice>,
    pub current: Option<ProductPrice>,
}

#[derive(Debug)]
pub struct ProductPrices {
    client: BackendClient,
    store: ResourceStore<PriceHistory>,
}

impl ProductPrices {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::ProductPrices),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<PriceHistory> {
        &self.store
    }

    /// Fetch the price list and the current price concurrently.
    #[instrument(skip(self))]
    pub async fn fetch(&self, product_id: ProductId) {
        if !product_id.is_valid() {
            return;
        }
        let list_endpoint = format!("/prices/product/{product_id}");
        let current_endpoint = format!("/prices/product/{product_id}/current");
        let request = async {
            let (prices, current) = tokio::try_join!(
                self.client.get::<Vec<ProductPrice>>(&list_endpoint),
                self.client.get::<Option<ProductPrice>>(&current_endpoint),
            )?;
            Ok::<_, ApiError>(PriceHistory { prices, current })
        };
        if let Err(error) = self.store.load(request).await {
            debug!(%error, "Price history fetch failed");
        }
    }

    pub fn reset(&self) {
        self.store.reset();
    }
}

/// Price mutations. Each returns `None` on failure.
#[derive(Debug)]
pub struct PriceMutations {
    client: BackendClient,
    tracker: MutationTracker,
}

impl PriceMutations {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            tracker: MutationTracker::new(StoreKey::PriceMutations),
        }
    }

    #[must_use]
    pub const fn tracker(&self) -> &MutationTracker {
        &self.tracker
    }

    #[instrument(skip(self, payload), fields(product_id = %payload.product_id))]
    pub async fn create(&self, payload: &PricePayload) -> Option<ProductPrice> {
        self.tracker.handle(self.client.post("/prices", payload)).await
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, id: PriceId, update: &PriceUpdate) -> Option<ProductPrice> {
        let endpoint = format!("/prices/{id}");
        self.tracker.handle(self.client.put(&endpoint, update)).await
    }

    #[instrument(skip(self))]
    pub async fn activate(&self, id: PriceId) -> Option<ProductPrice> {
        let endpoint = format!("/prices/{id}/activate");
        self.tracker.handle(self.client.patch(&endpoint)).await
    }

    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: PriceId) -> Option<ProductPrice> {
        let endpoint = format!("/prices/{id}/deactivate");
        self.tracker.handle(self.client.patch(&endpoint)).await
    }
}
