//! Public catalog: active products joined with their current prices.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use trinket_store_core::ProductId;

use super::cache::{CacheKey, CacheValue, StorefrontCache};
use crate::error::ApiError;
use crate::http::BackendClient;
use crate::store::{ResourceStore, StoreKey};
use crate::types::{Product, ProductPrice};

/// A product as shown in the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontProduct {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Current price; `None` when the product has no current price.
    #[serde(default)]
    pub price_in_cents: Option<i64>,
}

/// Join products with the current price of each. Non-current prices are
/// ignored; the last current price listed for a product wins.
#[must_use]
pub fn join_catalog(products: Vec<Product>, prices: &[ProductPrice]) -> Vec<StorefrontProduct> {
    let current: HashMap<ProductId, i64> = prices
        .iter()
        .filter(|price| price.current)
        .map(|price| (price.product_id, price.amount_in_cents))
        .collect();

    products
        .into_iter()
        .map(|product| StorefrontProduct {
            price_in_cents: current.get(&product.id).copied(),
            id: product.id,
            slug: product.slug,
            name: product.name,
            description: product.description,
            image: product.image_url,
            category: product.category,
        })
        .collect()
}

/// Catalog view backed by the storefront cache.
#[derive(Debug)]
pub struct Catalog {
    client: BackendClient,
    cache: StorefrontCache,
    store: ResourceStore<Vec<StorefrontProduct>>,
}

impl Catalog {
    #[must_use]
    pub fn new(client: BackendClient, cache: StorefrontCache) -> Self {
        Self {
            client,
            cache,
            store: ResourceStore::new(StoreKey::Catalog),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<Vec<StorefrontProduct>> {
        &self.store
    }

    /// The catalog, from cache unless `force` is set or the cache expired.
    ///
    /// On failure the error is recorded and the last known catalog is
    /// returned.
    #[instrument(skip(self))]
    pub async fn fetch(&self, force: bool) -> Vec<StorefrontProduct> {
        if !force
            && let Some(CacheValue::Catalog(products)) = self.cache.get(&CacheKey::Catalog).await
        {
            debug!("Cache hit for catalog");
            let products = products.as_ref().clone();
            self.store.set_data(products.clone());
            return products;
        }

        let request = async {
            let (products, prices) = tokio::try_join!(
                self.client.get::<Vec<Product>>("/products/active"),
                self.client.get::<Vec<ProductPrice>>("/prices/active"),
            )?;
            Ok::<_, ApiError>(join_catalog(products, &prices))
        };

        match self.store.load(request).await {
            Ok(products) => {
                if !products.is_empty() {
                    self.cache
                        .insert(CacheKey::Catalog, CacheValue::Catalog(Arc::new(products.clone())))
                        .await;
                }
                products
            }
            Err(error) => {
                warn!(%error, "Catalog fetch failed; keeping previous catalog");
                self.store.data()
            }
        }
    }

    /// Drop the cached catalog so the next fetch hits the backend.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&CacheKey::Catalog).await;
    }
}
