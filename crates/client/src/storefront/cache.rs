//! Time-boxed cache shared by the catalog and inventory views.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use trinket_store_core::ProductId;

use super::catalog::StorefrontProduct;
use super::inventory::InventorySnapshot;

/// How long the joined catalog stays fresh.
pub const CATALOG_TTL: Duration = Duration::from_secs(5 * 60);

/// How long a product's stock snapshot stays fresh.
pub const INVENTORY_TTL: Duration = Duration::from_secs(60);

/// Cache key for storefront data.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Catalog,
    Inventory(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Catalog(Arc<Vec<StorefrontProduct>>),
    Inventory(InventorySnapshot),
}

/// Per-key time to live.
#[derive(Debug, Clone, Copy)]
struct StorefrontExpiry;

impl Expiry<CacheKey, CacheValue> for StorefrontExpiry {
    fn expire_after_create(
        &self,
        key: &CacheKey,
        _value: &CacheValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(match key {
            CacheKey::Catalog => CATALOG_TTL,
            CacheKey::Inventory(_) => INVENTORY_TTL,
        })
    }

    fn expire_after_update(
        &self,
        key: &CacheKey,
        value: &CacheValue,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        self.expire_after_create(key, value, updated_at)
    }
}

pub type StorefrontCache = Cache<CacheKey, CacheValue>;

/// Build the storefront cache. Clones share entries.
#[must_use]
pub fn build_cache() -> StorefrontCache {
    Cache::builder()
        .max_capacity(1000)
        .expire_after(StorefrontExpiry)
        .build()
}
