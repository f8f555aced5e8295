//! Product list, details and mutations.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use trinket_store_core::{ProductId, ProductStatus};

use crate::filter::{Choice, ListFilter, contains_ci};
use crate::http::BackendClient;
use crate::store::{MutationTracker, ResourceState, ResourceStore, StoreKey};
use crate::types::{Product, ProductPayload};

/// Client-side filters for the product list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilters {
    /// Substring of the product name.
    pub search: String,
    /// Exact category.
    pub category: Choice<String>,
    pub status: Choice<ProductStatus>,
}

impl ListFilter<Product> for ProductFilters {
    fn matches(&self, product: &Product) -> bool {
        contains_ci(&product.name, &self.search)
            && self
                .category
                .admits(&product.category.clone().unwrap_or_default())
            && self.status.admits(&product.status())
    }
}

/// `GET /products` with client-side filtering.
#[derive(Debug)]
pub struct ProductsList {
    client: BackendClient,
    store: ResourceStore<Vec<Product>, ProductFilters>,
}

impl ProductsList {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::ProductsList),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<Vec<Product>, ProductFilters> {
        &self.store
    }

    #[must_use]
    pub fn state(&self) -> ResourceState<Vec<Product>, ProductFilters> {
        self.store.snapshot()
    }

    /// Fetch every product. New filters, when given, replace the stored ones.
    #[instrument(skip(self, filters))]
    pub async fn fetch(&self, filters: Option<ProductFilters>) {
        if let Some(filters) = filters {
            self.store.set_filters(filters);
        }
        if let Err(error) = self.store.load(self.client.get("/products")).await {
            debug!(%error, "Products fetch failed");
        }
    }

    pub fn set_filters(&self, filters: ProductFilters) {
        self.store.set_filters(filters);
    }

    /// Products matching the current filters.
    #[must_use]
    pub fn filtered(&self) -> Vec<Product> {
        let state = self.store.snapshot();
        state.filters.apply(&state.data)
    }
}

/// `GET /products/{id}`.
#[derive(Debug)]
pub struct ProductDetails {
    client: BackendClient,
    store: ResourceStore<Option<Product>>,
}

impl ProductDetails {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::ProductDetails),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<Option<Product>> {
        &self.store
    }

    /// Fetch one product. Invalid ids are ignored.
    #[instrument(skip(self))]
    pub async fn fetch(&self, id: ProductId) {
        if !id.is_valid() {
            return;
        }
        let endpoint = format!("/products/{id}");
        if let Err(error) = self.store.load(self.client.get(&endpoint)).await {
            debug!(%error, "Product fetch failed");
        }
    }

    pub fn reset(&self) {
        self.store.reset();
    }
}

/// Product mutations. Each returns `None` on failure.
#[derive(Debug)]
pub struct ProductMutations {
    client: BackendClient,
    tracker: MutationTracker,
}

impl ProductMutations {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            tracker: MutationTracker::new(StoreKey::ProductMutations),
        }
    }

    #[must_use]
    pub const fn tracker(&self) -> &MutationTracker {
        &self.tracker
    }

    /// Create a product. Invalid form input is recorded as a 400 on the
    /// tracker and never reaches the backend.
    #[instrument(skip(self, payload), fields(slug = %payload.slug))]
    pub async fn create(&self, payload: &ProductPayload) -> Option<Product> {
        self.tracker
            .handle(async {
                let payload = payload.normalized()?;
                self.client.post("/products", &payload).await
            })
            .await
    }

    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: ProductId, payload: &ProductPayload) -> Option<Product> {
        let endpoint = format!("/products/{id}");
        self.tracker
            .handle(async {
                let payload = payload.normalized()?;
                self.client.put(&endpoint, &payload).await
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Option<()> {
        let endpoint = format!("/products/{id}");
        self.tracker.handle(self.client.delete(&endpoint)).await
    }

    #[instrument(skip(self))]
    pub async fn activate(&self, id: ProductId) -> Option<Product> {
        let endpoint = format!("/products/{id}/activate");
        self.tracker.handle(self.client.patch(&endpoint)).await
    }

    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: ProductId) -> Option<Product> {
        let endpoint = format!("/products/{id}/deactivate");
        self.tracker.handle(self.client.patch(&endpoint)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, category: &str, active: bool) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: None,
            image_url: None,
            category: Some(category.to_string()),
            active,
            created_at: None,
            updated_at: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Caneca Azul", "canecas", true),
            product(2, "Caneca Verde", "canecas", false),
            product(3, "Chaveiro Azul", "chaveiros", true),
        ]
    }

    #[test]
    fn test_empty_filters_match_everything() {
        assert_eq!(ProductFilters::default().apply(&catalog()).len(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let filters = ProductFilters {
            search: "AZUL".to_string(),
            ..ProductFilters::default()
        };
        let ids: Vec<_> = filters.apply(&catalog()).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![ProductId::new(1), ProductId::new(3)]);
    }

    #[test]
    fn test_category_and_status_are_exact() {
        let filters = ProductFilters {
            search: String::new(),
            category: Choice::Only("canecas".to_string()),
            status: Choice::Only(ProductStatus::Inactive),
        };
        let filtered = filters.apply(&catalog());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, ProductId::new(2));
        assert_eq!(filters.apply(&filtered), filtered);
    }
}
