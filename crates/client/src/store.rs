//! Observable resource stores.
//!
//! A [`ResourceStore`] holds `{data, loading, error, filters}` for one view
//! and publishes every change on a watch channel. Callers read snapshots;
//! only the owning resource mutates the state.
//!
//! Concurrent loads are not de-duplicated. Every load runs to completion and
//! the last one to settle wins; a load that settles after a newer one was
//! started is logged as stale but still applied.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::error::ApiError;

/// Names every store in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    ProductsList,
    ProductDetails,
    ProductMutations,
    ProductPrices,
    PriceMutations,
    InventoryList,
    InventoryByProduct,
    InventoryMutations,
    OrdersList,
    OrderDetails,
    OrderMutations,
    OrderItemMutations,
    UsersList,
    UserDetails,
    UserMutations,
    CurrentProfile,
    CurrentProfileMutations,
    Catalog,
    StorefrontInventory,
    Checkout,
    Customer,
    CustomerOrders,
}

impl StoreKey {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProductsList => "products:list",
            Self::ProductDetails => "products:details",
            Self::ProductMutations => "products:mutations",
            Self::ProductPrices => "prices:list",
            Self::PriceMutations => "prices:mutations",
            Self::InventoryList => "inventory:list",
            Self::InventoryByProduct => "inventory:product",
            Self::InventoryMutations => "inventory:mutations",
            Self::OrdersList => "orders:list",
            Self::OrderDetails => "orders:details",
            Self::OrderMutations => "orders:mutations",
            Self::OrderItemMutations => "order-items:mutations",
            Self::UsersList => "users:list",
            Self::UserDetails => "users:details",
            Self::UserMutations => "users:mutations",
            Self::CurrentProfile => "users:profile",
            Self::CurrentProfileMutations => "users:profile:mutations",
            Self::Catalog => "storefront:catalog",
            Self::StorefrontInventory => "storefront:inventory",
            Self::Checkout => "storefront:checkout",
            Self::Customer => "storefront:customer",
            Self::CustomerOrders => "storefront:orders",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a resource store.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T, F = ()> {
    pub data: T,
    /// True while at least one load is in flight.
    pub loading: bool,
    /// Error of the most recent failed load; cleared when a load starts.
    pub error: Option<ApiError>,
    pub filters: F,
}

// =============================================================================
// ResourceStore
// =============================================================================

/// State container for one resource view.
pub struct ResourceStore<T, F = ()> {
    key: StoreKey,
    state: watch::Sender<ResourceState<T, F>>,
    started: AtomicU64,
    in_flight: AtomicU64,
}

impl<T, F> std::fmt::Debug for ResourceStore<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Default, F: Clone + Default> ResourceStore<T, F> {
    #[must_use]
    pub fn new(key: StoreKey) -> Self {
        Self::with_data(key, T::default())
    }
}

impl<T: Clone, F: Clone + Default> ResourceStore<T, F> {
    #[must_use]
    pub fn with_data(key: StoreKey, data: T) -> Self {
        Self {
            key,
            state: watch::Sender::new(ResourceState {
                data,
                loading: false,
                error: None,
                filters: F::default(),
            }),
            started: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn key(&self) -> StoreKey {
        self.key
    }

    #[must_use]
    pub fn snapshot(&self) -> ResourceState<T, F> {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn data(&self) -> T {
        self.state.borrow().data.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    #[must_use]
    pub fn error(&self) -> Option<ApiError> {
        self.state.borrow().error.clone()
    }

    #[must_use]
    pub fn filters(&self) -> F {
        self.state.borrow().filters.clone()
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T, F>> {
        self.state.subscribe()
    }

    pub fn set_filters(&self, filters: F) {
        self.state.send_modify(|state| state.filters = filters);
    }

    pub fn set_data(&self, data: T) {
        self.state.send_modify(|state| state.data = data);
    }

    /// Edit the data in place.
    pub fn update(&self, edit: impl FnOnce(&mut T)) {
        self.state.send_modify(|state| edit(&mut state.data));
    }

    /// Clear data and error, keeping filters.
    pub fn reset(&self)
    where
        T: Default,
    {
        self.state.send_modify(|state| {
            state.data = T::default();
            state.error = None;
        });
    }

    /// Run a load and replace `data` wholesale with its result.
    ///
    /// # Errors
    ///
    /// Returns the error of a failed load after recording it in the state.
    pub async fn load<Fut>(&self, request: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.track(request, |data, fresh: &T| *data = fresh.clone())
            .await
    }

    /// Run a request under this store's loading/error state, applying a
    /// successful result to `data` through `apply`.
    ///
    /// # Errors
    ///
    /// Returns the error of a failed request after recording it in the state.
    pub async fn track<R, Fut>(
        &self,
        request: Fut,
        apply: impl FnOnce(&mut T, &R),
    ) -> Result<R, ApiError>
    where
        Fut: Future<Output = Result<R, ApiError>>,
    {
        let generation = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = request.await;

        let latest = self.started.load(Ordering::SeqCst);
        if generation < latest {
            debug!(
                store = %self.key,
                generation,
                latest,
                "Applying response from an older request"
            );
        }
        let remaining = self.in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);

        self.state.send_modify(|state| {
            match &result {
                Ok(value) => apply(&mut state.data, value),
                Err(error) => state.error = Some(error.clone()),
            }
            state.loading = remaining > 0;
        });

        if let Err(error) = &result {
            debug!(store = %self.key, status = ?error.status, error = %error, "Request failed");
        }
        result
    }
}

// =============================================================================
// MutationTracker
// =============================================================================

/// Loading/error pair for a group of mutations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationState {
    pub loading: bool,
    pub error: Option<ApiError>,
}

/// Shared wrapper for mutations: failures land in the state and the caller
/// gets `None`.
#[derive(Debug)]
pub struct MutationTracker {
    key: StoreKey,
    state: watch::Sender<MutationState>,
}

impl MutationTracker {
    #[must_use]
    pub fn new(key: StoreKey) -> Self {
        Self {
            key,
            state: watch::Sender::new(MutationState::default()),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> MutationState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    #[must_use]
    pub fn error(&self) -> Option<ApiError> {
        self.state.borrow().error.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }

    /// Run a mutation. Returns `None` on failure; the error is kept in the
    /// tracker state.
    pub async fn handle<R, Fut>(&self, request: Fut) -> Option<R>
    where
        Fut: Future<Output = Result<R, ApiError>>,
    {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = request.await;

        self.state.send_modify(|state| {
            if let Err(error) = &result {
                state.error = Some(error.clone());
            }
            state.loading = false;
        });

        result
            .inspect_err(|error| {
                debug!(
                    store = %self.key,
                    status = ?error.status,
                    error = %error,
                    "Mutation failed"
                );
            })
            .ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_load_replaces_data_and_clears_loading() {
        let store: ResourceStore<Vec<u32>> = ResourceStore::new(StoreKey::ProductsList);
        let data = store.load(async { Ok(vec![1, 2, 3]) }).await.unwrap();
        assert_eq!(data, vec![1, 2, 3]);

        let state = store.snapshot();
        assert_eq!(state.data, vec![1, 2, 3]);
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_data_and_records_error() {
        let store: ResourceStore<Vec<u32>> =
            ResourceStore::with_data(StoreKey::OrdersList, vec![9]);
        let err = store
            .load(async { Err(ApiError::new(Some(404), "missing")) })
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(404));
        assert_eq!(store.data(), vec![9]);
        assert_eq!(store.error().unwrap().message, "missing");
        assert!(!store.is_loading());

        // A new attempt clears the previous error.
        store.load(async { Ok(vec![]) }).await.unwrap();
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_loading_is_true_while_in_flight() {
        let store: ResourceStore<u32> = ResourceStore::new(StoreKey::Catalog);
        let mut rx = store.subscribe();
        let (tx, gate) = oneshot::channel::<()>();

        let load = store.load(async move {
            gate.await.unwrap();
            Ok(5)
        });
        let observe = async {
            rx.changed().await.unwrap();
            assert!(rx.borrow_and_update().loading);
            tx.send(()).unwrap();
        };
        let (result, ()) = tokio::join!(load, observe);
        assert_eq!(result.unwrap(), 5);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_last_resolved_wins() {
        let store: ResourceStore<&'static str> = ResourceStore::new(StoreKey::InventoryList);
        let slow = store.load(async {
            tokio::time::sleep(Duration::from_millis(40)).await;
            Ok("first request")
        });
        let fast = store.load(async { Ok("second request") });
        let (a, b) = tokio::join!(slow, fast);
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(store.data(), "first request");
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_track_applies_through_closure() {
        let store: ResourceStore<Vec<u32>> = ResourceStore::new(StoreKey::CustomerOrders);
        let value = store
            .track(async { Ok(7_u32) }, |data, v| data.push(*v))
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(store.data(), vec![7]);
    }

    #[tokio::test]
    async fn test_filters_survive_reset() {
        let store: ResourceStore<Vec<u32>, String> = ResourceStore::new(StoreKey::UsersList);
        store.set_filters("ana".to_string());
        store.set_data(vec![1]);
        store.reset();
        assert!(store.data().is_empty());
        assert_eq!(store.filters(), "ana");
    }

    #[tokio::test]
    async fn test_mutation_tracker_swallows_failures() {
        let tracker = MutationTracker::new(StoreKey::ProductMutations);
        let ok = tracker.handle(async { Ok::<_, ApiError>(1) }).await;
        assert_eq!(ok, Some(1));
        assert!(tracker.error().is_none());

        let failed = tracker
            .handle(async { Err::<u32, _>(ApiError::new(Some(409), "conflict")) })
            .await;
        assert_eq!(failed, None);
        assert_eq!(tracker.error().unwrap().status, Some(409));
        assert!(!tracker.is_loading());
    }

    #[test]
    fn test_store_key_names() {
        assert_eq!(StoreKey::ProductsList.to_string(), "products:list");
        assert_eq!(StoreKey::Checkout.as_str(), "storefront:checkout");
    }
}
