//! Public storefront: catalog, stock, cart, checkout and the customer's
//! own profile and orders.

pub mod cache;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod customer;
pub mod inventory;
pub mod orders;
pub mod polling;
pub mod storage;

use std::sync::Arc;

use crate::http::BackendClient;

pub use cache::{CacheKey, CacheValue, StorefrontCache, build_cache};
pub use cart::{
    CART_STORAGE_KEY, Cart, CartItem, CartState, OwnerKey, clamp_quantity, sanitize_cart_items,
};
pub use catalog::{Catalog, StorefrontProduct, join_catalog};
pub use checkout::{Checkout, CheckoutError, CheckoutInput, build_pix_request};
pub use customer::CustomerProfile;
pub use inventory::{InventorySnapshot, InventoryState, StorefrontInventory};
pub use orders::{ORDERS_UNAVAILABLE, OrderHistory, OrdersManager};
pub use polling::{OrderPoller, POLL_INTERVAL};
pub use storage::{CartStorage, CartStorageError, FileCartStorage, MemoryCartStorage};

/// Every storefront view, sharing one backend client and one cache.
#[derive(Debug)]
pub struct Storefront {
    pub catalog: Catalog,
    pub inventory: StorefrontInventory,
    pub cart: Cart,
    pub checkout: Checkout,
    pub customer: CustomerProfile,
    pub orders: OrdersManager,
    pub poller: OrderPoller,
}

impl Storefront {
    #[must_use]
    pub fn new(client: &BackendClient, storage: Arc<dyn CartStorage>) -> Self {
        let cache = build_cache();
        Self {
            catalog: Catalog::new(client.clone(), cache.clone()),
            inventory: StorefrontInventory::new(client.clone(), cache),
            cart: Cart::new(storage),
            checkout: Checkout::new(client.clone()),
            customer: CustomerProfile::new(client.clone()),
            orders: OrdersManager::new(client.clone()),
            poller: OrderPoller::new(client.clone()),
        }
    }
}
