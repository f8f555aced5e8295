//! Shopping cart bound to the active owner.
//!
//! Exactly one owner's cart is active at a time. Every mutation writes the
//! active cart through to [`CartStorage`] under a key namespaced by owner;
//! memory stays authoritative when storage fails.
//!
//! Quantities are clamped on every mutation: a line holds `0` when its
//! product is out of stock and otherwise a quantity in `1..=available_stock`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use trinket_store_core::ProductId;

use super::catalog::StorefrontProduct;
use super::storage::CartStorage;

/// Storage key prefix for persisted carts.
pub const CART_STORAGE_KEY: &str = "trinket-store:cart:v1";

const DEFAULT_ITEM_NAME: &str = "Product";

/// Whose cart is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum OwnerKey {
    #[default]
    Guest,
    /// An authenticated identity.
    User(String),
}

impl OwnerKey {
    #[must_use]
    pub fn user(id: impl std::fmt::Display) -> Self {
        Self::User(id.to_string())
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    /// Storage key for this owner's cart.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{CART_STORAGE_KEY}:{self}")
    }
}

impl std::fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Guest => f.write_str("guest"),
            Self::User(id) => write!(f, "auth:{id}"),
        }
    }
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
    pub price_in_cents: Option<i64>,
    pub quantity: i64,
    pub available_stock: i64,
}

impl CartItem {
    #[must_use]
    pub fn subtotal_in_cents(&self) -> i64 {
        self.price_in_cents
            .unwrap_or(0)
            .saturating_mul(self.quantity.max(0))
    }
}

/// Clamp a requested quantity to what `stock` allows: `0` without stock,
/// otherwise `1..=stock`.
#[must_use]
pub fn clamp_quantity(requested: i64, stock: i64) -> i64 {
    if stock <= 0 {
        return 0;
    }
    requested.clamp(1, stock)
}

/// Rebuild cart lines from an untrusted persisted payload.
///
/// Entries that cannot be repaired (missing or non-positive product ids,
/// non-numeric quantities) are dropped one by one; the rest are normalized.
#[must_use]
pub fn sanitize_cart_items(payload: &Value) -> Vec<CartItem> {
    let Some(entries) = payload.as_array() else {
        return Vec::new();
    };
    entries.iter().filter_map(sanitize_item).collect()
}

fn sanitize_item(entry: &Value) -> Option<CartItem> {
    let raw = entry.as_object()?;
    let field = |name: &str| raw.get(name).filter(|v| !v.is_null());

    let product_id = field("productId").and_then(as_number)?;
    if product_id <= 0.0 || product_id.fract() != 0.0 {
        debug!(?product_id, "Dropping cart entry with invalid product id");
        return None;
    }
    let product_id = ProductId::new(to_whole(product_id));

    let quantity = match field("quantity") {
        None => None,
        Some(value) => {
            let Some(quantity) = as_number(value) else {
                debug!(%product_id, "Dropping cart entry with non-numeric quantity");
                return None;
            };
            Some(to_whole(quantity))
        }
    };

    let available_stock = field("availableStock")
        .and_then(as_number)
        .map(to_whole)
        .or(quantity)
        .unwrap_or(0)
        .max(0);

    let requested = quantity.filter(|q| *q != 0).unwrap_or(1);

    Some(CartItem {
        product_id,
        slug: field("slug")
            .map(text)
            .unwrap_or_else(|| product_id.to_string()),
        name: field("name")
            .map(text)
            .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string()),
        image: field("image").and_then(Value::as_str).map(str::to_string),
        price_in_cents: field("priceInCents").and_then(Value::as_i64),
        quantity: clamp_quantity(requested, available_stock),
        available_stock,
    })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

#[allow(clippy::cast_possible_truncation)]
fn to_whole(value: f64) -> i64 {
    value.floor() as i64
}

fn text(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string)
}

// =============================================================================
// Cart
// =============================================================================

/// Snapshot of the active cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub owner: OwnerKey,
    pub items: Vec<CartItem>,
}

impl CartState {
    #[must_use]
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Units across all lines.
    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.quantity.max(0))
            .fold(0, i64::saturating_add)
    }

    /// Value of all lines; lines without a price count as zero.
    #[must_use]
    pub fn total_amount_in_cents(&self) -> i64 {
        self.items
            .iter()
            .map(CartItem::subtotal_in_cents)
            .fold(0, i64::saturating_add)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.product_id == product_id)
    }
}

pub struct Cart {
    storage: Arc<dyn CartStorage>,
    state: watch::Sender<CartState>,
}

impl std::fmt::Debug for Cart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cart")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Cart {
    /// Open the guest cart.
    #[must_use]
    pub fn new(storage: Arc<dyn CartStorage>) -> Self {
        Self::open(storage, OwnerKey::Guest)
    }

    /// Open `owner`'s cart from storage.
    #[must_use]
    pub fn open(storage: Arc<dyn CartStorage>, owner: OwnerKey) -> Self {
        let items = hydrate(storage.as_ref(), &owner);
        Self {
            storage,
            state: watch::Sender::new(CartState { owner, items }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn owner(&self) -> OwnerKey {
        self.state.borrow().owner.clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.state.borrow().items.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// Make `owner`'s cart the active one.
    ///
    /// Signing in from a non-empty guest cart into an empty owned cart moves
    /// the guest lines over and clears the persisted guest cart. A non-empty
    /// owned cart is never merged with guest lines.
    pub fn switch_owner(&self, owner: OwnerKey) {
        let current = self.snapshot();
        if current.owner == owner {
            return;
        }

        let mut items = hydrate(self.storage.as_ref(), &owner);
        let migrate = current.owner.is_guest()
            && !owner.is_guest()
            && items.is_empty()
            && current.has_items();

        if migrate {
            items = current.items;
            persist(self.storage.as_ref(), &owner, &items);
            if let Err(e) = self.storage.remove(&OwnerKey::Guest.storage_key()) {
                warn!(error = %e, "Failed to clear guest cart after migration");
            }
            info!(owner = %owner, lines = items.len(), "Moved guest cart to signed-in owner");
        } else {
            debug!(from = %current.owner, to = %owner, "Switched cart owner");
        }

        self.state.send_replace(CartState { owner, items });
    }

    /// Add `quantity` of `product`, merging into an existing line.
    ///
    /// Returns the resulting line, or `None` without stock.
    pub fn add_item(
        &self,
        product: &StorefrontProduct,
        quantity: i64,
        available_stock: i64,
    ) -> Option<CartItem> {
        let stock = available_stock.max(0);
        if stock == 0 {
            debug!(product_id = %product.id, "Not adding out-of-stock product");
            return None;
        }
        let requested = clamp_quantity(quantity, stock);

        self.mutate(|state| {
            if let Some(line) = state.line_mut(product.id) {
                line.available_stock = stock;
                line.quantity = clamp_quantity(line.quantity.saturating_add(requested), stock);
                return Some(line.clone());
            }
            let line = CartItem {
                product_id: product.id,
                slug: product.slug.clone(),
                name: product.name.clone(),
                image: product.image.clone(),
                price_in_cents: product.price_in_cents,
                quantity: requested,
                available_stock: stock,
            };
            state.items.push(line.clone());
            Some(line)
        })
    }

    /// Set a line's quantity, optionally with fresh stock. Returns the line,
    /// or `None` when the product is not in the cart.
    pub fn update_item_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
        stock_limit: Option<i64>,
    ) -> Option<CartItem> {
        self.mutate(|state| {
            let line = state.line_mut(product_id)?;
            line.available_stock = stock_limit.unwrap_or(line.available_stock).max(0);
            line.quantity = clamp_quantity(quantity, line.available_stock);
            Some(line.clone())
        })
    }

    /// Apply a fresh stock level to a line and re-clamp its quantity.
    pub fn set_item_stock(&self, product_id: ProductId, qty_on_hand: i64) -> Option<CartItem> {
        self.mutate(|state| {
            let line = state.line_mut(product_id)?;
            line.available_stock = qty_on_hand.max(0);
            line.quantity = clamp_quantity(line.quantity, line.available_stock);
            Some(line.clone())
        })
    }

    /// Remove a line. Returns whether a line was removed.
    pub fn remove_item(&self, product_id: ProductId) -> bool {
        self.mutate(|state| {
            let before = state.items.len();
            state.items.retain(|item| item.product_id != product_id);
            (state.items.len() != before).then_some(true)
        })
        .unwrap_or(false)
    }

    pub fn clear(&self) {
        self.mutate(|state| {
            state.items.clear();
            Some(())
        });
    }

    /// Apply an edit and write the cart through when it reports a change.
    fn mutate<R>(&self, edit: impl FnOnce(&mut CartState) -> Option<R>) -> Option<R> {
        let mut outcome = None;
        self.state.send_if_modified(|state| {
            outcome = edit(state);
            outcome.is_some()
        });
        if outcome.is_some() {
            let state = self.state.borrow().clone();
            persist(self.storage.as_ref(), &state.owner, &state.items);
        }
        outcome
    }
}

fn hydrate(storage: &dyn CartStorage, owner: &OwnerKey) -> Vec<CartItem> {
    let raw = match storage.load(&owner.storage_key()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(owner = %owner, error = %e, "Failed to load cart");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(payload) => sanitize_cart_items(&payload),
        Err(e) => {
            warn!(owner = %owner, error = %e, "Persisted cart is not valid JSON");
            Vec::new()
        }
    }
}

fn persist(storage: &dyn CartStorage, owner: &OwnerKey, items: &[CartItem]) {
    let result = serde_json::to_string(items)
        .map_err(|e| e.to_string())
        .and_then(|raw| {
            storage
                .save(&owner.storage_key(), &raw)
                .map_err(|e| e.to_string())
        });
    if let Err(error) = result {
        warn!(owner = %owner, %error, "Failed to persist cart");
    }
}
