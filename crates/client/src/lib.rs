//! Trinket Store Client - backend access and client-side state.
//!
//! # Modules
//!
//! - [`http`] - Fetch adapter: bearer token, JSON decoding, error normalization
//! - [`error`] - `ApiError` and the status-keyed message tables
//! - [`store`] - Observable resource stores and mutation trackers
//! - [`filter`] - Pure client-side list filters
//! - [`admin`] - Administrator CRUD resources
//! - [`storefront`] - Catalog, stock, cart, PIX checkout, customer orders
//! - [`auth`] / [`identity`] - Admin sign-in and the hosted identity provider
//! - [`context`] - [`AppContext`], which owns all of the above
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use trinket_store_client::{AppContext, ClientConfig};
//!
//! let context = AppContext::from_config(ClientConfig::from_env()?)?;
//! let catalog = context.storefront.catalog.fetch(false).await;
//! if let Some(product) = catalog.first() {
//!     context.storefront.cart.add_item(product, 1, 5);
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod http;
pub mod identity;
pub mod notify;
pub mod session;
pub mod store;
pub mod storefront;
pub mod types;

pub use auth::{AdminAuth, AuthError};
pub use config::{ClientConfig, ConfigError, IdentityConfig};
pub use context::{AppContext, ContextError};
pub use error::{ApiError, ErrorKind, FetchFailure};
pub use http::{BackendClient, RequestOptions};
pub use identity::{Identity, IdentityError, SupabaseIdentity, UserRecord};
pub use notify::{BroadcastNotifier, LogNotifier, Notification, Notifier};
pub use session::{Session, SessionCookies, SessionUser};
pub use store::{MutationState, MutationTracker, ResourceState, ResourceStore, StoreKey};
