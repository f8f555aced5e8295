//! Integration tests for the Trinket Store client.
//!
//! Every test runs the real client against a [`wiremock`] server standing in
//! for the REST backend (and, for identity tests, the Supabase project).
//!
//! ```bash
//! cargo test -p trinket-store-integration-tests
//! ```

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::{Value, json};
use trinket_store_client::storefront::{CartStorage, MemoryCartStorage};
use trinket_store_client::{
    AppContext, BroadcastNotifier, ClientConfig, IdentityConfig, SessionUser,
};
use trinket_store_core::{UserId, UserRole};
use wiremock::MockServer;

/// A mocked backend plus a context wired to it.
pub struct TestBackend {
    pub server: MockServer,
    pub context: AppContext,
    pub notifier: BroadcastNotifier,
}

impl TestBackend {
    /// Backend with in-memory cart storage and no identity provider.
    ///
    /// # Panics
    ///
    /// Panics if the context cannot be built.
    pub async fn start() -> Self {
        Self::with_storage(Arc::new(MemoryCartStorage::default())).await
    }

    /// Backend with the given cart storage.
    ///
    /// # Panics
    ///
    /// Panics if the context cannot be built.
    pub async fn with_storage(storage: Arc<dyn CartStorage>) -> Self {
        let server = MockServer::start().await;
        let config = config_for(&server, false);
        Self::build(server, config, storage)
    }

    /// Backend that also serves the identity provider endpoints.
    ///
    /// # Panics
    ///
    /// Panics if the context cannot be built.
    pub async fn with_identity() -> Self {
        let server = MockServer::start().await;
        let config = config_for(&server, true);
        Self::build(server, config, Arc::new(MemoryCartStorage::default()))
    }

    #[allow(clippy::expect_used)]
    fn build(server: MockServer, config: ClientConfig, storage: Arc<dyn CartStorage>) -> Self {
        let notifier = BroadcastNotifier::new(16);
        let context = AppContext::new(config, Arc::new(notifier.clone()), storage)
            .expect("context should build");
        Self {
            server,
            context,
            notifier,
        }
    }

    /// Put a token and profile in the session without calling the backend.
    pub async fn sign_in(&self, user_id: i64, role: UserRole) -> SessionUser {
        let user = SessionUser {
            user_id: UserId::new(user_id),
            name: "Ana Souza".to_string(),
            email: "ana@trinket.store".to_string(),
            role,
        };
        let session = self.context.session();
        session
            .set_token(Some(SecretString::from("test-token".to_string())))
            .await;
        session.set_user(Some(user.clone())).await;
        user
    }
}

#[allow(clippy::expect_used)]
fn config_for(server: &MockServer, identity: bool) -> ClientConfig {
    let mut config =
        ClientConfig::for_backend(&server.uri()).expect("mock server URI should parse");
    if identity {
        config.identity = Some(IdentityConfig {
            url: server.uri(),
            anon_key: SecretString::from("anon-key".to_string()),
        });
    }
    config
}

// =============================================================================
// Fixtures
// =============================================================================

#[must_use]
pub fn product_json(id: i64, name: &str, active: bool) -> Value {
    json!({
        "idProduct": id,
        "nomeProduct": name,
        "slugProduct": name.to_lowercase().replace(' ', "-"),
        "descricaoProduct": format!("{name} description"),
        "imagemurlProduct": format!("https://cdn.trinket.store/{id}.png"),
        "categoriaProduct": "canecas",
        "ativo": active,
    })
}

#[must_use]
pub fn price_json(id: i64, product_id: i64, amount: i64) -> Value {
    json!({
        "idPrice": id,
        "productId": product_id,
        "amountPrice": amount,
        "currencyPrice": "BRL",
        "vigentePrice": true,
    })
}

#[must_use]
pub fn inventory_json(id: i64, product_id: i64, qty: i64) -> Value {
    json!({
        "idInventory": id,
        "productId": product_id,
        "qtyOnHand": qty,
    })
}

#[must_use]
pub fn order_json(id: i64, user_id: i64, status: &str, total: i64, created_at: &str) -> Value {
    json!({
        "idOrder": id,
        "userId": user_id,
        "statusOrder": status,
        "totalOrders": total,
        "currencyOrder": "BRL",
        "createdAt": created_at,
    })
}

#[must_use]
pub fn user_json(id: i64, name: &str, role: &str, email: Option<&str>) -> Value {
    json!({
        "idUser": id,
        "nomeUser": name,
        "role": role,
        "email": email,
        "createdAt": "2025-03-01T12:00:00Z",
    })
}
