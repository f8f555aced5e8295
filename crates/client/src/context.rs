//! Application context: owns the backend client and every store.

use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::admin::AdminResources;
use crate::auth::AdminAuth;
use crate::config::ClientConfig;
use crate::http::BackendClient;
use crate::identity::{IdentityError, SupabaseIdentity};
use crate::notify::{LogNotifier, Notifier};
use crate::session::{Session, SessionUser};
use crate::storefront::{CartStorage, FileCartStorage, OwnerKey, Storefront};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Everything a front end needs, wired to one session.
#[derive(Debug)]
pub struct AppContext {
    config: ClientConfig,
    client: BackendClient,
    identity: Option<SupabaseIdentity>,
    pub auth: AdminAuth,
    pub admin: AdminResources,
    pub storefront: Storefront,
}

impl AppContext {
    /// Build a context with explicit notification and cart storage sinks.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(
        config: ClientConfig,
        notifier: Arc<dyn Notifier>,
        storage: Arc<dyn CartStorage>,
    ) -> Result<Self, ContextError> {
        let client = BackendClient::new(&config, Session::new(), notifier)?;
        let identity = match &config.identity {
            Some(identity) => Some(SupabaseIdentity::new(
                identity.clone(),
                config.request_timeout,
            )?),
            None => None,
        };
        Ok(Self {
            auth: AdminAuth::new(client.clone()),
            admin: AdminResources::new(&client),
            storefront: Storefront::new(&client, storage),
            identity,
            client,
            config,
        })
    }

    /// Build a context that logs notifications and keeps carts on disk
    /// under the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: ClientConfig) -> Result<Self, ContextError> {
        let storage = Arc::new(FileCartStorage::new(config.cart_dir()));
        Self::new(config, Arc::new(LogNotifier), storage)
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub const fn client(&self) -> &BackendClient {
        &self.client
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        self.client.session()
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&SupabaseIdentity> {
        self.identity.as_ref()
    }

    /// Point the cart at the signed-in user, or at the guest cart.
    pub async fn sync_cart_owner(&self) -> OwnerKey {
        let owner = self
            .session()
            .user()
            .await
            .map_or(OwnerKey::Guest, |user| OwnerKey::user(user.user_id));
        self.storefront.cart.switch_owner(owner.clone());
        owner
    }

    /// Adopt an identity-provider access token as the session.
    ///
    /// Returns `None` when the provider does not recognize the token.
    ///
    /// # Errors
    ///
    /// Returns an error when identity is not configured or the provider
    /// cannot be reached.
    #[instrument(skip(self, access_token))]
    pub async fn sign_in_with_identity(
        &self,
        access_token: &str,
    ) -> Result<Option<SessionUser>, IdentityError> {
        let provider = self.identity.as_ref().ok_or(IdentityError::NotConfigured)?;
        let Some(identity) = provider.current_user(access_token).await? else {
            return Ok(None);
        };
        let record = provider.ensure_user_record(access_token, &identity).await?;

        let user = SessionUser {
            user_id: record.user_id,
            name: identity.display_name(),
            email: identity.email.clone().unwrap_or_default(),
            role: record.role,
        };
        self.session()
            .set_token(Some(SecretString::from(access_token.to_string())))
            .await;
        self.session().set_user(Some(user.clone())).await;
        self.sync_cart_owner().await;
        info!(user_id = %user.user_id, role = %user.role, "Signed in through identity provider");
        Ok(Some(user))
    }

    /// End the session everywhere and fall back to the guest cart.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        if let (Some(provider), Some(token)) = (&self.identity, self.session().bearer().await)
            && !self.session().is_admin().await
            && let Err(error) = provider.sign_out(&token).await
        {
            warn!(%error, "Identity provider sign-out failed");
        }
        self.storefront.poller.stop();
        self.storefront.customer.clear_profile();
        self.session().clear().await;
        self.sync_cart_owner().await;
    }
}
