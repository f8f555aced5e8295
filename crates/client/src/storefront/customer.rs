//! The signed-in customer's profile.

use tracing::instrument;

use crate::error::ApiError;
use crate::http::BackendClient;
use crate::store::{ResourceStore, StoreKey};
use crate::types::User;

#[derive(Debug)]
pub struct CustomerProfile {
    client: BackendClient,
    store: ResourceStore<Option<User>>,
}

impl CustomerProfile {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::Customer),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<Option<User>> {
        &self.store
    }

    #[must_use]
    pub fn profile(&self) -> Option<User> {
        self.store.data()
    }

    /// Load `/users/me`. A failure clears the stored profile.
    ///
    /// # Errors
    ///
    /// Returns the normalized error after recording it.
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self) -> Result<User, ApiError> {
        let result = self
            .store
            .track(self.client.get::<User>("/users/me"), |profile, user| {
                *profile = Some(user.clone());
            })
            .await;
        if result.is_err() {
            self.store.set_data(None);
        }
        result
    }

    /// Forget the profile and any error.
    pub fn clear_profile(&self) {
        self.store.reset();
    }
}
