//! The signed-in user's own record at `/users/me`.

use tracing::{debug, instrument};

use crate::http::BackendClient;
use crate::store::{MutationTracker, ResourceStore, StoreKey};
use crate::types::{UpdateUserPayload, User};

const ENDPOINT: &str = "/users/me";

/// Current profile with separate loading flags for the fetch and for
/// updates/deletion.
#[derive(Debug)]
pub struct CurrentUserProfile {
    client: BackendClient,
    store: ResourceStore<Option<User>>,
    mutations: MutationTracker,
}

impl CurrentUserProfile {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::CurrentProfile),
            mutations: MutationTracker::new(StoreKey::CurrentProfileMutations),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<Option<User>> {
        &self.store
    }

    #[must_use]
    pub const fn mutations(&self) -> &MutationTracker {
        &self.mutations
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) {
        if let Err(error) = self.store.load(self.client.get(ENDPOINT)).await {
            debug!(%error, "Profile fetch failed");
        }
    }

    /// Update the profile; the stored record is replaced on success.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, payload: &UpdateUserPayload) -> Option<User> {
        let user: User = self
            .mutations
            .handle(self.client.put(ENDPOINT, payload))
            .await?;
        self.store.set_data(Some(user.clone()));
        Some(user)
    }

    /// Delete the account; the stored record is cleared on success.
    #[instrument(skip(self))]
    pub async fn delete(&self) -> bool {
        let deleted = self
            .mutations
            .handle(self.client.delete(ENDPOINT))
            .await
            .is_some();
        if deleted {
            self.store.set_data(None);
        }
        deleted
    }
}
