//! User list, details and mutations.

use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use trinket_store_core::{UserId, UserRole};

use crate::filter::{Choice, ListFilter, contains_ci};
use crate::http::{BackendClient, RequestOptions};
use crate::store::{MutationTracker, ResourceState, ResourceStore, StoreKey};
use crate::types::{AuthResponse, SignUpRequest, UpdateUserPayload, User};

/// Whether the user has an email on file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    #[default]
    All,
    With,
    Without,
}

/// How recently the user was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recency {
    #[default]
    All,
    Last7Days,
    Last30Days,
}

impl Recency {
    fn window(self) -> Option<Duration> {
        match self {
            Self::All => None,
            Self::Last7Days => Some(Duration::days(7)),
            Self::Last30Days => Some(Duration::days(30)),
        }
    }
}

/// Filters for the user list. `search` and `role` are also sent to the
/// backend as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilters {
    /// Substring of the name or the email.
    pub search: String,
    pub role: Choice<UserRole>,
    pub email_status: EmailStatus,
    pub recency: Recency,
}

impl UserFilters {
    /// Match against a fixed clock. Users whose creation date cannot be
    /// parsed always pass the recency check.
    #[must_use]
    pub fn matches_at(&self, user: &User, now: DateTime<Utc>) -> bool {
        let matches_search = self.search.trim().is_empty()
            || contains_ci(&user.name, &self.search)
            || user
                .email
                .as_deref()
                .is_some_and(|email| contains_ci(email, &self.search));
        let matches_email = match self.email_status {
            EmailStatus::All => true,
            EmailStatus::With => user.has_email(),
            EmailStatus::Without => !user.has_email(),
        };
        let matches_recency = match (self.recency.window(), user.created_at()) {
            (Some(window), Some(created_at)) => now - created_at <= window,
            _ => true,
        };
        matches_search && self.role.admits(&user.role) && matches_email && matches_recency
    }

    fn query(&self, mut options: RequestOptions) -> RequestOptions {
        let search = self.search.trim();
        if !search.is_empty() {
            options = options.query("search", search);
        }
        if let Choice::Only(role) = self.role {
            options = options.query("role", role.as_str());
        }
        options
    }
}

impl ListFilter<User> for UserFilters {
    fn matches(&self, user: &User) -> bool {
        self.matches_at(user, Utc::now())
    }
}

/// `GET /users?search=&role=` with client-side filtering.
#[derive(Debug)]
pub struct UsersList {
    client: BackendClient,
    store: ResourceStore<Vec<User>, UserFilters>,
}

impl UsersList {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::UsersList),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<Vec<User>, UserFilters> {
        &self.store
    }

    #[must_use]
    pub fn state(&self) -> ResourceState<Vec<User>, UserFilters> {
        self.store.snapshot()
    }

    #[instrument(skip(self, filters))]
    pub async fn fetch(&self, filters: Option<UserFilters>) {
        if let Some(filters) = filters {
            self.store.set_filters(filters);
        }
        let options = self.store.filters().query(RequestOptions::new(Method::GET));
        if let Err(error) = self.store.load(self.client.call("/users", options)).await {
            debug!(%error, "Users fetch failed");
        }
    }

    pub fn set_filters(&self, filters: UserFilters) {
        self.store.set_filters(filters);
    }

    #[must_use]
    pub fn filtered(&self) -> Vec<User> {
        let state = self.store.snapshot();
        state.filters.apply(&state.data)
    }
}

/// `GET /users/{id}`.
#[derive(Debug)]
pub struct UserDetails {
    client: BackendClient,
    store: ResourceStore<Option<User>>,
}

impl UserDetails {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            store: ResourceStore::new(StoreKey::UserDetails),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ResourceStore<Option<User>> {
        &self.store
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, id: UserId) {
        if !id.is_valid() {
            return;
        }
        let endpoint = format!("/users/{id}");
        if let Err(error) = self.store.load(self.client.get(&endpoint)).await {
            debug!(%error, "User fetch failed");
        }
    }

    pub fn reset(&self) {
        self.store.reset();
    }
}

/// User mutations. Each returns `None` on failure.
#[derive(Debug)]
pub struct UserMutations {
    client: BackendClient,
    tracker: MutationTracker,
}

impl UserMutations {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            tracker: MutationTracker::new(StoreKey::UserMutations),
        }
    }

    #[must_use]
    pub const fn tracker(&self) -> &MutationTracker {
        &self.tracker
    }

    /// Create a user through `/auth/signup` and return the new record.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(&self, request: &SignUpRequest) -> Option<User> {
        self.tracker
            .handle(async {
                let request = request.normalized()?;
                self.client
                    .post::<_, AuthResponse>("/auth/signup", &request)
                    .await
            })
            .await
            .map(|response| response.user)
    }

    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: UserId, payload: &UpdateUserPayload) -> Option<User> {
        let endpoint = format!("/users/{id}");
        self.tracker.handle(self.client.put(&endpoint, payload)).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Option<()> {
        let endpoint = format!("/users/{id}");
        self.tracker.handle(self.client.delete(&endpoint)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(id: i64, name: &str, email: Option<&str>, role: UserRole, created_at: &str) -> User {
        User {
            id: UserId::new(id),
            auth_id: None,
            name: name.to_string(),
            role,
            email: email.map(ToString::to_string),
            created_at: Some(created_at.to_string()),
            updated_at: None,
        }
    }

    fn users() -> Vec<User> {
        vec![
            user(
                1,
                "Ana Souza",
                Some("ana@trinket.store"),
                UserRole::Admin,
                "2025-03-28T12:00:00Z",
            ),
            user(2, "Bruno Lima", None, UserRole::Customer, "2025-03-10T12:00:00Z"),
            user(
                3,
                "Carla Dias",
                Some("carla@mail.com"),
                UserRole::Customer,
                "2024-12-01T12:00:00Z",
            ),
            user(4, "Davi Reis", Some(""), UserRole::Customer, "not a date"),
        ]
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap()
    }

    fn ids(filters: &UserFilters) -> Vec<i64> {
        users()
            .iter()
            .filter(|u| filters.matches_at(u, now()))
            .map(|u| u.id.as_i64())
            .collect()
    }

    #[test]
    fn test_search_covers_name_and_email() {
        let filters = UserFilters {
            search: "MAIL.COM".to_string(),
            ..UserFilters::default()
        };
        assert_eq!(ids(&filters), vec![3]);

        let filters = UserFilters {
            search: "bruno".to_string(),
            ..UserFilters::default()
        };
        assert_eq!(ids(&filters), vec![2]);
    }

    #[test]
    fn test_email_status() {
        let with = UserFilters {
            email_status: EmailStatus::With,
            ..UserFilters::default()
        };
        assert_eq!(ids(&with), vec![1, 3]);

        let without = UserFilters {
            email_status: EmailStatus::Without,
            ..UserFilters::default()
        };
        assert_eq!(ids(&without), vec![2, 4]);
    }

    #[test]
    fn test_recency_keeps_unparseable_dates() {
        let week = UserFilters {
            recency: Recency::Last7Days,
            ..UserFilters::default()
        };
        assert_eq!(ids(&week), vec![1, 4]);

        let month = UserFilters {
            recency: Recency::Last30Days,
            ..UserFilters::default()
        };
        assert_eq!(ids(&month), vec![1, 2, 4]);
    }

    #[test]
    fn test_role_filter() {
        let filters = UserFilters {
            role: Choice::Only(UserRole::Admin),
            ..UserFilters::default()
        };
        assert_eq!(ids(&filters), vec![1]);
    }

    #[test]
    fn test_query_parameters() {
        let filters = UserFilters {
            search: "  ana ".to_string(),
            role: Choice::Only(UserRole::Customer),
            ..UserFilters::default()
        };
        let options = filters.query(RequestOptions::new(Method::GET));
        assert_eq!(
            options.query,
            vec![
                ("search".to_string(), "ana".to_string()),
                ("role".to_string(), "customer".to_string()),
            ]
        );
        assert!(UserFilters::default().query(RequestOptions::default()).query.is_empty());
    }
}
