//! Hosted identity provider (Supabase) glue.
//!
//! The provider owns sign-in; this module reads the signed-in identity,
//! builds the OAuth redirect, signs out, and makes sure every identity has a
//! row in the `users` table.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use trinket_store_core::{UserId, UserRole};
use uuid::Uuid;

use crate::config::IdentityConfig;

const FALLBACK_DISPLAY_NAME: &str = "Trinket customer";

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity provider is not configured")]
    NotConfigured,

    #[error("Identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity provider returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("User record was not returned after creation")]
    MissingRecord,
}

/// The signed-in identity as reported by `/auth/v1/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl Identity {
    /// Name to store on a new user record.
    #[must_use]
    pub fn display_name(&self) -> String {
        let from_metadata = |key: &str| {
            self.user_metadata
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        from_metadata("full_name")
            .or_else(|| from_metadata("name"))
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string())
    }
}

/// The `users` row linked to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "id_user")]
    pub user_id: UserId,
    /// Rows written before roles existed carry none; those are customers.
    #[serde(default)]
    pub role: UserRole,
}

// =============================================================================
// SupabaseIdentity
// =============================================================================

/// Client for the identity provider's auth and REST endpoints.
#[derive(Clone)]
pub struct SupabaseIdentity {
    inner: Arc<SupabaseIdentityInner>,
}

struct SupabaseIdentityInner {
    client: reqwest::Client,
    config: IdentityConfig,
}

impl std::fmt::Debug for SupabaseIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseIdentity")
            .field("url", &self.inner.config.url)
            .finish_non_exhaustive()
    }
}

impl SupabaseIdentity {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: IdentityConfig, timeout: Duration) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            inner: Arc::new(SupabaseIdentityInner { client, config }),
        })
    }

    /// Build from an optional configuration.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::NotConfigured` when `config` is `None`.
    pub fn from_config(
        config: Option<&IdentityConfig>,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let config = config.ok_or(IdentityError::NotConfigured)?;
        Self::new(config.clone(), timeout)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.config.url)
    }

    fn headers(&self, access_token: &str) -> Result<HeaderMap, IdentityError> {
        let invalid = |e: reqwest::header::InvalidHeaderValue| IdentityError::Rejected {
            status: 0,
            message: format!("Invalid header value: {e}"),
        };
        let mut headers = HeaderMap::new();
        let mut apikey = HeaderValue::from_str(self.inner.config.anon_key()).map_err(invalid)?;
        apikey.set_sensitive(true);
        headers.insert("apikey", apikey);
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {access_token}")).map_err(invalid)?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// URL that starts the Google OAuth flow and returns to `redirect_to`.
    #[must_use]
    pub fn oauth_authorize_url(&self, redirect_to: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("provider", "google")
            .append_pair("redirect_to", redirect_to)
            .append_pair("prompt", "select_account")
            .finish();
        format!("{}?{query}", self.endpoint("/auth/v1/authorize"))
    }

    /// Identity behind an access token. An expired or unknown token yields
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or an unexpected response.
    #[instrument(skip(self, access_token))]
    pub async fn current_user(
        &self,
        access_token: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("/auth/v1/user"))
            .headers(self.headers(access_token)?)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Access token was not accepted");
                Ok(None)
            }
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(rejected(status, response).await),
        }
    }

    /// End the provider session for `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success response.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/v1/logout"))
            .headers(self.headers(access_token)?)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(rejected(response.status(), response).await);
        }
        info!("Signed out of identity provider");
        Ok(())
    }

    /// Find the `users` row for `identity`, creating a customer row on first
    /// sign-in. The stored role is returned as is.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success response, or when
    /// the created row is not echoed back.
    #[instrument(skip(self, access_token, identity), fields(auth_id = %identity.id))]
    pub async fn ensure_user_record(
        &self,
        access_token: &str,
        identity: &Identity,
    ) -> Result<UserRecord, IdentityError> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("select", "id_user,role")
            .append_pair("auth_id", &format!("eq.{}", identity.id))
            .finish();
        let response = self
            .inner
            .client
            .get(format!("{}?{query}", self.endpoint("/rest/v1/users")))
            .headers(self.headers(access_token)?)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(rejected(response.status(), response).await);
        }
        let existing: Vec<UserRecord> = response.json().await?;
        if let Some(record) = existing.first() {
            debug!(user_id = %record.user_id, role = %record.role, "User record exists");
            return Ok(*record);
        }

        let body = json!({
            "auth_id": identity.id,
            "nome_user": identity.display_name(),
            "role": UserRole::Customer.as_str(),
            "email": identity.email,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });
        let response = self
            .inner
            .client
            .post(self.endpoint("/rest/v1/users"))
            .headers(self.headers(access_token)?)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(rejected(response.status(), response).await);
        }
        let created: Vec<UserRecord> = response.json().await?;
        let record = created.first().copied().ok_or(IdentityError::MissingRecord)?;
        info!(user_id = %record.user_id, "Created user record for new identity");
        Ok(record)
    }
}

async fn rejected(status: StatusCode, response: reqwest::Response) -> IdentityError {
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| body.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| text.chars().take(200).collect());
    warn!(status = status.as_u16(), message = %message, "Identity provider rejected request");
    IdentityError::Rejected {
        status: status.as_u16(),
        message,
    }
}
