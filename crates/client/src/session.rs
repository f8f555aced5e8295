//! Bearer token and signed-in profile shared by every request.
//!
//! The profile travels as a cookie holding `base64(urlencode(json))`; the
//! token is kept as a [`SecretString`] and only exposed when a request header
//! is built.

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use trinket_store_core::{UserId, UserRole};

/// Profile of the signed-in user, as stored in the profile cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(rename = "usuarioKey")]
    pub user_id: UserId,
    #[serde(rename = "usuario")]
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl SessionUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Encode a profile as a cookie value.
#[must_use]
pub fn encode_profile_cookie(user: &SessionUser) -> String {
    serde_json::to_string(user)
        .map(|json| STANDARD.encode(urlencoding::encode(&json).as_bytes()))
        .unwrap_or_default()
}

/// Decode a profile cookie. Anything malformed decodes to `None`.
#[must_use]
pub fn decode_profile_cookie(value: &str) -> Option<SessionUser> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let bytes = STANDARD
        .decode(value)
        .inspect_err(|e| tracing::debug!(error = %e, "Profile cookie is not base64"))
        .ok()?;
    let encoded = String::from_utf8(bytes).ok()?;
    let json = urlencoding::decode(&encoded).ok()?;
    serde_json::from_str(&json)
        .inspect_err(|e| tracing::debug!(error = %e, "Profile cookie has an unexpected shape"))
        .ok()
}

/// Serialized session, as persisted between CLI runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookies {
    pub auth_token: Option<String>,
    pub user_data: Option<String>,
}

impl SessionCookies {
    /// Read cookies from a JSON file. A missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(std::io::Error::other),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Write cookies to a JSON file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, raw)
    }
}

// =============================================================================
// Session
// =============================================================================

/// Shared session state. Cloning is cheap and clones share state.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Default)]
struct SessionInner {
    token: RwLock<Option<SecretString>>,
    user: RwLock<Option<SessionUser>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_token(&self, token: Option<SecretString>) {
        *self.inner.token.write().await = token;
    }

    /// Token value for the `Authorization` header.
    pub async fn bearer(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .await
            .as_ref()
            .map(|token| token.expose_secret().to_string())
            .filter(|token| !token.is_empty())
    }

    pub async fn set_user(&self, user: Option<SessionUser>) {
        *self.inner.user.write().await = user;
    }

    pub async fn user(&self) -> Option<SessionUser> {
        self.inner.user.read().await.clone()
    }

    /// Forget token and profile.
    pub async fn clear(&self) {
        self.set_token(None).await;
        self.set_user(None).await;
    }

    /// Token and profile are both present.
    pub async fn is_authenticated(&self) -> bool {
        self.bearer().await.is_some() && self.inner.user.read().await.is_some()
    }

    pub async fn is_admin(&self) -> bool {
        self.inner
            .user
            .read()
            .await
            .as_ref()
            .is_some_and(SessionUser::is_admin)
    }

    /// Snapshot the session as cookie values.
    pub async fn export(&self) -> SessionCookies {
        SessionCookies {
            auth_token: self.bearer().await,
            user_data: self.user().await.as_ref().map(encode_profile_cookie),
        }
    }

    /// Restore a session from cookie values. A malformed profile cookie
    /// leaves the profile empty.
    pub async fn restore(&self, cookies: &SessionCookies) {
        let token = cookies
            .auth_token
            .clone()
            .filter(|t| !t.is_empty())
            .map(SecretString::from);
        self.set_token(token).await;
        let user = cookies
            .user_data
            .as_deref()
            .and_then(decode_profile_cookie);
        self.set_user(user).await;
    }
}
