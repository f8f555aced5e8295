//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TRINKET_BACKEND_URL` - Base URL of the REST backend (e.g. `https://api.trinket.store`)
//!
//! ## Optional
//! - `TRINKET_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `TRINKET_DATA_DIR` - Directory for cart snapshots and the session file
//!   (default: `.trinket-store`)
//! - `SUPABASE_URL` - Identity provider project URL
//! - `SUPABASE_ANON_KEY` - Identity provider public API key (required when `SUPABASE_URL` is set)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DATA_DIR: &str = ".trinket-store";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without a trailing slash
    pub backend_url: String,
    /// Timeout applied to every backend request
    pub request_timeout: Duration,
    /// Directory holding cart snapshots and the CLI session
    pub data_dir: PathBuf,
    /// Identity provider configuration, when enabled
    pub identity: Option<IdentityConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Identity provider (Supabase) configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Project URL (e.g. `https://abc.supabase.co`)
    pub url: String,
    /// Public anon key sent as the `apikey` header
    pub anon_key: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl IdentityConfig {
    /// Expose the anon key for request headers.
    #[must_use]
    pub fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend_url = normalize_base_url(
            "TRINKET_BACKEND_URL",
            &get_required_env("TRINKET_BACKEND_URL")?,
        )?;
        let timeout_secs = get_env_or_default(
            "TRINKET_REQUEST_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("TRINKET_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        let data_dir = PathBuf::from(get_env_or_default("TRINKET_DATA_DIR", DEFAULT_DATA_DIR));
        let identity = IdentityConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            backend_url,
            request_timeout: Duration::from_secs(timeout_secs),
            data_dir,
            identity,
            sentry_dsn,
        })
    }

    /// Build a configuration for a backend URL with every other setting at
    /// its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn for_backend(backend_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            backend_url: normalize_base_url("backend_url", backend_url)?,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            identity: None,
            sentry_dsn: None,
        })
    }

    /// Directory holding persisted cart snapshots.
    #[must_use]
    pub fn cart_dir(&self) -> PathBuf {
        self.data_dir.join("carts")
    }

    /// File holding the persisted session cookies.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(url) = get_optional_env("SUPABASE_URL").filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        let url = normalize_base_url("SUPABASE_URL", &url)?;
        let anon_key = get_required_env("SUPABASE_ANON_KEY")?;
        Ok(Some(Self {
            url,
            anon_key: SecretString::from(anon_key),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate an absolute http(s) URL and strip any trailing slash so that
/// endpoint paths can be appended directly.
fn normalize_base_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
