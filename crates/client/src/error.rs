//! Normalized backend errors.
//!
//! Every failure a request can produce is first captured as a
//! [`FetchFailure`] (one variant per source) and then converted, through a
//! single [`FetchFailure::normalize`], into the [`ApiError`] that stores keep
//! and notifications display.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Message used when neither the backend nor the status table has one.
pub const GENERIC_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Notification title used when the status has no dedicated title.
pub const GENERIC_TITLE: &str = "Something went wrong";

/// Uniform error shape exposed to callers.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status, with every 5xx folded into 500. `None` when no response
    /// was received.
    pub status: Option<u16>,
    /// Human readable message.
    pub message: String,
    /// Raw backend body or failure cause.
    pub details: Option<Value>,
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    Server,
    /// No status at all: network failure or a client-side problem.
    Network,
    /// A status outside the known taxonomy.
    Other,
}

impl ApiError {
    /// Create an error from its parts.
    #[must_use]
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// A 400 raised before any request was sent.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(Some(400), message)
    }

    /// Classify the error by status.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self.status {
            None => ErrorKind::Network,
            Some(400) => ErrorKind::Validation,
            Some(401) => ErrorKind::Authentication,
            Some(403) => ErrorKind::Authorization,
            Some(404) => ErrorKind::NotFound,
            Some(409) => ErrorKind::Conflict,
            Some(500..) => ErrorKind::Server,
            Some(_) => ErrorKind::Other,
        }
    }

    /// Notification title for this error.
    #[must_use]
    pub fn title(&self) -> &'static str {
        status_title(self.status)
    }

    /// The message the backend put in its error body, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        self.details.as_ref().and_then(body_message)
    }
}

/// Fold every 5xx status into the single 500 bucket.
#[must_use]
pub const fn bucket_status(status: u16) -> u16 {
    if status >= 500 { 500 } else { status }
}

/// Fallback message for a (bucketed) status.
#[must_use]
pub const fn status_message(status: Option<u16>) -> Option<&'static str> {
    match status {
        Some(400) => Some("Please check the information provided and try again."),
        Some(401) => Some("Your session has expired. Please sign in again."),
        Some(403) => Some("You do not have permission to perform this action."),
        Some(404) => Some("The requested resource was not found."),
        Some(409) => Some("A record with this information already exists."),
        Some(500) => Some("We are experiencing instability. Please try again shortly."),
        _ => None,
    }
}

/// Notification title for a (bucketed) status.
#[must_use]
pub const fn status_title(status: Option<u16>) -> &'static str {
    match status {
        Some(400) => "Invalid data",
        Some(401) => "Session expired",
        Some(403) => "Access denied",
        Some(404) => "Not found",
        Some(409) => "Data conflict",
        Some(500) => "Internal error",
        _ => GENERIC_TITLE,
    }
}

/// Backend error bodies carry either `message` or `error`.
fn body_message(body: &Value) -> Option<&str> {
    ["message", "error"]
        .into_iter()
        .filter_map(|field| body.get(field).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
}

// =============================================================================
// FetchFailure
// =============================================================================

/// A raw failure, tagged by where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchFailure {
    /// The backend answered with a non-2xx status.
    Http {
        status: u16,
        /// Parsed JSON body, or the raw text as a JSON string.
        body: Option<Value>,
    },
    /// No response was received (connection refused, timeout, TLS).
    Network(String),
    /// A 2xx response whose body did not match the expected shape.
    Decode(String),
    /// Anything else: request construction, encoding, ad-hoc failures.
    Other {
        message: Option<String>,
        details: Option<Value>,
    },
}

impl FetchFailure {
    /// Build an HTTP failure from a status and the raw response text.
    #[must_use]
    pub fn http(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(text)
                    .unwrap_or_else(|_| Value::String(text.to_string())),
            )
        };
        Self::Http { status, body }
    }

    /// Build a failure that carries only a message.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: Some(message.into()),
            details: None,
        }
    }

    /// Convert into the uniform [`ApiError`].
    ///
    /// Message priority: backend message, then the status table, then the
    /// generic fallback.
    #[must_use]
    pub fn normalize(self) -> ApiError {
        match self {
            Self::Http { status, body } => {
                let status = bucket_status(status);
                let message = body
                    .as_ref()
                    .and_then(body_message)
                    .map(ToString::to_string)
                    .or_else(|| status_message(Some(status)).map(ToString::to_string))
                    .unwrap_or_else(|| GENERIC_MESSAGE.to_string());
                ApiError {
                    status: Some(status),
                    message,
                    details: body,
                }
            }
            Self::Network(cause) => ApiError {
                status: None,
                message: GENERIC_MESSAGE.to_string(),
                details: Some(Value::String(cause)),
            },
            Self::Decode(cause) => ApiError {
                status: None,
                message: GENERIC_MESSAGE.to_string(),
                details: Some(Value::String(cause)),
            },
            Self::Other { message, details } => ApiError {
                status: None,
                message: message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_MESSAGE.to_string()),
                details,
            },
        }
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            Self::Http {
                status: status.as_u16(),
                body: None,
            }
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<FetchFailure> for ApiError {
    fn from(failure: FetchFailure) -> Self {
        failure.normalize()
    }
}
