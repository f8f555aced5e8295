//! Administrator sign-in against `/auth/signin`.

use reqwest::Method;
use secrecy::SecretString;
use serde_json::json;
use thiserror::Error;
use tracing::{info, instrument};
use trinket_store_core::{Email, UserRole};

use crate::error::ApiError;
use crate::http::{BackendClient, RequestOptions};
use crate::session::{Session, SessionUser};
use crate::types::{AuthResponse, LoginCredentials};

/// Errors from admin authentication.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Sign-in failed; the message is ready to show.
    #[error("{0}")]
    Login(String),

    /// The credentials belong to a customer account.
    #[error("Customer accounts cannot access the admin area")]
    CustomerAccess,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Administrator access required")]
    Forbidden,
}

/// Message for a failed sign-in: backend message first, then by status.
/// A failure without any status is treated as a server error.
#[must_use]
pub fn login_error_message(error: &ApiError) -> String {
    if let Some(message) = error.backend_message() {
        return message.to_string();
    }
    match error.status.unwrap_or(500) {
        401 => "Incorrect email or password.",
        400 => "Invalid data. Check the fields and try again.",
        500.. => "Server error. Please try again later.",
        _ => "Could not sign in. Please try again.",
    }
    .to_string()
}

/// Admin login, logout and route guard.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    client: BackendClient,
}

impl AdminAuth {
    #[must_use]
    pub const fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn session(&self) -> &Session {
        self.client.session()
    }

    /// Sign in and store token and profile in the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Login` with a display message when the email is
    /// malformed (no request is sent) or the backend rejects the request,
    /// or `AuthError::CustomerAccess` when the account is not an
    /// administrator. The session is left untouched on error.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<SessionUser, AuthError> {
        let email = Email::parse(&credentials.email)
            .map_err(|_| AuthError::Login("Enter a valid email address.".to_string()))?;
        let body = json!({
            "email": email.as_str(),
            "password": credentials.password,
        });
        let options = RequestOptions::new(Method::POST).body(body).silent();
        let response: AuthResponse = self
            .client
            .call("/auth/signin", options)
            .await
            .map_err(|e| AuthError::Login(login_error_message(&e)))?;

        if response.user.role != UserRole::Admin {
            return Err(AuthError::CustomerAccess);
        }

        let user = SessionUser {
            user_id: response.user.id,
            name: response.user.name.clone(),
            email: response
                .user
                .email
                .clone()
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| email.into_inner()),
            role: response.user.role,
        };
        self.session()
            .set_token(Some(SecretString::from(response.access_token)))
            .await;
        self.session().set_user(Some(user.clone())).await;
        info!(user_id = %user.user_id, "Administrator signed in");
        Ok(user)
    }

    /// Forget token and profile.
    pub async fn logout(&self) {
        self.session().clear().await;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session().is_authenticated().await
    }

    pub async fn is_admin(&self) -> bool {
        self.session().is_admin().await
    }

    /// Guard for admin-only operations.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` without a token and profile, or
    /// `AuthError::Forbidden` when the profile is not an administrator.
    pub async fn require_admin(&self) -> Result<SessionUser, AuthError> {
        if !self.is_authenticated().await {
            return Err(AuthError::NotAuthenticated);
        }
        match self.session().user().await {
            Some(user) if user.is_admin() => Ok(user),
            _ => Err(AuthError::Forbidden),
        }
    }
}
