use serde::{Deserialize, Serialize};
use trinket_store_core::fields::{is_valid_name, trim_and_collapse};
use trinket_store_core::{Email, UserRole};

use super::User;
use crate::error::ApiError;

/// Email/password credentials for `/auth/signin`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body for `/auth/signup`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SignUpRequest {
    /// Lowercase the email and collapse whitespace in the name.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`ApiError`] for a malformed email or a name that is
    /// not 2-100 letters.
    pub fn normalized(&self) -> Result<Self, ApiError> {
        let email = Email::parse(&self.email)
            .map_err(|e| ApiError::validation(format!("Invalid email: {e}.")))?;
        let name = trim_and_collapse(&self.name);
        if !is_valid_name(Some(name.as_str())) {
            return Err(ApiError::validation(
                "Name must have between 2 and 100 letters.",
            ));
        }
        Ok(Self {
            email: email.into_inner(),
            password: self.password.clone(),
            name,
            role: self.role,
        })
    }
}

/// Response of `/auth/signin` and `/auth/signup`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: User,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = LoginCredentials {
            email: "ana@trinket.store".to_string(),
            password: "hunter2".to_string(),
        };
        let debug_output = format!("{credentials:?}");
        assert!(debug_output.contains("ana@trinket.store"));
        assert!(!debug_output.contains("hunter2"));
    }

    fn sign_up(email: &str, name: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: "s3cret".to_string(),
            name: name.to_string(),
            role: UserRole::Customer,
        }
    }

    #[test]
    fn test_sign_up_normalized() {
        let clean = sign_up(" Bruno.Lima@Gmail.com ", " Bruno   Lima ")
            .normalized()
            .unwrap();
        assert_eq!(clean.email, "bruno.lima@gmail.com");
        assert_eq!(clean.name, "Bruno Lima");
    }

    #[test]
    fn test_sign_up_rejects_bad_fields() {
        let bad_email = sign_up("bruno@localhost", "Bruno Lima")
            .normalized()
            .unwrap_err();
        assert_eq!(bad_email.status, Some(400));
        assert!(bad_email.message.starts_with("Invalid email"));

        let bad_name = sign_up("bruno@gmail.com", "B2").normalized().unwrap_err();
        assert_eq!(bad_name.status, Some(400));
    }
}
