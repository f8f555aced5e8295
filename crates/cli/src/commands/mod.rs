//! Command implementations.

pub mod account;
pub mod admin;
pub mod shop;

use thiserror::Error;
use trinket_store_client::{
    ApiError, AppContext, AuthError, ClientConfig, ContextError, IdentityError, SessionCookies,
};
use trinket_store_client::storefront::CheckoutError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Session file error: {0}")]
    Session(#[from] std::io::Error),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Sign in first")]
    NotSignedIn,
}

/// Build the context and restore the session saved by a previous run.
///
/// # Errors
///
/// Returns an error if the context cannot be built or the session file is
/// unreadable.
pub async fn open(config: ClientConfig) -> Result<AppContext, CommandError> {
    let session_file = config.session_file();
    let context = AppContext::from_config(config)?;
    let cookies = SessionCookies::load(&session_file)?;
    context.session().restore(&cookies).await;
    let owner = context.sync_cart_owner().await;
    tracing::debug!(%owner, "Session restored");
    Ok(context)
}

/// Persist the session for the next run.
///
/// # Errors
///
/// Returns an error if the session file cannot be written.
pub async fn save_session(context: &AppContext) -> Result<(), CommandError> {
    let cookies = context.session().export().await;
    cookies.save(&context.config().session_file())?;
    Ok(())
}

/// Fail with the error a store recorded, if any.
fn check(error: Option<ApiError>) -> Result<(), CommandError> {
    error.map_or(Ok(()), |error| Err(error.into()))
}

fn money(cents: Option<i64>) -> String {
    cents.map_or_else(
        || "-".to_string(),
        |cents| {
            trinket_store_core::Price::from_cents(cents, trinket_store_core::CurrencyCode::BRL)
                .display()
        },
    )
}
