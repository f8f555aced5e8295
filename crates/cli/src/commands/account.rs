//! Sign-in, sign-out and identity commands.

use trinket_store_client::AppContext;
use trinket_store_client::types::LoginCredentials;

use super::{CommandError, save_session};

/// Sign in as an administrator.
pub async fn login(
    context: &AppContext,
    email: String,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = password
        .or_else(|| std::env::var("TRINKET_PASSWORD").ok())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| CommandError::InvalidArgument("A password is required".to_string()))?;

    let user = context
        .auth
        .login(&LoginCredentials { email, password })
        .await?;
    save_session(context).await?;
    context.sync_cart_owner().await;
    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn logout(context: &AppContext) -> Result<(), CommandError> {
    context.sign_out().await;
    save_session(context).await?;
    println!("Signed out");
    Ok(())
}

pub async fn whoami(context: &AppContext) {
    match context.session().user().await {
        Some(user) => println!(
            "{} <{}> ({}, id {})",
            user.name,
            user.email,
            user.role.as_str(),
            user.user_id
        ),
        None => println!("Not signed in; using the guest cart"),
    }
}

pub fn oauth_url(context: &AppContext, redirect_to: &str) -> Result<(), CommandError> {
    let identity = context
        .identity()
        .ok_or(trinket_store_client::IdentityError::NotConfigured)?;
    println!("{}", identity.oauth_authorize_url(redirect_to));
    Ok(())
}

/// Adopt an identity-provider access token as the session.
pub async fn identity_sign_in(
    context: &AppContext,
    access_token: &str,
) -> Result<(), CommandError> {
    let user = context
        .sign_in_with_identity(access_token)
        .await?
        .ok_or_else(|| {
            CommandError::InvalidArgument("The access token was not accepted".to_string())
        })?;
    save_session(context).await?;
    println!("Signed in as {} (id {})", user.name, user.user_id);
    Ok(())
}
