//! Subcommand implementations.
//!
//! Command output goes to stdout; diagnostics go through `tracing` (stderr).

pub mod account;
pub mod cart;
pub mod catalog;

use shopeasy_storefront::error::AppError;
use shopeasy_storefront::models::UserProfile;
use shopeasy_storefront::state::Storefront;

/// Log in when credentials are configured.
///
/// Returns `None` when no credentials are set; catalog reads still work
/// anonymously but the cart needs an account.
async fn login_if_configured(store: &Storefront) -> Result<Option<UserProfile>, AppError> {
    let Some(credentials) = store.config().credentials.as_ref() else {
        return Ok(None);
    };

    let profile = store.auth_service().login_with(credentials).await?;
    Ok(Some(profile))
}
