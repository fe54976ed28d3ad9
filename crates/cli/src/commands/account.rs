//! Account commands.

use std::io::Write;

use shopeasy_storefront::error::AppError;
use shopeasy_storefront::services::auth::AuthError;
use shopeasy_storefront::state::Storefront;

/// Log in and print the account profile.
pub async fn whoami(store: &Storefront) -> Result<(), AppError> {
    let profile = super::login_if_configured(store)
        .await?
        .ok_or(AuthError::NotAuthenticated)?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "{} (#{})", profile.display_name(), profile.id)?;
    writeln!(out, "username: {}", profile.username)?;
    if !profile.email.is_empty() {
        writeln!(out, "email:    {}", profile.email)?;
    }
    if profile.is_admin() {
        writeln!(out, "role:     administrator")?;
    }
    Ok(())
}
