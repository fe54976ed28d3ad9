//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for the storefront client. Callers
//! that give up on an error hand it to [`AppError::report`], which captures
//! unexpected failures to Sentry.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::{CartSyncError, RemoteCartError};
use crate::config::ConfigError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storefront API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed; the cart is unchanged.
    #[error("Cart error: {0}")]
    Cart(#[from] CartSyncError),

    /// Terminal input or output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether this is a failure worth an error report, as opposed to
    /// something the user can fix (bad credentials, missing settings).
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        match self {
            Self::Config(_) => false,
            Self::Auth(err) => matches!(err, AuthError::Api(_)),
            Self::Cart(err) => !matches!(
                err,
                CartSyncError::Remote {
                    source: RemoteCartError::Unauthorized(_),
                    ..
                }
            ),
            Self::Api(err) => !matches!(err, ApiError::Unauthorized(_)),
            Self::Io(_) => true,
        }
    }

    /// Whether the same operation could succeed if tried again later
    /// (rate limiting, 5xx responses, dropped connections, timeouts).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api(err) | Self::Auth(AuthError::Api(err)) => err.is_transient(),
            Self::Cart(CartSyncError::Timeout { .. }) => true,
            Self::Cart(CartSyncError::Remote { source, .. }) => source.is_transient(),
            Self::Config(_) | Self::Auth(_) | Self::Cart(_) | Self::Io(_) => false,
        }
    }

    /// Log the error and capture unexpected failures to Sentry.
    pub fn report(&self) {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::warn!(error = %self, "Operation failed");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "42")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shopeasy_core::ProductId;

    use super::*;
    use crate::cart::CartDelta;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config(ConfigError::MissingEnvVar("SHOPEASY_API_URL".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: SHOPEASY_API_URL"
        );
    }

    #[test]
    fn test_user_errors_are_not_reported() {
        assert!(!AppError::Auth(AuthError::InvalidCredentials).is_unexpected());
        assert!(!AppError::Api(ApiError::Unauthorized("expired".to_string())).is_unexpected());
        assert!(
            !AppError::Cart(CartSyncError::Remote {
                delta: CartDelta::Add,
                product_id: ProductId::new(1),
                quantity: 1,
                source: RemoteCartError::Unauthorized("no token".to_string()),
            })
            .is_unexpected()
        );
    }

    #[test]
    fn test_service_failures_are_reported() {
        assert!(
            AppError::Cart(CartSyncError::Timeout {
                delta: CartDelta::Remove,
                product_id: ProductId::new(1),
                quantity: 2,
                after: Duration::from_secs(10),
            })
            .is_unexpected()
        );
        assert!(AppError::Api(ApiError::RateLimited(3)).is_unexpected());
    }

    #[test]
    fn test_transient_failures_can_be_retried() {
        assert!(AppError::Api(ApiError::RateLimited(3)).is_transient());
        assert!(AppError::Auth(AuthError::Api(ApiError::RateLimited(3))).is_transient());
        assert!(
            AppError::Cart(CartSyncError::Timeout {
                delta: CartDelta::Add,
                product_id: ProductId::new(1),
                quantity: 1,
                after: Duration::from_secs(10),
            })
            .is_transient()
        );
        assert!(
            AppError::Cart(CartSyncError::Remote {
                delta: CartDelta::Add,
                product_id: ProductId::new(1),
                quantity: 1,
                source: RemoteCartError::Transport("connection reset".to_string()),
            })
            .is_transient()
        );
    }

    #[test]
    fn test_permanent_failures_are_not_retried() {
        assert!(!AppError::Auth(AuthError::InvalidCredentials).is_transient());
        assert!(!AppError::Api(ApiError::NotFound("produtos/9/".to_string())).is_transient());
        assert!(
            !AppError::Cart(CartSyncError::Remote {
                delta: CartDelta::Add,
                product_id: ProductId::new(13),
                quantity: 1,
                source: RemoteCartError::Rejected {
                    status: 400,
                    message: "Produto sem estoque".to_string(),
                },
            })
            .is_transient()
        );
    }
}
