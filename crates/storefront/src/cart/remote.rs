//! The remote cart seam.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use shopeasy_core::ProductId;

/// Errors reported by a remote cart call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteCartError {
    /// Missing or rejected credential.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// The cart service asked the client to slow down.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The cart service refused the delta.
    #[error("rejected by cart service: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// The call never produced an answer (connection, transport, decoding).
    #[error("cart service unreachable: {0}")]
    Transport(String),
}

impl RemoteCartError {
    /// Whether sending the same delta later could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited(_) | Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Unauthorized(_) => false,
        }
    }
}

/// Server-side cart keyed by the authenticated account.
///
/// Both calls express a delta, never an absolute quantity, and are not
/// assumed idempotent.
#[async_trait]
pub trait RemoteCart: Send + Sync {
    /// Add `quantity` units of `product_id`.
    async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RemoteCartError>;

    /// Remove `quantity` units of `product_id`.
    async fn remove_from_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RemoteCartError>;
}

#[async_trait]
impl<T: RemoteCart + ?Sized> RemoteCart for Arc<T> {
    async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RemoteCartError> {
        (**self).add_to_cart(product_id, quantity).await
    }

    async fn remove_from_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RemoteCartError> {
        (**self).remove_from_cart(product_id, quantity).await
    }
}
