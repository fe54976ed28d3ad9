//! REST API bindings for the storefront backend.
//!
//! # Architecture
//!
//! - One shared [`ApiClient`] (`reqwest`) carries the base URL, the request
//!   timeout and the [`AuthSession`](crate::models::AuthSession) credential
//! - The backend is the source of truth - no local persistence
//! - Catalog responses are cached in memory via `moka`; cart calls never are
//!
//! # Endpoints
//!
//! - `produtos/`, `produtos/{id}/`, `categorias/` - read-only catalog
//! - `carrinhos/adicionar-item/`, `carrinhos/remover-item/` - cart deltas
//! - `token/`, `token/refresh/`, `me/` - JWT authentication
//!
//! # Example
//!
//! ```rust,ignore
//! use shopeasy_storefront::api::{ApiClient, CatalogClient, HttpRemoteCart};
//!
//! let api = ApiClient::new(&config.api, auth.clone())?;
//! let catalog = CatalogClient::new(api.clone(), config.catalog_cache_ttl);
//!
//! let dresses = catalog.list_products(&ProductFilter::category("vestidos")).await?;
//! let remote = HttpRemoteCart::new(api);
//! ```

mod cache;
mod cart;
mod catalog;
mod client;
mod conversions;
pub mod types;

pub use cart::HttpRemoteCart;
pub use catalog::{CatalogClient, ProductFilter};
pub use client::ApiClient;

use thiserror::Error;

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint path could not be joined to the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Missing or rejected credential (401/403).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A record parsed but violates a domain rule (e.g., negative price).
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl ApiError {
    /// Whether retrying the same request later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Keep at most `limit` characters of a response body for errors and logs.
fn truncate_body(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}
