//! Integration tests for the `ShopEasy` storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopeasy-integration-tests
//! ```
//!
//! No external services are needed: engine tests drive in-memory fakes and
//! HTTP tests run against an `axum` stub of the backend on a loopback port.
//!
//! # Support
//!
//! - [`fakes`] - scriptable [`RemoteCart`](shopeasy_storefront::cart::RemoteCart)
//!   and sample catalog
//! - [`stub`] - stub backend speaking the storefront REST API

pub mod fakes;
pub mod stub;
