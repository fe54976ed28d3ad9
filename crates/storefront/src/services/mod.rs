//! Business logic services for the storefront client.
//!
//! # Services
//!
//! - `auth` - JWT login, refresh and profile lookup

pub mod auth;
