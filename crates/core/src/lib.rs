//! ShopEasy Core - Shared types library.
//!
//! This crate provides the domain types used across the ShopEasy client:
//! - `storefront` - Catalog, authentication and cart bindings plus the cart sync engine
//! - `cli` - Command-line storefront that drives the engine
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async.
//! The cart mirror lives here because its invariants are pure data rules:
//! one line per product, quantities always positive, first-add order kept.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices and product snapshots
//! - [`cart`] - Cart lines and the ordered cart mirror

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{CartLine, CartMirror};
pub use types::*;
