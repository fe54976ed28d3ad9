//! `ShopEasy` storefront client library.
//!
//! Talks to the storefront REST API and keeps a local cart mirror in step
//! with the server-side cart.
//!
//! # Modules
//!
//! - [`api`] - REST bindings: HTTP client, cached catalog, remote cart
//! - [`cart`] - cart synchronization engine
//! - [`services`] - JWT authentication
//! - [`state`] - [`Storefront`](state::Storefront) handle wiring it together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
