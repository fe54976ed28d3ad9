//! Domain models for the storefront client.
//!
//! - [`session`] - The authorization credential shared by every API call
//! - [`user`] - The logged-in account profile

pub mod session;
pub mod user;

pub use session::AuthSession;
pub use user::UserProfile;
