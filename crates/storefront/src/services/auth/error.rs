//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password rejected by the token endpoint.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An operation needed a session but none is held.
    #[error("not logged in")]
    NotAuthenticated,

    /// No refresh token was issued for this session.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The refresh token was rejected; the session has been cleared.
    #[error("session expired, log in again")]
    SessionExpired,

    /// API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}
