//! Session-related types.
//!
//! The authorization credential is owned here, outside the cart engine. Every
//! API call reads it; login and token refresh replace it.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use secrecy::{ExposeSecret, SecretString};

/// Shared JWT pair for the logged-in account.
///
/// Cheaply cloneable; all clones see the same tokens.
#[derive(Clone, Default)]
pub struct AuthSession {
    tokens: Arc<RwLock<Option<Tokens>>>,
}

struct Tokens {
    access: SecretString,
    refresh: Option<SecretString>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl AuthSession {
    /// A session with no credential.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly issued token pair.
    pub fn login(&self, access: SecretString, refresh: Option<SecretString>) {
        *self.write() = Some(Tokens { access, refresh });
    }

    /// Drop the stored tokens.
    pub fn logout(&self) {
        *self.write() = None;
    }

    /// Whether an access token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Value for the `Authorization` header, if logged in.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.read()
            .as_ref()
            .map(|tokens| format!("Bearer {}", tokens.access.expose_secret()))
    }

    /// The refresh token, if one was issued.
    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.read().as_ref().and_then(|tokens| tokens.refresh.clone())
    }

    /// Replace the access token, keeping the refresh token.
    ///
    /// Does nothing after logout.
    pub fn set_access(&self, access: SecretString) {
        if let Some(tokens) = self.write().as_mut() {
            tokens.access = access;
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Tokens>> {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Tokens>> {
        self.tokens.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_and_logout() {
        let session = AuthSession::new();
        assert!(!session.is_authenticated());
        assert!(session.bearer().is_none());

        session.login(SecretString::from("abc"), None);
        assert_eq!(session.bearer().as_deref(), Some("Bearer abc"));

        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clones_share_tokens() {
        let session = AuthSession::new();
        let clone = session.clone();
        session.login(SecretString::from("abc"), Some(SecretString::from("r")));

        assert!(clone.is_authenticated());
        clone.set_access(SecretString::from("def"));
        assert_eq!(session.bearer().as_deref(), Some("Bearer def"));
        assert!(session.refresh_token().is_some());
    }

    #[test]
    fn test_set_access_after_logout_is_ignored() {
        let session = AuthSession::new();
        session.set_access(SecretString::from("abc"));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let session = AuthSession::new();
        session.login(SecretString::from("very_secret_token"), None);
        let debug_output = format!("{session:?}");
        assert!(!debug_output.contains("very_secret_token"));
    }
}
