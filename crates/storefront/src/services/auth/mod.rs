//! Authentication service.
//!
//! Exchanges account credentials for a JWT pair and keeps it in the shared
//! [`AuthSession`], which every API call (cart deltas included) reads.

mod error;

pub use error::AuthError;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use crate::api::types::{AccessToken, RefreshRequest, TokenPair, TokenRequest};
use crate::api::{ApiClient, ApiError};
use crate::config::Credentials;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{AuthSession, UserProfile};

const TOKEN_PATH: &str = "token/";
const REFRESH_PATH: &str = "token/refresh/";
const ME_PATH: &str = "me/";

/// Authentication service.
///
/// Handles login, token refresh and profile lookup.
pub struct AuthService<'a> {
    api: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    fn session(&self) -> &AuthSession {
        self.api.auth()
    }

    /// Log in with username and password, then load the profile.
    ///
    /// Any previous session is dropped first so a stale token is never sent
    /// to the token endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the backend rejects the pair.
    /// Returns `AuthError::Api` for any other failure.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<UserProfile, AuthError> {
        self.session().logout();

        let request = TokenRequest {
            username,
            password: password.expose_secret(),
        };
        let tokens: TokenPair = self
            .api
            .send_json(Method::POST, self.api.endpoint(TOKEN_PATH)?, &request)
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized(_) => AuthError::InvalidCredentials,
                other => AuthError::Api(other),
            })?;

        self.session().login(
            SecretString::from(tokens.access),
            tokens.refresh.map(SecretString::from),
        );

        let profile = self.me().await?;
        let email = Some(profile.email.as_str()).filter(|e| !e.is_empty());
        set_sentry_user(&profile.id, email);
        info!(user_id = %profile.id, "Logged in");

        Ok(profile)
    }

    /// Log in with configured credentials.
    ///
    /// # Errors
    ///
    /// See [`AuthService::login`].
    pub async fn login_with(&self, credentials: &Credentials) -> Result<UserProfile, AuthError> {
        self.login(&credentials.username, &credentials.password).await
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// A rejected refresh token ends the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NoRefreshToken` if none was issued.
    /// Returns `AuthError::SessionExpired` if the backend rejects it.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let refresh = self
            .session()
            .refresh_token()
            .ok_or(AuthError::NoRefreshToken)?;

        let request = RefreshRequest {
            refresh: refresh.expose_secret(),
        };
        let result: Result<AccessToken, ApiError> = self
            .api
            .send_json(Method::POST, self.api.endpoint(REFRESH_PATH)?, &request)
            .await;

        match result {
            Ok(token) => {
                self.session().set_access(SecretString::from(token.access));
                Ok(())
            }
            Err(ApiError::Unauthorized(reason)) => {
                warn!(%reason, "Refresh token rejected");
                self.logout();
                Err(AuthError::SessionExpired)
            }
            Err(e) => Err(AuthError::Api(e)),
        }
    }

    /// Fetch the logged-in account's profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` without a session.
    /// Returns `AuthError::Api` if the request fails.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, AuthError> {
        if !self.session().is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }

        Ok(self.api.get_json(self.api.endpoint(ME_PATH)?).await?)
    }

    /// Drop the session tokens.
    pub fn logout(&self) {
        self.session().logout();
        clear_sentry_user();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::*;
    use crate::config::ApiConfig;

    fn api() -> ApiClient {
        let config = ApiConfig {
            base_url: Url::parse("http://127.0.0.1:9/api/v1/").unwrap(),
            request_timeout: Duration::from_millis(200),
        };
        ApiClient::new(&config, AuthSession::new()).unwrap()
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let api = api();
        let err = AuthService::new(&api).me().await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_refresh_requires_refresh_token() {
        let api = api();
        api.auth().login(SecretString::from("access"), None);

        let err = AuthService::new(&api).refresh().await.unwrap_err();
        assert!(matches!(err, AuthError::NoRefreshToken));
    }

    #[test]
    fn test_logout_clears_session() {
        let api = api();
        api.auth().login(SecretString::from("access"), None);

        AuthService::new(&api).logout();
        assert!(!api.auth().is_authenticated());
    }
}
