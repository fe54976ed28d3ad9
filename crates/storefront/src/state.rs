//! Shared client state.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError, CatalogClient, HttpRemoteCart};
use crate::cart::{CartSync, CartSyncConfig, ProductLookup};
use crate::config::StorefrontConfig;
use crate::models::AuthSession;
use crate::services::auth::AuthService;

/// Handle to the storefront backend.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// shared API client, catalog cache and session credential.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    catalog: CatalogClient,
}

impl Storefront {
    /// Create a new storefront handle with an empty session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api, AuthSession::new())?;
        let catalog = CatalogClient::new(api.clone(), config.catalog_cache_ttl);

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                catalog,
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the REST API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the cached catalog.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// The session credential shared by every request.
    #[must_use]
    pub fn auth(&self) -> &AuthSession {
        self.inner.api.auth()
    }

    /// Authentication operations bound to this handle's session.
    #[must_use]
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.api)
    }

    /// Start a cart session that resolves products through the catalog.
    #[must_use]
    pub fn cart_session(&self) -> CartSync<HttpRemoteCart, CatalogClient> {
        self.cart_session_with(self.inner.catalog.clone())
    }

    /// Start a cart session with a custom product lookup, such as the
    /// products a page has already loaded.
    #[must_use]
    pub fn cart_session_with<C: ProductLookup>(&self, catalog: C) -> CartSync<HttpRemoteCart, C> {
        CartSync::new(
            HttpRemoteCart::new(self.inner.api.clone()),
            catalog,
            CartSyncConfig::from(&self.inner.config),
        )
    }
}
