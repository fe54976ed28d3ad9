//! HTTP binding of the remote cart.
//!
//! The backend keys the cart by the authenticated account, so the only
//! inputs are the product and the unit delta. Neither call is cached.

use async_trait::async_trait;
use reqwest::Method;
use tracing::instrument;

use shopeasy_core::ProductId;

use super::types::CartItemRequest;
use super::{ApiClient, ApiError};
use crate::cart::{RemoteCart, RemoteCartError};

const ADD_ITEM_PATH: &str = "carrinhos/adicionar-item/";
const REMOVE_ITEM_PATH: &str = "carrinhos/remover-item/";

/// Remote cart backed by the storefront REST API.
#[derive(Clone)]
pub struct HttpRemoteCart {
    api: ApiClient,
}

impl HttpRemoteCart {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn send_delta(
        &self,
        method: Method,
        path: &str,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let body = CartItemRequest {
            produto: product_id,
            quantidade: quantity,
        };
        self.api.send(method, self.api.endpoint(path)?, &body).await
    }
}

#[async_trait]
impl RemoteCart for HttpRemoteCart {
    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RemoteCartError> {
        self.send_delta(Method::POST, ADD_ITEM_PATH, product_id, quantity)
            .await
            .map_err(RemoteCartError::from)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove_from_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RemoteCartError> {
        self.send_delta(Method::DELETE, REMOVE_ITEM_PATH, product_id, quantity)
            .await
            .map_err(RemoteCartError::from)
    }
}

impl From<ApiError> for RemoteCartError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(message) => Self::Unauthorized(message),
            ApiError::RateLimited(secs) => Self::RateLimited(secs),
            ApiError::Status { status, message } => Self::Rejected { status, message },
            ApiError::NotFound(path) => Self::Rejected {
                status: 404,
                message: path,
            },
            other => Self::Transport(other.to_string()),
        }
    }
}
