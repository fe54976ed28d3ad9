//! Shared HTTP client for the storefront REST API.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::{ApiError, truncate_body};
use crate::config::ApiConfig;
use crate::models::AuthSession;

/// Client for the storefront REST API.
///
/// Cheaply cloneable via `Arc`. Attaches the current bearer token from the
/// shared [`AuthSession`] to every request.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    auth: AuthSession,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig, auth: AuthSession) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                auth,
            }),
        })
    }

    /// The credential attached to requests.
    #[must_use]
    pub fn auth(&self) -> &AuthSession {
        &self.inner.auth
    }

    /// Resolve an endpoint path (e.g., `produtos/42/`) against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// GET a JSON resource by absolute URL.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let body = self.execute(self.request(Method::GET, url)).await?;
        parse_json(&body)
    }

    /// Send a JSON body and parse a JSON response.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .execute(self.request(method, url).json(body))
            .await?;
        parse_json(&body)
    }

    /// Send a JSON body, ignoring any response body.
    pub(crate) async fn send<B>(&self, method: Method, url: Url, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(self.request(method, url).json(body)).await?;
        Ok(())
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self
            .inner
            .client
            .request(method, url)
            .header("Accept", "application/json");

        match self.inner.auth.bearer() {
            Some(bearer) => request.header("Authorization", bearer),
            None => request,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let url = response.url().clone();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status.is_success() {
            return Ok(response_text);
        }

        tracing::debug!(
            status = %status,
            url = %url,
            body = %truncate_body(&response_text, 500),
            "API returned non-success status"
        );

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ApiError::Unauthorized(detail_message(&response_text))
            }
            StatusCode::NOT_FOUND => ApiError::NotFound(url.path().to_string()),
            _ => ApiError::Status {
                status: status.as_u16(),
                message: detail_message(&response_text),
            },
        })
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate_body(body, 500),
            "Failed to parse API response"
        );
        ApiError::Parse(e)
    })
}

/// Pull the human-readable message out of an error body.
///
/// The backend answers errors with `{"detail": "..."}`; anything else is
/// returned truncated as-is.
fn detail_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| truncate_body(body, 200))
}
