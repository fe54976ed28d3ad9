//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPEASY_API_URL` - Base URL of the storefront REST API
//!   (e.g., `http://localhost:8000/api/v1/`)
//!
//! ## Optional
//! - `SHOPEASY_REQUEST_TIMEOUT_SECS` - Timeout for every API call, cart calls
//!   included (default: 10)
//! - `SHOPEASY_CATALOG_CACHE_TTL_SECS` - Catalog response cache lifetime (default: 300)
//! - `SHOPEASY_USERNAME` - Account used by the CLI to log in
//! - `SHOPEASY_PASSWORD` - Password for `SHOPEASY_USERNAME` (set both or neither)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "10";
const DEFAULT_CATALOG_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// REST API connection settings
    pub api: ApiConfig,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
    /// Login credentials, when both username and password are set
    pub credentials: Option<Credentials>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// REST API connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; always ends with `/` so relative endpoints join under it
    pub base_url: Url,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

/// Account credentials.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api = ApiConfig {
            base_url: parse_base_url("SHOPEASY_API_URL", &env.required("SHOPEASY_API_URL")?)?,
            request_timeout: env.seconds(
                "SHOPEASY_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
        };
        let catalog_cache_ttl =
            env.seconds("SHOPEASY_CATALOG_CACHE_TTL_SECS", DEFAULT_CATALOG_CACHE_TTL_SECS)?;

        let username = env.optional("SHOPEASY_USERNAME");
        let password = env.optional("SHOPEASY_PASSWORD");
        let credentials = match (username, password) {
            (Some(username), Some(password)) => Some(Credentials {
                username,
                password: SecretString::from(password),
            }),
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar("SHOPEASY_PASSWORD".to_string()));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar("SHOPEASY_USERNAME".to_string()));
            }
            (None, None) => None,
        };

        Ok(Self {
            api,
            catalog_cache_ttl,
            credentials,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a positive number of seconds.
    fn seconds(&self, key: &str, default: &str) -> Result<Duration, ConfigError> {
        let secs = self
            .or_default(key, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        Ok(Duration::from_secs(secs))
    }
}

/// Parse the API base URL, normalizing it to end with a slash.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SHOPEASY_API_URL"));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("SHOPEASY_API_URL", "http://localhost:8000/api/v1/")]).unwrap();

        assert_eq!(config.api.request_timeout, Duration::from_secs(10));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert!(config.credentials.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = load(&[("SHOPEASY_API_URL", "http://localhost:8000/api/v1")]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:8000/api/v1/");
        assert_eq!(
            config.api.base_url.join("produtos/").unwrap().as_str(),
            "http://localhost:8000/api/v1/produtos/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[("SHOPEASY_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = load(&[
            ("SHOPEASY_API_URL", "http://localhost:8000/"),
            ("SHOPEASY_REQUEST_TIMEOUT_SECS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(ref key, _) if key == "SHOPEASY_REQUEST_TIMEOUT_SECS"
        ));
    }

    #[test]
    fn test_username_without_password() {
        let err = load(&[
            ("SHOPEASY_API_URL", "http://localhost:8000/"),
            ("SHOPEASY_USERNAME", "maria"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SHOPEASY_PASSWORD"));
    }

    #[test]
    fn test_password_without_username() {
        let err = load(&[
            ("SHOPEASY_API_URL", "http://localhost:8000/"),
            ("SHOPEASY_PASSWORD", "super_secret_password"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SHOPEASY_USERNAME"));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let config = load(&[
            ("SHOPEASY_API_URL", "http://localhost:8000/"),
            ("SHOPEASY_USERNAME", "maria"),
            ("SHOPEASY_PASSWORD", "super_secret_password"),
        ])
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("maria"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_password"));
    }
}
