//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GALLERY_CATALOG_URL` - Base URL of the artwork catalog service
//!
//! ## Optional
//! - `GALLERY_CHECKOUT_URL` - Base URL of the checkout backend
//!   (default: same as `GALLERY_CATALOG_URL`; the reference backend serves
//!   both APIs from one process)
//! - `GALLERY_HTTP_TIMEOUT_SECS` - Per-request HTTP timeout (default: 10)

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Base URL of the catalog service, without a trailing slash.
    pub catalog_url: String,
    /// Base URL of the checkout backend, without a trailing slash.
    pub checkout_url: String,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl GalleryConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let catalog_url =
            normalize_base_url(&get_required_env("GALLERY_CATALOG_URL")?, "GALLERY_CATALOG_URL")?;
        let checkout_url = match get_optional_env("GALLERY_CHECKOUT_URL") {
            Some(raw) => normalize_base_url(&raw, "GALLERY_CHECKOUT_URL")?,
            None => catalog_url.clone(),
        };
        let timeout_secs = get_env_or_default(
            "GALLERY_HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("GALLERY_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            catalog_url,
            checkout_url,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Build a configuration from explicit base URLs.
    ///
    /// Used by tests and by shells that do their own configuration loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either URL is not an absolute http(s) URL.
    pub fn new(catalog_url: &str, checkout_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            catalog_url: normalize_base_url(catalog_url, "catalog_url")?,
            checkout_url: normalize_base_url(checkout_url, "checkout_url")?,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate a base URL and strip any trailing slash so endpoint paths can be
/// appended with plain formatting.
fn normalize_base_url(raw: &str, name: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            "missing host".to_string(),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
