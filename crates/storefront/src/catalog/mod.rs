//! Catalog service client.
//!
//! A read-only JSON client for the remote artwork catalog. Listing responses
//! are cached with `moka` (5-minute TTL) since the catalog changes rarely;
//! there is no retry policy - a fetch error is surfaced so the shell can keep
//! showing a stale or empty listing and let the visitor refresh manually.

mod types;

pub use types::{Artwork, CATALOG_CURRENCY};

use std::sync::Arc;
use std::time::Duration;

use gallery_core::{ArtworkId, Availability};
use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::GalleryConfig;

/// Cache TTL for listing responses.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error response.
    #[error("Catalog error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Artwork not found.
    #[error("Artwork not found: {0}")]
    NotFound(ArtworkId),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Cached catalog responses.
#[derive(Clone)]
enum CacheValue {
    Listing(Vec<Artwork>),
    Artwork(Box<Artwork>),
}

/// Client for the artwork catalog service.
///
/// Cheaply cloneable; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &GalleryConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.catalog_url.clone(),
                timeout: config.http_timeout,
                cache,
            }),
        }
    }

    /// Fetch a collection of artworks, optionally filtered by category
    /// and/or availability.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    #[instrument(skip(self))]
    pub async fn list_artworks(
        &self,
        category: Option<&str>,
        availability: Option<Availability>,
    ) -> Result<Vec<Artwork>, CatalogError> {
        let cache_key = format!(
            "artworks:{}:{}",
            category.unwrap_or(""),
            availability.map_or("", |availability| availability.as_str())
        );

        if let Some(CacheValue::Listing(artworks)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for artwork listing");
            return Ok(artworks);
        }

        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(category) = category {
            query.push(("category", category));
        }
        if let Some(availability) = availability {
            query.push(("availability", availability.as_str()));
        }

        let url = format!("{}/api/artworks", self.inner.base_url);
        let artworks: Vec<Artwork> = self.fetch_json(&url, &query).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Listing(artworks.clone()))
            .await;

        Ok(artworks)
    }

    /// Fetch the curated subset shown on the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    #[instrument(skip(self))]
    pub async fn featured_artworks(&self) -> Result<Vec<Artwork>, CatalogError> {
        let cache_key = "featured".to_string();

        if let Some(CacheValue::Listing(artworks)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for featured artworks");
            return Ok(artworks);
        }

        let url = format!("{}/api/featured-artworks", self.inner.base_url);
        let artworks: Vec<Artwork> = self.fetch_json(&url, &[]).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Listing(artworks.clone()))
            .await;

        Ok(artworks)
    }

    /// Fetch a single artwork by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the catalog has no such
    /// artwork, or another error if the request fails.
    #[instrument(skip(self), fields(artwork_id = %artwork_id))]
    pub async fn get_artwork(&self, artwork_id: &ArtworkId) -> Result<Artwork, CatalogError> {
        let cache_key = format!("artwork:{artwork_id}");

        if let Some(CacheValue::Artwork(artwork)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for artwork");
            return Ok(*artwork);
        }

        let url = format!("{}/api/artworks/{artwork_id}", self.inner.base_url);
        let response = self
            .inner
            .client
            .get(&url)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(artwork_id.clone()));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let artwork: Artwork = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Artwork(Box::new(artwork.clone())))
            .await;

        Ok(artwork)
    }

    /// Invalidate all cached responses (manual refresh).
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    /// GET a JSON body, mapping non-success statuses to typed errors.
    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let response = self
            .inner
            .client
            .get(url)
            .query(query)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}
