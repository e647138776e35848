//! Application state shared across the shell's event handlers.

use std::sync::Arc;

use crate::cart::CartController;
use crate::catalog::CatalogClient;
use crate::checkout::CheckoutClient;
use crate::config::GalleryConfig;

/// Long-lived application state: configuration plus the API clients.
///
/// Cheaply cloneable via `Arc`. Per-page-session mutable state lives in a
/// [`CartController`] created by [`Self::start_session`], not here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GalleryConfig,
    catalog: CatalogClient,
    checkout: CheckoutClient,
}

impl AppState {
    /// Create application state from configuration.
    #[must_use]
    pub fn new(config: GalleryConfig) -> Self {
        let catalog = CatalogClient::new(&config);
        let checkout = CheckoutClient::new(&config);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                checkout,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &GalleryConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the checkout backend client.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutClient {
        &self.inner.checkout
    }

    /// Start a fresh page session: an empty cart on the home view.
    #[must_use]
    pub fn start_session(&self) -> CartController {
        CartController::new()
    }
}
