//! Application state shared across handlers.

use std::sync::Arc;

use shopfront_core::Email;

use crate::backend::{Backend, DataStore};
use crate::config::StorefrontConfig;
use crate::services::catalog::Catalog;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The backend is optional: a
/// missing or invalid backend configuration leaves the server running in a
/// degraded mode that explains the problem instead of serving auth actions.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Result<Backend, String>,
    catalog: Catalog,
}

impl AppState {
    /// Create the application state, connecting the configured backend.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = match &config.backend {
            Ok(backend_config) => Backend::connect(backend_config).map_err(|e| {
                tracing::error!(error = %e, "Failed to create backend clients");
                e.to_string()
            }),
            Err(issue) => Err(issue.0.clone()),
        };
        Self::build(config, backend)
    }

    /// Create the application state around an existing backend.
    #[must_use]
    pub fn with_backend(config: StorefrontConfig, backend: Backend) -> Self {
        Self::build(config, Ok(backend))
    }

    fn build(config: StorefrontConfig, backend: Result<Backend, String>) -> Self {
        let store: Option<Arc<dyn DataStore>> = backend.as_ref().ok().map(|b| b.store.clone());
        let catalog = Catalog::new(&config.products, store);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The backend, unless the server runs in degraded mode.
    #[must_use]
    pub fn backend(&self) -> Option<&Backend> {
        self.inner.backend.as_ref().ok()
    }

    /// Why the backend is unavailable, for the configuration banner.
    #[must_use]
    pub fn config_error(&self) -> Option<&str> {
        self.inner.backend.as_ref().err().map(String::as_str)
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// The address whose account is shown the admin UI.
    #[must_use]
    pub fn admin_email(&self) -> Option<&Email> {
        self.inner.config.admin_email.as_ref()
    }
}
