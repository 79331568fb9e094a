//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use threadline_core::Product;

use crate::backend::{Backend, BackendError};
use crate::config::StorefrontConfig;
use crate::storage::{KeyValueStore, LocalStorage, StorageError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client, storage and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Arc<dyn Backend>,
    store: Arc<dyn KeyValueStore>,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `backend` - Product, order and auth backend
    /// * `store` - Key-value store behind each browser's local storage
    /// * `pool` - `PostgreSQL` pool, when a database is configured
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        backend: Arc<dyn Backend>,
        store: Arc<dyn KeyValueStore>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                store,
                pool,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.inner.backend.as_ref()
    }

    /// Get a reference to the database connection pool, if any.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Fetch the product collection.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        self.inner.backend.products().await
    }

    /// Local storage for the browser behind `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser id cannot be read from the session.
    pub async fn local_storage(
        &self,
        session: &tower_sessions::Session,
    ) -> Result<LocalStorage, StorageError> {
        LocalStorage::for_session(Arc::clone(&self.inner.store), session).await
    }
}
