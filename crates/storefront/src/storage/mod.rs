//! Browser-scoped key-value persistence.
//!
//! Each browser gets its own namespace (a random id kept in its session), so
//! keys such as `userData` behave like entries in that browser's local
//! storage. Values are opaque strings; callers JSON-encode what they store.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local map, used when no database is configured
//! - [`PgKeyValueStore`] - `local_storage` table in `PostgreSQL`
//!
//! Writes are last-writer-wins. Two tabs editing the same namespace race and
//! nothing guards against it.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tower_sessions::Session;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgKeyValueStore;

use crate::models::session_keys;

/// Key holding the JSON-encoded user profile.
pub const USER_DATA_KEY: &str = "userData";

/// Key holding the avatar data URL for a session token.
#[must_use]
pub fn profile_image_key(token: &str) -> String {
    format!("profileImage-{token}")
}

/// Errors from the underlying store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The browser namespace could not be read from or written to the session.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// A flat string key-value store partitioned by namespace.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a value.
    async fn set(&self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Missing keys are not an error.
    async fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError>;
}

/// One browser's view of a [`KeyValueStore`].
#[derive(Clone)]
pub struct LocalStorage {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl LocalStorage {
    /// Bind a store to an explicit namespace.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    /// Bind a store to the namespace of the browser behind `session`.
    ///
    /// The namespace id is created and saved in the session on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Session`] if the session cannot be read or written.
    pub async fn for_session(
        store: Arc<dyn KeyValueStore>,
        session: &Session,
    ) -> Result<Self, StorageError> {
        let namespace = match session.get::<String>(session_keys::BROWSER_ID).await? {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                session.insert(session_keys::BROWSER_ID, &id).await?;
                id
            }
        };
        Ok(Self::new(store, namespace))
    }

    /// The namespace this handle reads and writes.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Read a value.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.store.get(&self.namespace, key).await
    }

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.set(&self.namespace, key, value).await
    }

    /// Delete a value.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.store.remove(&self.namespace, key).await
    }
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
