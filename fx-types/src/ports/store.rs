//! Local key-value store port.
//!
//! The rate cache and the preferred currency are persisted through this
//! trait. Adapters decide where the bytes live (files, memory, ...).

use crate::error::StoreError;

/// Minimal persistent string store keyed by name.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }
}
