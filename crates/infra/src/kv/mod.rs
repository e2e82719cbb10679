//! Key/value persistence for ledger collections.
//!
//! Each top-level collection is stored as one JSON document under its own key.
//! There is no transaction spanning keys: a placement that touches orders and
//! inventory performs two independent writes.

pub mod file;
pub mod in_memory;

use std::sync::Arc;

use thiserror::Error;

pub use file::FileKeyValueStore;
pub use in_memory::InMemoryKeyValueStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Minimal string key/value store (the browser-storage contract).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
