//! Snapshot Store Port
//!
//! Key/value store holding the published snapshot as one opaque JSON value
//! under a well-known key. The production store is external (the game
//! backend's KV); this crate only depends on the contract.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Opaque JSON blob store, get/set by key.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Fetch the value under `key`, `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the value under `key` wholesale.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}
