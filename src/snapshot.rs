//! Snapshot reader - the full log as one JSON document

use std::sync::Arc;

use crate::store::{MessageStore, StoreError};
use crate::types::Log;

/// Errors returned by [`SnapshotReader`]
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The store has never been initialized
    #[error("messages data not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Serves consistent, read-only views of the log
#[derive(Clone)]
pub struct SnapshotReader {
    store: Arc<MessageStore>,
}

impl SnapshotReader {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }

    /// Current log as a pretty-printed JSON array
    pub fn get_snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        let log = self.store.read_persisted()?.ok_or(SnapshotError::NotFound)?;
        encode(&log)
    }

    /// [`get_snapshot`](Self::get_snapshot) with the store read on the blocking pool
    pub async fn get_snapshot_async(&self) -> Result<Vec<u8>, SnapshotError> {
        let log = self
            .store
            .read_persisted_async()
            .await?
            .ok_or(SnapshotError::NotFound)?;
        encode(&log)
    }
}

fn encode(log: &Log) -> Result<Vec<u8>, SnapshotError> {
    Ok(serde_json::to_vec_pretty(log)?)
}
