//! Message Store - the shared append-only log
//!
//! Both ingestion adapters and the snapshot reader go through one
//! [`MessageStore`]. Every operation that touches the persisted document
//! takes the same lock, so an append's load/modify/persist sequence never
//! interleaves with another append or with a read.
//!
//! # Layout
//!
//! One pretty-printed JSON array at a fixed path, UTF-8, non-ASCII left
//! unescaped. Writes go through a `<file>.tmp` sibling; nothing else in the
//! directory is touched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::types::{Log, Record};
use crate::utils::atomic::{atomic_write, remove_stale_temp, temp_path_for};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations
///
/// A persisted document that fails to parse is not an error; it is
/// recovered as an empty log.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store task failed: {0}")]
    Task(String),
}

/// Durable append-only message log
pub struct MessageStore {
    data_file: PathBuf,
    /// Serialization boundary for every access to `data_file`
    lock: Mutex<()>,
}

impl MessageStore {
    /// Create a store backed by the document at `data_file`.
    ///
    /// Nothing touches the filesystem until [`initialize`](Self::initialize)
    /// or the first append.
    pub fn new<P: AsRef<Path>>(data_file: P) -> Self {
        Self {
            data_file: data_file.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the persisted document
    pub fn path(&self) -> &Path {
        &self.data_file
    }

    /// Create the persisted empty log if absent. Idempotent.
    pub fn initialize(&self) -> StoreResult<()> {
        let _guard = self.lock.lock();

        if let Some(dir) = self.data_file.parent() {
            fs::create_dir_all(dir)?;
        }

        if remove_stale_temp(&self.data_file)? {
            let temp_path = temp_path_for(&self.data_file);
            warn!(path = %temp_path.display(), "Removed leftover temp file");
        }

        if !self.data_file.exists() {
            self.persist(&Log::new())?;
            info!(path = %self.data_file.display(), "Created empty message log");
        }

        Ok(())
    }

    /// Append `record` and persist the whole log before returning
    pub fn append(&self, record: Record) -> StoreResult<()> {
        let _guard = self.lock.lock();

        let mut log = self.load()?.unwrap_or_default();
        log.push(record);
        self.persist(&log)?;

        debug!(records = log.len(), "Appended record");
        Ok(())
    }

    /// Current log; a store that was never initialized reads as empty
    pub fn read(&self) -> StoreResult<Log> {
        Ok(self.read_persisted()?.unwrap_or_default())
    }

    /// Current log, or `None` when no persisted document exists
    pub fn read_persisted(&self) -> StoreResult<Option<Log>> {
        let _guard = self.lock.lock();
        self.load()
    }

    /// Number of records in the log
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    /// Whether the log holds no records
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// [`append`](Self::append) on the blocking pool
    pub async fn append_async(self: &Arc<Self>, record: Record) -> StoreResult<()> {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || store.append(record))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// [`read_persisted`](Self::read_persisted) on the blocking pool
    pub async fn read_persisted_async(self: &Arc<Self>) -> StoreResult<Option<Log>> {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || store.read_persisted())
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Load the persisted log (caller must hold the lock)
    fn load(&self) -> StoreResult<Option<Log>> {
        match fs::read(&self.data_file) {
            Ok(bytes) => Ok(Some(decode_log(&bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the persisted log (caller must hold the lock)
    fn persist(&self, log: &Log) -> StoreResult<()> {
        let content = serde_json::to_vec_pretty(log)?;
        atomic_write(&self.data_file, &content)?;
        Ok(())
    }
}

/// Decode a persisted document, recovering anything unusable as empty
fn decode_log(bytes: &[u8]) -> Log {
    let items = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            warn!("Persisted log is not a JSON array, starting from an empty log");
            return Log::new();
        }
        Err(e) => {
            warn!(error = %e, "Persisted log is unreadable, starting from an empty log");
            return Log::new();
        }
    };

    let mut log = Log::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(object) => log.push(Record::from_stored(object)),
            other => warn!(index, value = %other, "Skipping non-object log entry"),
        }
    }
    log
}
