//! Message Board
//!
//! Accepts short text messages over two independent channels, an HTTP form
//! endpoint and a UDP datagram socket, and appends each to one shared
//! persistent JSON log that is served back as a single document.
//!
//! # Modules
//!
//! - `types`: the stored `Record` and the `Log` sequence
//! - `store`: `MessageStore`, the single serialization point for the log
//! - `ingest`: form and datagram adapters feeding the store
//! - `snapshot`: consistent read-only views of the log
//! - `api`: HTTP routes (`/message`, `/messages.json`, `/health`)
//! - `config`: environment-driven settings
//! - `utils`: timestamps and atomic file writes
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use message_board::{MessageStore, Record, SnapshotReader};
//!
//! let store = Arc::new(MessageStore::new("storage/data.json"));
//! store.initialize().unwrap();
//! store.append(Record::build("alice", "hi")).unwrap();
//!
//! let snapshot = SnapshotReader::new(store).get_snapshot().unwrap();
//! println!("{}", String::from_utf8_lossy(&snapshot));
//! ```

pub mod api;
pub mod config;
pub mod ingest;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{ConfigError, ServerConfig};
pub use ingest::{DatagramAdapter, DatagramError, FormAdapter};
pub use snapshot::{SnapshotError, SnapshotReader};
pub use store::{MessageStore, StoreError, StoreResult};
pub use types::{Log, Record};
pub use utils::time::Precision;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
