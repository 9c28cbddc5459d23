//! Data types for the message board
//!
//! This module contains the record schema shared by the store, the
//! ingestion adapters and the snapshot reader.

mod record;

pub use record::Record;

/// The full ordered sequence of records, the unit of persistence
pub type Log = Vec<Record>;
