//! Ingestion adapters
//!
//! Two independent producers feed the shared [`MessageStore`](crate::store::MessageStore):
//!
//! - `form`: request/response submissions (`username`, `message` fields)
//! - `datagram`: fire-and-forget JSON objects over UDP

pub mod datagram;
pub mod form;

pub use datagram::{DatagramAdapter, DatagramError, MAX_DATAGRAM_SIZE};
pub use form::{parse_form, FormAdapter, MessageForm};
