//! Datagram adapter: JSON objects over UDP
//!
//! Each packet is decoded, stamped with a microsecond timestamp and appended.
//! Bad packets are logged and dropped; the sender never hears back.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use tokio::net::UdpSocket;
use tracing::{error, info, warn};

use crate::store::{MessageStore, StoreError};
use crate::types::Record;
use crate::utils::time::Precision;

/// Largest payload read from one datagram
pub const MAX_DATAGRAM_SIZE: usize = 4096;

/// Why a datagram was discarded
#[derive(Debug, thiserror::Error)]
pub enum DatagramError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),

    #[error("store rejected the record: {0}")]
    Store(#[from] StoreError),
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Turns datagrams into appended records
#[derive(Clone)]
pub struct DatagramAdapter {
    store: Arc<MessageStore>,
}

impl DatagramAdapter {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }

    /// Decode one packet into a record stamped now
    pub fn decode(packet: &[u8]) -> Result<Record, DatagramError> {
        let text = std::str::from_utf8(packet)?;
        match serde_json::from_str::<Value>(text)? {
            Value::Object(object) => Ok(Record::from_object(object, Precision::Micros)),
            other => Err(DatagramError::NotAnObject(json_kind(&other))),
        }
    }

    /// Decode and append one packet
    pub fn handle_packet(&self, packet: &[u8]) -> Result<Record, DatagramError> {
        let record = Self::decode(packet)?;
        self.store.append(record.clone())?;
        Ok(record)
    }

    /// Receive loop. Runs until the process exits.
    ///
    /// Each packet is handled to completion before the next one is read.
    pub async fn run(self, socket: UdpSocket) {
        if let Ok(addr) = socket.local_addr() {
            info!(%addr, "UDP server listening");
        }

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            let (len, peer) = match socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    warn!(error = %e, "UDP receive failed");
                    continue;
                }
            };

            let packet = buf[..len].to_vec();
            let adapter = self.clone();
            let outcome = tokio::task::spawn_blocking(move || adapter.handle_packet(&packet))
                .await
                .map_err(|e| DatagramError::Store(StoreError::Task(e.to_string())))
                .and_then(|result| result);

            log_outcome(peer, outcome);
        }
    }
}

fn log_outcome(peer: SocketAddr, outcome: Result<Record, DatagramError>) {
    match outcome {
        Ok(record) => info!(
            %peer,
            sender = %record.sender,
            body = %record.body,
            "Saved UDP message"
        ),
        Err(DatagramError::Store(e)) => error!(%peer, error = %e, "Failed to store UDP message"),
        Err(e) => warn!(%peer, error = %e, "Discarded UDP packet"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_adapter() -> (DatagramAdapter, Arc<MessageStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MessageStore::new(temp_dir.path().join("data.json")));
        store.initialize().unwrap();
        (DatagramAdapter::new(Arc::clone(&store)), store, temp_dir)
    }

    #[test]
    fn test_decode_object() {
        let record = DatagramAdapter::decode(br#"{"sender":"x","body":"y"}"#).unwrap();
        assert_eq!(record.sender, "x");
        assert_eq!(record.body, "y");
        assert!(record.recorded_at.contains('.'));
    }

    #[test]
    fn test_decode_failures_are_typed() {
        assert!(matches!(
            DatagramAdapter::decode(b"not-json"),
            Err(DatagramError::Json(_))
        ));
        assert!(matches!(
            DatagramAdapter::decode(&[0xff, 0xfe]),
            Err(DatagramError::Utf8(_))
        ));
        assert!(matches!(
            DatagramAdapter::decode(b"[1,2]"),
            Err(DatagramError::NotAnObject("array"))
        ));
    }

    #[test]
    fn test_handle_packet_good_then_bad() {
        let (adapter, store, _temp_dir) = create_adapter();

        adapter.handle_packet(br#"{"sender":"x","body":"y"}"#).unwrap();
        assert!(adapter.handle_packet(b"not-json").is_err());

        let log = store.read().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].sender, "x");
    }

    #[test]
    fn test_handle_packet_keeps_extra_keys() {
        let (adapter, store, _temp_dir) = create_adapter();

        adapter
            .handle_packet(br#"{"username":"u","message":"m","channel":"ops"}"#)
            .unwrap();

        let log = store.read().unwrap();
        assert_eq!(log[0].sender, "u");
        assert_eq!(log[0].extra().get("channel"), Some(&json!("ops")));
    }

    #[tokio::test]
    async fn test_run_survives_malformed_packets() {
        let (adapter, store, _temp_dir) = create_adapter();

        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let server = tokio::spawn(adapter.run(socket));

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"not-json", addr).await.unwrap();
        client.send_to(b"42", addr).await.unwrap();
        client
            .send_to(br#"{"sender":"x","body":"y"}"#, addr)
            .await
            .unwrap();

        let mut len = 0;
        for _ in 0..100 {
            len = store.len().unwrap();
            if len > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(len, 1);
        assert!(!server.is_finished());

        server.abort();
    }
}
