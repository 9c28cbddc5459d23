//! Request adapter: form-encoded submissions
//!
//! Accepts `username=...&message=...` bodies. Missing or malformed fields
//! become empty strings; a submission is never rejected.

use std::sync::Arc;

use tracing::debug;

use crate::store::{MessageStore, StoreResult};
use crate::types::Record;

/// Form field carrying the sender
pub const SENDER_FIELD: &str = "username";
/// Form field carrying the body
pub const BODY_FIELD: &str = "message";

/// Fields extracted from one form submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageForm {
    pub username: String,
    pub message: String,
}

/// Decode an `application/x-www-form-urlencoded` body.
///
/// The first non-blank occurrence of a repeated key wins. Invalid percent escapes and
/// invalid UTF-8 are decoded lossily.
pub fn parse_form(raw: &[u8]) -> MessageForm {
    let mut username = None;
    let mut message = None;

    for pair in raw.split(|&b| b == b'&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = match pair.iter().position(|&b| b == b'=') {
            Some(idx) => (&pair[..idx], &pair[idx + 1..]),
            None => (pair, &[][..]),
        };

        let slot = match decode_component(key).as_str() {
            SENDER_FIELD => &mut username,
            BODY_FIELD => &mut message,
            _ => continue,
        };

        // Blank values are skipped, so a later non-blank one can still fill the slot
        if slot.is_none() && !value.is_empty() {
            *slot = Some(decode_component(value));
        }
    }

    MessageForm {
        username: username.unwrap_or_default(),
        message: message.unwrap_or_default(),
    }
}

fn decode_component(raw: &[u8]) -> String {
    let plus_decoded: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    String::from_utf8_lossy(&urlencoding::decode_binary(&plus_decoded)).into_owned()
}

/// Turns form submissions into appended records
#[derive(Clone)]
pub struct FormAdapter {
    store: Arc<MessageStore>,
}

impl FormAdapter {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }

    /// Decode `raw`, append the record and return it
    pub fn accept(&self, raw: &[u8]) -> StoreResult<Record> {
        let record = Self::to_record(raw);
        self.store.append(record.clone())?;
        Ok(record)
    }

    /// [`accept`](Self::accept) with the store write on the blocking pool
    pub async fn accept_async(&self, raw: &[u8]) -> StoreResult<Record> {
        let record = Self::to_record(raw);
        self.store.append_async(record.clone()).await?;
        Ok(record)
    }

    fn to_record(raw: &[u8]) -> Record {
        let form = parse_form(raw);
        debug!(username = %form.username, message = %form.message, "Received form message");
        Record::build(form.username, form.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_basic_form() {
        let form = parse_form(b"username=alice&message=hello");
        assert_eq!(form.username, "alice");
        assert_eq!(form.message, "hello");
    }

    #[test]
    fn test_parse_decodes_plus_and_percent() {
        let form = parse_form(b"username=J%C3%BCrgen+K&message=a%26b%3Dc+d%2B");
        assert_eq!(form.username, "Jürgen K");
        assert_eq!(form.message, "a&b=c d+");
    }

    #[test]
    fn test_parse_missing_fields_are_empty() {
        assert_eq!(parse_form(b""), MessageForm::default());

        let form = parse_form(b"message=only");
        assert_eq!(form.username, "");
        assert_eq!(form.message, "only");
    }

    #[test]
    fn test_parse_tolerates_garbage() {
        let form = parse_form(b"&&=x&username&message=%ZZ&other=1");
        assert_eq!(form.username, "");
        assert_eq!(form.message, "%ZZ");
    }

    #[test]
    fn test_parse_first_value_wins() {
        let form = parse_form(b"username=first&username=second");
        assert_eq!(form.username, "first");

        let form = parse_form(b"username=&username=bob");
        assert_eq!(form.username, "bob");
    }

    #[test]
    fn test_parse_invalid_utf8_is_lossy() {
        let form = parse_form(b"username=%FF%FEok");
        assert!(form.username.ends_with("ok"));
        assert!(form.username.contains('\u{FFFD}'));
    }

    #[test]
    fn test_accept_appends_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MessageStore::new(temp_dir.path().join("data.json")));
        store.initialize().unwrap();
        let adapter = FormAdapter::new(Arc::clone(&store));

        let record = adapter.accept(b"username=alice&message=hi").unwrap();
        assert_eq!(record.sender, "alice");

        let log = store.read().unwrap();
        assert_eq!(log, vec![record]);
    }
}
