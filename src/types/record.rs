//! Record types for the message log

use serde::Serialize;
use serde_json::{Map, Value};

use crate::utils::time::{format_timestamp, Precision};

/// One stored message
///
/// Records are read back through [`Record::from_stored`], which applies the
/// same key normalization as incoming datagrams.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "username")]
    pub sender: String,
    #[serde(rename = "message")]
    pub body: String,
    #[serde(rename = "timestamp")]
    pub recorded_at: String,
    /// Additional keys carried by datagram payloads, stored as received.
    /// Never holds a reserved key, so the flattened output has no duplicates.
    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub(crate) extra: Map<String, Value>,
}

impl Record {
    /// Build a record stamped now with second precision
    pub fn build(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self::build_with_precision(sender, body, Precision::Seconds)
    }

    /// Build a record stamped now with the given precision
    pub fn build_with_precision(
        sender: impl Into<String>,
        body: impl Into<String>,
        precision: Precision,
    ) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
            recorded_at: format_timestamp(precision),
            extra: Map::new(),
        }
    }

    /// Normalize a decoded JSON object into a record stamped now.
    ///
    /// `sender` falls back to `username` and `body` falls back to `message`.
    /// Any incoming `timestamp` is replaced. Remaining keys go to `extra`.
    pub fn from_object(object: Map<String, Value>, precision: Precision) -> Self {
        let mut record = Self::from_stored(object);
        record.recorded_at = format_timestamp(precision);
        record
    }

    /// Keys carried alongside sender, body and timestamp
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Normalize an object read back from the persisted log, keeping its timestamp
    pub(crate) fn from_stored(mut object: Map<String, Value>) -> Self {
        let sender = take_text(&mut object, "sender", "username");
        let body = take_text(&mut object, "body", "message");
        let recorded_at = object
            .remove("timestamp")
            .map(value_to_text)
            .unwrap_or_default();

        Self {
            sender,
            body,
            recorded_at,
            extra: object,
        }
    }
}

/// Remove both spellings of a field, preferring `primary`.
///
/// Both spellings serialize to the same stored key, so the shadowed one is dropped.
fn take_text(object: &mut Map<String, Value>, primary: &str, legacy: &str) -> String {
    let legacy_value = object.remove(legacy);
    object
        .remove(primary)
        .or(legacy_value)
        .map(value_to_text)
        .unwrap_or_default()
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_build_keeps_fields_verbatim() {
        let record = Record::build("  alice ", "<b>hi</b>");
        assert_eq!(record.sender, "  alice ");
        assert_eq!(record.body, "<b>hi</b>");
        assert_eq!(record.recorded_at.len(), "2024-01-01 00:00:00".len());
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_build_with_micros() {
        let record = Record::build_with_precision("a", "b", Precision::Micros);
        assert_eq!(record.recorded_at.len(), "2024-01-01 00:00:00.000000".len());
    }

    #[test]
    fn test_serializes_with_log_field_names() {
        let record = Record {
            sender: "alice".to_string(),
            body: "hi".to_string(),
            recorded_at: "2024-05-01 10:00:00".to_string(),
            extra: Map::new(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"username": "alice", "message": "hi", "timestamp": "2024-05-01 10:00:00"})
        );
    }

    #[test]
    fn test_reserved_keys_never_reach_extra() {
        let record = Record::from_object(
            object(json!({
                "username": "u",
                "message": "m",
                "sender": "s",
                "body": "b",
                "timestamp": "t",
                "room": 1
            })),
            Precision::Seconds,
        );

        assert_eq!(record.sender, "s");
        assert_eq!(record.body, "b");
        assert_eq!(record.extra().len(), 1);

        let text = serde_json::to_string(&record).unwrap();
        for key in ["\"username\"", "\"message\"", "\"timestamp\""] {
            assert_eq!(text.matches(key).count(), 1, "{} repeated in {}", key, text);
        }
        assert!(!text.contains("\"sender\""));
        assert!(!text.contains("\"body\""));
    }

    #[test]
    fn test_from_object_normalizes_datagram_keys() {
        let record = Record::from_object(
            object(json!({"sender": "x", "body": "y", "timestamp": "old", "room": 7})),
            Precision::Micros,
        );

        assert_eq!(record.sender, "x");
        assert_eq!(record.body, "y");
        assert_ne!(record.recorded_at, "old");
        assert_eq!(record.extra.get("room"), Some(&json!(7)));
        assert!(!record.extra.contains_key("timestamp"));
    }

    #[test]
    fn test_from_object_accepts_form_names_and_missing_fields() {
        let record = Record::from_object(object(json!({"username": "bob"})), Precision::Seconds);
        assert_eq!(record.sender, "bob");
        assert_eq!(record.body, "");
    }

    #[test]
    fn test_from_object_stringifies_non_text_values() {
        let record = Record::from_object(
            object(json!({"sender": 42, "body": null})),
            Precision::Seconds,
        );
        assert_eq!(record.sender, "42");
        assert_eq!(record.body, "");
    }

    #[test]
    fn test_from_object_prefers_datagram_spelling() {
        let record = Record::from_object(
            object(json!({"sender": "x", "username": "u"})),
            Precision::Seconds,
        );
        assert_eq!(record.sender, "x");
        assert!(record.extra.is_empty());

        // Exactly one "username" key in the stored form
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text.matches("\"username\"").count(), 1);
    }

    #[test]
    fn test_from_stored_keeps_timestamp() {
        let record = Record::from_stored(object(
            json!({"username": "a", "message": "b", "timestamp": "2024-01-01 00:00:00"}),
        ));
        assert_eq!(record.recorded_at, "2024-01-01 00:00:00");
    }
}
