//! Document values
//!
//! Documents travel as plain JSON objects (`RawDocument`). Once a document is
//! checked against its collection's schema, each value becomes a `FieldValue`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::models::{FieldType, ID_FIELD};

/// A document exactly as the server sent it, key order preserved.
pub type RawDocument = serde_json::Map<String, serde_json::Value>;

/// Server-assigned id of a raw document.
///
/// The data service hands out string ids; numeric ids are accepted and
/// rendered in decimal. An empty string counts as missing.
pub fn document_id(doc: &RawDocument) -> Option<String> {
    match doc.get(ID_FIELD)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A schema-typed document value.
///
/// Numbers keep their JSON representation so that `42` stays an integer
/// when written back.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Number(serde_json::Number),
    Boolean(bool),
    /// `date` fields; written as RFC 3339 in UTC.
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Interpret a JSON value as the given field type.
    ///
    /// Returns `None` when the value does not fit the type, or the type is
    /// not one of the four known ones.
    pub fn from_json(value: &serde_json::Value, field_type: &FieldType) -> Option<Self> {
        match (field_type, value) {
            (FieldType::String, serde_json::Value::String(s)) => Some(FieldValue::String(s.clone())),
            (FieldType::Number, serde_json::Value::Number(n)) => Some(FieldValue::Number(n.clone())),
            (FieldType::Boolean, serde_json::Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
            (FieldType::Date, serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| FieldValue::Timestamp(dt.with_timezone(&Utc))),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::Value::Number(n.clone()),
            FieldValue::Boolean(b) => serde_json::Value::Bool(*b),
            FieldValue::Timestamp(dt) => serde_json::Value::String(format_timestamp(dt)),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::String(_) => FieldType::String,
            FieldValue::Number(_) => FieldType::Number,
            FieldValue::Boolean(_) => FieldType::Boolean,
            FieldValue::Timestamp(_) => FieldType::Date,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(dt) => Some(dt),
            _ => None,
        }
    }
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => n.serialize(serializer),
            FieldValue::Boolean(b) => serializer.serialize_bool(*b),
            FieldValue::Timestamp(dt) => serializer.serialize_str(&format_timestamp(dt)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Number(i.into())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_respects_field_type() {
        assert_eq!(
            FieldValue::from_json(&json!("x"), &FieldType::String),
            Some(FieldValue::String("x".to_string()))
        );
        assert_eq!(FieldValue::from_json(&json!(1), &FieldType::String), None);
        assert_eq!(
            FieldValue::from_json(&json!(true), &FieldType::Boolean),
            Some(FieldValue::Boolean(true))
        );
        assert_eq!(
            FieldValue::from_json(&json!("not a date"), &FieldType::Date),
            None
        );
        assert_eq!(
            FieldValue::from_json(&json!("x"), &FieldType::Other("geo".to_string())),
            None
        );
    }

    #[test]
    fn test_integers_stay_integers() {
        let value = FieldValue::from_json(&json!(42), &FieldType::Number).unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), "42");
        assert_eq!(value.as_f64(), Some(42.0));
    }

    #[test]
    fn test_timestamp_written_as_utc_rfc3339() {
        let value = FieldValue::from_json(&json!("2024-01-15T12:30:00+02:00"), &FieldType::Date)
            .unwrap();
        assert_eq!(value.to_json(), json!("2024-01-15T10:30:00Z"));
        assert_eq!(value.field_type(), FieldType::Date);
    }

    #[test]
    fn test_document_id_accepts_strings_and_numbers() {
        let doc = json!({"id": "65a1f0", "name": "x"});
        assert_eq!(document_id(doc.as_object().unwrap()), Some("65a1f0".to_string()));

        let doc = json!({"id": 12});
        assert_eq!(document_id(doc.as_object().unwrap()), Some("12".to_string()));

        let doc = json!({"id": ""});
        assert_eq!(document_id(doc.as_object().unwrap()), None);

        let doc = json!({"name": "x"});
        assert_eq!(document_id(doc.as_object().unwrap()), None);
    }
}
