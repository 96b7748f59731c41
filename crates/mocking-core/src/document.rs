//! Schema-typed documents
//!
//! Editor text and server responses are plain JSON objects. Before a payload
//! is sent, it is checked against the collection's field list and turned into
//! a `Document`: a map from field name to `FieldValue` that never contains the
//! `id` key.

use indexmap::IndexMap;
use mocking_api::{document_id, Field, FieldValue, RawDocument, ID_FIELD};
use serde::Serialize;

use crate::error::ValidationError;
use crate::schema_defaults::generate_default_document;

/// Whether required fields must be present.
///
/// Creating a document needs every required field; updates may send a
/// partial document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    RequireAll,
    Partial,
}

/// A document payload that conforms to its collection's schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    values: IndexMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a raw JSON object against `fields`.
    ///
    /// An `id` key is dropped: it is never part of a payload. Keys not in
    /// the schema, values of the wrong type, and (with `RequireAll`) missing
    /// required fields are rejected.
    pub fn from_raw(
        raw: &RawDocument,
        fields: &[Field],
        presence: Presence,
    ) -> Result<Self, ValidationError> {
        let mut values = IndexMap::with_capacity(raw.len());

        for (name, value) in raw {
            if name == ID_FIELD {
                continue;
            }
            let field = fields
                .iter()
                .find(|f| &f.name == name)
                .ok_or_else(|| ValidationError::UnknownField { name: name.clone() })?;

            if !field.field_type.is_known() {
                return Err(ValidationError::UnsupportedFieldType {
                    name: name.clone(),
                    field_type: field.field_type.clone(),
                });
            }

            let typed = FieldValue::from_json(value, &field.field_type).ok_or_else(|| {
                ValidationError::TypeMismatch {
                    name: name.clone(),
                    expected: field.field_type.clone(),
                }
            })?;
            values.insert(name.clone(), typed);
        }

        if presence == Presence::RequireAll {
            if let Some(missing) = fields
                .iter()
                .filter(|f| f.required && !f.is_id())
                .find(|f| !values.contains_key(&f.name))
            {
                return Err(ValidationError::MissingRequired {
                    name: missing.name.clone(),
                });
            }
        }

        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Set a value. `id` is refused silently, the server owns it.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        if name != ID_FIELD {
            self.values.insert(name, value.into());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }

    pub fn to_raw(&self) -> RawDocument {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

/// Split a raw document into its id and the editable remainder.
pub fn strip_id(raw: &RawDocument) -> (Option<String>, RawDocument) {
    let id = document_id(raw);
    let rest = raw
        .iter()
        .filter(|(k, _)| k.as_str() != ID_FIELD)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    (id, rest)
}

/// Editable form of an existing document: `id` removed, schema fields the
/// document lacks filled with their example values.
///
/// Only editable schema fields are kept, in declaration order. Keys the
/// schema no longer declares are dropped so the text validates unchanged.
pub fn merge_with_defaults(existing: &RawDocument, fields: &[Field]) -> RawDocument {
    let (_, editable) = strip_id(existing);
    let defaults = generate_default_document(fields);

    let mut merged = RawDocument::new();
    for field in fields.iter().filter(|f| is_editable(f)) {
        if let Some(value) = editable.get(&field.name).or_else(|| defaults.get(&field.name)) {
            merged.insert(field.name.clone(), value.clone());
        }
    }
    merged
}

/// `raw` restricted to its `id` and the editable schema fields.
pub fn retain_schema_fields(raw: &RawDocument, fields: &[Field]) -> RawDocument {
    raw.iter()
        .filter(|(key, _)| {
            key.as_str() == ID_FIELD
                || fields.iter().any(|f| &f.name == *key && is_editable(f))
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn is_editable(field: &Field) -> bool {
    !field.is_id() && field.field_type.is_known()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mocking_api::FieldType;
    use serde_json::json;

    fn schema() -> Vec<Field> {
        vec![
            Field::id_field(),
            Field::new("name", FieldType::String).required(),
            Field::new("age", FieldType::Number),
            Field::new("active", FieldType::Boolean),
            Field::new("born", FieldType::Date),
        ]
    }

    fn raw(value: serde_json::Value) -> RawDocument {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_raw_types_values_and_drops_id() {
        let doc = Document::from_raw(
            &raw(json!({"id": "abc", "name": "Ada", "age": 36, "born": "1815-12-10T00:00:00Z"})),
            &schema(),
            Presence::RequireAll,
        )
        .unwrap();

        assert!(doc.get("id").is_none());
        assert_eq!(doc.get("name").and_then(FieldValue::as_str), Some("Ada"));
        assert_eq!(doc.get("age").and_then(FieldValue::as_f64), Some(36.0));
        assert!(doc.get("born").and_then(FieldValue::as_timestamp).is_some());
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"name": "Ada", "age": 36, "born": "1815-12-10T00:00:00Z"})
        );
    }

    #[test]
    fn test_from_raw_rejects_unknown_and_mistyped_fields() {
        let err = Document::from_raw(
            &raw(json!({"name": "Ada", "nickname": "A"})),
            &schema(),
            Presence::Partial,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownField {
                name: "nickname".to_string()
            }
        );

        let err = Document::from_raw(&raw(json!({"age": "old"})), &schema(), Presence::Partial)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                name: "age".to_string(),
                expected: FieldType::Number
            }
        );
    }

    #[test]
    fn test_required_only_checked_when_asked() {
        let partial = raw(json!({"age": 3}));
        assert!(Document::from_raw(&partial, &schema(), Presence::Partial).is_ok());
        assert_eq!(
            Document::from_raw(&partial, &schema(), Presence::RequireAll).unwrap_err(),
            ValidationError::MissingRequired {
                name: "name".to_string()
            }
        );
    }

    #[test]
    fn test_unsupported_type_is_rejected() {
        let fields = vec![Field::new("where", FieldType::Other("geo".to_string()))];
        let err =
            Document::from_raw(&raw(json!({"where": "x"})), &fields, Presence::Partial).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedFieldType { .. }));
    }

    #[test]
    fn test_insert_refuses_id() {
        let mut doc = Document::new();
        doc.insert("id", "x");
        doc.insert("name", "Ada");
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_merge_with_defaults_fills_gaps_and_strips_id() {
        let existing = raw(json!({"id": "abc", "age": 7, "legacy": "kept"}));
        let merged = merge_with_defaults(&existing, &schema());

        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "age", "active", "born"]);
        assert_eq!(merged["age"], json!(7));
        assert_eq!(merged["name"], json!("Lorem ipsum"));
        assert!(!merged.contains_key("id"));
    }

    #[test]
    fn test_retain_schema_fields_keeps_id() {
        let mut fields = schema();
        fields.push(Field::new("geo", FieldType::Other("geopoint".to_string())));
        let kept = retain_schema_fields(
            &raw(json!({"legacy": 1, "id": "abc", "age": 7, "geo": [0, 0]})),
            &fields,
        );
        assert_eq!(kept, raw(json!({"id": "abc", "age": 7})));
    }

    #[test]
    fn test_strip_id() {
        let (id, rest) = strip_id(&raw(json!({"id": "abc", "name": "Ada"})));
        assert_eq!(id.as_deref(), Some("abc"));
        assert_eq!(rest, raw(json!({"name": "Ada"})));
    }
}
