//! Document editor text handling
//!
//! The editor works on JSON text in three modes. This module produces the
//! starting text for each mode and turns submitted text into typed payloads.
//! Everything here runs before a request is issued: a bulk submission with a
//! single entry lacking an `id` is rejected as a whole.

use mocking_api::{document_id, Field, RawDocument};
use serde_json::Value;

use crate::document::{merge_with_defaults, retain_schema_fields, Document, Presence};
use crate::error::ValidationError;
use crate::schema_defaults::{
    format_document_as_json, format_documents_as_json, generate_default_document,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    /// New document, seeded from the schema's example values.
    Create,
    /// One existing document; the id is kept outside the editable text.
    Edit { id: String },
    /// Every document of the collection as one JSON array.
    Bulk,
}

/// One entry of a bulk submission.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkEntry {
    pub id: String,
    pub document: Document,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorPayload {
    Create(Document),
    Update { id: String, document: Document },
    Bulk(Vec<BulkEntry>),
}

/// Starting text for a new document.
pub fn create_template(fields: &[Field]) -> String {
    format_document_as_json(&generate_default_document(fields))
}

/// Starting text for editing `document`: id stripped, gaps filled with
/// example values.
pub fn edit_template(document: &RawDocument, fields: &[Field]) -> String {
    format_document_as_json(&merge_with_defaults(document, fields))
}

/// Starting text for bulk editing: the documents as listed, limited to their
/// ids and schema fields.
pub fn bulk_template(documents: &[RawDocument], fields: &[Field]) -> String {
    let projected: Vec<RawDocument> = documents
        .iter()
        .map(|d| retain_schema_fields(d, fields))
        .collect();
    format_documents_as_json(&projected)
}

/// Parse and validate submitted editor text for `mode`.
pub fn parse_editor_text(
    mode: &EditorMode,
    text: &str,
    fields: &[Field],
) -> Result<EditorPayload, ValidationError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ValidationError::InvalidJson {
        message: e.to_string(),
    })?;

    match mode {
        EditorMode::Create => {
            let raw = expect_object(value)?;
            let document = Document::from_raw(&raw, fields, Presence::RequireAll)?;
            Ok(EditorPayload::Create(document))
        }
        EditorMode::Edit { id } => {
            let raw = expect_object(value)?;
            let document = Document::from_raw(&raw, fields, Presence::Partial)?;
            Ok(EditorPayload::Update {
                id: id.clone(),
                document,
            })
        }
        EditorMode::Bulk => parse_bulk(value, fields).map(EditorPayload::Bulk),
    }
}

fn parse_bulk(value: Value, fields: &[Field]) -> Result<Vec<BulkEntry>, ValidationError> {
    let Value::Array(items) = value else {
        return Err(ValidationError::ExpectedArray);
    };

    // Ids first, so a missing id wins over any schema complaint.
    let mut identified = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(raw) = item else {
            return Err(ValidationError::ExpectedObject);
        };
        let id = document_id(&raw).ok_or(ValidationError::MissingDocumentId { index })?;
        identified.push((id, raw));
    }

    identified
        .into_iter()
        .map(|(id, raw)| {
            Document::from_raw(&raw, fields, Presence::Partial)
                .map(|document| BulkEntry { id, document })
        })
        .collect()
}

fn expect_object(value: Value) -> Result<RawDocument, ValidationError> {
    match value {
        Value::Object(raw) => Ok(raw),
        _ => Err(ValidationError::ExpectedObject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mocking_api::FieldType;
    use serde_json::json;

    fn schema() -> Vec<Field> {
        vec![
            Field::id_field(),
            Field::new("title", FieldType::String).required(),
            Field::new("views", FieldType::Number),
        ]
    }

    #[test]
    fn test_create_template_parses_as_create_payload() {
        let text = create_template(&schema());
        let payload = parse_editor_text(&EditorMode::Create, &text, &schema()).unwrap();
        let EditorPayload::Create(document) = payload else {
            panic!("expected create payload");
        };
        assert_eq!(document.len(), 2);
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let err = parse_editor_text(&EditorMode::Create, "{\"title\": ", &schema()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidJson { .. }));
        assert_eq!(err.to_string(), "Invalid JSON format");
    }

    #[test]
    fn test_edit_keeps_id_outside_payload() {
        let existing = json!({"id": "d1", "title": "Hello"});
        let text = edit_template(existing.as_object().unwrap(), &schema());
        assert!(!text.contains("d1"));

        let payload = parse_editor_text(
            &EditorMode::Edit {
                id: "d1".to_string(),
            },
            &text,
            &schema(),
        )
        .unwrap();
        match payload {
            EditorPayload::Update { id, document } => {
                assert_eq!(id, "d1");
                assert!(document.get("id").is_none());
                assert_eq!(document.get("views").and_then(|v| v.as_f64()), Some(42.0));
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_unchanged_templates_validate_despite_dropped_field() {
        let existing = json!({"id": "d1", "title": "Hello", "legacy": "kept"});
        let existing = existing.as_object().cloned().unwrap();

        let edit = edit_template(&existing, &schema());
        assert!(!edit.contains("legacy"));
        let mode = EditorMode::Edit {
            id: "d1".to_string(),
        };
        assert!(parse_editor_text(&mode, &edit, &schema()).is_ok());

        let bulk = bulk_template(&[existing], &schema());
        assert!(!bulk.contains("legacy"));
        let EditorPayload::Bulk(entries) =
            parse_editor_text(&EditorMode::Bulk, &bulk, &schema()).unwrap()
        else {
            panic!("expected bulk payload");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "d1");
    }

    #[test]
    fn test_bulk_requires_array() {
        let err = parse_editor_text(&EditorMode::Bulk, "{}", &schema()).unwrap_err();
        assert_eq!(err, ValidationError::ExpectedArray);
    }

    #[test]
    fn test_bulk_entry_without_id_rejects_everything() {
        let text = json!([
            {"id": "a", "title": "one"},
            {"title": "two"},
            {"id": "c", "views": "not a number"}
        ])
        .to_string();
        let err = parse_editor_text(&EditorMode::Bulk, &text, &schema()).unwrap_err();
        assert_eq!(err, ValidationError::MissingDocumentId { index: 1 });
    }

    #[test]
    fn test_bulk_round_trips_listed_documents() {
        let docs: Vec<RawDocument> = vec![
            json!({"id": "a", "title": "one", "views": 1}),
            json!({"id": "b", "title": "two"}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();

        let text = bulk_template(&docs, &schema());
        let EditorPayload::Bulk(entries) =
            parse_editor_text(&EditorMode::Bulk, &text, &schema()).unwrap()
        else {
            panic!("expected bulk payload");
        };
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(entries.iter().all(|e| e.document.get("id").is_none()));
    }
}
