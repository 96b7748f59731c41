//! Client-side rules for MockingCode
//!
//! Pure logic shared by the client and its frontends:
//! - `schema_defaults`: example documents derived from a field schema
//! - `document`: schema-typed documents, validated before sending
//! - `schema`: the schema editor's working copy
//! - `editor`: document editor templates and payload parsing
//! - `limits`: collection/document limits

pub mod document;
pub mod editor;
pub mod error;
pub mod limits;
pub mod schema;
pub mod schema_defaults;

pub use document::{merge_with_defaults, retain_schema_fields, strip_id, Document, Presence};
pub use editor::{
    bulk_template, create_template, edit_template, parse_editor_text, BulkEntry, EditorMode,
    EditorPayload,
};
pub use error::ValidationError;
pub use limits::Limits;
pub use schema::{normalize_fields, validate_fields, FieldEdit, SchemaDraft};
pub use schema_defaults::{
    accepts_format, default_value_for_field, format_document_as_json, format_documents_as_json,
    generate_default_document, string_formats,
};
