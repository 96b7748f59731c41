//! Representative documents derived from a field schema
//!
//! Used to pre-fill the document editor. The output is advisory: it is not
//! checked against `required` or any server-side rule.

use mocking_api::{Field, FieldType, RawDocument};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
enum Example {
    Text(&'static str),
    Integer(i64),
    Boolean(bool),
}

impl Example {
    fn to_json(self) -> Value {
        match self {
            Example::Text(s) => Value::String(s.to_string()),
            Example::Integer(i) => Value::from(i),
            Example::Boolean(b) => Value::Bool(b),
        }
    }
}

/// (type, format, example). The empty format is the per-type fallback.
const EXAMPLES: &[(&str, &str, Example)] = &[
    ("string", "", Example::Text("Lorem ipsum")),
    ("string", "name", Example::Text("John Doe")),
    ("string", "email", Example::Text("john.doe@example.com")),
    ("string", "phone", Example::Text("+1 (555) 123-4567")),
    ("string", "username", Example::Text("john_doe")),
    ("string", "url", Example::Text("https://example.com")),
    ("string", "address", Example::Text("1 Example Street")),
    ("string", "city", Example::Text("Springfield")),
    ("string", "country", Example::Text("United States")),
    ("string", "uuid", Example::Text("550e8400-e29b-41d4-a716-446655440000")),
    ("number", "", Example::Integer(42)),
    ("number", "min:0,max:100", Example::Integer(50)),
    ("number", "min:1,max:10", Example::Integer(5)),
    ("boolean", "", Example::Boolean(true)),
    ("date", "", Example::Text("2024-01-15T10:30:00Z")),
];

fn lookup(field_type: &str, format: &str) -> Option<Example> {
    EXAMPLES
        .iter()
        .find(|(t, f, _)| *t == field_type && *f == format)
        .map(|(_, _, example)| *example)
}

/// Example value for one field, or `None` when the field gets no entry.
///
/// `id` never gets a value (the server assigns it). Lookup is by
/// `(type, format)`, then `(type, "")`; unknown types yield nothing.
pub fn default_value_for_field(field: &Field) -> Option<Value> {
    if field.is_id() || !field.field_type.is_known() {
        return None;
    }
    let type_name = field.field_type.as_str();
    let format = field.format_str();

    let example = if format.is_empty() {
        lookup(type_name, "")
    } else {
        lookup(type_name, format).or_else(|| lookup(type_name, ""))
    };
    example.map(Example::to_json)
}

/// Build the editor's starting document for a schema.
///
/// Keys appear in declaration order. Fields with a blank name, the `id`
/// field, and fields without an example are left out entirely.
pub fn generate_default_document(fields: &[Field]) -> RawDocument {
    let mut document = RawDocument::new();
    for field in fields {
        if field.name.trim().is_empty() {
            continue;
        }
        if let Some(value) = default_value_for_field(field) {
            document.insert(field.name.clone(), value);
        }
    }
    document
}

/// Pretty-print a document the way the editor shows it (two-space indent).
pub fn format_document_as_json(document: &RawDocument) -> String {
    format_json(document)
}

/// Pretty-print a list of documents for bulk editing.
pub fn format_documents_as_json(documents: &[RawDocument]) -> String {
    format_json(&documents)
}

fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    // Maps with string keys always serialize.
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// String formats the schema editor offers, with their labels.
pub fn string_formats() -> &'static [(&'static str, &'static str)] {
    &[
        ("", "Random word"),
        ("name", "Name"),
        ("email", "Email"),
        ("phone", "Phone"),
        ("username", "Username"),
        ("url", "URL"),
        ("address", "Address"),
        ("city", "City"),
        ("country", "Country"),
        ("uuid", "UUID"),
    ]
}

/// Whether a type takes a free-form format (`number` takes `min:a,max:b`).
pub fn accepts_format(field_type: &FieldType) -> bool {
    matches!(field_type, FieldType::String | FieldType::Number)
}
