//! Client-side validation failures
//!
//! These are raised before any request is sent. They convert into
//! `ApiError` so views can surface them like any other failure.

use mocking_api::{ApiError, FieldType};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("All fields must have a name")]
    EmptyFieldName,

    #[error("Duplicate field: {name}")]
    DuplicateField { name: String },

    #[error("Field {name} is read-only")]
    ReadOnlyField { name: String },

    #[error("No field at position {index}")]
    FieldIndexOutOfRange { index: usize },

    #[error("{what} name must not be empty")]
    EmptyName { what: &'static str },

    #[error("Invalid JSON format")]
    InvalidJson { message: String },

    #[error("Expected a JSON object")]
    ExpectedObject,

    #[error("Bulk edit needs an array of objects")]
    ExpectedArray,

    #[error("Every document must have an id (entry {index} has none)")]
    MissingDocumentId { index: usize },

    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    #[error("Field {name} must be a {expected}")]
    TypeMismatch { name: String, expected: FieldType },

    #[error("Field {name} has unsupported type {field_type}")]
    UnsupportedFieldType { name: String, field_type: FieldType },

    #[error("Missing required field: {name}")]
    MissingRequired { name: String },

    #[error("Limit reached: {limit}")]
    LimitReached { limit: usize },
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::InvalidJson { message } => ApiError::InvalidJson { message },
            ValidationError::LimitReached { limit } => ApiError::LimitReached { limit },
            other => ApiError::Validation {
                message: other.to_string(),
            },
        }
    }
}
