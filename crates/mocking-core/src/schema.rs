//! Editing a collection's field schema
//!
//! `SchemaDraft` holds the working copy shown in the schema editor. It keeps
//! the `id` field present and read-only, refuses edits to read-only fields,
//! and validates names before the schema is saved.

use std::collections::HashSet;

use mocking_api::{Field, FieldType};

use crate::error::ValidationError;

/// A single change to one field of the draft.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Name(String),
    Type(FieldType),
    Format(Option<String>),
    Required(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDraft {
    initial: Vec<Field>,
    fields: Vec<Field>,
}

impl SchemaDraft {
    /// Start a draft from a collection's stored fields.
    pub fn from_fields(existing: &[Field]) -> Self {
        let initial = normalize_fields(existing);
        Self {
            fields: initial.clone(),
            initial,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    pub fn is_modified(&self) -> bool {
        self.fields != self.initial
    }

    /// Append an empty `string` field and return its index.
    pub fn add_field(&mut self) -> usize {
        let mut field = Field::new("", FieldType::String);
        field.format = Some(String::new());
        self.fields.push(field);
        self.fields.len() - 1
    }

    pub fn update_field(&mut self, index: usize, edit: FieldEdit) -> Result<(), ValidationError> {
        let field = self.editable_field(index)?;
        match edit {
            FieldEdit::Name(name) => field.name = name,
            FieldEdit::Type(field_type) => field.field_type = field_type,
            FieldEdit::Format(format) => field.format = format,
            FieldEdit::Required(required) => field.required = required,
        }
        Ok(())
    }

    pub fn remove_field(&mut self, index: usize) -> Result<Field, ValidationError> {
        self.editable_field(index)?;
        Ok(self.fields.remove(index))
    }

    /// Drop every edit made since the draft was created.
    pub fn reset(&mut self) {
        self.fields = self.initial.clone();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.fields)
    }

    /// Validate and hand out the fields to save.
    pub fn to_payload(&self) -> Result<Vec<Field>, ValidationError> {
        self.validate()?;
        Ok(self.fields.clone())
    }

    /// Mark the current fields as the saved baseline.
    pub fn mark_saved(&mut self) {
        self.initial = self.fields.clone();
    }

    fn editable_field(&mut self, index: usize) -> Result<&mut Field, ValidationError> {
        let field = self
            .fields
            .get_mut(index)
            .ok_or(ValidationError::FieldIndexOutOfRange { index })?;
        if field.read_only {
            return Err(ValidationError::ReadOnlyField {
                name: field.name.clone(),
            });
        }
        Ok(field)
    }
}

/// Ensure the `id` field exists and is read-only.
///
/// An existing `id` keeps its position; a missing one is prepended.
pub fn normalize_fields(existing: &[Field]) -> Vec<Field> {
    if existing.iter().any(Field::is_id) {
        existing
            .iter()
            .map(|f| {
                if f.is_id() {
                    Field {
                        read_only: true,
                        ..f.clone()
                    }
                } else {
                    f.clone()
                }
            })
            .collect()
    } else {
        std::iter::once(Field::id_field())
            .chain(existing.iter().cloned())
            .collect()
    }
}

/// Every field needs a non-blank name, and names must be unique.
pub fn validate_fields(fields: &[Field]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(ValidationError::EmptyFieldName);
        }
        if !seen.insert(field.name.as_str()) {
            return Err(ValidationError::DuplicateField {
                name: field.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mocking_api::ID_FIELD;

    #[test]
    fn test_missing_id_is_prepended() {
        let draft = SchemaDraft::from_fields(&[Field::new("email", FieldType::String)]);
        let names: Vec<&str> = draft.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec![ID_FIELD, "email"]);
        assert!(draft.fields()[0].read_only);
        assert!(draft.fields()[0].required);
    }

    #[test]
    fn test_existing_id_becomes_read_only_in_place() {
        let mut id = Field::new(ID_FIELD, FieldType::String);
        id.read_only = false;
        let draft = SchemaDraft::from_fields(&[Field::new("email", FieldType::String), id]);
        assert_eq!(draft.fields()[1].name, ID_FIELD);
        assert!(draft.fields()[1].read_only);
        assert!(!draft.is_modified());
    }

    #[test]
    fn test_read_only_fields_cannot_change() {
        let mut draft = SchemaDraft::from_fields(&[]);
        assert_eq!(
            draft.remove_field(0).unwrap_err(),
            ValidationError::ReadOnlyField {
                name: ID_FIELD.to_string()
            }
        );
        assert!(draft
            .update_field(0, FieldEdit::Name("key".to_string()))
            .is_err());
        assert_eq!(
            draft.remove_field(5).unwrap_err(),
            ValidationError::FieldIndexOutOfRange { index: 5 }
        );
    }

    #[test]
    fn test_add_edit_validate_and_reset() {
        let mut draft = SchemaDraft::from_fields(&[]);
        let index = draft.add_field();
        assert_eq!(draft.validate(), Err(ValidationError::EmptyFieldName));

        draft
            .update_field(index, FieldEdit::Name("email".to_string()))
            .unwrap();
        draft
            .update_field(index, FieldEdit::Format(Some("email".to_string())))
            .unwrap();
        draft.update_field(index, FieldEdit::Required(true)).unwrap();
        assert!(draft.validate().is_ok());
        assert!(draft.is_modified());

        let dup = draft.add_field();
        draft
            .update_field(dup, FieldEdit::Name("email".to_string()))
            .unwrap();
        assert_eq!(
            draft.to_payload(),
            Err(ValidationError::DuplicateField {
                name: "email".to_string()
            })
        );

        draft.reset();
        assert_eq!(draft.fields().len(), 1);
        assert!(!draft.is_modified());
    }

    #[test]
    fn test_mark_saved_moves_baseline() {
        let mut draft = SchemaDraft::from_fields(&[]);
        let index = draft.add_field();
        draft
            .update_field(index, FieldEdit::Name("title".to_string()))
            .unwrap();
        draft.mark_saved();
        draft.reset();
        assert_eq!(draft.fields().len(), 2);
    }
}
