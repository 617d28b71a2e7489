//! Record validation against a form schema.
//!
//! Fields are checked in schema order and the first failure wins, so the
//! reported field and message are deterministic. Keys present in the payload
//! but absent from the schema are tolerated. Fields are validated
//! independently of each other.

mod checks;

use serde_json::Value;

use crate::error::ValidationError;
use crate::record::RecordData;
use crate::schema::{FieldDefinition, FormSchema};
use crate::types::TypeRegistry;

/// Pure validator of record payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates a payload against a stored schema.
    pub fn validate(&self, schema: &FormSchema, data: &RecordData) -> Result<(), ValidationError> {
        self.validate_fields(&schema.fields, data)
    }

    /// Validates a payload against an ordered field list.
    ///
    /// # Returns
    /// `Ok(())` if every field passes, otherwise the first failing field and reason.
    pub fn validate_fields(
        &self,
        fields: &[FieldDefinition],
        data: &RecordData,
    ) -> Result<(), ValidationError> {
        for field in fields {
            let value = data.get(&field.id);
            match value {
                Some(value) if !is_absent(field, value) => {
                    checks::check_value(field, value)
                        .map_err(|reason| ValidationError::new(&field.id, reason))?;
                }
                _ if field.required => {
                    return Err(ValidationError::new(
                        &field.id,
                        format!("missing required field `{}`", field.display_name()),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Null always counts as absent; the empty string only for text-valued types.
fn is_absent(field: &FieldDefinition, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) if s.is_empty() => TypeRegistry::blank_is_absent(field.field_type()),
        _ => false,
    }
}
