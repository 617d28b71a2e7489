//! Structural checks applied when a schema is defined or revised.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{FieldKind, TypeRegistry};

use super::field::FieldDefinition;

/// Validates a schema name and field list before it is stored.
///
/// Checks a non-empty name, non-empty and unique field ids, a non-empty and
/// duplicate-free option set for enumerated fields, and ordered bounds.
/// Unknown type tags are accepted; the record validator rejects any value
/// submitted for them.
///
/// # Returns
/// `Ok(())` or the first offending field.
pub fn validate_definition(name: &str, fields: &[FieldDefinition]) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", "schema name must not be empty"));
    }

    let mut seen_ids = HashSet::new();
    for (position, field) in fields.iter().enumerate() {
        if field.id.trim().is_empty() {
            return Err(ValidationError::new(
                format!("#{}", position),
                "field id must not be empty",
            ));
        }
        if !seen_ids.insert(field.id.as_str()) {
            return Err(ValidationError::new(&field.id, "duplicate field id"));
        }

        let Some(field_type) = field.field_type() else {
            tracing::warn!(
                "Field '{}' uses unknown type '{}'; values for it will be rejected",
                field.id,
                field.type_tag
            );
            continue;
        };

        if TypeRegistry::descriptor(field_type).requires_options {
            let options = field.options();
            if options.is_empty() {
                return Err(ValidationError::new(
                    &field.id,
                    format!("{} field requires at least one option", field_type),
                ));
            }
            let mut seen_values = HashSet::new();
            for option in options {
                if !seen_values.insert(option.value.as_str()) {
                    return Err(ValidationError::new(
                        &field.id,
                        format!("duplicate option value \"{}\"", option.value),
                    ));
                }
            }
        }

        match &field.kind {
            FieldKind::String(c) => {
                if let (Some(min), Some(max)) = (c.min_length, c.max_length) {
                    if min > max {
                        return Err(ValidationError::new(
                            &field.id,
                            format!("min_length {} exceeds max_length {}", min, max),
                        ));
                    }
                }
            }
            FieldKind::Number(c) => {
                if let (Some(min), Some(max)) = (c.min_value, c.max_value) {
                    if min > max {
                        return Err(ValidationError::new(
                            &field.id,
                            format!("min_value {} exceeds max_value {}", min, max),
                        ));
                    }
                }
            }
            FieldKind::Identifier(_)
            | FieldKind::Enum(_)
            | FieldKind::Temporal(_)
            | FieldKind::Unknown => {}
        }
    }

    Ok(())
}
