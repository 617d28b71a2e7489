use serde_json::Value;

use super::field_type::{FieldType, TypeDescriptor};

static DESCRIPTORS: [TypeDescriptor; 5] = [
    TypeDescriptor {
        field_type: FieldType::Identifier,
        constraint_keys: &["id_type"],
        blank_is_absent: true,
        requires_options: false,
    },
    TypeDescriptor {
        field_type: FieldType::String,
        constraint_keys: &["format", "min_length", "max_length"],
        blank_is_absent: true,
        requires_options: false,
    },
    TypeDescriptor {
        field_type: FieldType::Number,
        constraint_keys: &["min_value", "max_value", "precision"],
        blank_is_absent: false,
        requires_options: false,
    },
    TypeDescriptor {
        field_type: FieldType::Enum,
        constraint_keys: &["enum_options", "options"],
        blank_is_absent: true,
        requires_options: true,
    },
    TypeDescriptor {
        field_type: FieldType::Temporal,
        constraint_keys: &["time_format"],
        blank_is_absent: true,
        requires_options: false,
    },
];

/// Constraint default implied by an alias tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Implied {
    None,
    Str(&'static str, &'static str),
    Int(&'static str, u64),
}

/// Tags accepted besides the canonical ones.
const ALIASES: &[(&str, FieldType, Implied)] = &[
    ("identifier", FieldType::Identifier, Implied::None),
    ("uuid", FieldType::Identifier, Implied::Str("id_type", "uuid")),
    ("text", FieldType::String, Implied::Str("format", "text")),
    ("textarea", FieldType::String, Implied::Str("format", "text")),
    ("email", FieldType::String, Implied::Str("format", "email")),
    ("phone", FieldType::String, Implied::Str("format", "phone")),
    ("url", FieldType::String, Implied::Str("format", "url")),
    ("password", FieldType::String, Implied::Str("format", "password")),
    ("numeric", FieldType::Number, Implied::None),
    ("integer", FieldType::Number, Implied::Int("precision", 0)),
    ("float", FieldType::Number, Implied::None),
    ("decimal", FieldType::Number, Implied::None),
    ("enumerated", FieldType::Enum, Implied::None),
    ("select", FieldType::Enum, Implied::None),
    ("radio", FieldType::Enum, Implied::None),
    ("temporal", FieldType::Temporal, Implied::None),
    ("date", FieldType::Temporal, Implied::Str("time_format", "date")),
    ("datetime", FieldType::Temporal, Implied::Str("time_format", "datetime")),
];

/// Outcome of resolving a type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    pub field_type: FieldType,
    /// Constraint key and value applied when the definition leaves it unset
    pub implied: Option<(&'static str, Value)>,
}

/// Static, closed mapping from type tags to field types and their descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeRegistry;

impl TypeRegistry {
    /// Resolves a type tag (canonical or alias, case-insensitive).
    ///
    /// # Returns
    /// `None` when the tag is not known.
    pub fn resolve(tag: &str) -> Option<ResolvedType> {
        let tag = tag.trim();
        if let Some(field_type) = FieldType::ALL
            .into_iter()
            .find(|t| t.tag().eq_ignore_ascii_case(tag))
        {
            return Some(ResolvedType {
                field_type,
                implied: None,
            });
        }

        ALIASES
            .iter()
            .find(|(alias, _, _)| alias.eq_ignore_ascii_case(tag))
            .map(|(_, field_type, implied)| ResolvedType {
                field_type: *field_type,
                implied: match *implied {
                    Implied::None => None,
                    Implied::Str(key, value) => Some((key, Value::from(value))),
                    Implied::Int(key, value) => Some((key, Value::from(value))),
                },
            })
    }

    /// Returns the descriptor of a field type.
    pub fn descriptor(field_type: FieldType) -> &'static TypeDescriptor {
        // DESCRIPTORS is indexed in FieldType::ALL order
        let index = FieldType::ALL
            .iter()
            .position(|t| *t == field_type)
            .unwrap_or_default();
        &DESCRIPTORS[index]
    }

    /// Whether an empty string counts as absent for the given type.
    ///
    /// Unknown types treat blanks as absent so they never block
    /// empty-but-optional fields.
    pub fn blank_is_absent(field_type: Option<FieldType>) -> bool {
        field_type.map_or(true, |t| Self::descriptor(t).blank_is_absent)
    }
}
