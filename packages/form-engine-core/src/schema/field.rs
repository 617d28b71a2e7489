//! Field definitions and their flat document representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{EnumOption, FieldKind, FieldType, TypeRegistry};

/// One typed field of a form schema.
///
/// Stored as a flat JSON object: `id`, `name`, `label`, `type`, `required`,
/// the constraint keys of the type, and any display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawField", into = "RawField")]
pub struct FieldDefinition {
    /// Key into record payloads, unique within the schema
    pub id: String,
    pub name: String,
    pub label: String,
    /// Type tag as written by the schema author
    pub type_tag: String,
    /// Governs presence checking only
    pub required: bool,
    /// Resolved type and constraint payload
    pub kind: FieldKind,
    /// Keys not consumed by the type (placeholder, sort_order, ...)
    pub extras: Map<String, Value>,
}

impl FieldDefinition {
    /// Creates an optional field whose name defaults to its id.
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        let id = id.into();
        let type_tag = kind
            .field_type()
            .map(|t| t.tag().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            name: id.clone(),
            id,
            label: label.into(),
            type_tag,
            required: false,
            kind,
            extras: Map::new(),
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Overrides the type tag, e.g. to keep an unknown tag.
    pub fn with_type_tag(mut self, tag: impl Into<String>) -> Self {
        self.type_tag = tag.into();
        self
    }

    pub fn field_type(&self) -> Option<FieldType> {
        self.kind.field_type()
    }

    /// Name shown in messages: label, then name, then id.
    pub fn display_name(&self) -> &str {
        [&self.label, &self.name, &self.id]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Options of an enumerated field; empty for every other type.
    pub fn options(&self) -> &[EnumOption] {
        match &self.kind {
            FieldKind::Enum(c) => c.effective_options(),
            _ => &[],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawField {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    label: String,
    #[serde(rename = "type", default)]
    type_tag: String,
    #[serde(default)]
    required: bool,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl TryFrom<RawField> for FieldDefinition {
    type Error = String;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        let RawField {
            id,
            name,
            label,
            type_tag,
            required,
            mut rest,
        } = raw;

        let kind = match TypeRegistry::resolve(&type_tag) {
            None => FieldKind::Unknown,
            Some(resolved) => {
                let descriptor = TypeRegistry::descriptor(resolved.field_type);
                let mut constraints = Map::new();
                for key in descriptor.constraint_keys {
                    if let Some(value) = rest.remove(*key) {
                        constraints.insert((*key).to_string(), value);
                    }
                }
                if let Some((key, value)) = resolved.implied {
                    constraints.entry(key).or_insert(value);
                }
                parse_kind(resolved.field_type, constraints).map_err(|e| {
                    format!(
                        "field '{}': invalid constraints for type '{}': {}",
                        id, type_tag, e
                    )
                })?
            }
        };

        Ok(FieldDefinition {
            id,
            name,
            label,
            type_tag,
            required,
            kind,
            extras: rest,
        })
    }
}

impl From<FieldDefinition> for RawField {
    fn from(field: FieldDefinition) -> Self {
        let mut rest = field.extras;
        let constraints = match &field.kind {
            FieldKind::Identifier(c) => serde_json::to_value(c),
            FieldKind::String(c) => serde_json::to_value(c),
            FieldKind::Number(c) => serde_json::to_value(c),
            FieldKind::Enum(c) => serde_json::to_value(c),
            FieldKind::Temporal(c) => serde_json::to_value(c),
            FieldKind::Unknown => Ok(Value::Null),
        };
        if let Ok(Value::Object(map)) = constraints {
            rest.extend(map);
        }

        RawField {
            id: field.id,
            name: field.name,
            label: field.label,
            type_tag: field.type_tag,
            required: field.required,
            rest,
        }
    }
}

fn parse_kind(
    field_type: FieldType,
    constraints: Map<String, Value>,
) -> Result<FieldKind, serde_json::Error> {
    let value = Value::Object(constraints);
    Ok(match field_type {
        FieldType::Identifier => FieldKind::Identifier(serde_json::from_value(value)?),
        FieldType::String => FieldKind::String(serde_json::from_value(value)?),
        FieldType::Number => FieldKind::Number(serde_json::from_value(value)?),
        FieldType::Enum => FieldKind::Enum(serde_json::from_value(value)?),
        FieldType::Temporal => FieldKind::Temporal(serde_json::from_value(value)?),
    })
}
