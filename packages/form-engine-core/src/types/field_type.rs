use std::fmt;

/// Closed set of supported field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Identifier,
    String,
    Number,
    Enum,
    Temporal,
}

impl FieldType {
    /// All field types, in registry order.
    pub const ALL: [FieldType; 5] = [
        FieldType::Identifier,
        FieldType::String,
        FieldType::Number,
        FieldType::Enum,
        FieldType::Temporal,
    ];

    /// Canonical tag written into schema documents.
    pub fn tag(self) -> &'static str {
        match self {
            FieldType::Identifier => "id",
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Enum => "enum",
            FieldType::Temporal => "time",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Static description of what a field type recognizes and how presence is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Field type described
    pub field_type: FieldType,
    /// Constraint keys consumed by this type; other keys are carried as metadata
    pub constraint_keys: &'static [&'static str],
    /// Whether an empty string counts as an absent value
    pub blank_is_absent: bool,
    /// Whether a definition must declare at least one option
    pub requires_options: bool,
}
