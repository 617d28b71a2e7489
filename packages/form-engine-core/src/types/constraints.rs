//! Per-type constraint payloads.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::field_type::FieldType;

/// Generation strategy of an identifier field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    AutoIncrement,
    Uuid,
}

/// Identifier constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifierConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<IdStrategy>,
}

/// String constraints. Bounds are inclusive and counted in characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringConstraints {
    /// Free-form classifier (text, email, phone, ...); never enforced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Numeric constraints. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Maximum number of decimal digits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

/// Representation accepted by a temporal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `YYYY-MM-DD`
    Date,
    /// `HH:MM` or `HH:MM:SS`
    Time,
    /// RFC 3339 or `YYYY-MM-DD HH:MM:SS`
    DateTime,
    /// Any string form above, or integer epoch milliseconds
    DateObject,
}

impl TimeFormat {
    pub fn tag(self) -> &'static str {
        match self {
            TimeFormat::Date => "date",
            TimeFormat::Time => "time",
            TimeFormat::DateTime => "datetime",
            TimeFormat::DateObject => "date_object",
        }
    }
}

impl FromStr for TimeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(TimeFormat::Date),
            "time" => Ok(TimeFormat::Time),
            "datetime" => Ok(TimeFormat::DateTime),
            "date_object" => Ok(TimeFormat::DateObject),
            other => Err(format!("unknown time_format '{}'", other)),
        }
    }
}

/// Temporal constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalConstraints {
    /// Representation tag; kept as written so unrecognized tags round-trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
}

impl TemporalConstraints {
    /// Resolved representation. Missing tags mean `datetime`; unrecognized
    /// tags accept any recognized representation.
    pub fn format(&self) -> TimeFormat {
        match self.time_format.as_deref() {
            None => TimeFormat::DateTime,
            Some(tag) => tag.parse().unwrap_or(TimeFormat::DateObject),
        }
    }
}

/// One selectable option of an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    #[serde(default)]
    pub label: String,
    pub value: String,
}

impl EnumOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Enumerated constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumConstraints {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_options: Vec<EnumOption>,
    /// Option list written by older clients
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<EnumOption>,
}

impl EnumConstraints {
    pub fn with_options(options: Vec<EnumOption>) -> Self {
        Self {
            enum_options: options,
            options: Vec::new(),
        }
    }

    /// Options in effect: `enum_options`, falling back to the legacy list.
    pub fn effective_options(&self) -> &[EnumOption] {
        if self.enum_options.is_empty() {
            &self.options
        } else {
            &self.enum_options
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.effective_options().iter().any(|o| o.value == value)
    }
}

/// Type tag plus its constraint payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Identifier(IdentifierConstraints),
    String(StringConstraints),
    Number(NumberConstraints),
    Enum(EnumConstraints),
    Temporal(TemporalConstraints),
    /// Tag not known to the registry
    Unknown,
}

impl FieldKind {
    /// Registry type, `None` for unknown tags.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            FieldKind::Identifier(_) => Some(FieldType::Identifier),
            FieldKind::String(_) => Some(FieldType::String),
            FieldKind::Number(_) => Some(FieldType::Number),
            FieldKind::Enum(_) => Some(FieldType::Enum),
            FieldKind::Temporal(_) => Some(FieldType::Temporal),
            FieldKind::Unknown => None,
        }
    }
}
