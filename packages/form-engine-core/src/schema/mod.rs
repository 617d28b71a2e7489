//! Form schema model: named, ordered lists of typed field definitions.

mod definition;
mod field;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{SchemaId, UserId};

pub use definition::validate_definition;
pub use field::FieldDefinition;

/// A stored form schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub id: SchemaId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Owning user
    pub owner: UserId,
    /// Ordered field list; replaced as a whole on revision
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormSchema {
    /// Case-insensitive substring match on name or description.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.name.to_lowercase().contains(&keyword)
            || self.description.to_lowercase().contains(&keyword)
    }
}

/// Name, description and field list supplied when defining or revising a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl SchemaDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }
}
