//! Hierarchical categories and the integrity rules guarding their tree.

mod integrity;
mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::CategoryId;

pub use integrity::would_create_cycle;
pub use service::CategoryService;

/// A node of the category tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// `None` for root nodes
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub sort: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Input for creating a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub sort: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parent_id: None,
            icon: String::new(),
            color: String::new(),
            sort: 0,
            is_active: true,
        }
    }

    pub fn under(mut self, parent: CategoryId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn sort(mut self, sort: i32) -> Self {
        self.sort = sort;
        self
    }
}

/// Partial update of a category. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` moves the node to the root level
    pub parent: Option<Option<CategoryId>>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort: Option<i32>,
    pub is_active: Option<bool>,
}

impl CategoryUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn reparent(parent: Option<CategoryId>) -> Self {
        Self {
            parent: Some(parent),
            ..Default::default()
        }
    }
}

/// Nested view of a category and its descendants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CategoryNode>,
}
