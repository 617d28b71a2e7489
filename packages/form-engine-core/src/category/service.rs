//! Category create/update/delete path with the tree invariants enforced.

use chrono::Utc;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::FormError;
use crate::ids::CategoryId;
use crate::store::{CategoryStore, FileIndex};

use super::integrity::would_create_cycle;
use super::{Category, CategoryNode, CategoryUpdate, NewCategory};

const ENTITY: &str = "category";

/// Category operations. Holds no state besides the ancestor walk cap.
#[derive(Debug, Clone, Copy)]
pub struct CategoryService {
    max_depth: usize,
}

impl Default for CategoryService {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl CategoryService {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_max_depth(config.max_ancestor_depth)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Creates a category.
    ///
    /// # Errors
    /// `NotFound` if the parent is missing, `NameConflict` if a sibling already
    /// uses the name, `ValidationFailed` for a blank name.
    pub fn create_category<S>(&self, store: &mut S, input: NewCategory) -> Result<Category, FormError>
    where
        S: CategoryStore,
    {
        let name = checked_name(&input.name)?;
        if let Some(parent) = input.parent_id {
            require(&*store, parent)?;
        }
        ensure_unique_name(&*store, input.parent_id, &name, None)?;

        let now = Utc::now();
        let mut category = Category {
            id: CategoryId(0),
            name,
            description: input.description,
            parent_id: input.parent_id,
            icon: input.icon,
            color: input.color,
            sort: input.sort,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        category.id = store.create_category(category.clone())?;
        info!(id = category.id.get(), name = %category.name, "Category created");
        Ok(category)
    }

    /// Applies a partial update.
    ///
    /// A parent change is checked against the tree before it is written; the
    /// node's children keep their parent pointers. The name is re-checked for
    /// uniqueness whenever the name or the parent changes.
    pub fn update_category<S>(
        &self,
        store: &mut S,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Category, FormError>
    where
        S: CategoryStore,
    {
        let mut category = require(&*store, id)?;

        let name = match update.name {
            Some(name) => checked_name(&name)?,
            None => category.name.clone(),
        };
        let parent_id = update.parent.unwrap_or(category.parent_id);

        if parent_id != category.parent_id {
            if let Some(parent) = parent_id {
                if parent == id {
                    return Err(self.reject_cycle(id, parent));
                }
                require(&*store, parent)?;
                if would_create_cycle(&*store, id, parent, self.max_depth)? {
                    return Err(self.reject_cycle(id, parent));
                }
            }
        }
        if name != category.name || parent_id != category.parent_id {
            ensure_unique_name(&*store, parent_id, &name, Some(id))?;
        }

        category.name = name;
        category.parent_id = parent_id;
        if let Some(description) = update.description {
            category.description = description;
        }
        if let Some(icon) = update.icon {
            category.icon = icon;
        }
        if let Some(color) = update.color {
            category.color = color;
        }
        if let Some(sort) = update.sort {
            category.sort = sort;
        }
        if let Some(is_active) = update.is_active {
            category.is_active = is_active;
        }
        category.updated_at = Utc::now();

        store.replace_category(category.clone())?;
        info!(id = id.get(), "Category updated");
        Ok(category)
    }

    /// Deletes a leaf category that no live file points at.
    pub fn delete_category<S>(&self, store: &mut S, id: CategoryId) -> Result<(), FormError>
    where
        S: CategoryStore + FileIndex,
    {
        require(&*store, id)?;

        let children = store.count_children(id)?;
        if children > 0 {
            return Err(FormError::ReferentialConflict {
                entity: ENTITY,
                id: id.get(),
                dependents: children,
                kind: "child categories",
            });
        }
        let files = store.count_live_files(id)?;
        if files > 0 {
            return Err(FormError::ReferentialConflict {
                entity: ENTITY,
                id: id.get(),
                dependents: files,
                kind: "files",
            });
        }

        store.delete_category(id)?;
        info!(id = id.get(), "Category deleted");
        Ok(())
    }

    /// Returns the forest of all categories, siblings ordered by sort then name.
    ///
    /// Nodes unreachable from a root (a corrupt loop) are left out.
    pub fn category_tree<S>(&self, store: &S) -> Result<Vec<CategoryNode>, FormError>
    where
        S: CategoryStore + ?Sized,
    {
        let mut all = store.list_categories()?;
        all.sort_by(|a, b| a.sort.cmp(&b.sort).then_with(|| a.name.cmp(&b.name)));
        Ok(build_level(&all, None, self.max_depth))
    }

    fn reject_cycle(&self, node: CategoryId, parent: CategoryId) -> FormError {
        warn!(node = node.get(), parent = parent.get(), "Reparent rejected");
        FormError::CycleRejected {
            node: node.get(),
            parent: parent.get(),
        }
    }
}

fn build_level(all: &[Category], parent: Option<CategoryId>, depth: usize) -> Vec<CategoryNode> {
    if depth == 0 {
        return Vec::new();
    }
    all.iter()
        .filter(|c| c.parent_id == parent)
        .map(|c| CategoryNode {
            category: c.clone(),
            children: build_level(all, Some(c.id), depth - 1),
        })
        .collect()
}

fn checked_name(name: &str) -> Result<String, FormError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FormError::validation("name", "category name must not be empty"));
    }
    Ok(name.to_string())
}

fn require<S: CategoryStore + ?Sized>(store: &S, id: CategoryId) -> Result<Category, FormError> {
    store.get_category(id)?.ok_or(FormError::NotFound {
        entity: ENTITY,
        id: id.get(),
    })
}

fn ensure_unique_name<S: CategoryStore + ?Sized>(
    store: &S,
    parent: Option<CategoryId>,
    name: &str,
    exclude: Option<CategoryId>,
) -> Result<(), FormError> {
    let taken = store
        .children(parent)?
        .iter()
        .any(|c| c.name == name && Some(c.id) != exclude);
    if taken {
        return Err(FormError::NameConflict {
            name: name.to_string(),
        });
    }
    Ok(())
}
