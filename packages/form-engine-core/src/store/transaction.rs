//! Exclusive write access with an undo log.

use crate::error::StoreError;

use super::table::{Entity, Row, TableAccess, Tables};

/// Represents a single applied change, kept so it can be undone.
#[derive(Debug, Clone)]
pub(crate) enum Change {
    /// A row was inserted
    Created {
        /// Table the row went into
        table: &'static str,
        /// Id assigned to the row
        id: u64,
    },
    /// A row was overwritten
    Replaced {
        /// Row as it was before the write
        previous: Row,
    },
    /// A row was removed
    Deleted {
        /// Row as it was before the delete
        original: Row,
    },
}

/// Write context over the locked tables.
///
/// Changes are applied in place and recorded. [`super::Database::transaction`]
/// keeps them when its closure succeeds and undoes them, newest first, when it
/// fails.
#[derive(Debug)]
pub struct Transaction<'a> {
    tables: &'a mut Tables,
    undo: Vec<Change>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(tables: &'a mut Tables) -> Self {
        Self {
            tables,
            undo: Vec::new(),
        }
    }

    /// Number of changes applied so far.
    pub fn change_count(&self) -> usize {
        self.undo.len()
    }

    /// Undoes every change and returns how many were reverted.
    pub(crate) fn rollback(mut self) -> usize {
        let count = self.undo.len();
        while let Some(change) = self.undo.pop() {
            match change {
                Change::Created { table, id } => self.tables.forget(table, id),
                Change::Replaced { previous } => previous.restore(self.tables),
                Change::Deleted { original } => original.restore(self.tables),
            }
        }
        count
    }
}

impl TableAccess for Transaction<'_> {
    fn tables(&self) -> &Tables {
        &*self.tables
    }

    fn insert<E: Entity>(&mut self, row: E) -> Result<E::Id, StoreError> {
        let id = E::table_mut(self.tables).insert(row);
        self.undo.push(Change::Created {
            table: E::TABLE,
            id: id.into(),
        });
        Ok(id)
    }

    fn replace<E: Entity>(&mut self, row: E) -> Result<(), StoreError> {
        let previous = E::table_mut(self.tables).replace(row)?;
        self.undo.push(Change::Replaced {
            previous: previous.into_row(),
        });
        Ok(())
    }

    fn remove<E: Entity>(&mut self, id: E::Id) -> Result<(), StoreError> {
        let original = E::table_mut(self.tables).remove(id)?;
        self.undo.push(Change::Deleted {
            original: original.into_row(),
        });
        Ok(())
    }
}
