//! Typed tables keyed by row id.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::category::Category;
use crate::error::StoreError;
use crate::ids::{CategoryId, FileId, RecordId, SchemaId};
use crate::record::FormRecord;
use crate::schema::FormSchema;

use super::FileRef;

/// A row type stored in one of the engine's tables.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Typed id of the row
    type Id: Copy + From<u64> + Into<u64>;

    /// Table name, used in errors and snapshot file names
    const TABLE: &'static str;

    fn id(&self) -> Self::Id;
    fn set_id(&mut self, id: Self::Id);
    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
    fn into_row(self) -> Row;
}

/// A row of any table, as kept by the undo log.
#[derive(Debug, Clone)]
pub enum Row {
    Schema(FormSchema),
    Record(FormRecord),
    Category(Category),
    File(FileRef),
}

impl Row {
    /// Puts the row back into its table, overwriting any row with the same id.
    pub(crate) fn restore(self, tables: &mut Tables) {
        match self {
            Row::Schema(row) => tables.schemas.put(row),
            Row::Record(row) => tables.records.put(row),
            Row::Category(row) => tables.categories.put(row),
            Row::File(row) => tables.files.put(row),
        }
    }
}

/// Rows of one entity type plus the id sequence.
#[derive(Debug, Clone)]
pub struct Table<E: Entity> {
    rows: BTreeMap<u64, E>,
    next_id: u64,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<E: Entity> Table<E> {
    /// Rebuilds a table from persisted rows.
    ///
    /// The id sequence never goes backwards past an existing row.
    pub fn from_rows(next_id: u64, rows: Vec<E>) -> Self {
        let rows: BTreeMap<u64, E> = rows.into_iter().map(|row| (row.id().into(), row)).collect();
        let floor = rows.keys().next_back().map_or(1, |max| max + 1);
        Self {
            rows,
            next_id: next_id.max(floor),
        }
    }

    pub fn get(&self, id: E::Id) -> Option<&E> {
        self.rows.get(&id.into())
    }

    /// Rows in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub(crate) fn insert(&mut self, mut row: E) -> E::Id {
        let id = E::Id::from(self.next_id);
        self.next_id += 1;
        row.set_id(id);
        self.rows.insert(id.into(), row);
        id
    }

    /// Replaces an existing row, returning the previous version.
    pub(crate) fn replace(&mut self, row: E) -> Result<E, StoreError> {
        let id: u64 = row.id().into();
        match self.rows.get_mut(&id) {
            Some(slot) => Ok(std::mem::replace(slot, row)),
            None => Err(StoreError::NotFound {
                table: E::TABLE,
                id,
            }),
        }
    }

    pub(crate) fn remove(&mut self, id: E::Id) -> Result<E, StoreError> {
        let id: u64 = id.into();
        self.rows.remove(&id).ok_or(StoreError::NotFound {
            table: E::TABLE,
            id,
        })
    }

    pub(crate) fn put(&mut self, row: E) {
        self.rows.insert(row.id().into(), row);
    }

    pub(crate) fn forget(&mut self, id: u64) {
        self.rows.remove(&id);
    }
}

/// All tables of the engine.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub schemas: Table<FormSchema>,
    pub records: Table<FormRecord>,
    pub categories: Table<Category>,
    pub files: Table<FileRef>,
}

impl Tables {
    pub(crate) fn forget(&mut self, table: &str, id: u64) {
        match table {
            FormSchema::TABLE => self.schemas.forget(id),
            FormRecord::TABLE => self.records.forget(id),
            Category::TABLE => self.categories.forget(id),
            FileRef::TABLE => self.files.forget(id),
            _ => tracing::warn!(table, id, "Undo for unknown table ignored"),
        }
    }
}

/// Uniform row access over a table set.
///
/// Implemented by [`Tables`] (writes apply directly) and by
/// [`super::Transaction`] (writes are recorded for rollback). Every store trait
/// is implemented on top of it.
pub trait TableAccess {
    fn tables(&self) -> &Tables;
    fn insert<E: Entity>(&mut self, row: E) -> Result<E::Id, StoreError>;
    fn replace<E: Entity>(&mut self, row: E) -> Result<(), StoreError>;
    fn remove<E: Entity>(&mut self, id: E::Id) -> Result<(), StoreError>;
}

impl TableAccess for Tables {
    fn tables(&self) -> &Tables {
        self
    }

    fn insert<E: Entity>(&mut self, row: E) -> Result<E::Id, StoreError> {
        Ok(E::table_mut(self).insert(row))
    }

    fn replace<E: Entity>(&mut self, row: E) -> Result<(), StoreError> {
        E::table_mut(self).replace(row).map(|_| ())
    }

    fn remove<E: Entity>(&mut self, id: E::Id) -> Result<(), StoreError> {
        E::table_mut(self).remove(id).map(|_| ())
    }
}

macro_rules! impl_entity {
    ($ty:ty, $id:ty, $table:literal, $field:ident, $variant:ident) => {
        impl Entity for $ty {
            type Id = $id;
            const TABLE: &'static str = $table;

            fn id(&self) -> $id {
                self.id
            }

            fn set_id(&mut self, id: $id) {
                self.id = id;
            }

            fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
                &mut tables.$field
            }

            fn into_row(self) -> Row {
                Row::$variant(self)
            }
        }
    };
}

impl_entity!(FormSchema, SchemaId, "form_schemas", schemas, Schema);
impl_entity!(FormRecord, RecordId, "form_records", records, Record);
impl_entity!(Category, CategoryId, "categories", categories, Category);
impl_entity!(FileRef, FileId, "files", files, File);
