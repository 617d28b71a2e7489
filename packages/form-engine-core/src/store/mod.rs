//! Storage collaborator: transactional in-memory tables behind narrow store traits.
//!
//! The engine and the category service only ever see the traits below. Reads
//! go through a shared [`Tables`] view; writes go through a [`Transaction`]
//! that rolls back every change when its closure fails.

mod database;
mod table;
mod transaction;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::StoreError;
use crate::ids::{CategoryId, FileId, RecordId, SchemaId};
use crate::record::FormRecord;
use crate::schema::FormSchema;

pub use database::Database;
pub use table::{Entity, Table, TableAccess, Tables};
pub use transaction::Transaction;

/// A file's category membership, tracked only so category deletes can count live files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub id: FileId,
    pub name: String,
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Form schema rows.
pub trait SchemaStore {
    fn get_schema(&self, id: SchemaId) -> Result<Option<FormSchema>, StoreError>;
    fn list_schemas(&self) -> Result<Vec<FormSchema>, StoreError>;
    /// Stores a new schema under a fresh id, ignoring `schema.id`.
    fn create_schema(&mut self, schema: FormSchema) -> Result<SchemaId, StoreError>;
    fn replace_schema(&mut self, schema: FormSchema) -> Result<(), StoreError>;
    fn delete_schema(&mut self, id: SchemaId) -> Result<(), StoreError>;
}

/// Form record rows.
pub trait RecordStore {
    fn get_record(&self, id: RecordId) -> Result<Option<FormRecord>, StoreError>;
    fn list_records(&self, schema_id: SchemaId) -> Result<Vec<FormRecord>, StoreError>;
    /// Stores a new record under a fresh id, ignoring `record.id`.
    fn create_record(&mut self, record: FormRecord) -> Result<RecordId, StoreError>;
    fn replace_record(&mut self, record: FormRecord) -> Result<(), StoreError>;
    fn delete_record(&mut self, id: RecordId) -> Result<(), StoreError>;
    /// Number of records referencing the schema.
    fn count_records(&self, schema_id: SchemaId) -> Result<usize, StoreError>;
}

/// Category rows.
pub trait CategoryStore {
    fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;
    fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    /// Direct children of `parent`, or the roots when `parent` is `None`.
    fn children(&self, parent: Option<CategoryId>) -> Result<Vec<Category>, StoreError>;
    /// Stores a new category under a fresh id, ignoring `category.id`.
    fn create_category(&mut self, category: Category) -> Result<CategoryId, StoreError>;
    fn replace_category(&mut self, category: Category) -> Result<(), StoreError>;
    fn delete_category(&mut self, id: CategoryId) -> Result<(), StoreError>;
    fn count_children(&self, id: CategoryId) -> Result<usize, StoreError>;
}

/// File membership rows.
pub trait FileIndex {
    fn get_file(&self, id: FileId) -> Result<Option<FileRef>, StoreError>;
    /// Stores a new file reference under a fresh id, ignoring `file.id`.
    fn create_file(&mut self, file: FileRef) -> Result<FileId, StoreError>;
    fn replace_file(&mut self, file: FileRef) -> Result<(), StoreError>;
    /// Number of non-deleted files in the category.
    fn count_live_files(&self, category: CategoryId) -> Result<usize, StoreError>;
}

impl<T: TableAccess> SchemaStore for T {
    fn get_schema(&self, id: SchemaId) -> Result<Option<FormSchema>, StoreError> {
        Ok(self.tables().schemas.get(id).cloned())
    }

    fn list_schemas(&self) -> Result<Vec<FormSchema>, StoreError> {
        Ok(self.tables().schemas.iter().cloned().collect())
    }

    fn create_schema(&mut self, schema: FormSchema) -> Result<SchemaId, StoreError> {
        self.insert(schema)
    }

    fn replace_schema(&mut self, schema: FormSchema) -> Result<(), StoreError> {
        self.replace(schema)
    }

    fn delete_schema(&mut self, id: SchemaId) -> Result<(), StoreError> {
        self.remove::<FormSchema>(id)
    }
}

impl<T: TableAccess> RecordStore for T {
    fn get_record(&self, id: RecordId) -> Result<Option<FormRecord>, StoreError> {
        Ok(self.tables().records.get(id).cloned())
    }

    fn list_records(&self, schema_id: SchemaId) -> Result<Vec<FormRecord>, StoreError> {
        Ok(self
            .tables()
            .records
            .iter()
            .filter(|r| r.schema_id == schema_id)
            .cloned()
            .collect())
    }

    fn create_record(&mut self, record: FormRecord) -> Result<RecordId, StoreError> {
        self.insert(record)
    }

    fn replace_record(&mut self, record: FormRecord) -> Result<(), StoreError> {
        self.replace(record)
    }

    fn delete_record(&mut self, id: RecordId) -> Result<(), StoreError> {
        self.remove::<FormRecord>(id)
    }

    fn count_records(&self, schema_id: SchemaId) -> Result<usize, StoreError> {
        Ok(self
            .tables()
            .records
            .iter()
            .filter(|r| r.schema_id == schema_id)
            .count())
    }
}

impl<T: TableAccess> CategoryStore for T {
    fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.tables().categories.get(id).cloned())
    }

    fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.tables().categories.iter().cloned().collect())
    }

    fn children(&self, parent: Option<CategoryId>) -> Result<Vec<Category>, StoreError> {
        Ok(self
            .tables()
            .categories
            .iter()
            .filter(|c| c.parent_id == parent)
            .cloned()
            .collect())
    }

    fn create_category(&mut self, category: Category) -> Result<CategoryId, StoreError> {
        self.insert(category)
    }

    fn replace_category(&mut self, category: Category) -> Result<(), StoreError> {
        self.replace(category)
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<(), StoreError> {
        self.remove::<Category>(id)
    }

    fn count_children(&self, id: CategoryId) -> Result<usize, StoreError> {
        Ok(self
            .tables()
            .categories
            .iter()
            .filter(|c| c.parent_id == Some(id))
            .count())
    }
}

impl<T: TableAccess> FileIndex for T {
    fn get_file(&self, id: FileId) -> Result<Option<FileRef>, StoreError> {
        Ok(self.tables().files.get(id).cloned())
    }

    fn create_file(&mut self, file: FileRef) -> Result<FileId, StoreError> {
        self.insert(file)
    }

    fn replace_file(&mut self, file: FileRef) -> Result<(), StoreError> {
        self.replace(file)
    }

    fn count_live_files(&self, category: CategoryId) -> Result<usize, StoreError> {
        Ok(self
            .tables()
            .files
            .iter()
            .filter(|f| f.category_id == Some(category) && !f.is_deleted)
            .count())
    }
}
