//! Database container guarding the tables.

use std::sync::RwLock;

use tracing::debug;

use crate::error::StoreError;

use super::table::Tables;
use super::transaction::Transaction;

/// Holds every table behind a single lock, the serialization point for writes.
#[derive(Debug, Default)]
pub struct Database {
    tables: RwLock<Tables>,
}

impl Database {
    /// Creates a new empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a database over previously loaded tables.
    pub fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Runs `f` over a shared view of the tables.
    pub fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Tables) -> Result<T, E>,
        E: From<StoreError>,
    {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        f(&tables)
    }

    /// Runs `f` inside an all-or-nothing transaction.
    ///
    /// # Returns
    /// The closure's result. On `Err` every change it made has been undone.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut tx = Transaction::new(&mut tables);
        match f(&mut tx) {
            Ok(value) => {
                debug!(changes = tx.change_count(), "Transaction committed");
                Ok(value)
            }
            Err(e) => {
                let reverted = tx.rollback();
                debug!(reverted, "Transaction rolled back");
                Err(e)
            }
        }
    }

    /// Consumes the database, returning its tables.
    pub fn into_tables(self) -> Result<Tables, StoreError> {
        self.tables.into_inner().map_err(|_| StoreError::LockPoisoned)
    }
}
