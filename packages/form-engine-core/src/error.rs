//! Error taxonomy for the engine and its storage collaborator.

use thiserror::Error;

/// Storage collaborator errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Row not found for replace/delete
    #[error("{table} row {id} not found")]
    NotFound { table: &'static str, id: u64 },

    /// Lock poisoned (RwLock poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Data corruption detected while loading a snapshot
    #[error("Data corruption detected: {0}")]
    DataCorruption(String),

    /// Disk full error during persistence
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// I/O error during persistence
    #[error("I/O error: {0}")]
    Io(String),

    /// Transient I/O error that may succeed on retry
    #[error("Transient I/O error: {0}")]
    TransientIo(String),
}

/// First validation failure for a schema definition or a record payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("field `{field}`: {reason}")]
pub struct ValidationError {
    /// Offending field id
    pub field: String,
    /// Human-readable reason
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Engine operation errors.
///
/// Every variant is terminal and surfaced to the caller as is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Entity absent, or not visible to the acting user
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// Entity visible but the actor lacks the required ownership or role
    #[error("not allowed to modify {entity} {id}")]
    Forbidden { entity: &'static str, id: u64 },

    /// Schema definition or record payload rejected
    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Delete blocked by dependent rows
    #[error("{entity} {id} still has {dependents} dependent {kind}")]
    ReferentialConflict {
        entity: &'static str,
        id: u64,
        dependents: usize,
        kind: &'static str,
    },

    /// Reparent blocked by the tree integrity check
    #[error("moving category {node} under {parent} would create a cycle")]
    CycleRejected { node: u64, parent: u64 },

    /// Sibling name already taken
    #[error("name '{name}' already exists at this level")]
    NameConflict { name: String },

    /// Storage collaborator failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FormError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FormError::ValidationFailed(ValidationError::new(field, reason))
    }
}
