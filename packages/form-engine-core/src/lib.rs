//! Core of the form backend.
//!
//! Provides the field type registry, form schema model, record validation,
//! the stateless form engine, category tree integrity checks, and the
//! transactional storage collaborator the engine runs against.

pub mod access;
pub mod category;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod persistence;
pub mod record;
pub mod schema;
pub mod store;
pub mod types;
pub mod validation;

pub use access::{Actor, Role};
pub use engine::FormEngine;
pub use error::{FormError, StoreError, ValidationError};
pub use record::{FormRecord, RecordData};
pub use schema::{FieldDefinition, FormSchema};
