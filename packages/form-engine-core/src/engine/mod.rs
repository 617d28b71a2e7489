//! Form engine: the stateless pipeline behind every schema and record operation.
//!
//! Each operation takes the storage handle explicitly. Callers run mutating
//! operations inside [`crate::store::Database::transaction`] so that the
//! validate-then-write sequence is atomic.

mod records;
mod schemas;

use crate::access::Actor;
use crate::error::FormError;
use crate::ids::{RecordId, SchemaId};
use crate::record::{FormRecord, RecordData};
use crate::schema::FormSchema;
use crate::store::SchemaStore;
use crate::validation::SchemaValidator;

const SCHEMA: &str = "form schema";
const RECORD: &str = "form record";

/// Orchestrates schema definitions and record submissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormEngine {
    validator: SchemaValidator,
}

impl FormEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a payload against a schema without touching storage.
    pub fn check(&self, schema: &FormSchema, data: &RecordData) -> Result<(), FormError> {
        self.validator.validate(schema, data)?;
        Ok(())
    }
}

/// Loads a schema the actor may see: admins see all, others only their own.
fn visible_schema<S>(store: &S, actor: &Actor, id: SchemaId) -> Result<FormSchema, FormError>
where
    S: SchemaStore + ?Sized,
{
    match store.get_schema(id)? {
        Some(schema) if actor.can_manage(schema.owner) => Ok(schema),
        _ => Err(schema_not_found(id)),
    }
}

fn schema_not_found(id: SchemaId) -> FormError {
    FormError::NotFound {
        entity: SCHEMA,
        id: id.get(),
    }
}

fn record_not_found(id: RecordId) -> FormError {
    FormError::NotFound {
        entity: RECORD,
        id: id.get(),
    }
}

/// Newest first, ties broken by id.
fn newest_first_records(records: &mut [FormRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
