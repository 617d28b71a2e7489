use chrono::Utc;
use tracing::{debug, info};

use crate::access::Actor;
use crate::error::FormError;
use crate::ids::{RecordId, SchemaId};
use crate::record::{FormRecord, RecordData};
use crate::store::{RecordStore, SchemaStore};

use super::{newest_first_records, record_not_found, visible_schema, FormEngine, RECORD};

impl FormEngine {
    /// Validates `data` against the schema and stores it as a new record.
    ///
    /// The schema must be visible to the actor. Nothing is written when
    /// validation fails.
    pub fn submit_record<S>(
        &self,
        store: &mut S,
        actor: &Actor,
        schema_id: SchemaId,
        data: RecordData,
    ) -> Result<FormRecord, FormError>
    where
        S: SchemaStore + RecordStore,
    {
        let schema = visible_schema(&*store, actor, schema_id)?;
        if let Err(e) = self.validator.validate(&schema, &data) {
            info!(schema = schema_id.get(), field = %e.field, "Record rejected");
            return Err(e.into());
        }

        let now = Utc::now();
        let mut record = FormRecord {
            id: RecordId(0),
            schema_id,
            owner: actor.user_id,
            data,
            created_at: now,
            updated_at: now,
        };
        record.id = store.create_record(record.clone())?;

        info!(id = record.id.get(), schema = schema_id.get(), "Record submitted");
        Ok(record)
    }

    /// Replaces a record's payload after validating it against the record's schema.
    ///
    /// Only the author or an admin may revise; `schema_id` never changes.
    pub fn revise_record<S>(
        &self,
        store: &mut S,
        actor: &Actor,
        id: RecordId,
        data: RecordData,
    ) -> Result<FormRecord, FormError>
    where
        S: SchemaStore + RecordStore,
    {
        let mut record = self.get_record(&*store, actor, id)?;
        ensure_author(actor, &record)?;

        let schema = store
            .get_schema(record.schema_id)?
            .ok_or(record_not_found(id))?;
        if let Err(e) = self.validator.validate(&schema, &data) {
            info!(id = id.get(), field = %e.field, "Record revision rejected");
            return Err(e.into());
        }

        record.data = data;
        record.updated_at = Utc::now();
        store.replace_record(record.clone())?;

        info!(id = id.get(), "Record revised");
        Ok(record)
    }

    /// Loads a record visible to the actor: admin, author, or owner of its schema.
    pub fn get_record<S>(&self, store: &S, actor: &Actor, id: RecordId) -> Result<FormRecord, FormError>
    where
        S: SchemaStore + RecordStore + ?Sized,
    {
        let record = store.get_record(id)?.ok_or(record_not_found(id))?;
        if actor.can_manage(record.owner) {
            return Ok(record);
        }

        let schema_owner = store.get_schema(record.schema_id)?.map(|s| s.owner);
        if schema_owner == Some(actor.user_id) {
            Ok(record)
        } else {
            Err(record_not_found(id))
        }
    }

    /// Lists the records of a schema visible to the actor, newest first.
    pub fn list_records<S>(
        &self,
        store: &S,
        actor: &Actor,
        schema_id: SchemaId,
    ) -> Result<Vec<FormRecord>, FormError>
    where
        S: SchemaStore + RecordStore + ?Sized,
    {
        visible_schema(store, actor, schema_id)?;
        let mut records = store.list_records(schema_id)?;
        newest_first_records(&mut records);

        debug!(schema = schema_id.get(), count = records.len(), "Records listed");
        Ok(records)
    }

    /// Deletes a record. Only the author or an admin may delete.
    pub fn delete_record<S>(&self, store: &mut S, actor: &Actor, id: RecordId) -> Result<(), FormError>
    where
        S: SchemaStore + RecordStore,
    {
        let record = self.get_record(&*store, actor, id)?;
        ensure_author(actor, &record)?;

        store.delete_record(id)?;
        info!(id = id.get(), "Record deleted");
        Ok(())
    }
}

/// Schema owners can read records of their schema but only authors change them.
fn ensure_author(actor: &Actor, record: &FormRecord) -> Result<(), FormError> {
    if actor.can_manage(record.owner) {
        Ok(())
    } else {
        Err(FormError::Forbidden {
            entity: RECORD,
            id: record.id.get(),
        })
    }
}
