use chrono::Utc;
use tracing::{debug, info, warn};

use crate::access::Actor;
use crate::error::FormError;
use crate::ids::SchemaId;
use crate::schema::{validate_definition, FormSchema, SchemaDraft};
use crate::store::{RecordStore, SchemaStore};

use super::{schema_not_found, visible_schema, FormEngine, SCHEMA};

impl FormEngine {
    /// Creates a schema owned by the actor.
    ///
    /// An empty field list is accepted; fields can be added by a later revision.
    pub fn define_schema<S>(
        &self,
        store: &mut S,
        actor: &Actor,
        draft: SchemaDraft,
    ) -> Result<FormSchema, FormError>
    where
        S: SchemaStore,
    {
        validate_definition(&draft.name, &draft.fields)?;

        let now = Utc::now();
        let mut schema = FormSchema {
            id: SchemaId(0),
            name: draft.name.trim().to_string(),
            description: draft.description,
            owner: actor.user_id,
            fields: draft.fields,
            created_at: now,
            updated_at: now,
        };
        schema.id = store.create_schema(schema.clone())?;

        info!(
            id = schema.id.get(),
            owner = actor.user_id.get(),
            fields = schema.fields.len(),
            "Schema defined"
        );
        Ok(schema)
    }

    /// Replaces name, description and the whole field list.
    ///
    /// Stored records are not re-validated against the new fields.
    pub fn revise_schema<S>(
        &self,
        store: &mut S,
        actor: &Actor,
        id: SchemaId,
        draft: SchemaDraft,
    ) -> Result<FormSchema, FormError>
    where
        S: SchemaStore,
    {
        let mut schema = visible_schema(&*store, actor, id)?;
        validate_definition(&draft.name, &draft.fields)?;

        schema.name = draft.name.trim().to_string();
        schema.description = draft.description;
        schema.fields = draft.fields;
        schema.updated_at = Utc::now();
        store.replace_schema(schema.clone())?;

        info!(id = id.get(), fields = schema.fields.len(), "Schema revised");
        Ok(schema)
    }

    /// Deletes a schema that no record references.
    pub fn retire_schema<S>(&self, store: &mut S, actor: &Actor, id: SchemaId) -> Result<(), FormError>
    where
        S: SchemaStore + RecordStore,
    {
        visible_schema(&*store, actor, id)?;

        let dependents = store.count_records(id)?;
        if dependents > 0 {
            warn!(id = id.get(), dependents, "Schema retire blocked by records");
            return Err(FormError::ReferentialConflict {
                entity: SCHEMA,
                id: id.get(),
                dependents,
                kind: "records",
            });
        }

        store.delete_schema(id)?;
        info!(id = id.get(), "Schema retired");
        Ok(())
    }

    pub fn get_schema<S>(&self, store: &S, actor: &Actor, id: SchemaId) -> Result<FormSchema, FormError>
    where
        S: SchemaStore + ?Sized,
    {
        visible_schema(store, actor, id)
    }

    /// Lists the schemas visible to the actor, newest first.
    ///
    /// A non-blank `keyword` keeps schemas whose name or description contains it.
    pub fn list_schemas<S>(
        &self,
        store: &S,
        actor: &Actor,
        keyword: Option<&str>,
    ) -> Result<Vec<FormSchema>, FormError>
    where
        S: SchemaStore + ?Sized,
    {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        let mut schemas: Vec<FormSchema> = store
            .list_schemas()?
            .into_iter()
            .filter(|s| actor.can_manage(s.owner))
            .filter(|s| keyword.map_or(true, |k| s.matches_keyword(k)))
            .collect();
        schemas.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        debug!(count = schemas.len(), "Schemas listed");
        Ok(schemas)
    }
}
