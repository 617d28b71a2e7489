use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use form_engine_core::category::{CategoryService, CategoryUpdate, NewCategory};
use form_engine_core::config::EngineConfig;
use form_engine_core::ids::{CategoryId, FileId, RecordId, SchemaId};
use form_engine_core::persistence::SnapshotManager;
use form_engine_core::schema::{validate_definition, FieldDefinition, SchemaDraft};
use form_engine_core::store::{CategoryStore, Database, FileIndex, FileRef, Tables, Transaction};
use form_engine_core::validation::SchemaValidator;
use form_engine_core::{Actor, FormEngine, FormError, RecordData};

use crate::cli::{
    CategoryCommand, CategoryUpdateArgs, Cli, Commands, FileCommand, RecordCommand, SchemaCommand,
};

/// Shared state for one invocation.
struct Session {
    db: Database,
    snapshots: SnapshotManager,
    actor: Actor,
    engine: FormEngine,
    categories: CategoryService,
}

impl Session {
    fn open(config: &EngineConfig, actor: Actor) -> Result<Self> {
        let snapshots = SnapshotManager::new(config);
        let db = snapshots
            .load()
            .with_context(|| format!("Failed to load snapshot from {}", config.data_dir.display()))?;

        Ok(Self {
            db,
            snapshots,
            actor,
            engine: FormEngine::new(),
            categories: CategoryService::new(config),
        })
    }

    /// Runs `f` in a transaction and saves the snapshot when it succeeds.
    fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, FormError>,
    {
        let value = self.db.transaction(f)?;
        self.snapshots.save(&self.db)?;
        Ok(value)
    }

    fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Tables) -> Result<T, FormError>,
    {
        Ok(self.db.read(f)?)
    }
}

/// Executes the parsed command and returns its JSON output.
pub fn run(cli: Cli) -> Result<Value> {
    let Cli {
        data_dir,
        max_ancestor_depth,
        user,
        admin,
        command,
    } = cli;
    let config = EngineConfig {
        data_dir,
        max_ancestor_depth,
        ..EngineConfig::default()
    };
    let actor = if admin {
        Actor::admin(user)
    } else {
        Actor::user(user)
    };

    match command {
        Commands::Validate { schema, data } => validate_offline(&schema, &data),
        Commands::Schema(cmd) => run_schema(&Session::open(&config, actor)?, cmd),
        Commands::Record(cmd) => run_record(&Session::open(&config, actor)?, cmd),
        Commands::Category(cmd) => run_category(&Session::open(&config, actor)?, cmd),
        Commands::File(cmd) => run_file(&Session::open(&config, actor)?, cmd),
    }
}

fn run_schema(ctx: &Session, cmd: SchemaCommand) -> Result<Value> {
    let (engine, actor) = (&ctx.engine, &ctx.actor);
    let value = match cmd {
        SchemaCommand::Define {
            name,
            description,
            fields,
        } => {
            let fields = match fields {
                Some(path) => read_json::<Vec<FieldDefinition>>(&path)?,
                None => Vec::new(),
            };
            let draft = SchemaDraft {
                name,
                description,
                fields,
            };
            to_json(ctx.write(|tx| engine.define_schema(tx, actor, draft))?)?
        }
        SchemaCommand::Revise {
            id,
            name,
            description,
            fields,
        } => {
            let fields = fields
                .map(|path| read_json::<Vec<FieldDefinition>>(&path))
                .transpose()?;
            to_json(ctx.write(|tx| {
                let current = engine.get_schema(&*tx, actor, SchemaId(id))?;
                let draft = SchemaDraft {
                    name: name.unwrap_or(current.name),
                    description: description.unwrap_or(current.description),
                    fields: fields.unwrap_or(current.fields),
                };
                engine.revise_schema(tx, actor, SchemaId(id), draft)
            })?)?
        }
        SchemaCommand::Retire { id } => {
            ctx.write(|tx| engine.retire_schema(tx, actor, SchemaId(id)))?;
            json!({ "retired": id })
        }
        SchemaCommand::Show { id } => {
            to_json(ctx.read(|t| engine.get_schema(t, actor, SchemaId(id)))?)?
        }
        SchemaCommand::List { keyword } => to_json(
            ctx.read(|t| engine.list_schemas(t, actor, keyword.as_deref()))?,
        )?,
    };
    Ok(value)
}

fn run_record(ctx: &Session, cmd: RecordCommand) -> Result<Value> {
    let (engine, actor) = (&ctx.engine, &ctx.actor);
    let value = match cmd {
        RecordCommand::Submit { schema, data } => {
            let data: RecordData = read_json(&data)?;
            to_json(ctx.write(|tx| engine.submit_record(tx, actor, SchemaId(schema), data))?)?
        }
        RecordCommand::Revise { id, data } => {
            let data: RecordData = read_json(&data)?;
            to_json(ctx.write(|tx| engine.revise_record(tx, actor, RecordId(id), data))?)?
        }
        RecordCommand::Show { id } => {
            to_json(ctx.read(|t| engine.get_record(t, actor, RecordId(id)))?)?
        }
        RecordCommand::List { schema } => {
            to_json(ctx.read(|t| engine.list_records(t, actor, SchemaId(schema)))?)?
        }
        RecordCommand::Delete { id } => {
            ctx.write(|tx| engine.delete_record(tx, actor, RecordId(id)))?;
            json!({ "deleted": id })
        }
    };
    Ok(value)
}

fn run_category(ctx: &Session, cmd: CategoryCommand) -> Result<Value> {
    let svc = &ctx.categories;
    let value = match cmd {
        CategoryCommand::Create {
            name,
            parent,
            description,
            sort,
        } => {
            let input = NewCategory {
                description,
                parent_id: parent.map(CategoryId),
                sort,
                ..NewCategory::new(name)
            };
            to_json(ctx.write(|tx| svc.create_category(tx, input))?)?
        }
        CategoryCommand::Update(args) => {
            let id = CategoryId(args.id);
            let update = category_update(args);
            to_json(ctx.write(|tx| svc.update_category(tx, id, update))?)?
        }
        CategoryCommand::Delete { id } => {
            ctx.write(|tx| svc.delete_category(tx, CategoryId(id)))?;
            json!({ "deleted": id })
        }
        CategoryCommand::Tree => to_json(ctx.read(|t| svc.category_tree(t))?)?,
    };
    Ok(value)
}

fn category_update(args: CategoryUpdateArgs) -> CategoryUpdate {
    let parent = if args.root {
        Some(None)
    } else {
        args.parent.map(|p| Some(CategoryId(p)))
    };
    CategoryUpdate {
        name: args.name,
        description: args.description,
        parent,
        sort: args.sort,
        is_active: args.active,
        ..CategoryUpdate::default()
    }
}

fn run_file(ctx: &Session, cmd: FileCommand) -> Result<Value> {
    let value = match cmd {
        FileCommand::Add { name, category } => {
            let file = ctx.write(|tx| {
                if let Some(id) = category {
                    if tx.get_category(CategoryId(id))?.is_none() {
                        return Err(FormError::NotFound {
                            entity: "category",
                            id,
                        });
                    }
                }
                let mut file = FileRef {
                    id: FileId(0),
                    name,
                    category_id: category.map(CategoryId),
                    is_deleted: false,
                };
                file.id = tx.create_file(file.clone())?;
                Ok(file)
            })?;
            to_json(file)?
        }
        FileCommand::Trash { id } => {
            let file = ctx.write(|tx| {
                let mut file = tx.get_file(FileId(id))?.ok_or(FormError::NotFound {
                    entity: "file",
                    id,
                })?;
                file.is_deleted = true;
                tx.replace_file(file.clone())?;
                Ok(file)
            })?;
            to_json(file)?
        }
    };
    Ok(value)
}

fn validate_offline(schema: &Path, data: &Path) -> Result<Value> {
    let draft: SchemaDraft = read_json(schema)?;
    let data: RecordData = read_json(data)?;

    validate_definition(&draft.name, &draft.fields)
        .with_context(|| format!("Schema file {} is not a valid definition", schema.display()))?;
    match SchemaValidator::new().validate_fields(&draft.fields, &data) {
        Ok(()) => Ok(json!({ "valid": true })),
        Err(e) => {
            tracing::info!(field = %e.field, "Validation failed");
            Ok(json!({ "valid": false, "field": e.field, "reason": e.reason }))
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to render output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(dir: &Path, args: &[&str]) -> Cli {
        let mut argv = vec!["form-tool", "--data-dir", dir.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    fn write(dir: &Path, name: &str, value: Value) -> String {
        let path = dir.join(name);
        fs::write(&path, value.to_string()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_schema_and_record_flow_persists() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let fields = write(
            dir.path(),
            "fields.json",
            json!([{"id": "title", "label": "Title", "type": "string", "required": true}]),
        );
        let good = write(dir.path(), "good.json", json!({"title": "hello"}));
        let bad = write(dir.path(), "bad.json", json!({}));

        let out = run(cli(&data_dir, &["schema", "define", "--name", "Notes", "--fields", &fields]))
            .unwrap();
        assert_eq!(out["id"], json!(1));

        let out = run(cli(&data_dir, &["record", "submit", "--schema", "1", "--data", &good])).unwrap();
        assert_eq!(out["data"]["title"], json!("hello"));

        let err = run(cli(&data_dir, &["record", "submit", "--schema", "1", "--data", &bad]))
            .unwrap_err();
        assert!(err.to_string().contains("missing required field `Title`"));

        let err = run(cli(&data_dir, &["schema", "retire", "1"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FormError>(),
            Some(FormError::ReferentialConflict { .. })
        ));

        let out = run(cli(&data_dir, &["record", "list", "--schema", "1"])).unwrap();
        assert_eq!(out.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_file_add_requires_existing_category() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");

        let err = run(cli(&data_dir, &["file", "add", "--name", "a.pdf", "--category", "9"]))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FormError>(),
            Some(FormError::NotFound {
                entity: "category",
                id: 9
            })
        ));

        run(cli(&data_dir, &["category", "create", "--name", "Docs"])).unwrap();
        let out = run(cli(&data_dir, &["file", "add", "--name", "a.pdf", "--category", "1"]))
            .unwrap();
        assert_eq!(out["category_id"], json!(1));
        let out = run(cli(&data_dir, &["file", "add", "--name", "loose.txt"])).unwrap();
        assert_eq!(out["category_id"], json!(null));
    }

    #[test]
    fn test_category_update_flags() {
        let args = CategoryUpdateArgs {
            id: 3,
            name: None,
            description: None,
            parent: None,
            root: true,
            sort: Some(2),
            active: None,
        };
        let update = category_update(args);
        assert_eq!(update.parent, Some(None));
        assert_eq!(update.sort, Some(2));
    }

    #[test]
    fn test_validate_offline_reports_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(
            dir.path(),
            "schema.json",
            json!({
                "name": "Scores",
                "fields": [
                    {"id": "score", "type": "number", "min_value": 0, "max_value": 100},
                    {"id": "color", "type": "enum", "required": true,
                     "enum_options": [{"label": "A", "value": "a"}]}
                ]
            }),
        );
        let data = write(dir.path(), "data.json", json!({"score": 100.01, "color": "c"}));

        let out = validate_offline(Path::new(&schema), Path::new(&data)).unwrap();
        assert_eq!(out["valid"], json!(false));
        assert_eq!(out["field"], json!("score"));
    }
}
