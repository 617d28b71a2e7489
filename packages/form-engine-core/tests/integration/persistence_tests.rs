//! Snapshot persistence and recovery.

use std::fs;

use ntest::timeout;
use serde_json::json;
use tempfile::tempdir;

use form_engine_core::category::{CategoryService, NewCategory};
use form_engine_core::config::EngineConfig;
use form_engine_core::persistence::SnapshotManager;
use form_engine_core::store::{CategoryStore, Database, RecordStore, SchemaStore};
use form_engine_core::{Actor, FormEngine, StoreError};

use super::helpers::{payload, survey_draft, valid_survey_payload};

fn config(dir: &std::path::Path) -> EngineConfig {
    EngineConfig {
        data_dir: dir.to_path_buf(),
        persistence_retry_delay_ms: 0,
        ..Default::default()
    }
}

#[timeout(5000)]
#[test]
fn test_snapshot_round_trip() {
    let temp_dir = tempdir().unwrap();
    let config = config(temp_dir.path());
    let snapshots = SnapshotManager::new(&config);
    let engine = FormEngine::new();
    let owner = Actor::user(1);

    let db = Database::new();
    let schema = db
        .transaction(|tx| engine.define_schema(tx, &owner, survey_draft()))
        .unwrap();
    let record = db
        .transaction(|tx| engine.submit_record(tx, &owner, schema.id, valid_survey_payload()))
        .unwrap();
    let category = db
        .transaction(|tx| CategoryService::new(&config).create_category(tx, NewCategory::new("Root")))
        .unwrap();

    let manifest = snapshots.save(&db).unwrap();
    assert_eq!(manifest.tables.len(), 4);
    assert!(temp_dir.path().join("manifest.json").exists());
    assert_eq!(manifest.generation, 1);
    assert_eq!(manifest.tables["form_records"].file, "tables/form_records.1.json");
    assert!(temp_dir.path().join("tables/form_records.1.json").exists());

    let loaded = snapshots.load().unwrap();
    let restored_schema = loaded.read(|t| t.get_schema(schema.id)).unwrap().unwrap();
    assert_eq!(restored_schema, schema);
    let restored_record = loaded.read(|t| t.get_record(record.id)).unwrap().unwrap();
    assert_eq!(restored_record.data, valid_survey_payload());
    assert!(loaded.read(|t| t.get_category(category.id)).unwrap().is_some());

    // Id sequences continue after reload
    let next = loaded
        .transaction(|tx| engine.submit_record(tx, &owner, schema.id, valid_survey_payload()))
        .unwrap();
    assert!(next.id > record.id);
}

#[timeout(5000)]
#[test]
fn test_missing_snapshot_loads_empty() {
    let temp_dir = tempdir().unwrap();
    let snapshots = SnapshotManager::new(&config(&temp_dir.path().join("nothing-here")));

    assert!(!snapshots.exists());
    let db = snapshots.load().unwrap();
    assert!(db.read(|t| t.list_schemas()).unwrap().is_empty());
}

#[timeout(5000)]
#[test]
fn test_tampered_table_file_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let snapshots = SnapshotManager::new(&config(temp_dir.path()));
    let owner = Actor::user(1);

    let db = Database::new();
    let schema = db
        .transaction(|tx| FormEngine::new().define_schema(tx, &owner, survey_draft()))
        .unwrap();
    db.transaction(|tx| {
        FormEngine::new().submit_record(tx, &owner, schema.id, payload(json!({"name": "Bo", "channel": "phone"})))
    })
    .unwrap();
    let manifest = snapshots.save(&db).unwrap();

    let path = temp_dir.path().join(&manifest.tables["form_records"].file);
    let tampered = fs::read_to_string(&path).unwrap().replace("Bo", "Al");
    fs::write(&path, tampered).unwrap();

    match snapshots.load() {
        Err(StoreError::DataCorruption(msg)) => assert!(msg.contains("form_records")),
        other => panic!("Expected data corruption, got {:?}", other.map(|_| ())),
    }
}

#[timeout(5000)]
#[test]
fn test_save_overwrites_previous_snapshot() {
    let temp_dir = tempdir().unwrap();
    let snapshots = SnapshotManager::new(&config(temp_dir.path()));
    let owner = Actor::user(1);
    let engine = FormEngine::new();

    let db = Database::new();
    let schema = db
        .transaction(|tx| engine.define_schema(tx, &owner, survey_draft()))
        .unwrap();
    snapshots.save(&db).unwrap();

    db.transaction(|tx| engine.retire_schema(tx, &owner, schema.id))
        .unwrap();
    snapshots.save(&db).unwrap();

    let loaded = snapshots.load().unwrap();
    assert!(loaded.read(|t| t.list_schemas()).unwrap().is_empty());
    assert_eq!(loaded.read(|t| t.count_records(schema.id)).unwrap(), 0);
    assert!(!temp_dir.path().join("manifest.json.tmp").exists());
}

#[timeout(5000)]
#[test]
fn test_failed_save_keeps_previous_snapshot() {
    let temp_dir = tempdir().unwrap();
    let snapshots = SnapshotManager::new(&config(temp_dir.path()));
    let owner = Actor::user(1);
    let engine = FormEngine::new();

    let db = Database::new();
    let first = db
        .transaction(|tx| engine.define_schema(tx, &owner, survey_draft()))
        .unwrap();
    snapshots.save(&db).unwrap();

    db.transaction(|tx| engine.define_schema(tx, &owner, survey_draft()))
        .unwrap();
    // A directory in the way of the manifest temp file fails the save after
    // the new table files are written
    let blocker = temp_dir.path().join("manifest.json.tmp");
    fs::create_dir(&blocker).unwrap();
    assert!(snapshots.save(&db).is_err());

    let loaded = snapshots.load().unwrap();
    let schemas = loaded.read(|t| t.list_schemas()).unwrap();
    assert_eq!(schemas.len(), 1);
    assert_eq!(schemas[0].id, first.id);

    fs::remove_dir(&blocker).unwrap();
    let manifest = snapshots.save(&db).unwrap();
    assert_eq!(manifest.generation, 2);
    assert_eq!(snapshots.load().unwrap().read(|t| t.list_schemas()).unwrap().len(), 2);

    // Only the current generation remains on disk
    let mut on_disk: Vec<String> = fs::read_dir(temp_dir.path().join("tables"))
        .unwrap()
        .map(|entry| format!("tables/{}", entry.unwrap().file_name().to_string_lossy()))
        .collect();
    on_disk.sort();
    let mut referenced: Vec<String> = manifest.tables.values().map(|t| t.file.clone()).collect();
    referenced.sort();
    assert_eq!(on_disk, referenced);
}
