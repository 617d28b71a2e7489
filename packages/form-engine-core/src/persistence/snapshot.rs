//! Snapshot persistence of all tables as JSON documents.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::config::EngineConfig;
use crate::error::StoreError;
use crate::record::FormRecord;
use crate::schema::FormSchema;
use crate::store::{Database, Entity, FileRef, Table, Tables};

use super::io_utils::{checksum, classify_io_error, retry_io_operation, write_atomic};
use super::manifest::{validate_manifest, Manifest, TableEntry, MANIFEST_VERSION};

const MANIFEST_FILE: &str = "manifest.json";
const TABLES_DIR: &str = "tables";
const KNOWN_TABLES: [&str; 4] = [
    FormSchema::TABLE,
    FormRecord::TABLE,
    Category::TABLE,
    FileRef::TABLE,
];

#[derive(Serialize)]
struct TableFileOut<'a, E> {
    table: &'a str,
    next_id: u64,
    rows: Vec<&'a E>,
}

#[derive(Deserialize)]
struct TableFileIn<E> {
    next_id: u64,
    rows: Vec<E>,
}

/// Saves and loads database snapshots under the configured data directory.
///
/// Layout: `manifest.json` plus one `tables/<table>.<generation>.json` per table.
/// Every file is written through a temp file and an atomic rename. The manifest
/// records a CRC32 per table file and is written last; files of older
/// generations are removed only once it is in place.
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    /// Data directory path
    data_dir: PathBuf,
    /// Maximum retry attempts for transient I/O errors
    max_retries: u32,
    /// Delay between retry attempts in milliseconds
    retry_delay_ms: u64,
}

impl SnapshotManager {
    /// Creates a new snapshot manager with the given configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            max_retries: config.persistence_max_retries,
            retry_delay_ms: config.persistence_retry_delay_ms,
        }
    }

    /// Returns whether a snapshot exists in the data directory.
    pub fn exists(&self) -> bool {
        self.data_dir.join(MANIFEST_FILE).exists()
    }

    /// Saves every table of the database.
    ///
    /// # Returns
    /// The manifest that was written.
    pub fn save(&self, db: &Database) -> Result<Manifest, StoreError> {
        let manifest = db.read(|tables| {
            retry_io_operation(
                || self.save_internal(tables),
                self.max_retries,
                self.retry_delay_ms,
                "save_snapshot",
            )
        })?;
        tracing::info!(
            "Snapshot saved to {} ({} tables)",
            self.data_dir.display(),
            manifest.tables.len()
        );
        Ok(manifest)
    }

    /// Loads the database from disk, or an empty one when no snapshot exists.
    pub fn load(&self) -> Result<Database, StoreError> {
        if !self.exists() {
            tracing::debug!("No snapshot in {}, starting empty", self.data_dir.display());
            return Ok(Database::new());
        }

        let manifest = self.read_manifest()?;
        validate_manifest(&manifest, &KNOWN_TABLES)?;

        let tables = Tables {
            schemas: self.load_table(&manifest)?,
            records: self.load_table(&manifest)?,
            categories: self.load_table(&manifest)?,
            files: self.load_table(&manifest)?,
        };
        tracing::info!(
            "Snapshot loaded from {}: {} schemas, {} records, {} categories, {} files",
            self.data_dir.display(),
            tables.schemas.len(),
            tables.records.len(),
            tables.categories.len(),
            tables.files.len()
        );
        Ok(Database::from_tables(tables))
    }

    fn read_manifest(&self) -> Result<Manifest, StoreError> {
        let manifest_path = self.data_dir.join(MANIFEST_FILE);
        let contents = retry_io_operation(
            || {
                fs::read_to_string(&manifest_path)
                    .map_err(|e| classify_io_error(e, "Failed to read manifest"))
            },
            self.max_retries,
            self.retry_delay_ms,
            "load_manifest",
        )?;
        serde_json::from_str(&contents)
            .map_err(|e| StoreError::Serialization(format!("Failed to parse manifest: {}", e)))
    }

    /// Generation after the newest one on disk.
    fn next_generation(&self) -> u64 {
        if !self.exists() {
            return 1;
        }
        match self.read_manifest() {
            Ok(manifest) => manifest.generation + 1,
            Err(e) => {
                // Unreadable manifest: pick a number no earlier save could have used
                tracing::warn!("Previous manifest unreadable, using timestamp generation: {}", e);
                Utc::now().timestamp_millis().max(1) as u64
            }
        }
    }

    fn save_internal(&self, tables: &Tables) -> Result<Manifest, StoreError> {
        let tables_dir = self.data_dir.join(TABLES_DIR);
        fs::create_dir_all(&tables_dir)
            .map_err(|e| classify_io_error(e, "Failed to create data directory"))?;

        let generation = self.next_generation();
        let mut entries = BTreeMap::new();
        self.save_table(&tables.schemas, generation, &mut entries)?;
        self.save_table(&tables.records, generation, &mut entries)?;
        self.save_table(&tables.categories, generation, &mut entries)?;
        self.save_table(&tables.files, generation, &mut entries)?;

        let manifest = Manifest {
            version: MANIFEST_VERSION,
            generation,
            saved_at: Utc::now(),
            tables: entries,
        };
        let json = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        write_atomic(&self.data_dir.join(MANIFEST_FILE), &json)?;

        self.remove_stale_files(&manifest);
        Ok(manifest)
    }

    /// Deletes table files the manifest no longer references. Failures only warn.
    fn remove_stale_files(&self, manifest: &Manifest) {
        let tables_dir = self.data_dir.join(TABLES_DIR);
        let entries = match fs::read_dir(&tables_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to list {}: {}", tables_dir.display(), e);
                return;
            }
        };

        for entry in entries.flatten() {
            let name = format!("{}/{}", TABLES_DIR, entry.file_name().to_string_lossy());
            if manifest.tables.values().any(|t| t.file == name) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => tracing::debug!("Removed stale table file {}", name),
                Err(e) => tracing::warn!("Failed to remove stale table file {}: {}", name, e),
            }
        }
    }

    fn save_table<E: Entity>(
        &self,
        table: &Table<E>,
        generation: u64,
        entries: &mut BTreeMap<String, TableEntry>,
    ) -> Result<(), StoreError> {
        let file = format!("{}/{}.{}.json", TABLES_DIR, E::TABLE, generation);
        let body = TableFileOut {
            table: E::TABLE,
            next_id: table.next_id(),
            rows: table.iter().collect(),
        };
        let json = serde_json::to_vec_pretty(&body)
            .map_err(|e| StoreError::Serialization(format!("Table '{}': {}", E::TABLE, e)))?;

        write_atomic(&self.data_dir.join(&file), &json)?;
        tracing::debug!("Wrote {} rows to {}", table.len(), file);

        entries.insert(
            E::TABLE.to_string(),
            TableEntry {
                file,
                rows: table.len(),
                checksum: checksum(&json),
            },
        );
        Ok(())
    }

    fn load_table<E: Entity>(&self, manifest: &Manifest) -> Result<Table<E>, StoreError> {
        let Some(entry) = manifest.tables.get(E::TABLE) else {
            return Ok(Table::default());
        };

        let path = self.data_dir.join(&entry.file);
        let data = retry_io_operation(
            || fs::read(&path).map_err(|e| classify_io_error(e, "Failed to read table file")),
            self.max_retries,
            self.retry_delay_ms,
            "load_table",
        )?;

        let actual = checksum(&data);
        if actual != entry.checksum {
            return Err(StoreError::DataCorruption(format!(
                "Checksum mismatch for table '{}': expected {:08x}, got {:08x}",
                E::TABLE,
                entry.checksum,
                actual
            )));
        }

        let parsed: TableFileIn<E> = serde_json::from_slice(&data).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse table '{}': {}", E::TABLE, e))
        })?;
        if parsed.rows.len() != entry.rows {
            return Err(StoreError::DataCorruption(format!(
                "Row count mismatch for table '{}': manifest {}, file {}",
                E::TABLE,
                entry.rows,
                parsed.rows.len()
            )));
        }

        Ok(Table::from_rows(parsed.next_id, parsed.rows))
    }
}
