//! On-disk snapshot layout.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Current manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

/// Snapshot manifest. Table files are named per generation and the manifest
/// is renamed into place last, so a failed save leaves the previous one loadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Format version
    pub version: u32,
    /// Save counter, part of every table file name
    #[serde(default)]
    pub generation: u64,
    /// When the snapshot was taken
    pub saved_at: DateTime<Utc>,
    /// Per-table metadata, keyed by table name
    pub tables: BTreeMap<String, TableEntry>,
}

/// Manifest entry for one table file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Relative path of the table file
    pub file: String,
    /// Row count at save time
    pub rows: usize,
    /// CRC32 of the table file
    pub checksum: u32,
}

/// Checks a loaded manifest before any table file is read.
pub fn validate_manifest(manifest: &Manifest, known_tables: &[&str]) -> Result<(), StoreError> {
    if manifest.version != MANIFEST_VERSION {
        return Err(StoreError::DataCorruption(format!(
            "Unsupported manifest version {} (expected {})",
            manifest.version, MANIFEST_VERSION
        )));
    }

    for (name, entry) in &manifest.tables {
        if !known_tables.contains(&name.as_str()) {
            tracing::warn!("Ignoring unknown table '{}' in manifest", name);
            continue;
        }
        if entry.file.is_empty() || entry.file.contains("..") {
            return Err(StoreError::DataCorruption(format!(
                "Invalid file path '{}' for table '{}'",
                entry.file, name
            )));
        }
    }

    Ok(())
}
