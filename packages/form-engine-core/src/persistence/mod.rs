//! Snapshot persistence for the in-memory tables.

pub mod io_utils;
mod manifest;
mod snapshot;

pub use manifest::{Manifest, TableEntry, MANIFEST_VERSION};
pub use snapshot::SnapshotManager;
