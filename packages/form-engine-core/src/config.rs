//! Engine configuration.

use std::path::PathBuf;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Data directory for snapshot persistence
    pub data_dir: PathBuf,
    /// Maximum number of parent hops walked by the category cycle check
    pub max_ancestor_depth: usize,
    /// Maximum retry attempts for transient I/O errors
    pub persistence_max_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub persistence_retry_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            max_ancestor_depth: 1024,
            persistence_max_retries: 3,
            persistence_retry_delay_ms: 100,
        }
    }
}
