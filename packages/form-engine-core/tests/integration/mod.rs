//! Integration test suite.
//!
//! 1. Engine operations through transactions
//! 2. Category tree maintenance
//! 3. Snapshot persistence and recovery

pub mod category_tests;
pub mod engine_tests;
pub mod helpers;
pub mod persistence_tests;
