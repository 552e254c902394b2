//! Record store traits and configuration.
//!
//! This module defines the core abstraction for record storage backends.

use crate::error::DbResult;
use std::path::{Path, PathBuf};

// ============================================================================
// RecordStoreConfig
// ============================================================================

/// Configuration for a record store.
#[derive(Debug, Clone)]
pub struct RecordStoreConfig {
    /// Root directory holding one file per record.
    pub path: PathBuf,
}

impl RecordStoreConfig {
    /// Create a new record store configuration.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

// ============================================================================
// RecordStore Trait
// ============================================================================

/// Trait for record storage backend implementations.
///
/// A record store is a durable mapping from an opaque string key to an
/// arbitrary JSON value.
///
/// ## Failure Visibility
///
/// Unlike the typed layer above it, a record store reports absent keys as
/// [`DbError::NotFound`](crate::DbError::NotFound). Listing is the exception:
/// records that cannot be parsed are skipped so that a single corrupt file
/// never hides the rest of the store.
pub trait RecordStore: Send + Sync {
    /// Write or overwrite the record stored under `key`.
    fn save(&self, key: &str, value: &serde_json::Value) -> DbResult<()>;

    /// Read the record stored under `key`.
    fn get(&self, key: &str) -> DbResult<serde_json::Value>;

    /// Remove the record stored under `key`.
    fn delete(&self, key: &str) -> DbResult<()>;

    /// List the original keys of all readable records.
    fn list_keys(&self) -> DbResult<Vec<String>>;

    /// Check whether a record exists for `key`.
    fn contains(&self, key: &str) -> bool;

    /// Root directory of this store.
    fn root(&self) -> &Path;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_store_config() {
        let config = RecordStoreConfig::new("/path/to/records");

        assert_eq!(config.path, PathBuf::from("/path/to/records"));
    }
}
