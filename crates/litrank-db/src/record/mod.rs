//! Record storage module for litrank-db.
//!
//! - [`RecordStore`] - Trait for key → JSON value storage implementations
//! - [`RecordStoreConfig`] - Where a store lives on disk
//! - [`FileRecordStore`] - One JSON file per key under a root directory
//!
//! ## On-disk Format
//!
//! Every record is a standalone file `<sanitized-key>.json` holding an
//! envelope that preserves the original key:
//!
//! ```json
//! {
//!   "key": "method_colbert",
//!   "data": { "id": "method_colbert", "name": "ColBERT" }
//! }
//! ```

pub mod file;
pub mod traits;

pub use file::{record_filename, FileRecordStore, RECORD_EXTENSION};
pub use traits::{RecordStore, RecordStoreConfig};

use crate::error::DbResult;

/// Open (or create) a record store with the given configuration.
///
/// The root directory is created if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the root directory cannot be created.
pub fn open_record_store(config: &RecordStoreConfig) -> DbResult<Box<dyn RecordStore>> {
    let store = FileRecordStore::open(config)?;
    Ok(Box::new(store))
}
