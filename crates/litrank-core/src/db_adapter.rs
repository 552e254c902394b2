//! Adapter layer for litrank-db infrastructure.
//!
//! This module bridges the untyped record stores in `litrank-db` with the
//! domain types of `litrank-core`. It provides:
//!
//! - Error conversion from `DbError` to `LitError`
//! - A factory that opens the three record stores backing an entity store
//!
//! ## Architecture
//!
//! ```text
//! litrank-core domain code (store, compare, engine)
//!        ↓
//!   db_adapter (this module) - error mapping + store layout
//!        ↓
//!     litrank-db implementations (FileRecordStore)
//! ```

use std::path::Path;

use litrank_db::record::{open_record_store, RecordStore, RecordStoreConfig};

use crate::constants::{BENCHMARKS_DIR, ENTITIES_DIR, RELATIONSHIPS_DIR};
use crate::errors::LitError;

// ============================================================================
// Error Conversion
// ============================================================================

/// Convert a litrank-db error to a litrank-core error.
pub fn from_db_error(err: litrank_db::DbError) -> LitError {
    use litrank_db::DbError;

    match err {
        DbError::NotFound { key } => LitError::NotFound(key),

        DbError::MalformedRecord { path, message } => {
            LitError::malformed("stored", format!("{}: {}", path.display(), message))
        }

        DbError::RecordIo { path, message } => LitError::StoreIo { path, message },

        DbError::Io(io_err) => LitError::Io(io_err),

        DbError::Json(json_err) => LitError::Json(json_err),
    }
}

/// Extension trait to convert DbResult to Result<T, LitError>.
pub trait IntoLitResult<T> {
    /// Convert a DbResult to a LitError result.
    fn into_lit_result(self) -> Result<T, LitError>;
}

impl<T> IntoLitResult<T> for litrank_db::DbResult<T> {
    fn into_lit_result(self) -> Result<T, LitError> {
        self.map_err(from_db_error)
    }
}

// ============================================================================
// Store Layout
// ============================================================================

/// The three record stores an entity store is built from.
pub struct RecordStores {
    /// Entity records keyed by entity id.
    pub entities: Box<dyn RecordStore>,
    /// Relationship records keyed by `source_relation_target`.
    pub relationships: Box<dyn RecordStore>,
    /// Benchmark score records keyed by `method_benchmark_metric`.
    pub benchmarks: Box<dyn RecordStore>,
}

/// Open the `entities/`, `relationships/` and `benchmarks/` stores under `root`.
///
/// Directories are created on demand.
pub fn open_record_stores(root: &Path) -> Result<RecordStores, LitError> {
    let open = |dir: &str| {
        open_record_store(&RecordStoreConfig::new(root.join(dir))).into_lit_result()
    };

    Ok(RecordStores {
        entities: open(ENTITIES_DIR)?,
        relationships: open(RELATIONSHIPS_DIR)?,
        benchmarks: open(BENCHMARKS_DIR)?,
    })
}
