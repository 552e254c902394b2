//! Error types for litrank-db.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for litrank-db operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur in litrank-db operations.
#[derive(Debug, Error)]
pub enum DbError {
    // ========================================================================
    // Record errors
    // ========================================================================
    /// The key was never saved, or has been deleted.
    #[error("Key not found: {key}")]
    NotFound { key: String },

    /// A record file exists but cannot be parsed as a record envelope.
    #[error("Malformed record at {path}: {message}")]
    MalformedRecord { path: PathBuf, message: String },

    /// Record store I/O error with path context.
    #[error("Record store I/O error at {path}: {message}")]
    RecordIo { path: PathBuf, message: String },

    // ========================================================================
    // General errors
    // ========================================================================
    /// IO error wrapper.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbError {
    /// Create a not-found error for a key.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a malformed record error.
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a record I/O error.
    pub fn record_io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::RecordIo {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the key is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
