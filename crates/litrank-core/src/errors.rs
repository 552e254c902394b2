//! Error types for litrank-core.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-specific errors for litrank operations.
#[derive(Error, Debug)]
pub enum LitError {
    // =========================================================================
    // Domain Model Errors
    // =========================================================================
    /// A typed field received a value outside its closed set.
    ///
    /// Raised for unknown `entity_type` / `relation_type` strings. Never
    /// recovered: a record with an unknown kind is a caller bug.
    #[error("Invalid {field} `{value}`: expected one of {expected}")]
    Validation {
        /// The field being validated (e.g. `entity_type`).
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Comma-separated list of accepted values.
        expected: String,
    },

    /// A float field holds NaN or an infinity, which a JSON record cannot carry.
    #[error("Invalid {field} `{value}`: must be a finite number")]
    NonFinite {
        /// The field being validated (`score`, `confidence`).
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A stored record is missing required fields or has mistyped ones.
    #[error("Malformed {kind} record: {message}")]
    MalformedRecord {
        /// The record kind (`entity`, `relationship`, `benchmark score`).
        kind: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// A record does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Record store I/O error.
    #[error("Record store I/O error at `{path}`: {message}")]
    StoreIo {
        /// Path to the store file or directory.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Global configuration file is invalid.
    #[error("Global config invalid: {0}")]
    InvalidGlobalConfig(String),

    /// A configuration value is invalid.
    #[error("Invalid configuration: {message}. {hint}")]
    InvalidConfiguration {
        /// Description of the invalid configuration.
        message: String,
        /// Actionable hint on how to fix it.
        hint: String,
    },

    /// No data directory could be determined.
    #[error("Could not determine a data directory. Pass --data-dir or set `data_dir` in the config file.")]
    NoDataDir,

    // =========================================================================
    // Ingestion / Report Errors
    // =========================================================================
    /// Failed to read an extraction bundle.
    #[error("Failed to read extraction bundle `{path}`: {message}")]
    BundleRead {
        /// Path to the bundle file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// Failed to write a report file.
    #[error("Failed to write report to `{path}`: {message}")]
    ReportWrite {
        /// Path to the report file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// Invalid argument provided to a command.
    #[error("{0}")]
    InvalidArgument(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A wrapped generic error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LitError {
    /// Create a malformed record error.
    pub fn malformed(kind: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            kind,
            message: message.into(),
        }
    }

    /// Whether this error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
