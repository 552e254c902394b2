//! # litrank-db
//!
//! Storage layer for litrank - a tiny file-backed key → JSON value store.
//!
//! This crate knows nothing about the research domain. It only
//! knows how to persist opaque JSON values under string keys, one file per
//! key. The typed entity/relationship/score model lives in `litrank-core`.
//!
//! ## Architecture
//!
//! ```text
//! litrank-cli → litrank-core (EntityStore, ComparisonEngine)
//!                    ↓
//!          litrank-db::record::RecordStore trait
//!                    ↓
//!              FileRecordStore (one JSON file per key)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use litrank_db::record::{open_record_store, RecordStoreConfig};
//! use serde_json::json;
//!
//! let store = open_record_store(&RecordStoreConfig::new("/tmp/data/entities"))?;
//! store.save("colbert", &json!({"name": "ColBERT"}))?;
//! let value = store.get("colbert")?;
//! let keys = store.list_keys()?;
//! ```

pub mod error;
pub mod record;

pub use error::{DbError, DbResult};
pub use record::{open_record_store, FileRecordStore, RecordStore, RecordStoreConfig};
