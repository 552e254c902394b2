//! File-backed record store.
//!
//! Each key is stored as a separate JSON file under the store's root
//! directory. The file carries the original key next to the data, so the
//! key survives the lossy key → filename mapping.
//!
//! ## Key → Filename Mapping
//!
//! Characters that are neither alphanumeric nor one of `-`, `_`, `.` are
//! replaced by `_`. If nothing of the key survives (empty key, or a key made
//! only of replaced characters such as `"///"`), the SHA-256 hex digest of
//! the key is used as the file stem instead.
//!
//! Files written before the hash fallback existed keep the plain sanitized
//! name (`___.json` for `"///"`). Reads and deletes fall back to that name
//! when the hashed file is absent.
//!
//! The mapping is many-to-one: `"a/b"` and `"a:b"` both land in `a_b.json`.
//! Such collisions are neither detected nor resolved; the last write wins.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use super::traits::{RecordStore, RecordStoreConfig};
use crate::error::{DbError, DbResult};

/// File extension used for record files.
pub const RECORD_EXTENSION: &str = "json";

/// Replacement for characters that are unsafe in filenames.
const PLACEHOLDER: char = '_';

/// Envelope written to disk.
#[derive(Serialize)]
struct RecordEnvelopeRef<'a> {
    key: &'a str,
    data: &'a serde_json::Value,
}

/// Envelope read back from disk.
///
/// `data` defaults to `null` so that a keyed file without payload still reads.
#[derive(Deserialize)]
struct RecordEnvelope {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

/// Compute the filename (including extension) used to store `key`.
///
/// # Examples
///
/// ```
/// use litrank_db::record::record_filename;
///
/// assert_eq!(record_filename("method_colbert"), "method_colbert.json");
/// assert_eq!(record_filename("weird/key:name"), "weird_key_name.json");
/// assert_eq!(record_filename("///").len(), 64 + ".json".len());
/// ```
pub fn record_filename(key: &str) -> String {
    let (safe, kept) = sanitize(key);
    let stem = if kept == 0 { key_digest(key) } else { safe };
    format!("{}.{}", stem, RECORD_EXTENSION)
}

/// Plain sanitized filename for keys that now hash, if it differs.
fn legacy_filename(key: &str) -> Option<String> {
    match sanitize(key) {
        (safe, 0) => Some(format!("{}.{}", safe, RECORD_EXTENSION)),
        _ => None,
    }
}

/// Replace unsafe characters, returning the result and how many characters were kept.
fn sanitize(key: &str) -> (String, usize) {
    let mut kept = 0usize;
    let safe: String = key
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                kept += 1;
                c
            } else {
                PLACEHOLDER
            }
        })
        .collect();
    (safe, kept)
}

/// SHA-256 hex digest of a key.
fn key_digest(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// File-backed record store: one pretty-printed JSON file per key.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    /// Root directory holding the record files.
    root: PathBuf,
}

impl FileRecordStore {
    /// Open or create a file record store.
    pub fn open(config: &RecordStoreConfig) -> DbResult<Self> {
        debug!("Opening FileRecordStore at {:?}", config.path);

        fs::create_dir_all(&config.path).map_err(|e| {
            DbError::record_io(&config.path, format!("Failed to create directory: {}", e))
        })?;

        Ok(Self {
            root: config.path.clone(),
        })
    }

    /// Full path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(record_filename(key))
    }

    /// Path of the existing file backing `key`.
    ///
    /// Prefers the current filename; falls back to the plain sanitized name
    /// for all-placeholder keys written by earlier versions.
    fn existing_path(&self, key: &str) -> Option<PathBuf> {
        let path = self.path_for(key);
        if path.is_file() {
            return Some(path);
        }
        legacy_filename(key)
            .map(|name| self.root.join(name))
            .filter(|legacy| legacy.is_file())
    }

    /// Read and parse an envelope from disk.
    fn read_envelope(&self, path: &Path) -> DbResult<RecordEnvelope> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| DbError::malformed(path, e.to_string()))
    }
}

impl RecordStore for FileRecordStore {
    fn save(&self, key: &str, value: &serde_json::Value) -> DbResult<()> {
        let path = self.path_for(key);
        trace!("Saving record {:?} to {:?}", key, path);

        let envelope = RecordEnvelopeRef { key, data: value };
        let content = serde_json::to_string_pretty(&envelope)?;
        fs::write(&path, content)
            .map_err(|e| DbError::record_io(&path, format!("Failed to write record: {}", e)))
    }

    fn get(&self, key: &str) -> DbResult<serde_json::Value> {
        let Some(path) = self.existing_path(key) else {
            return Err(DbError::not_found(key));
        };

        match self.read_envelope(&path) {
            Ok(envelope) => Ok(envelope.data),
            Err(DbError::Io(e)) if e.kind() == ErrorKind::NotFound => Err(DbError::not_found(key)),
            Err(e) => Err(e),
        }
    }

    fn delete(&self, key: &str) -> DbResult<()> {
        let path = self.existing_path(key).unwrap_or_else(|| self.path_for(key));
        match fs::remove_file(&path) {
            Ok(()) => {
                trace!("Deleted record {:?}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DbError::not_found(key)),
            Err(e) => Err(DbError::record_io(
                &path,
                format!("Failed to delete record: {}", e),
            )),
        }
    }

    fn list_keys(&self) -> DbResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            DbError::record_io(&self.root, format!("Failed to list records: {}", e))
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    debug!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }

            match self.read_envelope(&path) {
                Ok(RecordEnvelope { key: Some(key), .. }) => keys.push(key),
                Ok(_) => debug!("Skipping record without key at {:?}", path),
                Err(e) => debug!("Skipping malformed record: {}", e),
            }
        }

        // read_dir order is platform-dependent
        keys.sort();
        Ok(keys)
    }

    fn contains(&self, key: &str) -> bool {
        self.existing_path(key).is_some()
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, FileRecordStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = RecordStoreConfig::new(temp_dir.path().join("data"));
        let store = FileRecordStore::open(&config).expect("Failed to open store");
        (temp_dir, store)
    }

    #[test]
    fn test_open_creates_root() {
        let (temp_dir, store) = create_test_store();

        assert!(temp_dir.path().join("data").is_dir());
        assert_eq!(store.root(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_save_and_get() {
        let (_temp_dir, store) = create_test_store();

        store.save("test1", &json!({"a": 1})).unwrap();

        assert_eq!(store.get("test1").unwrap(), json!({"a": 1}));
        assert!(store.list_keys().unwrap().contains(&"test1".to_string()));
        assert!(store.contains("test1"));
    }

    #[test]
    fn test_save_overwrites() {
        let (_temp_dir, store) = create_test_store();

        store.save("k", &json!("first")).unwrap();
        store.save("k", &json!("second")).unwrap();

        assert_eq!(store.get("k").unwrap(), json!("second"));
        assert_eq!(store.list_keys().unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let (_temp_dir, store) = create_test_store();

        let err = store.get("missing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, store) = create_test_store();

        store.save("todel", &json!([1, 2, 3])).unwrap();
        store.delete("todel").unwrap();

        assert!(matches!(store.get("todel"), Err(DbError::NotFound { .. })));
        assert!(!store.contains("todel"));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let (_temp_dir, store) = create_test_store();

        let err = store.delete("never-saved").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_key_sanitization() {
        let (_temp_dir, store) = create_test_store();
        let key = "weird/key\\name:with*chars?";

        store.save(key, &json!("value")).unwrap();

        assert_eq!(store.get(key).unwrap(), json!("value"));
        assert!(store.path_for(key).ends_with("weird_key_name_with_chars_.json"));
        assert_eq!(store.list_keys().unwrap(), vec![key.to_string()]);
    }

    #[test]
    fn test_all_illegal_key_uses_hash_name() {
        let (_temp_dir, store) = create_test_store();

        store.save("///", &json!({"x": true})).unwrap();

        let filename = record_filename("///");
        let stem = filename.trim_end_matches(".json");
        assert_eq!(stem.len(), 64);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(store.root().join(&filename).is_file());

        assert_eq!(store.get("///").unwrap(), json!({"x": true}));
        assert_eq!(store.list_keys().unwrap(), vec!["///".to_string()]);
    }

    #[test]
    fn test_all_illegal_key_reads_plain_sanitized_file() {
        let (_temp_dir, store) = create_test_store();
        fs::write(
            store.root().join("___.json"),
            r#"{"key": "///", "data": {"old": 1}}"#,
        )
        .unwrap();

        assert_eq!(store.list_keys().unwrap(), vec!["///".to_string()]);
        assert!(store.contains("///"));
        assert_eq!(store.get("///").unwrap(), json!({"old": 1}));

        store.delete("///").unwrap();
        assert!(!store.root().join("___.json").exists());
        assert!(store.get("///").unwrap_err().is_not_found());
    }

    #[test]
    fn test_hashed_file_wins_over_plain_sanitized_file() {
        let (_temp_dir, store) = create_test_store();
        fs::write(
            store.root().join("___.json"),
            r#"{"key": "///", "data": "old"}"#,
        )
        .unwrap();

        store.save("///", &json!("new")).unwrap();

        assert_eq!(store.get("///").unwrap(), json!("new"));
    }

    #[test]
    fn test_empty_key_uses_hash_name() {
        assert_eq!(record_filename(""), format!("{}.json", key_digest("")));
    }

    #[test]
    fn test_unicode_key_is_kept() {
        assert_eq!(record_filename("método_ß"), "método_ß.json");
    }

    #[test]
    fn test_list_keys_skips_malformed_and_foreign_files() {
        let (_temp_dir, store) = create_test_store();

        store.save("good", &json!(1)).unwrap();
        fs::write(store.root().join("broken.json"), "{ not json").unwrap();
        fs::write(store.root().join("nokey.json"), r#"{"data": 5}"#).unwrap();
        fs::write(store.root().join("notes.txt"), "hello").unwrap();

        assert_eq!(store.list_keys().unwrap(), vec!["good".to_string()]);
    }

    #[test]
    fn test_get_malformed_record() {
        let (_temp_dir, store) = create_test_store();

        fs::write(store.path_for("bad"), "[1, 2").unwrap();

        assert!(matches!(
            store.get("bad"),
            Err(DbError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_get_without_data_is_null() {
        let (_temp_dir, store) = create_test_store();

        fs::write(store.path_for("empty"), r#"{"key": "empty"}"#).unwrap();

        assert_eq!(store.get("empty").unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn test_file_payload_format() {
        let (_temp_dir, store) = create_test_store();

        store.save("m1", &json!({"name": "Méthode"})).unwrap();

        let content = fs::read_to_string(store.path_for("m1")).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(payload, json!({"key": "m1", "data": {"name": "Méthode"}}));
        // Non-ASCII is written verbatim, two-space indentation
        assert!(content.contains("Méthode"));
        assert!(content.contains("\n  \"key\""));
    }
}
