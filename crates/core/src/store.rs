//! Persistent store for the [`Document`].
//!
//! The document lives in a single slot of a key-value store under a fixed, versioned key
//! ([`STORAGE_KEY`](crate::constants::STORAGE_KEY)). Two backends are provided:
//!
//! - [`FileKeyValueStore`]: one file per key inside a data directory. Writes go to a temporary
//!   file that is then renamed over the slot, so a slot is never left half written.
//! - [`MemoryKeyValueStore`]: a map in memory with an optional byte quota, handy for tests and
//!   for simulating a full store.
//!
//! Loading never fails: a missing slot or one that does not parse yields the empty document and
//! the problem is logged. Saving does fail, and the error goes back to whoever asked for the
//! save.

use crate::config::CoreConfig;
use crate::constants::SLOT_FILE_EXTENSION;
use crate::model::Document;
use crate::validation::validate_storage_key;
use crate::{HealthError, HealthResult};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A string-keyed, string-valued slot store.
pub trait KeyValueStore: std::fmt::Debug {
    /// Returns the value in `key`, or `None` if the slot is empty.
    fn get(&self, key: &str) -> HealthResult<Option<String>>;

    /// Overwrites the slot `key` with `value`.
    fn set(&mut self, key: &str, value: &str) -> HealthResult<()>;
}

/// File-backed key-value store: `<data_dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    data_dir: PathBuf,
}

impl FileKeyValueStore {
    /// The directory is created on first write, not here.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn slot_path(&self, key: &str) -> HealthResult<PathBuf> {
        validate_storage_key(key)?;
        Ok(self
            .data_dir
            .join(format!("{}.{}", key, SLOT_FILE_EXTENSION)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> HealthResult<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HealthError::StorageRead(e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> HealthResult<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.data_dir).map_err(HealthError::StorageDirCreation)?;

        let tmp = path.with_extension(format!("{}.tmp", SLOT_FILE_EXTENSION));
        fs::write(&tmp, value).map_err(HealthError::StorageWrite)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(HealthError::StorageWrite(e));
        }
        Ok(())
    }
}

/// In-memory key-value store with an optional total byte quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    slots: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses writes once the stored values would exceed `quota_bytes` in total.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            slots: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Puts raw text into a slot without any checks.
    pub fn insert_raw(&mut self, key: &str, value: impl Into<String>) {
        self.slots.insert(key.to_owned(), value.into());
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.slots
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> HealthResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> HealthResult<()> {
        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_excluding(key) + value.len();
            if needed > quota {
                return Err(HealthError::StorageQuotaExceeded { needed, quota });
            }
        }
        self.slots.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Loads and saves the [`Document`] in one slot of a [`KeyValueStore`].
#[derive(Debug)]
pub struct DocumentStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl DocumentStore {
    pub fn new(backend: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// File-backed store at the configured data directory and key.
    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(
            Box::new(FileKeyValueStore::new(cfg.data_dir())),
            cfg.storage_key(),
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the document, falling back to [`Document::empty`] if the slot is missing,
    /// unreadable, or malformed.
    pub fn load(&self) -> Document {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "no stored document, starting empty");
                return Document::empty();
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to read stored document");
                return Document::empty();
            }
        };

        match serde_json::from_str::<Document>(&raw).map_err(HealthError::Deserialization) {
            Ok(doc) => {
                if !doc.is_consistent() {
                    tracing::warn!(
                        key = %self.key,
                        reports = doc.reports.len(),
                        vitals = doc.vitals.len(),
                        timeline = doc.timeline.len(),
                        "stored timeline does not match reports and vitals"
                    );
                }
                doc
            }
            Err(e) => {
                tracing::error!(
                    key = %self.key,
                    error = %e,
                    "stored document is corrupt, starting empty"
                );
                Document::empty()
            }
        }
    }

    /// Serialises the whole document and overwrites the slot.
    ///
    /// # Errors
    ///
    /// Returns the backend's error (I/O failure, quota exceeded) or a serialisation error.
    pub fn save(&mut self, doc: &Document) -> HealthResult<()> {
        let json = serde_json::to_string(doc).map_err(HealthError::Serialization)?;
        self.backend.set(&self.key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STORAGE_KEY;
    use crate::model::tests::{sample_report, sample_vitals};
    use crate::model::User;
    use healthmate_files::PreviewHandle;
    use healthmate_types::NonEmptyText;
    use tempfile::TempDir;

    fn populated_document() -> Document {
        let mut doc = Document::empty();
        let mut report = sample_report("r1", "cbc.pdf", "Blood Test", "2024-01-10");
        report.preview_url = Some(PreviewHandle::from("blob:healthmate/dead".to_owned()));
        doc.prepend_report(report);
        doc.prepend_vitals(sample_vitals("v1", "120/80"));
        doc.prepend_report(sample_report("r2", "xray.png", "X-Ray", "2023-12-01"));
        doc.user = Some(User {
            name: NonEmptyText::new("Ayesha").unwrap(),
        });
        doc
    }

    fn memory_store() -> DocumentStore {
        DocumentStore::new(Box::new(MemoryKeyValueStore::new()), STORAGE_KEY)
    }

    #[test]
    fn test_round_trip_memory() {
        let mut store = memory_store();
        let doc = populated_document();

        store.save(&doc).unwrap();
        assert_eq!(store.load(), doc);
    }

    #[test]
    fn test_round_trip_file() {
        let temp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().join("data")).unwrap();
        let mut store = DocumentStore::from_config(&cfg);
        let doc = populated_document();

        store.save(&doc).unwrap();

        let slot = temp.path().join("data").join("healthmate_data_v1.json");
        assert!(slot.is_file());
        assert!(!temp
            .path()
            .join("data")
            .join("healthmate_data_v1.json.tmp")
            .exists());

        let reopened = DocumentStore::from_config(&cfg);
        assert_eq!(reopened.load(), doc);
    }

    #[test]
    fn test_missing_slot_loads_empty() {
        let temp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().join("never-created")).unwrap();
        let store = DocumentStore::from_config(&cfg);

        assert_eq!(store.load(), Document::empty());
    }

    #[test]
    fn test_corrupt_slot_loads_empty() {
        let mut backend = MemoryKeyValueStore::new();
        backend.insert_raw(STORAGE_KEY, "{not json");
        let store = DocumentStore::new(Box::new(backend), STORAGE_KEY);

        assert_eq!(store.load(), Document::empty());
    }

    #[test]
    fn test_wrong_shape_loads_empty() {
        let mut backend = MemoryKeyValueStore::new();
        backend.insert_raw(STORAGE_KEY, r#"{"reports": "nope"}"#);
        let store = DocumentStore::new(Box::new(backend), STORAGE_KEY);

        assert_eq!(store.load(), Document::empty());
    }

    #[test]
    fn test_corrupt_file_slot_loads_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("healthmate_data_v1.json"), "\u{0}\u{1}garbage").unwrap();
        let cfg = CoreConfig::new(temp.path().to_path_buf()).unwrap();

        assert_eq!(DocumentStore::from_config(&cfg).load(), Document::empty());
    }

    #[test]
    fn test_older_key_is_ignored() {
        let mut backend = MemoryKeyValueStore::new();
        backend.insert_raw("healthmate_data_v0", r#"{"legacy": true}"#);
        let store = DocumentStore::new(Box::new(backend), STORAGE_KEY);

        assert_eq!(store.load(), Document::empty());
    }

    #[test]
    fn test_quota_exceeded_is_reported() {
        let mut store =
            DocumentStore::new(Box::new(MemoryKeyValueStore::with_quota(16)), STORAGE_KEY);
        let result = store.save(&populated_document());

        assert!(matches!(
            result,
            Err(HealthError::StorageQuotaExceeded { quota: 16, .. })
        ));
        assert_eq!(store.load(), Document::empty());
    }

    #[test]
    fn test_quota_counts_overwritten_slot_once() {
        let doc = Document::empty();
        let size = serde_json::to_string(&doc).unwrap().len();
        let mut store = DocumentStore::new(
            Box::new(MemoryKeyValueStore::with_quota(size)),
            STORAGE_KEY,
        );

        store.save(&doc).unwrap();
        store.save(&doc).unwrap();
    }

    #[test]
    fn test_file_store_rejects_bad_key() {
        let temp = TempDir::new().unwrap();
        let mut backend = FileKeyValueStore::new(temp.path());
        assert!(matches!(
            backend.set("../x", "{}"),
            Err(HealthError::InvalidStorageKey(_))
        ));
    }

    #[test]
    fn test_file_store_write_failure_surfaces() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();

        let mut backend = FileKeyValueStore::new(blocker.join("data"));
        assert!(matches!(
            backend.set(STORAGE_KEY, "{}"),
            Err(HealthError::StorageDirCreation(_))
        ));
    }
}
