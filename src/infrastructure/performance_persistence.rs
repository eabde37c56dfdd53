//! JSON persistence for performance memory.
//!
//! The whole store is read and written as one document. Loading replaces the
//! in-memory store; saving goes through a sibling temp file and a rename, so the
//! target holds either its previous or its new content.

use crate::domain::errors::PersistenceError;
use crate::domain::performance::PerformanceStore;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const JSON_FILE_NAME: &str = "logs.json";

const PRETTY_INDENT: &[u8] = b"    ";

/// Handles persistence of the performance store to disk.
#[derive(Debug, Clone)]
pub struct PerformancePersistence {
    file_path: PathBuf,
}

impl PerformancePersistence {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Persistence for `logs.json` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(JSON_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Loads the store from disk. Returns `None` when the file does not exist.
    pub fn load(&self) -> Result<Option<PerformanceStore>, PersistenceError> {
        if !self.file_path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.file_path).map_err(|source| {
            PersistenceError::Read {
                path: self.file_path.clone(),
                source,
            }
        })?;
        let store: PerformanceStore =
            serde_json::from_str(&content).map_err(|source| PersistenceError::Parse {
                path: self.file_path.clone(),
                source,
            })?;

        if let Some((group, shortest, longest)) = store.find_ragged_group() {
            return Err(PersistenceError::Ragged {
                path: self.file_path.clone(),
                group: group.to_string(),
                shortest,
                longest,
            });
        }

        info!(
            "Loaded {} performance group(s) from {:?}",
            store.len(),
            self.file_path
        );
        Ok(Some(store))
    }

    /// Writes the whole store, replacing any previous content.
    pub fn save(&self, store: &PerformanceStore, compact: bool) -> Result<(), PersistenceError> {
        let content = encode(store, compact).map_err(PersistenceError::Serialize)?;

        // Atomic write: write to temp file then rename
        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(|source| PersistenceError::Write {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.file_path).map_err(|source| {
            let _ = fs::remove_file(&temp_path);
            PersistenceError::Write {
                path: self.file_path.clone(),
                source,
            }
        })?;

        info!(
            "Saved {} performance group(s) to {:?}",
            store.len(),
            self.file_path
        );
        Ok(())
    }
}

/// Encodes the store with minimal separators (`compact`) or four-space indentation
pub fn encode(store: &PerformanceStore, compact: bool) -> Result<Vec<u8>, serde_json::Error> {
    if compact {
        return serde_json::to_vec(store);
    }

    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(PRETTY_INDENT));
    store.serialize(&mut serializer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::PersistenceError;
    use crate::domain::performance::Record;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_test_persistence() -> (PerformancePersistence, PathBuf) {
        let unique_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!(
            "perflog_test_{}_{}_{}_persist",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            unique_id
        ));
        fs::create_dir_all(&temp_dir).expect("Failed to create test temp dir");
        (PerformancePersistence::in_dir(&temp_dir), temp_dir)
    }

    fn cleanup_test_dir(temp_dir: PathBuf) {
        fs::remove_dir_all(temp_dir).ok();
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap_or_default()
    }

    fn sample_store() -> PerformanceStore {
        let mut store = PerformanceStore::new();
        store
            .record("epoch", record(json!({"loss": 0.5, "acc": 0.9, "tag": "warmup"})))
            .unwrap();
        store
            .record("epoch", record(json!({"loss": 0.3, "acc": 0.95, "tag": "main"})))
            .unwrap();
        store
            .record(
                "eval",
                record(json!({"per_class": {"cat": 0.9, "dog": [1, 2]}, "done": true, "note": null})),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let (persistence, temp_dir) = create_test_persistence();
        let result = persistence.load().unwrap();
        assert!(result.is_none());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_load_treats_directory_as_missing_file() {
        let (persistence, temp_dir) = create_test_persistence();
        fs::create_dir_all(persistence.path()).unwrap();

        let result = persistence.load().unwrap();
        assert!(result.is_none());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_save_and_load_roundtrip_compact() {
        let (persistence, temp_dir) = create_test_persistence();
        let store = sample_store();

        persistence.save(&store, true).unwrap();
        let loaded = persistence.load().unwrap().unwrap();

        assert_eq!(loaded, store);
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_save_and_load_roundtrip_indented() {
        let (persistence, temp_dir) = create_test_persistence();
        let store = sample_store();

        persistence.save(&store, false).unwrap();
        let loaded = persistence.load().unwrap().unwrap();

        assert_eq!(loaded, store);
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let (persistence, temp_dir) = create_test_persistence();
        persistence.save(&sample_store(), false).unwrap();

        let mut smaller = PerformanceStore::new();
        smaller.record("only", record(json!({"x": 1}))).unwrap();
        persistence.save(&smaller, true).unwrap();

        assert_eq!(persistence.load().unwrap().unwrap(), smaller);
        assert!(!persistence.path().with_extension("tmp").exists());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_compact_and_indented_encodings() {
        let mut store = PerformanceStore::new();
        store.record("g", record(json!({"a": 1}))).unwrap();

        let compact = String::from_utf8(encode(&store, true).unwrap()).unwrap();
        assert_eq!(compact, r#"{"g":{"a":[1]}}"#);

        let indented = String::from_utf8(encode(&store, false).unwrap()).unwrap();
        assert_eq!(
            indented,
            "{\n    \"g\": {\n        \"a\": [\n            1\n        ]\n    }\n}"
        );
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let (persistence, temp_dir) = create_test_persistence();
        fs::write(persistence.path(), "{not json").unwrap();

        let err = persistence.load().unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { .. }));
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_load_rejects_wrong_shape() {
        let (persistence, temp_dir) = create_test_persistence();

        for body in [r#"[1, 2]"#, r#"{"g": [1]}"#, r#"{"g": {"a": 1}}"#] {
            fs::write(persistence.path(), body).unwrap();
            let err = persistence.load().unwrap_err();
            assert!(matches!(err, PersistenceError::Parse { .. }), "{body}");
        }
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_load_rejects_ragged_group() {
        let (persistence, temp_dir) = create_test_persistence();
        fs::write(persistence.path(), r#"{"g": {"a": [1, 2], "b": [1]}}"#).unwrap();

        let err = persistence.load().unwrap_err();
        match err {
            PersistenceError::Ragged {
                group,
                shortest,
                longest,
                ..
            } => {
                assert_eq!(group, "g");
                assert_eq!((shortest, longest), (1, 2));
            }
            other => panic!("expected ragged error, got {other:?}"),
        }
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_load_accepts_nested_sequences() {
        let (persistence, temp_dir) = create_test_persistence();
        fs::write(
            persistence.path(),
            r#"{"g": {"grid": [[1, 2], [3, 4]], "meta": [{"k": "v"}, {"k": "w"}]}}"#,
        )
        .unwrap();

        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(
            loaded.series("g", "grid").unwrap(),
            &[json!([1, 2]), json!([3, 4])]
        );

        persistence.save(&loaded, true).unwrap();
        assert_eq!(persistence.load().unwrap().unwrap(), loaded);
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let (_, temp_dir) = create_test_persistence();
        let persistence = PerformancePersistence::in_dir(&temp_dir.join("absent"));

        let err = persistence.save(&sample_store(), true).unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
        cleanup_test_dir(temp_dir);
    }
}
