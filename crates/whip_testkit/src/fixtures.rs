//! Test fixtures and store helpers.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use whip_core::{Config, Range, RangeStore, Record};

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: RangeStore,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a new in-memory test store.
    pub fn memory() -> Self {
        Self::memory_with_config(Config::default())
    }

    /// Creates a new in-memory test store with custom configuration.
    pub fn memory_with_config(config: Config) -> Self {
        Self {
            store: RangeStore::open_in_memory_with_config(config)
                .expect("Failed to open in-memory store"),
            temp_dir: None,
        }
    }

    /// Creates a new file-backed test store in a temporary directory.
    pub fn file() -> Self {
        Self::file_with_config(Config::default())
    }

    /// Creates a new file-backed test store with custom configuration.
    pub fn file_with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RangeStore::open_with_config(
            &Self::store_path(temp_dir.path()),
            config.create_if_missing(true),
        )
        .expect("Failed to open file store");

        Self {
            store,
            temp_dir: Some(temp_dir),
        }
    }

    /// Returns the store directory if file-backed, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|d| Self::store_path(d.path()))
    }

    /// Closes and reopens a file-backed store.
    ///
    /// # Panics
    ///
    /// Panics on an in-memory store; there is nothing to reopen.
    pub fn reopen(self) -> Self {
        let Self { store, temp_dir } = self;
        let config = store.config().clone();
        drop(store);

        let temp_dir = temp_dir.expect("Only file-backed stores can be reopened");
        let store = RangeStore::open_with_config(&Self::store_path(temp_dir.path()), config)
            .expect("Failed to reopen file store");

        Self {
            store,
            temp_dir: Some(temp_dir),
        }
    }

    fn store_path(root: &Path) -> PathBuf {
        root.join("test.whip")
    }
}

impl std::ops::Deref for TestStore {
    type Target = RangeStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl std::ops::DerefMut for TestStore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}

/// Runs a test with a temporary in-memory store.
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&mut RangeStore) -> R,
{
    let mut test_store = TestStore::memory();
    f(&mut test_store.store)
}

/// Builds a range, panicking on `begin > end`.
pub fn range(begin: u32, end: u32) -> Range {
    Range::new(begin, end).expect("begin must not exceed end")
}

/// Builds a record from a JSON object literal.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => Record::from(map),
        other => panic!("record fixture must be a JSON object, got {other}"),
    }
}

/// Builds a record with a `datetime` field and a single `value`.
pub fn dated(datetime: &str, value: i64) -> Record {
    record(serde_json::json!({ "datetime": datetime, "value": value }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_store_survives_reopen() {
        let mut test_store = TestStore::file();
        test_store
            .load(vec![
                (range(10, 19), record(json!({"n": 1}))),
                (range(20, 29), record(json!({"n": 2}))),
            ])
            .unwrap();
        let path = test_store.path().unwrap();

        let test_store = test_store.reopen();
        assert_eq!(test_store.path(), Some(path));
        assert_eq!(test_store.len(), 2);
        assert_eq!(
            test_store.lookup(25).unwrap(),
            Some(record(json!({"n": 2})))
        );
        assert!(test_store.log_size().unwrap() > 0);
    }

    #[test]
    fn memory_store_has_no_path() {
        let test_store = TestStore::memory();
        assert!(test_store.path().is_none());
        assert!(test_store.is_empty());
    }

    #[test]
    fn with_temp_store_hands_out_an_empty_store() {
        let len = with_temp_store(|store| {
            store.load(vec![(range(0, 0), 1u8)]).unwrap();
            store.len()
        });
        assert_eq!(len, 1);
    }
}
