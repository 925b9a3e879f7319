//! Persistent store adapter for the serialized task collection.
//!
//! # Responsibility
//! - Load and save one opaque blob under the task collection key.
//! - Log every failure once and hand it back to the caller.
//!
//! # Invariants
//! - The adapter has no notion of a task; it moves strings.
//! - One attempt per call. No retries, no backoff.

use super::{KeyValueStore, StorageError, StoreResult};
use log::{debug, error};

/// Well-known key holding the JSON array of tasks.
pub const DEFAULT_TASKS_KEY: &str = "tasks";

pub struct TaskStorage<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> TaskStorage<S> {
    /// Uses `DEFAULT_TASKS_KEY`.
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_TASKS_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Reads the blob. `Ok(None)` means nothing was ever saved.
    pub fn load(&self) -> StoreResult<Option<String>> {
        match self.store.get_item(self.key.as_str()) {
            Ok(blob) => {
                debug!(
                    "event=storage_load module=store status=ok present={} bytes={}",
                    blob.is_some(),
                    blob.as_ref().map_or(0, String::len)
                );
                Ok(blob)
            }
            Err(source) => {
                error!(
                    "event=storage_load module=store status=error error_code=storage_read_failed error={}",
                    source
                );
                Err(StorageError::Read {
                    key: self.key.clone(),
                    source,
                })
            }
        }
    }

    /// Replaces the blob atomically or fails.
    pub fn save(&mut self, blob: &str) -> StoreResult<()> {
        match self.store.set_item(self.key.as_str(), blob) {
            Ok(()) => {
                debug!(
                    "event=storage_save module=store status=ok bytes={}",
                    blob.len()
                );
                Ok(())
            }
            Err(source) => {
                error!(
                    "event=storage_save module=store status=error error_code=storage_write_failed error={}",
                    source
                );
                Err(StorageError::Write {
                    key: self.key.clone(),
                    source,
                })
            }
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskStorage, DEFAULT_TASKS_KEY};
    use crate::store::{MemoryKeyValueStore, StorageError};

    #[test]
    fn load_returns_none_when_never_saved() {
        let storage = TaskStorage::new(MemoryKeyValueStore::new());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn save_writes_under_default_key() {
        let mut storage = TaskStorage::new(MemoryKeyValueStore::new());
        storage.save("[]").unwrap();
        assert_eq!(storage.store().raw(DEFAULT_TASKS_KEY), Some("[]"));
        assert_eq!(storage.load().unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn failures_are_tagged_with_direction_and_key() {
        let mut store = MemoryKeyValueStore::new();
        store.set_fail_reads(true);
        store.set_fail_writes(true);
        let mut storage = TaskStorage::with_key(store, "todo");

        let read = storage.load().unwrap_err();
        assert!(matches!(read, StorageError::Read { .. }));
        assert_eq!(read.key(), "todo");

        let write = storage.save("[]").unwrap_err();
        assert!(matches!(write, StorageError::Write { .. }));
        assert!(write.to_string().contains("todo"));
    }
}
