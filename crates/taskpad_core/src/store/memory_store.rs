//! Process-local key-value store.

use super::{BackendError, BackendResult, KeyValueStore};
use std::collections::HashMap;

/// In-memory store for tests and previews.
///
/// Reads and writes can be forced to fail to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store with one raw entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut store = Self::default();
        store.entries.insert(key.into(), value.into());
        store
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful `set_item` calls.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        if self.fail_reads {
            return Err(BackendError::Unavailable(format!("read of `{key}` refused")));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()> {
        if self.fail_writes {
            return Err(BackendError::Unavailable(format!("write of `{key}` refused")));
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> BackendResult<()> {
        if self.fail_writes {
            return Err(BackendError::Unavailable(format!("remove of `{key}` refused")));
        }
        self.entries.remove(key);
        Ok(())
    }
}
