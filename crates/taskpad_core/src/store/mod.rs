//! Device key-value storage and the task blob adapter.
//!
//! # Responsibility
//! - Abstract the platform key-value API behind `KeyValueStore`.
//! - Provide SQLite-backed and in-memory implementations.
//! - Read/write the serialized task collection under one well-known key.
//!
//! # Invariants
//! - A write either fully replaces the value under its key or fails.
//! - Backend failures are surfaced, never swallowed, and never retried.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory_store;
mod sqlite_store;
mod task_storage;

pub use memory_store::MemoryKeyValueStore;
pub use sqlite_store::SqliteKeyValueStore;
pub use task_storage::{TaskStorage, DEFAULT_TASKS_KEY};

pub type BackendResult<T> = Result<T, BackendError>;
pub type StoreResult<T> = Result<T, StorageError>;

/// Minimal string key-value contract, shaped after mobile async storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> BackendResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()>;
    fn remove_item(&mut self, key: &str) -> BackendResult<()>;
}

/// Failure reported by a concrete key-value backend.
#[derive(Debug)]
pub enum BackendError {
    Db(DbError),
    /// Backend refused the call (I/O unavailable, injected failure, ...).
    Unavailable(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for BackendError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Adapter-level storage failure, tagged with the direction and key.
#[derive(Debug)]
pub enum StorageError {
    Read { key: String, source: BackendError },
    Write { key: String, source: BackendError },
}

impl StorageError {
    pub fn key(&self) -> &str {
        match self {
            Self::Read { key, .. } | Self::Write { key, .. } => key.as_str(),
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { key, source } => write!(f, "failed to read `{key}`: {source}"),
            Self::Write { key, source } => write!(f, "failed to write `{key}`: {source}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
        }
    }
}
