//! Core domain logic for Taskpad.
//! This crate is the single source of truth for task storage and ordering.

pub mod config;
pub mod db;
pub mod format;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig, IdStrategy, MissingTaskPolicy};
pub use format::{format_due_date, format_due_date_iso, parse_timestamp, FormatError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Priority, Task, TaskDraft, TaskId, TaskPatch, ValidationError};
pub use ordering::{compare_for_display, sort_for_display};
pub use repo::task_repo::{RepoError, RepoResult, SubscriptionId, TaskRepository};
pub use service::task_service::{ServiceError, ServiceResult, TaskService, TaskView};
pub use store::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, TaskStorage,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
