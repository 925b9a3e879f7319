//! Core runtime configuration.
//!
//! # Responsibility
//! - Carry the knobs that change repository behavior (storage key, id
//!   strategy, missing-id policy) and the default log level.
//! - Load them from the JSON blob handed over by the host app.
//!
//! # Invariants
//! - Every field has a default, so `{}` is a valid configuration.
//! - `validate` runs on every load path; an invalid config never escapes.

use crate::logging::{default_log_level, normalize_level};
use crate::store::DEFAULT_TASKS_KEY;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How new task ids are minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Decimal epoch milliseconds, bumped to stay strictly increasing.
    #[default]
    Timestamp,
    /// Random UUIDv4. Use when more than one writer may create tasks.
    Uuid,
}

/// What `update`/`delete` do when the id is not in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTaskPolicy {
    /// Return `RepoError::NotFound`.
    #[default]
    Reject,
    /// Succeed without touching storage.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub storage_key: String,
    pub id_strategy: IdStrategy,
    pub missing_task_policy: MissingTaskPolicy,
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_TASKS_KEY.to_string(),
            id_strategy: IdStrategy::default(),
            missing_task_policy: MissingTaskPolicy::default(),
            log_level: default_log_level().to_string(),
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config object. Missing fields default.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        normalize_level(self.log_level.as_str())
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    EmptyStorageKey,
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid config json: {message}"),
            Self::EmptyStorageKey => write!(f, "storage_key cannot be empty"),
            Self::InvalidLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
        }
    }
}

impl Error for ConfigError {}
