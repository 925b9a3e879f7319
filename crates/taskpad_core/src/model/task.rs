//! Task record, draft and patch types.
//!
//! # Invariants
//! - `id` is assigned once by the repository and never patched.
//! - `title`/`description` are checked by `TaskDraft::validate` before
//!   creation; stored records are not re-validated.
//! - `completed` missing from persisted JSON reads as `false`.
//! - Unknown priority strings survive a load/save cycle unchanged.
//! - Unknown record fields survive a load/save cycle unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque, immutable task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Task urgency.
///
/// Persisted as the plain strings `High`, `Normal` and `Low`. Anything else
/// found in storage is kept as `Unrecognized` so it is written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    Normal,
    #[default]
    Low,
    Unrecognized(String),
}

impl Priority {
    /// Display rank: `High(1) < Normal(2) < Low(3) < unrecognized(4)`.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 1,
            Self::Normal => 2,
            Self::Low => 3,
            Self::Unrecognized(_) => 4,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "High",
            Self::Normal => "Normal",
            Self::Low => "Low",
            Self::Unrecognized(raw) => raw.as_str(),
        }
    }

    /// Parses the persisted label. Matching is exact, like the stored form.
    pub fn parse(value: &str) -> Self {
        match value {
            "High" => Self::High,
            "Normal" => Self::Normal,
            "Low" => Self::Low,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match Self::parse(value.as_str()) {
            Self::Unrecognized(_) => Self::Unrecognized(value),
            known => known,
        }
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical task record, serialized with the camelCase field names used by
/// the persisted collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    /// Date-only meaning, full precision kept. Written as
    /// `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    #[serde(with = "iso_millis")]
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    /// Fields written by other app versions, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Builds a fresh, incomplete task from a draft and an assigned id.
    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            priority: draft.priority,
            completed: false,
            extra: Map::new(),
        }
    }
}

/// Input shape for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
}

impl TaskDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
        priority: Priority,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_date,
            priority,
        }
    }

    /// Checks the form-level rules before anything reaches the repository.
    ///
    /// # Errors
    /// - `EmptyTitle` / `EmptyDescription` when the value is blank after
    ///   trimming. Title is checked first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_text_fields(Some(self.title.as_str()), Some(self.description.as_str()))
    }
}

/// Partial update. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that only sets the completion flag.
    pub fn completed(value: bool) -> Self {
        Self {
            completed: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
    }

    /// Same rules as `TaskDraft::validate`, applied to provided fields only.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_text_fields(self.title.as_deref(), self.description.as_deref())
    }

    /// Merges this patch into `task`. The id is never touched.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = &self.priority {
            task.priority = priority.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Form validation failure raised before any repository call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTitle,
    EmptyDescription,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is required"),
            Self::EmptyDescription => write!(f, "description is required"),
        }
    }
}

impl Error for ValidationError {}

fn validate_text_fields(
    title: Option<&str>,
    description: Option<&str>,
) -> Result<(), ValidationError> {
    if title.is_some_and(|value| value.trim().is_empty()) {
        return Err(ValidationError::EmptyTitle);
    }
    if description.is_some_and(|value| value.trim().is_empty()) {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(())
}

mod iso_millis {
    use crate::format::parse_timestamp;
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(raw.as_str())
            .map_err(|err| serde::de::Error::custom(format!("invalid dueDate: {err}")))
    }
}
