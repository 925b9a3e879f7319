//! Task repository over the persistent store adapter.
//!
//! # Responsibility
//! - Load the collection once, then serve reads from memory.
//! - Apply create/update/delete as full-collection writes.
//! - Fan out snapshots to subscribers.
//!
//! # Invariants
//! - Persist-then-commit: a failed write leaves memory untouched and the
//!   error is returned to the caller.
//! - `list()` order is insertion order and stays put until the next mutation.
//! - Missing ids follow `MissingTaskPolicy`.

use crate::config::{CoreConfig, MissingTaskPolicy};
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch};
use crate::repo::id_gen::TaskIdGenerator;
use crate::store::{KeyValueStore, StorageError, TaskStorage};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    NotFound(TaskId),
    /// Persisted blob does not decode into a valid collection.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[Task])>;

pub struct TaskRepository<S: KeyValueStore> {
    storage: TaskStorage<S>,
    tasks: Vec<Task>,
    ids: TaskIdGenerator,
    missing_task_policy: MissingTaskPolicy,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> TaskRepository<S> {
    /// Wraps `store` with the configured key and loads the collection.
    pub fn open_store(store: S, config: &CoreConfig) -> RepoResult<Self> {
        Self::open(
            TaskStorage::with_key(store, config.storage_key.as_str()),
            config,
        )
    }

    /// Loads the persisted collection. An absent blob is an empty list.
    ///
    /// # Errors
    /// - `Storage` when the read fails.
    /// - `InvalidData` when the blob is not a task array or repeats an id.
    pub fn open(storage: TaskStorage<S>, config: &CoreConfig) -> RepoResult<Self> {
        let tasks = match storage.load()? {
            Some(blob) => decode_collection(blob.as_str()).inspect_err(|err| {
                error!(
                    "event=repo_open module=repo status=error error_code=invalid_data error={}",
                    err
                );
            })?,
            None => Vec::new(),
        };

        let mut ids = TaskIdGenerator::new(config.id_strategy);
        for task in &tasks {
            ids.observe(&task.id);
        }

        info!(
            "event=repo_open module=repo status=ok count={} id_strategy={:?}",
            tasks.len(),
            config.id_strategy
        );

        Ok(Self {
            storage,
            tasks,
            ids,
            missing_task_policy: config.missing_task_policy,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Current snapshot.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Creates a task stamped with the current time.
    pub fn create(&mut self, draft: TaskDraft) -> RepoResult<Task> {
        self.create_at(draft, Utc::now())
    }

    /// Creates a task as if at `now`. The draft is stored as given.
    pub fn create_at(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> RepoResult<Task> {
        let mut id = self.ids.next_id(now);
        while self.get(&id).is_some() {
            id = self.ids.next_id(now);
        }

        let task = Task::from_draft(id, draft);
        let mut candidate = self.tasks.clone();
        candidate.push(task.clone());
        self.commit(candidate)?;

        info!(
            "event=task_create module=repo status=ok task_id={} count={}",
            task.id,
            self.tasks.len()
        );
        Ok(task)
    }

    /// Merges `patch` into the task with `id`.
    ///
    /// Returns `Ok(None)` only under `MissingTaskPolicy::Ignore`.
    pub fn update(&mut self, id: &TaskId, patch: &TaskPatch) -> RepoResult<Option<Task>> {
        let Some(index) = self.position(id) else {
            return self.missing("task_update", id).map(|()| None);
        };

        let mut candidate = self.tasks.clone();
        patch.apply_to(&mut candidate[index]);
        let updated = candidate[index].clone();
        self.commit(candidate)?;

        info!(
            "event=task_update module=repo status=ok task_id={}",
            updated.id
        );
        Ok(Some(updated))
    }

    /// Hard-deletes the task with `id`.
    ///
    /// Returns `Ok(false)` only under `MissingTaskPolicy::Ignore`.
    pub fn delete(&mut self, id: &TaskId) -> RepoResult<bool> {
        let Some(index) = self.position(id) else {
            return self.missing("task_delete", id).map(|()| false);
        };

        let mut candidate = self.tasks.clone();
        candidate.remove(index);
        self.commit(candidate)?;

        info!(
            "event=task_delete module=repo status=ok task_id={} count={}",
            id,
            self.tasks.len()
        );
        Ok(true)
    }

    /// Registers a listener called with the full snapshot after every
    /// successful mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Task]) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn storage(&self) -> &TaskStorage<S> {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut TaskStorage<S> {
        &mut self.storage
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == id)
    }

    fn missing(&self, event: &str, id: &TaskId) -> RepoResult<()> {
        warn!(
            "event={} module=repo status=not_found task_id={} policy={:?}",
            event, id, self.missing_task_policy
        );
        match self.missing_task_policy {
            MissingTaskPolicy::Reject => Err(RepoError::NotFound(id.clone())),
            MissingTaskPolicy::Ignore => Ok(()),
        }
    }

    /// Writes `candidate` and, only if that succeeds, makes it the live
    /// collection and notifies listeners.
    ///
    /// Write failures are already logged by `TaskStorage::save`.
    fn commit(&mut self, candidate: Vec<Task>) -> RepoResult<()> {
        let blob = serde_json::to_string(&candidate)
            .map_err(|err| RepoError::InvalidData(err.to_string()))?;
        self.storage.save(blob.as_str())?;

        self.tasks = candidate;
        for (_, listener) in &mut self.listeners {
            listener(&self.tasks);
        }
        Ok(())
    }
}

fn decode_collection(blob: &str) -> RepoResult<Vec<Task>> {
    let tasks: Vec<Task> =
        serde_json::from_str(blob).map_err(|err| RepoError::InvalidData(err.to_string()))?;

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if !seen.insert(&task.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate task id `{}`",
                task.id
            )));
        }
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::{decode_collection, RepoError};

    #[test]
    fn decode_accepts_missing_completed_flag() {
        let tasks = decode_collection(
            r#"[{"id":"1","title":"a","description":"b","dueDate":"2025-01-10T00:00:00.000Z","priority":"High"}]"#,
        )
        .unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(!tasks[0].completed);
    }

    #[test]
    fn decode_rejects_duplicate_ids() {
        let blob = r#"[
            {"id":"1","title":"a","description":"b","dueDate":"2025-01-10T00:00:00.000Z","priority":"High"},
            {"id":"1","title":"c","description":"d","dueDate":"2025-01-11T00:00:00.000Z","priority":"Low"}
        ]"#;
        let err = decode_collection(blob).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(message) if message.contains("duplicate")));
    }

    #[test]
    fn decode_rejects_non_array_blob() {
        assert!(matches!(
            decode_collection(r#"{"tasks":[]}"#),
            Err(RepoError::InvalidData(_))
        ));
    }
}
