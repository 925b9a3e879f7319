//! Task use-case service.
//!
//! # Responsibility
//! - Validate form input before it reaches the repository.
//! - Provide the sorted, formatted projection the list screen renders.
//!
//! # Invariants
//! - Validation failures never touch storage.
//! - `list_for_display` is recomputed from the live snapshot on every call.

use crate::format::format_due_date;
use crate::model::task::{Priority, Task, TaskDraft, TaskId, TaskPatch, ValidationError};
use crate::ordering::sort_for_display;
use crate::repo::task_repo::{RepoError, SubscriptionId, TaskRepository};
use crate::store::KeyValueStore;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// One rendered row of the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    /// `dd/mm/yyyy` in the display timezone.
    pub due_label: String,
    pub priority: Priority,
    pub completed: bool,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            due_label: format_due_date(&task.due_date),
            priority: task.priority.clone(),
            completed: task.completed,
        }
    }
}

pub struct TaskService<S: KeyValueStore> {
    repo: TaskRepository<S>,
}

impl<S: KeyValueStore> TaskService<S> {
    pub fn new(repo: TaskRepository<S>) -> Self {
        Self { repo }
    }

    pub fn create_task(&mut self, draft: TaskDraft) -> ServiceResult<Task> {
        draft.validate()?;
        Ok(self.repo.create(draft)?)
    }

    /// Applies edited fields. Provided title/description must be non-blank.
    pub fn edit_task(&mut self, id: &TaskId, patch: &TaskPatch) -> ServiceResult<Option<Task>> {
        patch.validate()?;
        Ok(self.repo.update(id, patch)?)
    }

    /// Flips `completed`. An unknown id goes through the missing-id policy.
    pub fn toggle_completion(&mut self, id: &TaskId) -> ServiceResult<Option<Task>> {
        let completed = self.repo.get(id).map_or(true, |task| !task.completed);
        Ok(self.repo.update(id, &TaskPatch::completed(completed))?)
    }

    pub fn delete_task(&mut self, id: &TaskId) -> ServiceResult<bool> {
        Ok(self.repo.delete(id)?)
    }

    /// Unordered snapshot.
    pub fn tasks(&self) -> &[Task] {
        self.repo.list()
    }

    /// Snapshot sorted for display with due dates rendered.
    pub fn list_for_display(&self) -> Vec<TaskView> {
        sort_for_display(self.repo.list())
            .iter()
            .map(TaskView::from)
            .collect()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[Task]) + 'static) -> SubscriptionId {
        self.repo.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.repo.unsubscribe(id)
    }

    pub fn repository(&self) -> &TaskRepository<S> {
        &self.repo
    }

    pub fn into_repository(self) -> TaskRepository<S> {
        self.repo
    }
}
