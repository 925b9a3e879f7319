//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task form/list use-cases to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` and a message.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each call runs load-mutate-persist under one process-wide lock, so
//!   calls arriving from different threads never interleave writes.

use chrono::{DateTime, TimeZone, Utc};
use log::warn;
use taskpad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, Priority, ServiceError, SqliteKeyValueStore, Task, TaskDraft, TaskId, TaskPatch,
    TaskRepository, TaskService, TaskView,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

const STORE_DB_FILE_NAME: &str = "taskpad.sqlite3";
const STORE_DB_PATH_ENV: &str = "TASKPAD_DB_PATH";

static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static CORE_CONFIG: OnceLock<CoreConfig> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns empty string on success and an error message on failure.
/// Repeating the same `level + log_dir` is a no-op; changing either fails.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the device store location and core config for this process.
///
/// `config_json` may be empty for defaults. Must run before the first task
/// call; later calls with different values are rejected.
///
/// # FFI contract
/// - Sync call, never panics.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure(db_path: String, config_json: String) -> String {
    let trimmed_path = db_path.trim();
    if trimmed_path.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let config = if config_json.trim().is_empty() {
        CoreConfig::default()
    } else {
        match CoreConfig::from_json_str(config_json.as_str()) {
            Ok(config) => config,
            Err(err) => return format!("configure failed: {err}"),
        }
    };

    let _guard = lock_store();
    match pin_settings(
        &STORE_DB_PATH,
        &CORE_CONFIG,
        PathBuf::from(trimmed_path),
        config,
    ) {
        Ok(()) => String::new(),
        Err(err) => format!("configure failed: {err}"),
    }
}

/// One task row, already ordered and formatted for the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListItem {
    pub task_id: String,
    pub title: String,
    pub description: String,
    /// `dd/mm/yyyy`.
    pub due_label: String,
    pub priority: String,
    pub completed: bool,
}

/// Ordered list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskListItem>,
    pub message: String,
}

/// Generic action response envelope for task mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected task ID, when one exists.
    pub task_id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_id: Option<String>) -> Self {
        Self {
            ok: true,
            task_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Creates a task from the create form.
///
/// `due_epoch_ms` is the picked date in epoch milliseconds.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    title: String,
    description: String,
    due_epoch_ms: i64,
    priority: String,
) -> TaskActionResponse {
    let Some(due_date) = due_from_epoch_ms(due_epoch_ms) else {
        return TaskActionResponse::failure(format!(
            "task_create failed: invalid due date {due_epoch_ms}"
        ));
    };
    let draft = TaskDraft::new(title, description, due_date, Priority::parse(priority.trim()));

    match with_task_service(|service| service.create_task(draft)) {
        Ok(task) => TaskActionResponse::success("Task created.", Some(task.id.to_string())),
        Err(err) => TaskActionResponse::failure(format!("task_create failed: {err}")),
    }
}

/// Saves the edit form. `None` fields keep their stored values.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(
    task_id: String,
    title: Option<String>,
    description: Option<String>,
    due_epoch_ms: Option<i64>,
    priority: Option<String>,
) -> TaskActionResponse {
    let due_date = match due_epoch_ms.map(due_from_epoch_ms) {
        Some(None) => {
            return TaskActionResponse::failure("task_update failed: invalid due date");
        }
        Some(Some(value)) => Some(value),
        None => None,
    };
    let patch = TaskPatch {
        title,
        description,
        due_date,
        priority: priority.map(|value| Priority::parse(value.trim())),
        completed: None,
    };
    let id = TaskId::new(task_id.trim());

    let result = with_task_service(|service| service.edit_task(&id, &patch));
    changed_task_response("task_update", "Task updated.", result)
}

/// Flips the completion checkbox.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(task_id: String) -> TaskActionResponse {
    let id = TaskId::new(task_id.trim());
    let result = with_task_service(|service| service.toggle_completion(&id));
    changed_task_response("task_toggle", "Task toggled.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String) -> TaskActionResponse {
    let id = TaskId::new(task_id.trim());
    match with_task_service(|service| service.delete_task(&id)) {
        Ok(true) => TaskActionResponse::success("Task deleted.", Some(id.to_string())),
        Ok(false) => TaskActionResponse::success("Nothing to delete.", None),
        Err(err) => TaskActionResponse::failure(format!("task_delete failed: {err}")),
    }
}

/// Lists tasks in display order with formatted due dates.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list() -> TaskListResponse {
    match with_task_service(|service| Ok(service.list_for_display())) {
        Ok(rows) => {
            let items = rows.into_iter().map(to_task_list_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No tasks.".to_string()
            } else {
                format!("{} task(s).", items.len())
            };
            TaskListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("task_list failed: {err}"),
        },
    }
}

fn changed_task_response(
    operation: &str,
    message: &str,
    result: Result<Option<Task>, String>,
) -> TaskActionResponse {
    match result {
        Ok(Some(task)) => TaskActionResponse::success(message, Some(task.id.to_string())),
        Ok(None) => TaskActionResponse::success("Nothing to update.", None),
        Err(err) => TaskActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn due_from_epoch_ms(value: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value).single()
}

fn resolve_store_db_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(STORE_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(STORE_DB_FILE_NAME)
        })
        .clone()
}

/// Sets both cells or neither. A value already pinned must match exactly.
fn pin_settings(
    path_cell: &OnceLock<PathBuf>,
    config_cell: &OnceLock<CoreConfig>,
    path: PathBuf,
    config: CoreConfig,
) -> Result<(), String> {
    if path_cell.get().is_some_and(|pinned| pinned != &path) {
        return Err("store path already fixed for this process".to_string());
    }
    if config_cell.get().is_some_and(|pinned| pinned != &config) {
        return Err("core config already fixed for this process".to_string());
    }
    let _ = path_cell.set(path);
    let _ = config_cell.set(config);
    Ok(())
}

fn lock_store() -> MutexGuard<'static, ()> {
    STORE_LOCK.lock().unwrap_or_else(|poisoned| {
        warn!("event=store_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

fn with_task_service<T>(
    f: impl FnOnce(&mut TaskService<SqliteKeyValueStore>) -> Result<T, ServiceError>,
) -> Result<T, String> {
    let _guard = lock_store();

    let config = CORE_CONFIG.get_or_init(CoreConfig::default);
    let store = SqliteKeyValueStore::open(resolve_store_db_path())
        .map_err(|err| format!("store open failed: {err}"))?;
    let repo = TaskRepository::open_store(store, config)
        .map_err(|err| format!("task repo init failed: {err}"))?;
    let mut service = TaskService::new(repo);
    f(&mut service).map_err(|err| err.to_string())
}

fn to_task_list_item(view: TaskView) -> TaskListItem {
    TaskListItem {
        task_id: view.id.to_string(),
        title: view.title,
        description: view.description,
        due_label: view.due_label,
        priority: view.priority.to_string(),
        completed: view.completed,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        configure, core_version, init_logging, pin_settings, ping, task_create, task_delete,
        task_list, task_toggle, task_update,
    };
    use std::path::PathBuf;
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};
    use taskpad_core::{CoreConfig, MissingTaskPolicy};

    // 2025-03-01T10:00:00Z
    const DUE_MS: i64 = 1_740_823_200_000;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_rejects_invalid_input_before_fixing_state() {
        assert!(!configure("  ".to_string(), String::new()).is_empty());
        let error = configure(
            "/tmp/x.sqlite3".to_string(),
            r#"{"storage_key":""}"#.to_string(),
        );
        assert!(error.contains("storage_key"));
    }

    #[test]
    fn conflicting_config_leaves_unset_path_unpinned() {
        let path_cell = OnceLock::new();
        let config_cell = OnceLock::new();
        config_cell.set(CoreConfig::default()).unwrap();

        let ignoring = CoreConfig {
            missing_task_policy: MissingTaskPolicy::Ignore,
            ..CoreConfig::default()
        };
        let error = pin_settings(
            &path_cell,
            &config_cell,
            PathBuf::from("/tmp/pinned.sqlite3"),
            ignoring,
        )
        .unwrap_err();

        assert!(error.contains("core config"));
        assert!(path_cell.get().is_none());
        assert_eq!(config_cell.get(), Some(&CoreConfig::default()));
    }

    #[test]
    fn pin_settings_sets_both_and_accepts_identical_repeat() {
        let path_cell = OnceLock::new();
        let config_cell = OnceLock::new();
        let path = PathBuf::from("/tmp/pinned.sqlite3");

        pin_settings(&path_cell, &config_cell, path.clone(), CoreConfig::default()).unwrap();
        pin_settings(&path_cell, &config_cell, path.clone(), CoreConfig::default()).unwrap();
        assert_eq!(path_cell.get(), Some(&path));

        let error = pin_settings(
            &path_cell,
            &config_cell,
            PathBuf::from("/tmp/other.sqlite3"),
            CoreConfig::default(),
        )
        .unwrap_err();
        assert!(error.contains("store path"));
        assert_eq!(path_cell.get(), Some(&path));
    }

    #[test]
    fn create_then_list_returns_formatted_row() {
        let title = unique_token("ffi-create");
        let created = task_create(
            title.clone(),
            "from ffi".to_string(),
            DUE_MS,
            "High".to_string(),
        );
        assert!(created.ok, "{}", created.message);
        let task_id = created.task_id.expect("create should return task_id");

        let listed = task_list();
        assert!(listed.ok, "{}", listed.message);
        let row = listed
            .items
            .iter()
            .find(|item| item.task_id == task_id)
            .expect("created task should be listed");
        assert_eq!(row.title, title);
        assert_eq!(row.due_label, "01/03/2025");
        assert_eq!(row.priority, "High");
        assert!(!row.completed);
    }

    #[test]
    fn create_rejects_blank_title() {
        let response = task_create(
            "   ".to_string(),
            "desc".to_string(),
            DUE_MS,
            "Low".to_string(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("title"));
    }

    #[test]
    fn toggle_update_and_delete_roundtrip() {
        let created = task_create(
            unique_token("ffi-toggle"),
            "flip me".to_string(),
            DUE_MS,
            "Normal".to_string(),
        );
        assert!(created.ok, "{}", created.message);
        let task_id = created.task_id.expect("create should return task_id");

        let toggled = task_toggle(task_id.clone());
        assert!(toggled.ok, "{}", toggled.message);

        let updated = task_update(task_id.clone(), None, None, None, Some("Low".to_string()));
        assert!(updated.ok, "{}", updated.message);

        let row = task_list()
            .items
            .into_iter()
            .find(|item| item.task_id == task_id)
            .expect("task should still be listed");
        assert!(row.completed);
        assert_eq!(row.priority, "Low");

        let deleted = task_delete(task_id.clone());
        assert!(deleted.ok, "{}", deleted.message);
        assert!(task_list().items.iter().all(|item| item.task_id != task_id));

        let again = task_delete(task_id);
        assert!(!again.ok);
        assert!(again.message.contains("not found"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
