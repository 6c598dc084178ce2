//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the task command surface to Dart via FRB.
//! - Translate core errors into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each call builds its own `TaskService`; no repository outlives a call.

use log::warn;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use todo_core::db::open_db;
use todo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    FilterMode, ServiceResult, SqliteKeyValueStore, Task, TaskFormErrors, TaskId, TaskService,
    TaskServiceError,
};

const TASK_DB_FILE_NAME: &str = "todo_tasks.sqlite3";
const TASK_DB_PATH_ENV: &str = "TODO_DB_PATH";
const EMPTY_LIST_MESSAGE: &str = "No tasks found. Add your first task to get started!";
static TASK_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
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
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Task projection handed to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub completed: bool,
    /// ISO-8601 UTC with millisecond precision.
    pub created_at: String,
}

/// Inline form messages; `None` means the field is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFieldErrors {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Result envelope for one task command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the command was applied.
    pub ok: bool,
    /// Task after the command, when one is affected.
    pub task: Option<TaskItem>,
    /// Present only when form validation rejected the input.
    pub field_errors: Option<TaskFieldErrors>,
    /// Human-readable notification text.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task: Option<&Task>) -> Self {
        Self {
            ok: true,
            task: task.map(to_task_item),
            field_errors: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            field_errors: None,
            message: message.into(),
        }
    }

    fn from_error(command: &str, err: CallError) -> Self {
        match err {
            CallError::Service(TaskServiceError::Validation(errors)) => Self {
                ok: false,
                task: None,
                field_errors: Some(to_field_errors(errors)),
                message: errors.to_string(),
            },
            CallError::Service(TaskServiceError::NotFound(id)) => {
                Self::failure(format!("Task not found: {id}"))
            }
            other => Self::failure(format!("{command} failed: {other}")),
        }
    }
}

/// Visible tasks plus summary counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub items: Vec<TaskItem>,
    /// Effective filter (`all|active|completed`).
    pub filter: String,
    /// Counts over the whole collection, not just `items`.
    pub active_count: u32,
    pub completed_count: u32,
    pub message: String,
}

/// Creates a task from form input.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Validation failures return `field_errors` and store nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(name: String, description: String) -> TaskActionResponse {
    create_in(&resolve_task_db_path(), &name, &description)
}

/// Replaces name/description of an existing task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(id: String, name: String, description: String) -> TaskActionResponse {
    update_in(&resolve_task_db_path(), &id, &name, &description)
}

/// Flips the completed flag of a task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: String) -> TaskActionResponse {
    toggle_in(&resolve_task_db_path(), &id)
}

/// Deletes a task; deleting an unknown ID still succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> TaskActionResponse {
    delete_in(&resolve_task_db_path(), &id)
}

/// Lists tasks for `filter` (`all|active|completed`, empty means `all`).
///
/// # FFI contract
/// - Unknown filters fall back to `all`.
/// - Counts always cover the full collection.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list(filter: String) -> TaskListResponse {
    list_in(&resolve_task_db_path(), &filter)
}

fn create_in(db_path: &Path, name: &str, description: &str) -> TaskActionResponse {
    match with_task_service(db_path, |service| service.create_task(name, description)) {
        Ok(task) => TaskActionResponse::success("Task added successfully!", Some(&task)),
        Err(err) => TaskActionResponse::from_error("task_create", err),
    }
}

fn update_in(db_path: &Path, id: &str, name: &str, description: &str) -> TaskActionResponse {
    let id = TaskId::from(id);
    match with_task_service(db_path, |service| service.update_task(&id, name, description)) {
        Ok(task) => TaskActionResponse::success("Task updated successfully!", Some(&task)),
        Err(err) => TaskActionResponse::from_error("task_update", err),
    }
}

fn toggle_in(db_path: &Path, id: &str) -> TaskActionResponse {
    let id = TaskId::from(id);
    match with_task_service(db_path, |service| service.toggle_task(&id)) {
        Ok(task) => {
            let message = if task.completed {
                "Task completed! 🎉"
            } else {
                "Task marked as active"
            };
            TaskActionResponse::success(message, Some(&task))
        }
        Err(err) => TaskActionResponse::from_error("task_toggle", err),
    }
}

fn delete_in(db_path: &Path, id: &str) -> TaskActionResponse {
    let id = TaskId::from(id);
    match with_task_service(db_path, |service| service.delete_task(&id)) {
        Ok(true) => TaskActionResponse::success("Task deleted successfully", None),
        Ok(false) => TaskActionResponse::success("Task was already removed", None),
        Err(err) => TaskActionResponse::from_error("task_delete", err),
    }
}

fn list_in(db_path: &Path, filter: &str) -> TaskListResponse {
    let mode = normalize_filter(filter);
    let listed = with_task_service(db_path, |service| {
        let items = service
            .visible_tasks(mode)
            .into_iter()
            .map(to_task_item)
            .collect::<Vec<_>>();
        Ok((items, service.counts()))
    });

    match listed {
        Ok((items, counts)) => {
            let message = if items.is_empty() {
                EMPTY_LIST_MESSAGE.to_string()
            } else {
                format!("Showing {} task(s).", items.len())
            };
            TaskListResponse {
                items,
                filter: mode.as_str().to_string(),
                active_count: saturating_u32(counts.active),
                completed_count: saturating_u32(counts.completed),
                message,
            }
        }
        Err(err) => TaskListResponse {
            items: Vec::new(),
            filter: mode.as_str().to_string(),
            active_count: 0,
            completed_count: 0,
            message: format!("task_list failed: {err}"),
        },
    }
}

/// Failure while running one FFI command.
#[derive(Debug)]
enum CallError {
    Setup(String),
    Service(TaskServiceError),
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup(message) => f.write_str(message),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

fn with_task_service<T>(
    db_path: &Path,
    f: impl FnOnce(&mut TaskService<SqliteKeyValueStore<'_>>) -> ServiceResult<T>,
) -> Result<T, CallError> {
    let conn = open_db(db_path).map_err(|err| CallError::Setup(format!("task DB open failed: {err}")))?;
    let mut service = TaskService::open(SqliteKeyValueStore::new(&conn))
        .map_err(|err| CallError::Setup(format!("task store init failed: {err}")))?;
    f(&mut service).map_err(CallError::Service)
}

fn normalize_filter(raw: &str) -> FilterMode {
    if raw.trim().is_empty() {
        return FilterMode::All;
    }
    raw.parse().unwrap_or_else(|err| {
        warn!("event=task_list module=ffi status=fallback error={err}");
        FilterMode::All
    })
}

fn resolve_task_db_path() -> PathBuf {
    TASK_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(TASK_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(TASK_DB_FILE_NAME)
        })
        .clone()
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        name: task.name.clone(),
        description: task.description.clone(),
        completed: task.completed,
        created_at: task.created_at_iso(),
    }
}

fn to_field_errors(errors: TaskFormErrors) -> TaskFieldErrors {
    TaskFieldErrors {
        name: errors.name.map(str::to_string),
        description: errors.description.map(str::to_string),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, create_in, delete_in, init_logging, list_in, ping, toggle_in, update_in,
        EMPTY_LIST_MESSAGE,
    };
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn temp_db() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("tasks.sqlite3");
        (dir, path)
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn create_toggle_delete_flow_reports_notifications() {
        let (_dir, db) = temp_db();

        let created = create_in(&db, "Buy milk", "2%");
        assert!(created.ok, "{}", created.message);
        assert_eq!(created.message, "Task added successfully!");
        let task = created.task.expect("created task");

        let toggled = toggle_in(&db, &task.id);
        assert_eq!(toggled.message, "Task completed! 🎉");
        assert!(toggled.task.expect("toggled task").completed);

        let toggled_back = toggle_in(&db, &task.id);
        assert_eq!(toggled_back.message, "Task marked as active");

        let deleted = delete_in(&db, &task.id);
        assert!(deleted.ok);
        assert_eq!(deleted.message, "Task deleted successfully");

        let listed = list_in(&db, "all");
        assert!(listed.items.is_empty());
        assert_eq!(listed.message, EMPTY_LIST_MESSAGE);
    }

    #[test]
    fn create_with_blank_fields_returns_field_errors() {
        let (_dir, db) = temp_db();

        let response = create_in(&db, " ", "");
        assert!(!response.ok);
        let errors = response.field_errors.expect("field errors");
        assert_eq!(errors.name.as_deref(), Some("Task name is required"));
        assert_eq!(
            errors.description.as_deref(),
            Some("Task description is required")
        );
        assert!(list_in(&db, "all").items.is_empty());
    }

    #[test]
    fn update_and_toggle_report_unknown_ids() {
        let (_dir, db) = temp_db();

        let unknown = update_in(&db, "not-a-uuid", "a", "b");
        assert!(!unknown.ok);
        assert!(unknown.message.contains("Task not found: not-a-uuid"));

        let toggled = toggle_in(&db, "11111111-2222-4333-8444-555555555555");
        assert!(!toggled.ok);
        assert!(toggled.message.contains("Task not found"));
    }

    #[test]
    fn list_filters_and_counts_full_collection() {
        let (_dir, db) = temp_db();
        let milk = create_in(&db, "Buy milk", "2%").task.expect("milk");
        create_in(&db, "Pay rent", "due the 1st");
        toggle_in(&db, &milk.id);

        let completed = list_in(&db, "Completed");
        assert_eq!(completed.filter, "completed");
        assert_eq!(completed.items.len(), 1);
        assert_eq!(completed.items[0].id, milk.id);
        assert_eq!((completed.active_count, completed.completed_count), (1, 1));

        let fallback = list_in(&db, "someday");
        assert_eq!(fallback.filter, "all");
        let names: Vec<_> = fallback.items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Pay rent", "Buy milk"]);
    }

    #[test]
    fn delete_unknown_id_is_not_an_error() {
        let (_dir, db) = temp_db();

        for id in ["11111111-2222-4333-8444-555555555555", "abc"] {
            let response = delete_in(&db, id);
            assert!(response.ok, "{}", response.message);
            assert_eq!(response.message, "Task was already removed");
        }
    }
}
