//! Core task state and persistence for the to-do client.
//! This crate is the single source of truth for task invariants.

pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod validate;

pub use filter::{task_counts, visible_tasks, FilterMode, ParseFilterModeError, TaskCounts};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{Task, TaskId};
pub use repo::task_repo::{RepoError, RepoResult, TaskRepository, TASKS_KEY};
pub use service::task_service::{ServiceResult, TaskService, TaskServiceError};
pub use store::{
    KeyValueStore, LoadedSlot, MemoryKeyValueStore, PersistentStore, SlotSource,
    SqliteKeyValueStore, StoreError, StoreResult,
};
pub use validate::{validate, TaskForm, TaskFormErrors};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
