//! Task use-case service.
//!
//! # Responsibility
//! - Provide the command surface: create, update, toggle, delete, visible
//!   tasks and counts.
//! - Run form validation before any mutation reaches the repository.
//!
//! # Invariants
//! - A request failing validation issues no repository call.
//! - Stored name/description are the trimmed form values.
//! - Service layer remains storage-agnostic.

use crate::filter::{task_counts, visible_tasks, FilterMode, TaskCounts};
use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::{RepoError, TaskRepository};
use crate::store::{KeyValueStore, PersistentStore, StoreError};
use crate::validate::{TaskForm, TaskFormErrors};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, TaskServiceError>;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Form input failed one or more field rules.
    Validation(TaskFormErrors),
    /// Target task does not exist.
    NotFound(TaskId),
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "invalid task form: {errors}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::NotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Store(err) => Self::Store(err),
        }
    }
}

impl From<StoreError> for TaskServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Task service facade over an owned repository.
pub struct TaskService<S: KeyValueStore> {
    repo: TaskRepository<S>,
}

impl<S: KeyValueStore> TaskService<S> {
    /// Creates a service around an already opened repository.
    pub fn new(repo: TaskRepository<S>) -> Self {
        Self { repo }
    }

    /// Opens the repository on `medium` and wraps it.
    pub fn open(medium: S) -> ServiceResult<Self> {
        let repo = TaskRepository::open(PersistentStore::new(medium))?;
        Ok(Self::new(repo))
    }

    /// Validates, trims and creates one task.
    pub fn create_task(&mut self, name: &str, description: &str) -> ServiceResult<Task> {
        let form = checked_form(name, description, "task_create")?;
        let (name, description) = form.normalized();
        Ok(self.repo.create(name, description)?)
    }

    /// Validates, trims and replaces name/description of task `id`.
    pub fn update_task(
        &mut self,
        id: &TaskId,
        name: &str,
        description: &str,
    ) -> ServiceResult<Task> {
        let form = checked_form(name, description, "task_update")?;
        let (name, description) = form.normalized();
        Ok(self.repo.update(id, name, description)?)
    }

    pub fn toggle_task(&mut self, id: &TaskId) -> ServiceResult<Task> {
        Ok(self.repo.toggle_complete(id)?)
    }

    /// Returns whether a task was removed; missing IDs are not an error.
    pub fn delete_task(&mut self, id: &TaskId) -> ServiceResult<bool> {
        Ok(self.repo.delete(id)?)
    }

    /// Full collection, most recent first.
    pub fn tasks(&self) -> &[Task] {
        self.repo.all()
    }

    pub fn visible_tasks(&self, mode: FilterMode) -> Vec<&Task> {
        visible_tasks(self.repo.all(), mode)
    }

    pub fn counts(&self) -> TaskCounts {
        task_counts(self.repo.all())
    }
}

fn checked_form<'a>(
    name: &'a str,
    description: &'a str,
    event: &'static str,
) -> ServiceResult<TaskForm<'a>> {
    let form = TaskForm::new(name, description);
    let errors = form.validate();
    if errors.is_empty() {
        return Ok(form);
    }

    info!(
        "event={event} module=service status=rejected name_invalid={} description_invalid={}",
        errors.name.is_some(),
        errors.description.is_some()
    );
    Err(TaskServiceError::Validation(errors))
}
