//! Task repository over a `PersistentStore` slot.
//!
//! # Responsibility
//! - Provide create/update/toggle/delete over the ordered collection.
//! - Keep serialization details inside the store boundary.
//!
//! # Invariants
//! - New tasks are prepended; existing order is never rearranged.
//! - Task IDs are unique within the collection.
//! - Writes persist the candidate collection first and only then replace the
//!   in-memory copy.

use crate::model::task::{Task, TaskId};
use crate::store::{KeyValueStore, PersistentStore, SlotSource, StoreError};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot holding the serialized collection.
pub const TASKS_KEY: &str = "todo-tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task mutations.
#[derive(Debug)]
pub enum RepoError {
    NotFound(TaskId),
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Sole owner and mutator of the task collection.
pub struct TaskRepository<S: KeyValueStore> {
    store: PersistentStore<S>,
    tasks: Vec<Task>,
}

impl<S: KeyValueStore> TaskRepository<S> {
    /// Loads the collection from `store`, starting empty when the slot is
    /// absent or unreadable.
    ///
    /// # Errors
    /// - Returns medium read failures.
    pub fn open(store: PersistentStore<S>) -> RepoResult<Self> {
        let tasks = load_tasks(&store)?;
        Ok(Self { store, tasks })
    }

    /// Current collection, most recent first.
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == *id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Creates an active task and prepends it to the collection.
    ///
    /// Name and description are stored as given.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> RepoResult<Task> {
        let task = Task::new(name, description);

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task.clone());
        next.extend(self.tasks.iter().cloned());
        self.commit(next)?;

        info!(
            "event=task_create module=repo status=ok task_id={} total={}",
            task.id,
            self.tasks.len()
        );
        Ok(task)
    }

    /// Replaces name and description of task `id`.
    ///
    /// `id`, `created_at` and `completed` are preserved. Completed tasks may
    /// be updated.
    pub fn update(
        &mut self,
        id: &TaskId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> RepoResult<Task> {
        let updated = self.modify(id, "task_update", |task| {
            task.name = name.into();
            task.description = description.into();
        })?;
        info!("event=task_update module=repo status=ok task_id={id}");
        Ok(updated)
    }

    /// Flips `completed` of task `id`.
    pub fn toggle_complete(&mut self, id: &TaskId) -> RepoResult<Task> {
        let toggled = self.modify(id, "task_toggle", |task| {
            task.completed = !task.completed;
        })?;
        info!(
            "event=task_toggle module=repo status=ok task_id={id} completed={}",
            toggled.completed
        );
        Ok(toggled)
    }

    /// Removes task `id`; returns whether anything was removed.
    ///
    /// Persists even when nothing matched.
    pub fn delete(&mut self, id: &TaskId) -> RepoResult<bool> {
        let next: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| task.id != *id)
            .cloned()
            .collect();
        let removed = next.len() != self.tasks.len();
        self.commit(next)?;

        info!("event=task_delete module=repo status=ok task_id={id} removed={removed}");
        Ok(removed)
    }

    /// Discards the in-memory copy and re-reads the slot.
    ///
    /// Picks up writes made to the medium by another owner.
    pub fn reload(&mut self) -> RepoResult<()> {
        self.tasks = load_tasks(&self.store)?;
        info!(
            "event=task_reload module=repo status=ok total={}",
            self.tasks.len()
        );
        Ok(())
    }

    fn modify(
        &mut self,
        id: &TaskId,
        event: &'static str,
        apply: impl FnOnce(&mut Task),
    ) -> RepoResult<Task> {
        let Some(index) = self.tasks.iter().position(|task| task.id == *id) else {
            info!("event={event} module=repo status=not_found task_id={id}");
            return Err(RepoError::NotFound(id.clone()));
        };

        let mut next = self.tasks.clone();
        apply(&mut next[index]);
        let changed = next[index].clone();
        self.commit(next)?;
        Ok(changed)
    }

    fn commit(&mut self, next: Vec<Task>) -> RepoResult<()> {
        if let Err(err) = self.store.save(TASKS_KEY, &next) {
            warn!("event=task_persist module=repo status=error error={err}");
            return Err(err.into());
        }
        self.tasks = next;
        Ok(())
    }
}

fn load_tasks<S: KeyValueStore>(store: &PersistentStore<S>) -> RepoResult<Vec<Task>> {
    let loaded = store.load_slot(TASKS_KEY, Vec::<Task>::new())?;
    if let SlotSource::DecodeFailed(reason) = &loaded.source {
        warn!("event=task_load module=repo status=reset reason=decode_failed error={reason}");
    }

    let mut seen = HashSet::with_capacity(loaded.value.len());
    let total = loaded.value.len();
    let tasks: Vec<Task> = loaded
        .value
        .into_iter()
        .filter(|task| seen.insert(task.id.clone()))
        .collect();
    if tasks.len() != total {
        warn!(
            "event=task_load module=repo status=deduplicated dropped={}",
            total - tasks.len()
        );
    }

    info!("event=task_load module=repo status=ok total={}", tasks.len());
    Ok(tasks)
}
