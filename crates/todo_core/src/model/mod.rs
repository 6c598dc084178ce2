//! Domain model for the task collection.
//!
//! # Responsibility
//! - Define the single persisted entity (`Task`) and its identifier.
//! - Own the wire shape stored in the `todo-tasks` slot.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` assigned at creation.
//! - Deletion is permanent; there is no tombstone state.

pub mod task;
