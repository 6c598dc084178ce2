//! Repository layer owning the canonical task collection.
//!
//! # Responsibility
//! - Hold the single in-memory copy of the collection.
//! - Mirror every mutation into the durable slot before returning.
//!
//! # Invariants
//! - Memory and store never diverge after a mutation returns.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   storage errors.
//! - The repository trusts its caller; input validation lives in
//!   `crate::validate`.

pub mod task_repo;
