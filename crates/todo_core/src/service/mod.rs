//! Core use-case services.
//!
//! # Responsibility
//! - Expose the command surface consumed by presentation/FFI layers.
//! - Keep callers decoupled from storage details.

pub mod task_service;
