//! Task form validation.
//!
//! # Responsibility
//! - Gate create/update requests before they reach the repository.
//!
//! # Invariants
//! - A field is valid when it is non-empty after trimming.
//! - Valid input yields `TaskFormErrors::is_empty() == true`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub const NAME_REQUIRED: &str = "Task name is required";
pub const DESCRIPTION_REQUIRED: &str = "Task description is required";

/// User-entered candidate task fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskForm<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

impl<'a> TaskForm<'a> {
    pub fn new(name: &'a str, description: &'a str) -> Self {
        Self { name, description }
    }

    /// Runs every field rule.
    pub fn validate(&self) -> TaskFormErrors {
        validate(self.name, self.description)
    }

    /// Trimmed fields, as they should be stored.
    pub fn normalized(&self) -> (String, String) {
        (
            self.name.trim().to_string(),
            self.description.trim().to_string(),
        )
    }
}

/// Per-field validation messages; `None` means the field passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFormErrors {
    pub name: Option<&'static str>,
    pub description: Option<&'static str>,
}

impl TaskFormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

impl Display for TaskFormErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = [self.name, self.description]
            .into_iter()
            .flatten()
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl Error for TaskFormErrors {}

/// Validates candidate name and description.
pub fn validate(name: &str, description: &str) -> TaskFormErrors {
    TaskFormErrors {
        name: name.trim().is_empty().then_some(NAME_REQUIRED),
        description: description.trim().is_empty().then_some(DESCRIPTION_REQUIRED),
    }
}
