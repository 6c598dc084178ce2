//! Task domain model.
//!
//! # Responsibility
//! - Define the record persisted for every to-do item.
//! - Keep the external field naming (`createdAt`) and timestamp format stable.
//!
//! # Invariants
//! - `id` and `created_at` are assigned once by `Task::new` and never change.
//! - `created_at` is stored with millisecond precision in UTC.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable, opaque identifier of one task.
///
/// Freshly created tasks get a UUID v4 string, but any stored string is
/// accepted so records written by other clients still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Trimmed, non-empty when created through the service layer.
    pub name: String,
    /// Trimmed, non-empty when created through the service layer.
    pub description: String,
    pub completed: bool,
    /// Display-only creation time; never used to order the collection.
    #[serde(rename = "createdAt", with = "iso8601_millis")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates an active task with a generated ID and the current time.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(TaskId::generate(), name, description, Utc::now())
    }

    /// Creates an active task with caller-provided identity and timestamp.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(
        id: TaskId,
        name: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            completed: false,
            created_at: created_at.trunc_subsecs(3),
        }
    }

    /// `created_at` as stored, e.g. `2026-02-13T10:00:00.000Z`.
    pub fn created_at_iso(&self) -> String {
        iso8601_millis::format(&self.created_at)
    }

    /// Returns whether this task still needs doing.
    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// `createdAt` codec: `YYYY-MM-DDTHH:MM:SS.mmmZ`, the format browsers emit
/// from `Date.toISOString()`.
mod iso8601_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(|err| de::Error::custom(format!("invalid createdAt `{raw}`: {err}")))
    }
}
