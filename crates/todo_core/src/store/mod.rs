//! Durable slot binding between in-memory values and a key-value medium.
//!
//! # Responsibility
//! - Define the medium contract (`KeyValueStore`) consumed by the core.
//! - Encode/decode typed values into named slots (`PersistentStore`).
//!
//! # Invariants
//! - A slot that is absent or fails to decode yields the caller default.
//! - Medium failures are returned as `StoreError`, never swallowed.
//! - Values are stored as compact JSON; re-saving a loaded value writes the
//!   same bytes.

use crate::db::DbError;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure raised by the medium or by value encoding.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Encode(serde_json::Error),
    QuotaExceeded {
        key: String,
        needed_bytes: usize,
        quota_bytes: usize,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode slot value: {err}"),
            Self::QuotaExceeded {
                key,
                needed_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: needs {needed_bytes} bytes, quota is {quota_bytes}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Raw durable key-value medium.
///
/// Calls are synchronous; implementations decide their own durability.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, raw: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, raw: &str) -> StoreResult<()> {
        (**self).set(key, raw)
    }
}

/// Where a loaded value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotSource {
    /// Decoded from stored bytes.
    Stored,
    /// Slot absent; default substituted.
    Missing,
    /// Slot present but unreadable; default substituted.
    DecodeFailed(String),
}

/// Value returned by `PersistentStore::load_slot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSlot<T> {
    pub value: T,
    pub source: SlotSource,
}

/// Typed JSON binding over a `KeyValueStore`.
pub struct PersistentStore<S: KeyValueStore> {
    medium: S,
}

impl<S: KeyValueStore> PersistentStore<S> {
    pub fn new(medium: S) -> Self {
        Self { medium }
    }

    /// Reads `key`, falling back to `default` when absent or undecodable.
    ///
    /// # Errors
    /// - Returns medium read failures only; decode failures are recovered.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> StoreResult<T> {
        self.load_slot(key, default).map(|loaded| loaded.value)
    }

    /// Same as [`PersistentStore::load`], reporting how the value was obtained.
    pub fn load_slot<T: DeserializeOwned>(
        &self,
        key: &str,
        default: T,
    ) -> StoreResult<LoadedSlot<T>> {
        let Some(raw) = self.medium.get(key)? else {
            debug!("event=slot_load module=store status=missing key={key}");
            return Ok(LoadedSlot {
                value: default,
                source: SlotSource::Missing,
            });
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                debug!(
                    "event=slot_load module=store status=ok key={key} bytes={}",
                    raw.len()
                );
                Ok(LoadedSlot {
                    value,
                    source: SlotSource::Stored,
                })
            }
            Err(err) => {
                warn!(
                    "event=slot_load module=store status=decode_failed key={key} bytes={} error={err}",
                    raw.len()
                );
                Ok(LoadedSlot {
                    value: default,
                    source: SlotSource::DecodeFailed(err.to_string()),
                })
            }
        }
    }

    /// Encodes `value` and overwrites slot `key`.
    ///
    /// # Errors
    /// - `StoreError::Encode` when the value cannot be serialized.
    /// - Any failure raised by the medium write.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value).map_err(StoreError::Encode)?;
        self.medium.set(key, &raw)?;
        debug!(
            "event=slot_save module=store status=ok key={key} bytes={}",
            raw.len()
        );
        Ok(())
    }
}
