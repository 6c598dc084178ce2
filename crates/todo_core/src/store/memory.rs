//! In-memory key-value medium.
//!
//! Used by tests and ephemeral sessions. An optional byte quota mimics the
//! storage limits of browser-style local storage.

use super::{KeyValueStore, StoreError, StoreResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    slots: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium that rejects writes pushing total usage past `quota_bytes`.
    ///
    /// Usage counts key and value bytes of every slot.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            slots: RefCell::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, raw: &str) -> StoreResult<()> {
        let mut slots = self.slots.borrow_mut();
        if let Some(quota_bytes) = self.quota_bytes {
            let others: usize = slots
                .iter()
                .filter(|(slot_key, _)| slot_key.as_str() != key)
                .map(|(slot_key, value)| slot_key.len() + value.len())
                .sum();
            let needed_bytes = others + key.len() + raw.len();
            if needed_bytes > quota_bytes {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed_bytes,
                    quota_bytes,
                });
            }
        }
        slots.insert(key.to_string(), raw.to_string());
        Ok(())
    }
}
