//! In-memory store backend.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::{SlotKey, SlotStore, StoreError};

/// A [`SlotStore`] backed by a process-local map.
///
/// The default collaborator for tests and headless tooling; hosts that
/// persist to disk or a registry emulation provide their own backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<SlotKey, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl SlotStore for MemoryStore {
    fn save(&self, key: SlotKey, blob: &[u8]) -> Result<(), StoreError> {
        debug!(%key, bytes = blob.len(), "saving record");
        self.records.lock().insert(key, blob.to_vec());
        Ok(())
    }

    fn load(&self, key: SlotKey) -> Result<Vec<u8>, StoreError> {
        self.records
            .lock()
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound(key))
    }

    fn delete(&self, key: SlotKey) -> Result<(), StoreError> {
        match self.records.lock().remove(&key) {
            Some(_) => {
                debug!(%key, "deleted record");
                Ok(())
            }
            None => Err(StoreError::NotFound(key)),
        }
    }

    fn enumerate(&self) -> Vec<SlotKey> {
        let mut keys: Vec<SlotKey> = self.records.lock().keys().copied().collect();
        keys.sort();
        keys
    }
}
