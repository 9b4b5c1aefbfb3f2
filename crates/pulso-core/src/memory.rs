// crates/pulso-core/src/memory.rs
// ============================================================================
// Module: Pulso Memory Store
// Description: In-memory reference implementation of the durable store.
// Purpose: Back tests and hosts without persistent storage.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`MemoryStore`] implements [`DurableStore`] over interior-mutable maps
//! with the same contract as the persistent backends: atomic replacement,
//! no-op deletes for missing keys, and stable (key-ordered) listing. A
//! store constructed with [`MemoryStore::unavailable`] fails every
//! operation, mirroring a host that blocks persistent storage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::core::identifiers::RecordId;
use crate::core::record::CacheEntry;
use crate::core::record::SubmissionRecord;
use crate::interfaces::DurableStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Memory Store
// ============================================================================

/// In-memory durable store.
///
/// # Invariants
/// - Writes to a given key are serialized by the interior mutexes.
/// - Listing order is key order, stable for a given store state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Queue namespace keyed by record identifier.
    queue: Mutex<BTreeMap<RecordId, SubmissionRecord>>,
    /// Cache namespace keyed by logical name.
    cache: Mutex<BTreeMap<String, CacheEntry>>,
    /// When set, every operation fails as if storage could not open.
    unavailable: bool,
}

impl MemoryStore {
    /// Creates an empty, available store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose every operation fails with
    /// [`StoreError::Unavailable`].
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            queue: Mutex::new(BTreeMap::new()),
            cache: Mutex::new(BTreeMap::new()),
            unavailable: true,
        }
    }

    /// Fails the operation when the store is marked unavailable.
    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store is marked unavailable".to_string()));
        }
        Ok(())
    }

    /// Returns a snapshot of every queued record, in key order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    pub fn queue_snapshot(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        self.check_available()?;
        let guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.values().cloned().collect())
    }
}

impl DurableStore for MemoryStore {
    fn put_record(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let mut guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(record.record_id.clone(), record.clone());
        Ok(())
    }

    fn get_record(&self, id: &RecordId) -> Result<Option<SubmissionRecord>, StoreError> {
        self.check_available()?;
        let guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(id).cloned())
    }

    fn delete_record(&self, id: &RecordId) -> Result<(), StoreError> {
        self.check_available()?;
        let mut guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        guard.remove(id);
        Ok(())
    }

    fn list_pending(&self, limit: usize) -> Result<Vec<SubmissionRecord>, StoreError> {
        self.check_available()?;
        let guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.values().take(limit).cloned().collect())
    }

    fn put_cache(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        self.check_available()?;
        let mut guard = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    fn get_cache(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        self.check_available()?;
        let guard = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(key).cloned())
    }

    fn delete_cache(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut guard = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        guard.remove(key);
        Ok(())
    }
}
