//! In-memory remote store.
//!
//! Development and test double for the managed backend: rows live in a map,
//! history in a vec. Failures are scripted: push `WriteError`s and the next
//! writes consume them in order, which is how retry and rollback paths get
//! exercised without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::domain::{EntityId, HistoryEntry, Payload};
use crate::error::WriteError;
use crate::ports::RemoteStore;

/// One observed write, in arrival order. `payload` is `None` for deletes.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedWrite {
    pub entity_id: EntityId,
    pub payload: Option<Payload>,
}

#[derive(Default)]
pub struct InMemoryRemoteStore {
    rows: Mutex<HashMap<EntityId, Payload>>,
    history: Mutex<Vec<HistoryEntry>>,
    observed: Mutex<Vec<ObservedWrite>>,
    scripted_failures: Mutex<VecDeque<WriteError>>,
    fail_appends: AtomicBool,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failure for the next write or delete. Scripted failures are
    /// consumed first-in first-out, one per call.
    pub fn fail_next_write(&self, error: WriteError) {
        self.scripted_failures
            .lock()
            .expect("store lock")
            .push_back(error);
    }

    /// Queue `n` copies of the same failure.
    pub fn fail_next_writes(&self, n: usize, error: WriteError) {
        let mut failures = self.scripted_failures.lock().expect("store lock");
        for _ in 0..n {
            failures.push_back(error.clone());
        }
    }

    /// Make every `append` fail until turned off again.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::Relaxed);
    }

    pub fn row(&self, entity_id: &EntityId) -> Option<Payload> {
        self.rows.lock().expect("store lock").get(entity_id).cloned()
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history.lock().expect("store lock").clone()
    }

    /// Writes and deletes in the order the store saw them.
    pub fn observed_writes(&self) -> Vec<ObservedWrite> {
        self.observed.lock().expect("store lock").clone()
    }

    fn take_scripted_failure(&self) -> Option<WriteError> {
        self.scripted_failures
            .lock()
            .expect("store lock")
            .pop_front()
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn write(&self, entity_id: &EntityId, payload: &Payload) -> Result<Payload, WriteError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        let mut rows = self.rows.lock().expect("store lock");
        let row = rows
            .entry(entity_id.clone())
            .or_default()
            .clone()
            .merged_with(payload);
        rows.insert(entity_id.clone(), row.clone());

        self.observed.lock().expect("store lock").push(ObservedWrite {
            entity_id: entity_id.clone(),
            payload: Some(payload.clone()),
        });

        Ok(row)
    }

    async fn delete(&self, entity_id: &EntityId) -> Result<(), WriteError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        self.rows.lock().expect("store lock").remove(entity_id);
        self.observed.lock().expect("store lock").push(ObservedWrite {
            entity_id: entity_id.clone(),
            payload: None,
        });

        Ok(())
    }

    async fn append(&self, entry: &HistoryEntry) -> Result<(), WriteError> {
        if self.fail_appends.load(Ordering::Relaxed) {
            return Err(WriteError::Transient("history append unavailable".to_string()));
        }

        self.history.lock().expect("store lock").push(entry.clone());
        Ok(())
    }
}
