//! Sync orchestrator: the write state machine.
//!
//! Every user edit enters here. The orchestrator marks the entity as saving,
//! issues the remote write (or queues it while offline), retries transient
//! failures with backoff, records history on success, rolls back on terminal
//! failure, and clears the saving marker. In that order, every time.
//!
//! Per entity there is at most one write in flight. An edit arriving while a
//! previous write for the same entity is pending merges into a `next` slot
//! (field-level last-write-wins) and is issued after the in-flight write
//! resolves, so the superseding payload is always applied last.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::connectivity::ConnectivityMonitor;
use crate::domain::{
    ActorId, EntityId, HistoryEntry, MutationKind, MutationRecord, Notification, Payload,
};
use crate::error::{SubmitError, WriteError};
use crate::notify::NotificationBridge;
use crate::ports::Clock;
use crate::recorder::HistoryRecorder;
use crate::tracker::MutationTracker;
use crate::typed::{Patch, to_payload};

use super::retry::RetryPolicy;

/// Where an entity's pending mutation currently lives.
enum EntityEntry {
    /// Offline: waiting in the pending queue for the next flush.
    Queued(MutationRecord),

    /// A write is in flight. `next` holds the superseding edit, if any.
    InFlight {
        record: MutationRecord,
        next: Option<MutationRecord>,
    },
}

struct SyncState {
    /// Single source of truth for pending mutations, keyed by entity.
    entries: HashMap<EntityId, EntityEntry>,

    /// FIFO of entities queued while offline.
    queue: VecDeque<EntityId>,

    /// Last confirmed row per entity; rollback target on terminal failure.
    confirmed: HashMap<EntityId, Payload>,
}

/// Counts for status displays.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStatus {
    pub in_flight: usize,
    pub queued_offline: usize,
    pub saving: usize,
}

pub struct SyncOrchestrator {
    store: Arc<dyn crate::ports::RemoteStore>,
    clock: Arc<dyn Clock>,
    tracker: MutationTracker,
    bridge: NotificationBridge,
    monitor: ConnectivityMonitor,
    recorder: HistoryRecorder,
    retry: RetryPolicy,
    queue_capacity: usize,
    state: Mutex<SyncState>,
}

impl SyncOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        store: Arc<dyn crate::ports::RemoteStore>,
        clock: Arc<dyn Clock>,
        tracker: MutationTracker,
        bridge: NotificationBridge,
        monitor: ConnectivityMonitor,
        retry: RetryPolicy,
        queue_capacity: usize,
    ) -> Arc<Self> {
        let recorder = HistoryRecorder::new(Arc::clone(&store));
        Arc::new(Self {
            store,
            clock,
            tracker,
            bridge,
            monitor,
            recorder,
            retry,
            queue_capacity,
            state: Mutex::new(SyncState {
                entries: HashMap::new(),
                queue: VecDeque::new(),
                confirmed: HashMap::new(),
            }),
        })
    }

    /// Submit a partial update. The sole entry point for edits.
    pub fn submit_edit(
        self: &Arc<Self>,
        entity_id: EntityId,
        payload: Payload,
        actor_id: ActorId,
    ) -> Result<(), SubmitError> {
        self.submit(entity_id, MutationKind::Upsert(payload), actor_id)
    }

    /// Submit a deletion. Supersedes any pending edit for the entity.
    pub fn submit_delete(
        self: &Arc<Self>,
        entity_id: EntityId,
        actor_id: ActorId,
    ) -> Result<(), SubmitError> {
        self.submit(entity_id, MutationKind::Delete, actor_id)
    }

    /// Submit a statically typed patch (see [`Patch`]).
    pub fn submit_patch<P: Patch>(
        self: &Arc<Self>,
        entity_id: EntityId,
        patch: &P,
        actor_id: ActorId,
    ) -> Result<(), SubmitError> {
        tracing::debug!(entity = %entity_id, kind = P::KIND, "typed patch submitted");
        self.submit_edit(entity_id, to_payload(patch)?, actor_id)
    }

    /// Per-item "saving" state for the presentation layer.
    pub fn is_saving(&self, entity_id: &EntityId) -> bool {
        self.tracker.is_saving(entity_id)
    }

    /// The saving-set handle, for injection into the presentation layer.
    pub fn tracker(&self) -> &MutationTracker {
        &self.tracker
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    /// Subscribe to user-facing notifications.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Notification> {
        self.bridge.subscribe()
    }

    /// Optimistic read: the last confirmed row with pending edits overlaid.
    /// `None` when the entity does not exist locally (or a delete is pending).
    pub fn local_view(&self, entity_id: &EntityId) -> Option<Payload> {
        let state = self.state.lock().expect("sync state lock");
        let confirmed = state.confirmed.get(entity_id).cloned();

        let Some(entry) = state.entries.get(entity_id) else {
            return confirmed;
        };

        let mut kinds: Vec<&MutationKind> = Vec::new();
        match entry {
            EntityEntry::Queued(record) => kinds.push(&record.kind),
            EntityEntry::InFlight { record, next } => {
                kinds.push(&record.kind);
                if let Some(next) = next {
                    kinds.push(&next.kind);
                }
            }
        }

        let mut view = confirmed;
        for kind in kinds {
            view = match kind {
                MutationKind::Upsert(payload) => Some(view.unwrap_or_default().merged_with(payload)),
                MutationKind::Delete => None,
            };
        }
        view
    }

    pub fn status(&self) -> SyncStatus {
        let state = self.state.lock().expect("sync state lock");
        SyncStatus {
            in_flight: state
                .entries
                .values()
                .filter(|e| matches!(e, EntityEntry::InFlight { .. }))
                .count(),
            queued_offline: state.queue.len(),
            saving: self.tracker.len(),
        }
    }

    fn submit(
        self: &Arc<Self>,
        entity_id: EntityId,
        kind: MutationKind,
        actor_id: ActorId,
    ) -> Result<(), SubmitError> {
        let spawn_drive = {
            let mut state = self.state.lock().expect("sync state lock");

            match state.entries.get_mut(&entity_id) {
                // offline edit already queued: merge, keep queue position
                Some(EntityEntry::Queued(record)) => {
                    record.supersede(&kind, actor_id);
                    self.tracker.begin(&entity_id);
                    false
                }

                Some(EntityEntry::InFlight { record, next }) => {
                    match next {
                        Some(next) => next.supersede(&kind, actor_id),
                        None if record.kind.superseded_by(&kind) == record.kind => {
                            // duplicate of the in-flight write: absorb, no
                            // second remote call
                            record.absorb_hold();
                        }
                        None => {
                            *next = Some(MutationRecord::new(
                                entity_id.clone(),
                                kind,
                                actor_id,
                                self.clock.now(),
                            ));
                        }
                    }
                    self.tracker.begin(&entity_id);
                    false
                }

                None => {
                    let record =
                        MutationRecord::new(entity_id.clone(), kind, actor_id, self.clock.now());

                    if self.monitor.is_online() {
                        state
                            .entries
                            .insert(entity_id.clone(), EntityEntry::InFlight { record, next: None });
                        self.tracker.begin(&entity_id);
                        true
                    } else {
                        if state.queue.len() >= self.queue_capacity {
                            return Err(SubmitError::QueueFull {
                                capacity: self.queue_capacity,
                            });
                        }
                        state.entries.insert(entity_id.clone(), EntityEntry::Queued(record));
                        state.queue.push_back(entity_id.clone());
                        self.tracker.begin(&entity_id);
                        tracing::debug!(entity = %entity_id, "edit queued while offline");
                        false
                    }
                }
            }
        };

        if spawn_drive {
            tokio::spawn(Arc::clone(self).drive(entity_id));
        }
        Ok(())
    }

    /// Drain the offline queue in FIFO order, one write at a time.
    pub(crate) async fn flush(self: &Arc<Self>) {
        loop {
            if !self.monitor.is_online() {
                break;
            }

            let next = {
                let mut state = self.state.lock().expect("sync state lock");
                let Some(entity_id) = state.queue.pop_front() else {
                    break;
                };
                match state.entries.remove(&entity_id) {
                    Some(EntityEntry::Queued(record)) => {
                        state
                            .entries
                            .insert(entity_id.clone(), EntityEntry::InFlight { record, next: None });
                        Some(entity_id)
                    }
                    // already being driven; put the entry back untouched
                    Some(other) => {
                        state.entries.insert(entity_id, other);
                        None
                    }
                    None => None,
                }
            };

            if let Some(entity_id) = next {
                Arc::clone(self).drive(entity_id).await;
            }
        }
    }

    /// Run one entity's in-flight mutation to resolution, then any
    /// superseding mutation that accumulated meanwhile.
    async fn drive(self: Arc<Self>, entity_id: EntityId) {
        loop {
            let kind = {
                let state = self.state.lock().expect("sync state lock");
                match state.entries.get(&entity_id) {
                    Some(EntityEntry::InFlight { record, .. }) => record.kind.clone(),
                    _ => return,
                }
            };

            let more = match self.write_with_retry(&entity_id, &kind).await {
                Ok(row) => self.resolve_confirmed(&entity_id, row).await,
                Err(err) => self.resolve_failed(&entity_id, err),
            };

            if !more {
                return;
            }
        }
    }

    /// Issue the remote write, retrying transient failures with backoff up
    /// to the policy's attempt ceiling.
    async fn write_with_retry(
        &self,
        entity_id: &EntityId,
        kind: &MutationKind,
    ) -> Result<Option<Payload>, WriteError> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            {
                let mut state = self.state.lock().expect("sync state lock");
                if let Some(EntityEntry::InFlight { record, .. }) =
                    state.entries.get_mut(entity_id)
                {
                    record.start_attempt();
                }
            }

            let result = match kind {
                MutationKind::Upsert(payload) => {
                    self.store.write(entity_id, payload).await.map(Some)
                }
                MutationKind::Delete => self.store.delete(entity_id).await.map(|()| None),
            };

            match result {
                Ok(row) => return Ok(row),
                Err(err) if err.is_transient() && !self.retry.is_exhausted(attempts) => {
                    let delay = self.retry.next_delay(attempts);
                    tracing::warn!(
                        entity = %entity_id,
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        "transient write failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::warn!(entity = %entity_id, attempts, error = %err, "write failed");
                    return Err(err);
                }
            }
        }
    }

    /// Confirmed: fold into the confirmed row, record history (best effort),
    /// release the saving marker, notify. Returns true when a superseding
    /// mutation is now in flight.
    async fn resolve_confirmed(&self, entity_id: &EntityId, row: Option<Payload>) -> bool {
        let (holds, entry, more) = {
            let mut state = self.state.lock().expect("sync state lock");
            let Some(EntityEntry::InFlight { mut record, next }) =
                state.entries.remove(entity_id)
            else {
                return false;
            };
            record.mark_confirmed();

            let prior = state.confirmed.get(entity_id).cloned();
            let entry = match &record.kind {
                MutationKind::Upsert(payload) => {
                    let confirmed_row = row.unwrap_or_else(|| {
                        prior.clone().unwrap_or_default().merged_with(payload)
                    });
                    state.confirmed.insert(entity_id.clone(), confirmed_row);
                    HistoryEntry::for_upsert(
                        entity_id.clone(),
                        prior.as_ref(),
                        payload,
                        record.actor_id.clone(),
                        self.clock.now(),
                    )
                }
                MutationKind::Delete => {
                    state.confirmed.remove(entity_id);
                    HistoryEntry::for_delete(
                        entity_id.clone(),
                        prior.as_ref(),
                        record.actor_id.clone(),
                        self.clock.now(),
                    )
                }
            };

            let more = self.reinstate_next(&mut state, entity_id, next);
            (record.holds, entry, more)
        };

        for _ in 0..holds {
            self.tracker.end(entity_id);
        }

        if let Err(err) = self.recorder.record(&entry).await {
            // best effort only; the save already succeeded for the user
            tracing::warn!(entity = %entity_id, error = %err, "history append failed");
        }

        self.bridge.emit(Notification::SaveSucceeded { entity_id: entity_id.clone() });
        more
    }

    /// Failed: drop the optimistic overlay (rollback to last confirmed),
    /// release the saving marker, surface the reason. Returns true when a
    /// superseding mutation is now in flight; it still gets its chance.
    fn resolve_failed(&self, entity_id: &EntityId, err: WriteError) -> bool {
        let (holds, more) = {
            let mut state = self.state.lock().expect("sync state lock");
            let Some(EntityEntry::InFlight { mut record, next }) =
                state.entries.remove(entity_id)
            else {
                return false;
            };
            record.mark_failed();
            let more = self.reinstate_next(&mut state, entity_id, next);
            (record.holds, more)
        };

        for _ in 0..holds {
            self.tracker.end(entity_id);
        }

        self.bridge.emit(Notification::SaveFailed {
            entity_id: entity_id.clone(),
            reason: err.to_string(),
        });
        more
    }

    /// Promote the superseding mutation, if any. While offline it goes back
    /// to the pending queue instead of burning retries against a dead link.
    fn reinstate_next(
        &self,
        state: &mut SyncState,
        entity_id: &EntityId,
        next: Option<MutationRecord>,
    ) -> bool {
        let Some(record) = next else {
            return false;
        };

        if self.monitor.is_online() {
            state
                .entries
                .insert(entity_id.clone(), EntityEntry::InFlight { record, next: None });
            true
        } else {
            state.entries.insert(entity_id.clone(), EntityEntry::Queued(record));
            state.queue.push_back(entity_id.clone());
            false
        }
    }
}
