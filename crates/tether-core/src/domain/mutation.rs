//! Mutation record: one pending or completed write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ActorId, EntityId};
use super::payload::Payload;

/// What a mutation does to its entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    /// Partial update; creates the row if it does not exist yet.
    Upsert(Payload),
    /// Remove the row.
    Delete,
}

impl MutationKind {
    /// Combine this (older) mutation with a superseding (newer) one.
    ///
    /// - Upsert over Upsert: field-level last-write-wins merge.
    /// - Delete supersedes anything.
    /// - Upsert after a pending Delete re-creates the row with exactly the
    ///   newer fields.
    pub fn superseded_by(&self, newer: &MutationKind) -> MutationKind {
        match (self, newer) {
            (MutationKind::Upsert(older), MutationKind::Upsert(update)) => {
                MutationKind::Upsert(older.clone().merged_with(update))
            }
            (_, MutationKind::Delete) => MutationKind::Delete,
            (MutationKind::Delete, MutationKind::Upsert(p)) => MutationKind::Upsert(p.clone()),
        }
    }
}

/// Per-mutation state machine: pending -> confirmed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationStatus {
    Pending,
    Confirmed,
    Failed,
}

impl MutationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MutationStatus::Confirmed | MutationStatus::Failed)
    }
}

/// One pending or completed write for an entity.
///
/// Invariant: at most one record with `Pending` status exists per entity id;
/// the orchestrator serializes writes to the same entity and merges
/// superseding edits into the existing record instead of issuing two writes.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub entity_id: EntityId,
    pub kind: MutationKind,
    pub status: MutationStatus,
    pub actor_id: ActorId,

    /// When the mutation was first accepted.
    pub queued_at: DateTime<Utc>,

    /// Number of write attempts issued so far.
    pub attempts: u32,

    /// Tracker `begin` calls absorbed by this record. Every accepted submit
    /// contributes one hold; resolution pairs each with one `end`.
    pub holds: u32,
}

impl MutationRecord {
    pub fn new(
        entity_id: EntityId,
        kind: MutationKind,
        actor_id: ActorId,
        queued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_id,
            kind,
            status: MutationStatus::Pending,
            actor_id,
            queued_at,
            attempts: 0,
            holds: 1,
        }
    }

    /// Fold a newer edit into this record (last-write-wins) and absorb its
    /// tracker hold.
    pub fn supersede(&mut self, newer: &MutationKind, actor_id: ActorId) {
        self.kind = self.kind.superseded_by(newer);
        self.actor_id = actor_id;
        self.holds += 1;
    }

    /// Absorb a duplicate submit that changes nothing about the write.
    pub fn absorb_hold(&mut self) {
        self.holds += 1;
    }

    pub fn start_attempt(&mut self) {
        self.attempts += 1;
    }

    pub fn mark_confirmed(&mut self) {
        self.status = MutationStatus::Confirmed;
    }

    pub fn mark_failed(&mut self) {
        self.status = MutationStatus::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(kind: MutationKind) -> MutationRecord {
        MutationRecord::new(
            EntityId::new("task-1"),
            kind,
            ActorId::new("alice"),
            Utc::now(),
        )
    }

    #[test]
    fn upsert_supersede_merges_fields() {
        let mut rec = record(MutationKind::Upsert(
            Payload::new().with("title", json!("A")).with("done", json!(false)),
        ));
        rec.supersede(
            &MutationKind::Upsert(Payload::new().with("title", json!("B"))),
            ActorId::new("bob"),
        );

        let MutationKind::Upsert(payload) = &rec.kind else {
            panic!("expected upsert");
        };
        assert_eq!(payload.get("title"), Some(&json!("B")));
        assert_eq!(payload.get("done"), Some(&json!(false)));
        assert_eq!(rec.holds, 2);
        assert_eq!(rec.actor_id, ActorId::new("bob"));
    }

    #[test]
    fn delete_supersedes_pending_edit() {
        let mut rec = record(MutationKind::Upsert(
            Payload::new().with("title", json!("A")),
        ));
        rec.supersede(&MutationKind::Delete, ActorId::new("alice"));
        assert_eq!(rec.kind, MutationKind::Delete);
    }

    #[test]
    fn upsert_after_delete_recreates_with_newer_fields_only() {
        let mut rec = record(MutationKind::Delete);
        rec.supersede(
            &MutationKind::Upsert(Payload::new().with("title", json!("again"))),
            ActorId::new("alice"),
        );
        assert_eq!(
            rec.kind,
            MutationKind::Upsert(Payload::new().with("title", json!("again")))
        );
    }

    #[test]
    fn status_terminality() {
        assert!(!MutationStatus::Pending.is_terminal());
        assert!(MutationStatus::Confirmed.is_terminal());
        assert!(MutationStatus::Failed.is_terminal());
    }
}
