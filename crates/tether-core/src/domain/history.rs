//! History entries: the append-only audit trail.
//!
//! One entry is created per successfully confirmed mutation, never mutated or
//! deleted afterward. The remote store persists them; the rest of the system
//! only reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ids::{ActorId, EntityId};
use super::payload::Payload;

/// What the confirmed mutation did to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityAction {
    Created,
    Updated,
    Deleted,
}

/// Old and new value of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<serde_json::Value>,
}

/// Append-only audit record for one confirmed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub entity_id: EntityId,
    pub action: EntityAction,
    pub changes: BTreeMap<String, FieldChange>,
    pub actor_id: ActorId,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build the entry for a confirmed upsert: one `FieldChange` per touched
    /// field, old values taken from the last confirmed row.
    pub fn for_upsert(
        entity_id: EntityId,
        prior: Option<&Payload>,
        applied: &Payload,
        actor_id: ActorId,
        created_at: DateTime<Utc>,
    ) -> Self {
        let changes = applied
            .iter()
            .map(|(field, new)| {
                let old = prior.and_then(|p| p.get(field)).cloned();
                (field.clone(), FieldChange { old, new: Some(new.clone()) })
            })
            .collect();

        let action = if prior.is_some() {
            EntityAction::Updated
        } else {
            EntityAction::Created
        };

        Self { entity_id, action, changes, actor_id, created_at }
    }

    /// Build the entry for a confirmed delete: every confirmed field goes to
    /// `None`.
    pub fn for_delete(
        entity_id: EntityId,
        prior: Option<&Payload>,
        actor_id: ActorId,
        created_at: DateTime<Utc>,
    ) -> Self {
        let changes = prior
            .map(|p| {
                p.iter()
                    .map(|(field, old)| {
                        (field.clone(), FieldChange { old: Some(old.clone()), new: None })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            entity_id,
            action: EntityAction::Deleted,
            changes,
            actor_id,
            created_at,
        }
    }
}
