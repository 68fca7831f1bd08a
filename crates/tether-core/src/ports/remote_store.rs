//! RemoteStore port - the managed backend.
//!
//! Upsert-style partial writes plus the append-only history table. Row-level
//! authorization lives entirely behind this trait; the core performs no
//! client-side access checks.

use async_trait::async_trait;

use crate::domain::{EntityId, HistoryEntry, Payload};
use crate::error::WriteError;

/// Narrow interface to the remote data store.
///
/// `write` is an upsert: the payload is a partial update, the returned value
/// is the full stored row after applying it. That row becomes the entity's
/// last confirmed value on the client.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn write(&self, entity_id: &EntityId, payload: &Payload) -> Result<Payload, WriteError>;

    async fn delete(&self, entity_id: &EntityId) -> Result<(), WriteError>;

    async fn append(&self, entry: &HistoryEntry) -> Result<(), WriteError>;
}
