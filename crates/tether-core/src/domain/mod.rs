//! Domain model (ids, payloads, mutations, history, notifications).

pub mod events;
pub mod history;
pub mod ids;
pub mod mutation;
pub mod payload;

pub use events::Notification;
pub use history::{EntityAction, FieldChange, HistoryEntry};
pub use ids::{ActorId, EntityId};
pub use mutation::{MutationKind, MutationRecord, MutationStatus};
pub use payload::Payload;
