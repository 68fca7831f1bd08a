//! Notifications surfaced to the presentation layer.

use serde::{Deserialize, Serialize};

use super::ids::EntityId;

/// User-facing signal derived from connectivity and save outcomes.
///
/// The presentation layer decides how loud each of these is; the core only
/// guarantees it emits them (de-duplicated within a short window, see the
/// notification bridge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Notification {
    ConnectivityRestored,
    ConnectivityLost,
    SaveSucceeded { entity_id: EntityId },
    SaveFailed { entity_id: EntityId, reason: String },
}
