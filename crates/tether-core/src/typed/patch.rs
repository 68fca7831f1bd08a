//! Patch trait - statically typed partial updates.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::Payload;

/// A typed partial update for one kind of entity.
///
/// # Usage
/// ```ignore
/// #[derive(Serialize)]
/// struct TaskPatch {
///     #[serde(skip_serializing_if = "Option::is_none")]
///     title: Option<String>,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     status: Option<String>,
/// }
///
/// impl Patch for TaskPatch {
///     const KIND: &'static str = "task";
/// }
/// ```
///
/// Fields the edit does not touch must be skipped during serialization
/// (`skip_serializing_if`), otherwise they land in the payload and overwrite
/// remote values with `null`.
pub trait Patch: Serialize + Send + Sync + 'static {
    /// Entity kind label, used for logging.
    const KIND: &'static str;
}

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("patch for `{kind}` did not serialize to an object")]
    NotAnObject { kind: &'static str },

    #[error("patch serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convert a typed patch into the engine's payload shape.
pub fn to_payload<P: Patch>(patch: &P) -> Result<Payload, PatchError> {
    match serde_json::to_value(patch)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(PatchError::NotAnObject { kind: P::KIND }),
    }
}
