use thiserror::Error;

/// Failure reported by the remote store.
///
/// The split drives the retry policy: transient failures (network, timeout)
/// are retried with backoff, terminal ones (authorization, validation)
/// surface immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("transient write failure: {0}")]
    Transient(String),

    #[error("write rejected: {0}")]
    Terminal(String),
}

impl WriteError {
    pub fn is_transient(&self) -> bool {
        matches!(self, WriteError::Transient(_))
    }
}

/// Why a submit was not accepted.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The offline queue is capped; new edits past the cap are rejected
    /// rather than growing without bound.
    #[error("offline queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error(transparent)]
    InvalidPatch(#[from] crate::typed::PatchError),
}

/// History append failed. Logged, never propagated to the submit caller:
/// history is best-effort, not a correctness dependency.
#[derive(Debug, Error)]
#[error("history append failed: {0}")]
pub struct RecordingError(#[source] pub WriteError);
