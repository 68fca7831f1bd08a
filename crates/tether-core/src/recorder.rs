//! History recorder: best-effort append of audit entries.

use std::sync::Arc;

use crate::domain::HistoryEntry;
use crate::error::RecordingError;
use crate::ports::RemoteStore;

/// Appends one [`HistoryEntry`] per confirmed mutation.
///
/// A failed append never blocks the user-visible mutation outcome; the
/// orchestrator logs the error and moves on.
#[derive(Clone)]
pub struct HistoryRecorder {
    store: Arc<dyn RemoteStore>,
}

impl HistoryRecorder {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, entry: &HistoryEntry) -> Result<(), RecordingError> {
        self.store.append(entry).await.map_err(RecordingError)
    }
}
