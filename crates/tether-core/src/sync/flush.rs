//! Flush worker: drains the offline queue when connectivity returns.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::orchestrator::SyncOrchestrator;

/// Background task watching the connectivity signal.
///
/// On every offline -> online transition it asks the orchestrator to flush
/// the pending queue in FIFO order. Shutting down does not cancel an
/// in-flight flush write; it stops reacting to further transitions.
pub struct FlushWorker {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl FlushWorker {
    pub(crate) fn spawn(orchestrator: Arc<SyncOrchestrator>) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let mut connectivity_rx = orchestrator.monitor().subscribe();

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = connectivity_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if *connectivity_rx.borrow_and_update() {
                            orchestrator.flush().await;
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self { shutdown_tx, join }
    }

    pub fn request_shutdown(&self) {
        // ignore send error: the task may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}
