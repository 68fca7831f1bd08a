//! SyncBuilder - wiring and fail-fast validation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::connectivity::ConnectivityMonitor;
use crate::domain::Notification;
use crate::notify::NotificationBridge;
use crate::ports::{Clock, RemoteStore, SystemClock};
use crate::tracker::MutationTracker;

use super::flush::FlushWorker;
use super::orchestrator::SyncOrchestrator;
use super::retry::RetryPolicy;

const DEFAULT_QUEUE_CAPACITY: usize = 64;
const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(2);

/// Builds a wired [`SyncCore`].
///
/// # Usage
/// ```ignore
/// let core = SyncBuilder::new(store)
///     .queue_capacity(32)
///     .build()?;
/// core.orchestrator().submit_edit(id, payload, actor)?;
/// ```
pub struct SyncBuilder {
    store: Arc<dyn RemoteStore>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    queue_capacity: usize,
    dedup_window: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("offline queue capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("retry policy must allow at least one attempt")]
    ZeroAttempts,
}

impl SyncBuilder {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            dedup_window: DEFAULT_DEDUP_WINDOW,
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Cap of the offline pending queue; edits past the cap are rejected.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Window within which identical notifications are dropped.
    pub fn dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    /// Validate and wire everything, spawning the flush worker.
    pub fn build(self) -> Result<SyncCore, BuildError> {
        if self.queue_capacity == 0 {
            return Err(BuildError::ZeroQueueCapacity);
        }
        if self.retry.max_attempts == 0 {
            return Err(BuildError::ZeroAttempts);
        }

        let bridge = NotificationBridge::new(Arc::clone(&self.clock), self.dedup_window);
        let monitor = ConnectivityMonitor::new(bridge.clone());
        let tracker = MutationTracker::new();

        let orchestrator = SyncOrchestrator::new(
            self.store,
            self.clock,
            tracker,
            bridge,
            monitor.clone(),
            self.retry,
            self.queue_capacity,
        );

        let flush = FlushWorker::spawn(Arc::clone(&orchestrator));

        Ok(SyncCore { orchestrator, monitor, flush })
    }
}

/// The wired core: orchestrator, connectivity handle, flush worker.
pub struct SyncCore {
    orchestrator: Arc<SyncOrchestrator>,
    monitor: ConnectivityMonitor,
    flush: FlushWorker,
}

impl SyncCore {
    pub fn orchestrator(&self) -> &Arc<SyncOrchestrator> {
        &self.orchestrator
    }

    /// Feed platform connectivity signals in through this handle.
    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    /// The saving-set handle for the presentation layer.
    pub fn tracker(&self) -> &MutationTracker {
        self.orchestrator.tracker()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.orchestrator.subscribe()
    }

    /// Stop the flush worker. In-flight writes run to completion.
    pub async fn shutdown(self) {
        self.flush.shutdown_and_join().await;
    }
}
