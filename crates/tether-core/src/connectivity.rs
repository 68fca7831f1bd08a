//! Connectivity monitor: one process-wide online/offline boolean.
//!
//! Built on a `watch` channel, so consumers observe transitions, not checks:
//! `set_online(true)` twice in a row produces one event. Defaults to online:
//! if the platform signal is unavailable we fail open.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::Notification;
use crate::notify::NotificationBridge;
use crate::ports::ConnectivitySource;

struct MonitorInner {
    tx: watch::Sender<bool>,
    bridge: NotificationBridge,
}

/// Shared handle to the connectivity state.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<MonitorInner>,
}

impl ConnectivityMonitor {
    pub(crate) fn new(bridge: NotificationBridge) -> Self {
        let (tx, _) = watch::channel(true);
        Self {
            inner: Arc::new(MonitorInner { tx, bridge }),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.inner.tx.borrow()
    }

    /// Watch for transitions. The receiver yields exactly one change per
    /// actual state flip.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.tx.subscribe()
    }

    /// Feed the platform signal in. No-op unless the state actually flips;
    /// on a flip, listeners wake and the bridge notifies the user.
    pub fn set_online(&self, online: bool) {
        let changed = self.inner.tx.send_if_modified(|current| {
            if *current != online {
                *current = online;
                true
            } else {
                false
            }
        });

        if changed {
            tracing::info!(online, "connectivity changed");
            self.inner.bridge.emit(if online {
                Notification::ConnectivityRestored
            } else {
                Notification::ConnectivityLost
            });
        }
    }
}

/// Periodic reachability probe feeding the monitor.
/// - `shutdown_and_join()` で全体が止まる（drop では止まらない）
pub struct ProbeWorker {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ProbeWorker {
    /// Spawn the probe loop. Every `interval` the source is asked once and
    /// the answer is pushed into the monitor.
    pub fn spawn(
        source: Arc<dyn ConnectivitySource>,
        monitor: ConnectivityMonitor,
        interval: Duration,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(interval) => {
                        let online = source.probe().await;
                        monitor.set_online(online);
                    }
                }
            }
        });

        Self { shutdown_tx, join }
    }

    pub fn request_shutdown(&self) {
        // ignore send error: receiver may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::SystemClock;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn monitor() -> (ConnectivityMonitor, NotificationBridge) {
        let bridge = NotificationBridge::new(Arc::new(SystemClock), Duration::from_millis(0));
        (ConnectivityMonitor::new(bridge.clone()), bridge)
    }

    #[tokio::test]
    async fn defaults_to_online() {
        let (monitor, _bridge) = monitor();
        assert!(monitor.is_online());
    }

    #[tokio::test]
    async fn listeners_wake_once_per_transition() {
        let (monitor, _bridge) = monitor();
        let mut rx = monitor.subscribe();

        monitor.set_online(true); // no transition
        monitor.set_online(false); // transition

        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
        // no second change pending
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn transitions_notify_the_bridge() {
        let (monitor, bridge) = monitor();
        let mut events = bridge.subscribe();

        monitor.set_online(false);
        monitor.set_online(true);

        assert_eq!(events.recv().await.unwrap(), Notification::ConnectivityLost);
        assert_eq!(events.recv().await.unwrap(), Notification::ConnectivityRestored);
    }

    struct FlippingSource {
        online: AtomicBool,
    }

    #[async_trait]
    impl ConnectivitySource for FlippingSource {
        async fn probe(&self) -> bool {
            self.online.load(Ordering::Relaxed)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn probe_worker_feeds_the_monitor() {
        let (monitor, _bridge) = monitor();
        let source = Arc::new(FlippingSource { online: AtomicBool::new(false) });

        let worker = ProbeWorker::spawn(
            Arc::clone(&source) as Arc<dyn ConnectivitySource>,
            monitor.clone(),
            Duration::from_secs(30),
        );

        let mut rx = monitor.subscribe();
        rx.changed().await.unwrap();
        assert!(!monitor.is_online());

        source.online.store(true, Ordering::Relaxed);
        rx.changed().await.unwrap();
        assert!(monitor.is_online());

        worker.shutdown_and_join().await;
    }
}
