//! Notification bridge: projects core state changes onto the presentation
//! layer.
//!
//! Stateless beyond one piece of memory: the last emitted notification and
//! when it went out, used to drop identical repeats within a short window
//! (flapping connectivity must not spam toasts).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::broadcast;

use crate::domain::Notification;
use crate::ports::Clock;

const CHANNEL_CAPACITY: usize = 64;

struct BridgeInner {
    tx: broadcast::Sender<Notification>,
    clock: Arc<dyn Clock>,
    window: TimeDelta,
    last: Mutex<Option<(Notification, DateTime<Utc>)>>,
}

/// Shared fan-out of [`Notification`] events.
#[derive(Clone)]
pub struct NotificationBridge {
    inner: Arc<BridgeInner>,
}

impl NotificationBridge {
    pub fn new(clock: Arc<dyn Clock>, dedup_window: Duration) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let window = TimeDelta::from_std(dedup_window).unwrap_or(TimeDelta::MAX);
        Self {
            inner: Arc::new(BridgeInner {
                tx,
                clock,
                window,
                last: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to notifications. Subscribers that lag past the channel
    /// capacity miss the oldest events, which is acceptable for UI signals.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.inner.tx.subscribe()
    }

    /// Emit a notification unless an identical one already went out within
    /// the de-dup window.
    pub fn emit(&self, notification: Notification) {
        let now = self.inner.clock.now();
        {
            let mut last = self.inner.last.lock().expect("bridge lock");
            if let Some((previous, at)) = last.as_ref()
                && *previous == notification
                && now - *at < self.inner.window
            {
                return;
            }
            *last = Some((notification.clone(), now));
        }

        // send only fails when nobody is subscribed, which is fine
        let _ = self.inner.tx.send(notification);
    }
}
