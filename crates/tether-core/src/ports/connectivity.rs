//! ConnectivitySource port - the platform reachability signal.

use async_trait::async_trait;

/// One reachability check.
///
/// Implementations wrap whatever the platform offers (an OS online/offline
/// event, a HEAD request against the backend, ...). When the underlying
/// signal is unavailable, return `true`: the monitor fails open, a false
/// "offline" is worse than a false "online" for a productivity tool.
#[async_trait]
pub trait ConnectivitySource: Send + Sync {
    async fn probe(&self) -> bool;
}
