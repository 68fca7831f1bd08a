//! Sync - the coordinating layer.
//!
//! - **SyncOrchestrator**: the per-entity write state machine
//!   (idle -> pending -> confirmed | failed)
//! - **SyncBuilder / SyncCore**: wiring and lifecycle
//! - **FlushWorker**: drains the offline queue on reconnection
//! - **RetryPolicy**: backoff for transient failures

pub mod builder;
pub mod flush;
pub mod orchestrator;
pub mod retry;

pub use builder::{BuildError, SyncBuilder, SyncCore};
pub use flush::FlushWorker;
pub use orchestrator::{SyncOrchestrator, SyncStatus};
pub use retry::RetryPolicy;
