//! tether-core
//!
//! Save-state / synchronization core for a productivity app: tracks which
//! entities have an in-flight write, reconciles optimistic local edits
//! against remote confirmation, and queues writes while offline.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, payload, mutation, history, events）
//! - **ports**: 抽象化レイヤー（RemoteStore, Clock, ConnectivitySource）
//! - **sync**: アプリケーションロジック（orchestrator, builder, flush, retry）
//! - **typed**: 型付き Patch API
//! - **impls**: 実装（InMemoryRemoteStore など開発用）
//!
//! Plus focused components: [`tracker`] (the saving set),
//! [`connectivity`] (the online/offline monitor), [`notify`] (the
//! notification bridge), and [`recorder`] (best-effort history appends).

pub mod connectivity;
pub mod domain;
pub mod error;
pub mod impls;
pub mod notify;
pub mod ports;
pub mod recorder;
pub mod sync;
pub mod tracker;
pub mod typed;

pub use connectivity::{ConnectivityMonitor, ProbeWorker};
pub use domain::{
    ActorId, EntityAction, EntityId, FieldChange, HistoryEntry, MutationKind, MutationRecord,
    MutationStatus, Notification, Payload,
};
pub use error::{RecordingError, SubmitError, WriteError};
pub use notify::NotificationBridge;
pub use recorder::HistoryRecorder;
pub use sync::{BuildError, RetryPolicy, SyncBuilder, SyncCore, SyncOrchestrator, SyncStatus};
pub use tracker::MutationTracker;
