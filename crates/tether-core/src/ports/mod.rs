//! Ports - 抽象化レイヤー
//!
//! Each trait here is the seam to an external capability: the remote data
//! store, wall-clock time, and the platform connectivity signal. The core
//! only talks to these traits; swapping implementations (test doubles, the
//! in-memory dev store) never touches the orchestrator.

pub mod clock;
pub mod connectivity;
pub mod remote_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::connectivity::ConnectivitySource;
pub use self::remote_store::RemoteStore;
