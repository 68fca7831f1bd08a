//! Typed - 型付き Patch API
//!
//! Raw payloads are loose field maps. This layer lets callers describe a
//! partial update as a plain struct instead, so field names and value types
//! are checked at compile time; serialization produces the same partial
//! payload the engine works with.

pub mod patch;

pub use self::patch::{Patch, PatchError, to_payload};
