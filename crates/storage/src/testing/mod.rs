//! Testing utilities for facades and backends
//!
//! - **FaultyBackend**: wraps a [`MemoryBackend`](crate::MemoryBackend) and
//!   fails one chosen operation in both modes
//! - **FaultPoint**: which operation fails
//!
//! # Example
//!
//! ```ignore
//! use storage_facade_storage::testing::{FaultPoint, FaultyBackend};
//!
//! let backend = FaultyBackend::failing(FaultPoint::Read);
//! // every read (blocking or async) now fails with "Error on read"
//! ```

mod faulty;

pub use faulty::{FaultPoint, FaultyBackend};
