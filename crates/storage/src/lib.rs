//! Backends for storage-facade
//!
//! This crate provides concrete implementations of the
//! [`Backend`](storage_facade_core::Backend) contract:
//! - MemoryBackend: insertion-ordered in-memory store, both modes, optional
//!   simulated latency
//! - testing::FaultyBackend: fault injection for error-path tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod testing;

pub use memory::{MemoryBackend, DELETED_MARKER_KEY};
