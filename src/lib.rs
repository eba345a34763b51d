//! storage-facade - property-bag access to pluggable key/value storage
//!
//! A facade turns any [`Backend`] into an object with named properties:
//! writing a property writes through to the backend, reading it reads through
//! (falling back to a per-facade default), and deleting it removes the entry.
//! Facades run either blocking or suspendable (async).
//!
//! # Quick Start
//!
//! ```ignore
//! use storage_facade::{create_storage, MemoryBackend, Mode, Setup, Value};
//!
//! let storage = create_storage(Setup::new(MemoryBackend::new()).mode(Mode::Blocking))
//!     .into_blocking()
//!     .unwrap();
//!
//! storage.add_default([("theme", "light")])?;
//! assert_eq!(storage.get("theme")?, Some(Value::from("light")));
//!
//! storage.set("theme", "dark")?;
//! assert_eq!(storage.get("theme")?, Some(Value::from("dark")));
//! ```
//!
//! # Architecture
//!
//! - `storage-facade-core`: value model, errors, backend contract, config
//! - `storage-facade-engine`: init gate, defaults, both facades
//! - `storage-facade-storage`: in-memory and fault-injecting backends

pub use storage_facade_core::*;
pub use storage_facade_engine::{
    create_storage, AsyncStorageFacade, DefaultStore, FacadeStatus, Setup, Storage,
    StorageFacade,
};
pub use storage_facade_storage::{testing, MemoryBackend, DELETED_MARKER_KEY};
