//! Facade engine for storage-facade
//!
//! This crate turns a [`Backend`](storage_facade_core::Backend) into a
//! property bag:
//! - StorageFacade: blocking facade
//! - AsyncStorageFacade: suspendable facade with pending-write adoption
//! - Setup / create_storage: configuration and mode selection
//! - Init gate: backend init runs once per facade, failures are sticky
//! - Defaults: in-memory fallback values for absent keys
//!
//! Both facades share the same lifecycle (`Uninitialized → Ready | Failed`,
//! `Ready → Deleted`) and the same reserved method surface.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blocking;
pub mod defaults;
mod gate;
pub mod setup;
mod state;
pub mod storage;
pub mod suspendable;

pub use blocking::StorageFacade;
pub use defaults::DefaultStore;
pub use setup::Setup;
pub use state::FacadeStatus;
pub use storage::{create_storage, Storage};
pub use suspendable::AsyncStorageFacade;
