//! Core types and traits for storage-facade
//!
//! This crate defines the foundational types shared by every layer:
//! - Value: Tagged value model for stored properties
//! - Error: Error taxonomy (backend, init, deleted, config)
//! - Backend: The contract every storage backend implements, in blocking
//!   and suspendable variants
//! - Config: Instance name, operating mode and backend options, with TOML
//!   loading
//! - Names: The reserved method surface

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod error;
pub mod names;
pub mod value;

pub use backend::{Backend, Success};
pub use config::{FacadeConfig, InitConfig, Mode, CONFIG_FILE_NAME};
pub use error::{Error, Result};
pub use names::{is_reserved, Method, DEFAULT_STORAGE_NAME};
pub use value::{IntoEntry, Map, Value};
