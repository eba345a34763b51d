//! Backend contract
//!
//! Every storage backend plugged into a facade implements [`Backend`]. The
//! trait mirrors each operation in two variants: an `async` one used by
//! suspendable facades and a `*_blocking` one used by blocking facades.
//!
//! All operations have default implementations that fail with
//! [`Error::NotImplemented`], so a backend only implements the mode(s) it
//! supports. A facade started in an unsupported mode fails at init, and that
//! failure is sticky.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │ StorageFacade (blocking)     │   │ AsyncStorageFacade           │
//! └──────────────┬───────────────┘   └──────────────┬───────────────┘
//!                │ *_blocking                        │ async
//!                └───────────────┬───────────────────┘
//!                                ↓
//!                    ┌───────────────────────┐
//!                    │     dyn Backend       │
//!                    └───────────────────────┘
//!                      ↑                   ↑
//!               MemoryBackend        (file, browser, ...)
//! ```
//!
//! Absence is `None` in [`Backend::read`] and [`Backend::key_at`]; writing
//! `None` stores an entry that reads back as absent.

use async_trait::async_trait;

use crate::config::{InitConfig, Mode};
use crate::error::{Error, Result};
use crate::value::Value;

/// Distinguished success token returned by mutating backend operations.
///
/// A dedicated type (rather than `()`) makes it a type error to treat the
/// result of a write as if it were the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Success;

impl std::fmt::Display for Success {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("storage-facade: result of the operation: OK")
    }
}

/// Capability interface every storage backend satisfies.
///
/// Backends are shared with background write tasks in suspendable mode, so
/// they must be `Send + Sync + 'static` and use interior mutability.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Name used in error messages
    fn interface_name(&self) -> &str;

    /// Mode used when the facade setup does not choose one
    fn preferred_mode(&self) -> Mode {
        Mode::Suspendable
    }

    /// Build the not-implemented error for `method`
    fn not_implemented(&self, method: &str) -> Error {
        Error::not_implemented(self.interface_name(), method)
    }

    // ------------------------------------------------------------------
    // Suspendable variants
    // ------------------------------------------------------------------

    /// Prepare the backend. Called exactly once per facade.
    async fn init(&self, _config: &InitConfig) -> Result<Success> {
        Err(self.not_implemented("init"))
    }

    /// Read the value stored under `key`, `None` if absent
    async fn read(&self, _key: &str) -> Result<Option<Value>> {
        Err(self.not_implemented("read"))
    }

    /// Store `value` under `key`
    async fn write(&self, _key: &str, _value: Option<Value>) -> Result<Success> {
        Err(self.not_implemented("write"))
    }

    /// Remove `key`; removing a missing key succeeds
    async fn remove(&self, _key: &str) -> Result<Success> {
        Err(self.not_implemented("remove"))
    }

    /// Remove every entry
    async fn clear(&self) -> Result<Success> {
        Err(self.not_implemented("clear"))
    }

    /// Number of entries
    async fn count(&self) -> Result<usize> {
        Err(self.not_implemented("count"))
    }

    /// Key at ordinal `index` in enumeration order, `None` if out of range
    async fn key_at(&self, _index: usize) -> Result<Option<String>> {
        Err(self.not_implemented("key_at"))
    }

    /// Tear down the whole storage
    async fn delete_everything(&self) -> Result<Success> {
        Err(self.not_implemented("delete_everything"))
    }

    // ------------------------------------------------------------------
    // Blocking variants
    // ------------------------------------------------------------------

    /// Blocking [`Backend::init`]
    fn init_blocking(&self, _config: &InitConfig) -> Result<Success> {
        Err(self.not_implemented("init_blocking"))
    }

    /// Blocking [`Backend::read`]
    fn read_blocking(&self, _key: &str) -> Result<Option<Value>> {
        Err(self.not_implemented("read_blocking"))
    }

    /// Blocking [`Backend::write`]
    fn write_blocking(&self, _key: &str, _value: Option<Value>) -> Result<Success> {
        Err(self.not_implemented("write_blocking"))
    }

    /// Blocking [`Backend::remove`]
    fn remove_blocking(&self, _key: &str) -> Result<Success> {
        Err(self.not_implemented("remove_blocking"))
    }

    /// Blocking [`Backend::clear`]
    fn clear_blocking(&self) -> Result<Success> {
        Err(self.not_implemented("clear_blocking"))
    }

    /// Blocking [`Backend::count`]
    fn count_blocking(&self) -> Result<usize> {
        Err(self.not_implemented("count_blocking"))
    }

    /// Blocking [`Backend::key_at`]
    fn key_at_blocking(&self, _index: usize) -> Result<Option<String>> {
        Err(self.not_implemented("key_at_blocking"))
    }

    /// Blocking [`Backend::delete_everything`]
    fn delete_everything_blocking(&self) -> Result<Success> {
        Err(self.not_implemented("delete_everything_blocking"))
    }
}
