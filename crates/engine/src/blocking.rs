//! Blocking facade
//!
//! [`StorageFacade`] forwards every operation to the backend's `*_blocking`
//! variants. Init runs lazily on the first operation that needs the backend;
//! a failed init is replayed by every later operation.
//!
//! # Example
//!
//! ```ignore
//! use storage_facade_engine::{Setup, StorageFacade};
//! use storage_facade_storage::MemoryBackend;
//!
//! let storage = StorageFacade::new(Setup::new(MemoryBackend::new()));
//! storage.set("value", 42)?;
//! assert_eq!(storage.get("value")?, Some(42.into()));
//! ```

use tracing::{debug, trace};

use storage_facade_core::{is_reserved, Backend, IntoEntry, Map, Mode, Result, Success, Value};

use crate::defaults::collect_pairs;
use crate::gate::BlockingGate;
use crate::setup::Setup;
use crate::state::{FacadeState, FacadeStatus};

/// Property-bag view over a backend where every call completes synchronously
pub struct StorageFacade {
    backend: Box<dyn Backend>,
    state: FacadeState,
    gate: BlockingGate,
}

impl std::fmt::Debug for StorageFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageFacade")
            .field("backend", &self.backend.interface_name())
            .field("name", &self.state.name())
            .field("status", &self.status())
            .finish()
    }
}

impl StorageFacade {
    /// Build a blocking facade; the mode chosen in `setup` is overridden
    pub fn new(setup: Setup) -> Self {
        let (backend, init_config) = setup.into_parts(Mode::Blocking);
        Self {
            backend,
            state: FacadeState::new(init_config),
            gate: BlockingGate::new(),
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Instance name handed to the backend
    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// Always [`Mode::Blocking`]
    pub fn mode(&self) -> Mode {
        Mode::Blocking
    }

    /// The wrapped backend
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// True once an operation has completed the init check
    pub fn is_initialized(&self) -> bool {
        self.gate.is_initialized()
    }

    /// Current lifecycle state
    pub fn status(&self) -> FacadeStatus {
        if self.state.is_deleted() {
            return FacadeStatus::Deleted;
        }
        match self.gate.peek() {
            None => FacadeStatus::Uninitialized,
            Some(Ok(_)) => FacadeStatus::Ready,
            Some(Err(_)) => FacadeStatus::Failed,
        }
    }

    fn ready(&self) -> Result<Success> {
        self.state.ensure_live()?;
        self.gate.ensure(self.backend.as_ref(), self.state.init_config())
    }

    // ========================================================================
    // Property access
    // ========================================================================

    /// Read `name`, falling back to its default when the backend has none.
    ///
    /// Reserved method names pass the init gate, read as `None` and never
    /// reach the backend.
    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        self.ready()?;
        if is_reserved(name, Mode::Blocking) {
            trace!(target: "storage_facade::ops", name, "reserved name read");
            return Ok(None);
        }
        let value = self.backend.read_blocking(name)?;
        Ok(self.state.defaults().fill(name, value))
    }

    /// Store `value` under `name`; `None` stores an absent entry.
    ///
    /// Writes to reserved method names are ignored.
    pub fn set(&self, name: &str, value: impl IntoEntry) -> Result<()> {
        self.ready()?;
        if is_reserved(name, Mode::Blocking) {
            debug!(target: "storage_facade::ops", name, "ignoring write to reserved name");
            return Ok(());
        }
        self.backend.write_blocking(name, value.into_entry())?;
        Ok(())
    }

    /// Remove `name`; a later read sees the default, if any
    pub fn delete(&self, name: &str) -> Result<()> {
        self.ready()?;
        if is_reserved(name, Mode::Blocking) {
            debug!(target: "storage_facade::ops", name, "ignoring delete of reserved name");
            return Ok(());
        }
        self.backend.remove_blocking(name)?;
        Ok(())
    }

    // ========================================================================
    // Method surface
    // ========================================================================

    /// Remove every entry
    pub fn clear(&self) -> Result<()> {
        self.ready()?;
        self.backend.clear_blocking()?;
        Ok(())
    }

    /// Number of entries, including ones stored as absent
    pub fn size(&self) -> Result<usize> {
        self.ready()?;
        self.backend.count_blocking()
    }

    /// Key at `index` in backend enumeration order
    pub fn key(&self, index: usize) -> Result<Option<String>> {
        self.ready()?;
        self.backend.key_at_blocking(index)
    }

    /// Every entry as `(key, value)` in backend enumeration order
    pub fn entries(&self) -> Result<Vec<(String, Option<Value>)>> {
        self.ready()?;
        let count = self.backend.count_blocking()?;
        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            if let Some(key) = self.backend.key_at_blocking(index)? {
                let value = self.backend.read_blocking(&key)?;
                entries.push((key, value));
            }
        }
        Ok(entries)
    }

    /// Tear down the storage; every later operation fails with `Deleted`
    pub fn delete_storage(&self) -> Result<()> {
        self.ready()?;
        self.backend.delete_everything_blocking()?;
        self.state.mark_deleted();
        Ok(())
    }

    // ========================================================================
    // Defaults
    // ========================================================================

    /// Merge `pairs` into the defaults; later keys overwrite
    pub fn add_default<I, K, V>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.ready()?;
        self.state.add_default(collect_pairs(pairs));
        Ok(())
    }

    /// Replace the defaults with `pairs`
    pub fn set_default<I, K, V>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.ready()?;
        self.state.set_default(collect_pairs(pairs));
        Ok(())
    }

    /// Copy of the current defaults
    pub fn get_default(&self) -> Result<Map> {
        self.ready()?;
        Ok(self.state.get_default())
    }

    /// Drop every default
    pub fn clear_default(&self) -> Result<()> {
        self.ready()?;
        self.state.clear_default();
        Ok(())
    }
}
