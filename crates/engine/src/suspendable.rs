//! Suspendable facade
//!
//! [`AsyncStorageFacade`] forwards every operation to the backend's `async`
//! variants.
//!
//! ## Pending writes
//!
//! `set` and `delete` return as soon as the operation has been issued. The
//! operation runs on the ambient tokio runtime and its outcome is parked in a
//! per-key pending table:
//!
//! ```text
//!   set("k", v) ──spawn──> [prev("k")] → init gate → backend.write
//!        │                                               │
//!        └── pending["k"] = Shared(outcome) <────────────┘
//!
//!   get("k")  ── awaits pending["k"] ── value or error ── forgets it
//! ```
//!
//! - A `get` of a key with a pending operation adopts that outcome instead of
//!   reading the backend, so write-then-read returns the written value and a
//!   failed write surfaces at the next read of that key.
//! - A write to a key waits for the operation it replaces in the table
//!   before it runs, so backend writes per key land in issue order. A `get`
//!   in flight does not break that chain: the entry stays in the table until
//!   the awaited outcome is forgotten.
//! - A successful operation removes its own entry once it lands. Failures
//!   stay parked until a read, `clear` or `delete_storage` consumes them.
//! - `size`, `key` and `entries` wait for every pending operation first.
//!   `clear` and `delete_storage` wait and then discard them. Once
//!   `delete_storage` starts draining, new writes are refused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use storage_facade_core::{
    is_reserved, Backend, Error, IntoEntry, Map, Mode, Result, Success, Value,
};

use crate::defaults::collect_pairs;
use crate::gate::AsyncGate;
use crate::setup::Setup;
use crate::state::{FacadeState, FacadeStatus};

type PendingOutcome = Shared<BoxFuture<'static, Result<Option<Value>>>>;

#[derive(Clone)]
struct PendingEntry {
    seq: u64,
    outcome: PendingOutcome,
}

enum PendingOp {
    Write(Option<Value>),
    Remove,
}

struct Inner {
    backend: Box<dyn Backend>,
    state: FacadeState,
    gate: AsyncGate,
    pending: Mutex<HashMap<String, PendingEntry>>,
    next_seq: AtomicU64,
    closing: AtomicBool,
}

impl Inner {
    async fn ready(&self) -> Result<Success> {
        self.state.ensure_live()?;
        let outcome = self
            .gate
            .ensure(self.backend.as_ref(), self.state.init_config())
            .await?;
        // delete_storage may have completed while init was awaited
        self.state.ensure_live()?;
        Ok(outcome)
    }

    /// Checks available without awaiting: deletion and a settled init failure
    fn ensure_usable(&self) -> Result<()> {
        self.state.ensure_live()?;
        match self.gate.failure() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn apply(&self, name: &str, op: PendingOp) -> Result<Option<Value>> {
        self.ready().await?;
        match op {
            PendingOp::Write(value) => {
                self.backend.write(name, value.clone()).await?;
                Ok(value)
            }
            PendingOp::Remove => {
                self.backend.remove(name).await?;
                Ok(None)
            }
        }
    }

    /// Drop the entry for `name` if it is still the one tagged `seq`
    fn forget(&self, name: &str, seq: u64) {
        let mut pending = self.pending.lock();
        if pending.get(name).map_or(false, |entry| entry.seq == seq) {
            pending.remove(name);
        }
    }

    /// Wait for every pending operation, leaving failures in place
    async fn settle(&self) {
        let outstanding: Vec<PendingOutcome> = self
            .pending
            .lock()
            .values()
            .map(|entry| entry.outcome.clone())
            .collect();
        for outcome in outstanding {
            // failures stay parked for the next read of that key
            let _ = outcome.await;
        }
    }

    /// Wait for every pending operation and forget the outcomes
    async fn drain(&self) {
        let outstanding: Vec<(String, PendingEntry)> = self.pending.lock().drain().collect();
        for (name, entry) in outstanding {
            if let Err(e) = entry.outcome.await {
                warn!(target: "storage_facade::ops", name = %name, error = %e, "discarding failed pending operation");
            }
        }
    }
}

/// Property-bag view over a backend where every backend-touching call is
/// `async`.
///
/// Must be used inside a tokio runtime: `set` and `delete` spawn their work
/// on it.
pub struct AsyncStorageFacade {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AsyncStorageFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncStorageFacade")
            .field("backend", &self.inner.backend.interface_name())
            .field("name", &self.inner.state.name())
            .field("status", &self.status())
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl AsyncStorageFacade {
    /// Build a suspendable facade; the mode chosen in `setup` is overridden
    pub fn new(setup: Setup) -> Self {
        let (backend, init_config) = setup.into_parts(Mode::Suspendable);
        Self {
            inner: Arc::new(Inner {
                backend,
                state: FacadeState::new(init_config),
                gate: AsyncGate::new(),
                pending: Mutex::new(HashMap::new()),
                next_seq: AtomicU64::new(0),
                closing: AtomicBool::new(false),
            }),
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Instance name handed to the backend
    pub fn name(&self) -> &str {
        self.inner.state.name()
    }

    /// Always [`Mode::Suspendable`]
    pub fn mode(&self) -> Mode {
        self.inner.state.mode()
    }

    /// The wrapped backend
    pub fn backend(&self) -> &dyn Backend {
        self.inner.backend.as_ref()
    }

    /// True once backend init has settled, successfully or not
    pub fn is_initialized(&self) -> bool {
        self.inner.gate.is_initialized()
    }

    /// Current lifecycle state
    pub fn status(&self) -> FacadeStatus {
        if self.inner.state.is_deleted() {
            return FacadeStatus::Deleted;
        }
        match self.inner.gate.peek() {
            Some(Ok(_)) => FacadeStatus::Ready,
            Some(Err(_)) => FacadeStatus::Failed,
            None if self.inner.gate.is_initializing() => FacadeStatus::Initializing,
            None => FacadeStatus::Uninitialized,
        }
    }

    /// Number of keys with an operation in flight or an unread failure
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().len()
    }

    // ========================================================================
    // Property access
    // ========================================================================

    /// Read `name`, falling back to its default when the backend has none.
    ///
    /// If a `set` or `delete` of `name` is pending, its outcome is awaited
    /// and returned instead of reading the backend. Reserved method names
    /// pass the init gate and read as `None`.
    pub async fn get(&self, name: &str) -> Result<Option<Value>> {
        self.inner.ready().await?;
        if is_reserved(name, Mode::Suspendable) {
            trace!(target: "storage_facade::ops", name, "reserved name read");
            return Ok(None);
        }

        let adopted = self.inner.pending.lock().get(name).cloned();
        let value = match adopted {
            Some(entry) => {
                trace!(target: "storage_facade::ops", name, seq = entry.seq, "adopting pending outcome");
                let outcome = entry.outcome.await;
                self.inner.forget(name, entry.seq);
                outcome?
            }
            None => self.inner.backend.read(name).await?,
        };
        Ok(self.inner.state.defaults().fill(name, value))
    }

    /// Issue a write of `value` under `name`; `None` stores an absent entry.
    ///
    /// Returns once the write is issued. Its outcome is observed by the next
    /// `get` of `name`. Fails immediately if the storage was deleted, init
    /// already failed, or no tokio runtime is running.
    pub fn set(&self, name: &str, value: impl IntoEntry) -> Result<()> {
        self.inner.state.ensure_live()?;
        if is_reserved(name, Mode::Suspendable) {
            debug!(target: "storage_facade::ops", name, "ignoring write to reserved name");
            return Ok(());
        }
        self.inner.ensure_usable()?;
        self.issue(name, PendingOp::Write(value.into_entry()))
    }

    /// Issue removal of `name`; observed like [`AsyncStorageFacade::set`]
    pub fn delete(&self, name: &str) -> Result<()> {
        self.inner.state.ensure_live()?;
        if is_reserved(name, Mode::Suspendable) {
            debug!(target: "storage_facade::ops", name, "ignoring delete of reserved name");
            return Ok(());
        }
        self.inner.ensure_usable()?;
        self.issue(name, PendingOp::Remove)
    }

    fn issue(&self, name: &str, op: PendingOp) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::internal(format!("no tokio runtime for pending operation: {}", e)))?;

        let mut pending = self.inner.pending.lock();
        if self.inner.closing.load(Ordering::Acquire) {
            warn!(target: "storage_facade::lifecycle", name = %self.name(), key = name, "write refused during deletion");
            return Err(Error::deleted(self.name()));
        }
        let previous = pending.get(name).map(|entry| entry.outcome.clone());
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let key = name.to_string();
        let task = runtime.spawn(async move {
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    debug!(target: "storage_facade::ops", name = %key, error = %e, "superseded operation failed");
                }
            }
            let result = inner.apply(&key, op).await;
            if result.is_ok() {
                inner.forget(&key, seq);
            }
            result
        });

        let key = name.to_string();
        let outcome = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(Error::internal(format!(
                    "pending operation on '{}' did not complete: {}",
                    key, e
                ))),
            }
        }
        .boxed()
        .shared();
        pending.insert(name.to_string(), PendingEntry { seq, outcome });
        Ok(())
    }

    // ========================================================================
    // Method surface
    // ========================================================================

    /// Run backend init if it has not run, and return its outcome
    pub async fn open(&self) -> Result<Success> {
        self.inner.ready().await
    }

    /// Remove every entry, discarding pending operations
    pub async fn clear(&self) -> Result<()> {
        self.inner.ready().await?;
        self.inner.drain().await;
        self.inner.backend.clear().await?;
        Ok(())
    }

    /// Number of entries, including ones stored as absent
    pub async fn size(&self) -> Result<usize> {
        self.inner.ready().await?;
        self.inner.settle().await;
        self.inner.backend.count().await
    }

    /// Key at `index` in backend enumeration order
    pub async fn key(&self, index: usize) -> Result<Option<String>> {
        self.inner.ready().await?;
        self.inner.settle().await;
        self.inner.backend.key_at(index).await
    }

    /// Every entry as `(key, value)` in backend enumeration order
    pub async fn entries(&self) -> Result<Vec<(String, Option<Value>)>> {
        self.inner.ready().await?;
        self.inner.settle().await;

        let backend = self.inner.backend.as_ref();
        let count = backend.count().await?;
        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            if let Some(key) = backend.key_at(index).await? {
                let value = backend.read(&key).await?;
                entries.push((key, value));
            }
        }
        Ok(entries)
    }

    /// Tear down the storage; every later operation fails with `Deleted`.
    ///
    /// Writes issued once draining has started are refused. If the backend
    /// teardown fails the facade accepts writes again.
    pub async fn delete_storage(&self) -> Result<()> {
        self.inner.ready().await?;
        self.inner.closing.store(true, Ordering::Release);
        self.inner.drain().await;
        if let Err(e) = self.inner.backend.delete_everything().await {
            self.inner.closing.store(false, Ordering::Release);
            return Err(e);
        }
        self.inner.state.mark_deleted();
        Ok(())
    }

    // ========================================================================
    // Defaults
    // ========================================================================

    /// Merge `pairs` into the defaults; later keys overwrite
    pub async fn add_default<I, K, V>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let pairs = collect_pairs(pairs);
        self.inner.ready().await?;
        self.inner.state.add_default(pairs);
        Ok(())
    }

    /// Replace the defaults with `pairs`
    pub async fn set_default<I, K, V>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let pairs = collect_pairs(pairs);
        self.inner.ready().await?;
        self.inner.state.set_default(pairs);
        Ok(())
    }

    /// Copy of the current defaults
    pub async fn get_default(&self) -> Result<Map> {
        self.inner.ready().await?;
        Ok(self.inner.state.get_default())
    }

    /// Drop every default
    pub async fn clear_default(&self) -> Result<()> {
        self.inner.ready().await?;
        self.inner.state.clear_default();
        Ok(())
    }
}
