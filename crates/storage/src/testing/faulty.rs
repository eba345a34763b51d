//! Fault-injecting backend

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use storage_facade_core::{Backend, Error, InitConfig, Mode, Result, Success, Value};

use crate::memory::MemoryBackend;

/// Backend operation that a [`FaultyBackend`] fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    /// `init` / `init_blocking`
    Init,
    /// `read` / `read_blocking`
    Read,
    /// `write` / `write_blocking`
    Write,
    /// `remove` / `remove_blocking`
    Remove,
    /// `clear` / `clear_blocking`
    Clear,
    /// `count` / `count_blocking`
    Count,
    /// `key_at` / `key_at_blocking`
    Key,
    /// `delete_everything` / `delete_everything_blocking`
    Teardown,
}

impl FaultPoint {
    /// Short operation name used in the injected error message
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultPoint::Init => "init",
            FaultPoint::Read => "read",
            FaultPoint::Write => "write",
            FaultPoint::Remove => "remove",
            FaultPoint::Clear => "clear",
            FaultPoint::Count => "count",
            FaultPoint::Key => "key",
            FaultPoint::Teardown => "teardown",
        }
    }

    /// The error a faulty backend returns at this point
    pub fn error(&self) -> Error {
        Error::backend(format!("Error on {}", self.as_str()))
    }
}

/// A [`MemoryBackend`] that fails one operation.
///
/// Counts init invocations so tests can assert init ran exactly once.
#[derive(Debug, Clone)]
pub struct FaultyBackend {
    inner: MemoryBackend,
    fault: FaultPoint,
    preferred_mode: Mode,
    init_calls: Arc<AtomicUsize>,
}

impl FaultyBackend {
    /// Fail `fault` on top of a fresh memory backend
    pub fn failing(fault: FaultPoint) -> Self {
        Self::wrap(MemoryBackend::new(), fault)
    }

    /// Fail `fault` on top of an existing memory backend
    pub fn wrap(inner: MemoryBackend, fault: FaultPoint) -> Self {
        Self {
            inner,
            fault,
            preferred_mode: Mode::Suspendable,
            init_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report `mode` as the preferred mode
    pub fn prefer(mut self, mode: Mode) -> Self {
        self.preferred_mode = mode;
        self
    }

    /// How many times init (either variant) has been invoked
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    /// The wrapped memory backend
    pub fn inner(&self) -> &MemoryBackend {
        &self.inner
    }

    fn check(&self, point: FaultPoint) -> Result<()> {
        if self.fault == point {
            Err(point.error())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Backend for FaultyBackend {
    fn interface_name(&self) -> &str {
        "FaultyBackend"
    }

    fn preferred_mode(&self) -> Mode {
        self.preferred_mode
    }

    async fn init(&self, config: &InitConfig) -> Result<Success> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.check(FaultPoint::Init)?;
        self.inner.init(config).await
    }

    async fn read(&self, key: &str) -> Result<Option<Value>> {
        self.check(FaultPoint::Read)?;
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, value: Option<Value>) -> Result<Success> {
        self.check(FaultPoint::Write)?;
        self.inner.write(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<Success> {
        self.check(FaultPoint::Remove)?;
        self.inner.remove(key).await
    }

    async fn clear(&self) -> Result<Success> {
        self.check(FaultPoint::Clear)?;
        self.inner.clear().await
    }

    async fn count(&self) -> Result<usize> {
        self.check(FaultPoint::Count)?;
        self.inner.count().await
    }

    async fn key_at(&self, index: usize) -> Result<Option<String>> {
        self.check(FaultPoint::Key)?;
        self.inner.key_at(index).await
    }

    async fn delete_everything(&self) -> Result<Success> {
        self.check(FaultPoint::Teardown)?;
        self.inner.delete_everything().await
    }

    fn init_blocking(&self, config: &InitConfig) -> Result<Success> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.check(FaultPoint::Init)?;
        self.inner.init_blocking(config)
    }

    fn read_blocking(&self, key: &str) -> Result<Option<Value>> {
        self.check(FaultPoint::Read)?;
        self.inner.read_blocking(key)
    }

    fn write_blocking(&self, key: &str, value: Option<Value>) -> Result<Success> {
        self.check(FaultPoint::Write)?;
        self.inner.write_blocking(key, value)
    }

    fn remove_blocking(&self, key: &str) -> Result<Success> {
        self.check(FaultPoint::Remove)?;
        self.inner.remove_blocking(key)
    }

    fn clear_blocking(&self) -> Result<Success> {
        self.check(FaultPoint::Clear)?;
        self.inner.clear_blocking()
    }

    fn count_blocking(&self) -> Result<usize> {
        self.check(FaultPoint::Count)?;
        self.inner.count_blocking()
    }

    fn key_at_blocking(&self, index: usize) -> Result<Option<String>> {
        self.check(FaultPoint::Key)?;
        self.inner.key_at_blocking(index)
    }

    fn delete_everything_blocking(&self) -> Result<Success> {
        self.check(FaultPoint::Teardown)?;
        self.inner.delete_everything_blocking()
    }
}
