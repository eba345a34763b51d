//! Init gates
//!
//! A gate runs backend init exactly once per facade and memoizes the outcome.
//! Success lets operations through; a failure is wrapped in
//! [`Error::InitFailure`] and replayed, identical, to every later caller.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use storage_facade_core::{Backend, Error, InitConfig, Result, Success};

fn record(config: &InitConfig, interface: &str, outcome: &Result<Success>) {
    match outcome {
        Ok(_) => {
            debug!(target: "storage_facade::init", name = %config.name, backend = interface, "storage initialized");
        }
        Err(e) => {
            warn!(target: "storage_facade::init", name = %config.name, backend = interface, error = %e, "storage init failed");
        }
    }
}

/// Gate for blocking facades.
///
/// Concurrent first callers block on the cell until init returns.
#[derive(Debug, Default)]
pub(crate) struct BlockingGate {
    outcome: once_cell::sync::OnceCell<Result<Success>>,
}

impl BlockingGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Run init on first call; replay the memoized outcome afterwards
    pub(crate) fn ensure(&self, backend: &dyn Backend, config: &InitConfig) -> Result<Success> {
        self.outcome
            .get_or_init(|| {
                debug!(target: "storage_facade::init", name = %config.name, mode = %config.mode, "initializing storage");
                let result = backend.init_blocking(config).map_err(Error::init_failure);
                record(config, backend.interface_name(), &result);
                result
            })
            .clone()
    }

    pub(crate) fn peek(&self) -> Option<&Result<Success>> {
        self.outcome.get()
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.outcome.get().is_some()
    }
}

/// Gate for suspendable facades.
///
/// Callers that arrive while init is in flight wait on the same cell. If the
/// task driving init is cancelled, the next caller starts it again.
#[derive(Debug, Default)]
pub(crate) struct AsyncGate {
    cell: OnceCell<Result<Success>>,
    started: AtomicBool,
}

impl AsyncGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Await init, starting it if nobody has
    pub(crate) async fn ensure(&self, backend: &dyn Backend, config: &InitConfig) -> Result<Success> {
        self.cell
            .get_or_init(|| async {
                self.started.store(true, Ordering::Release);
                debug!(target: "storage_facade::init", name = %config.name, mode = %config.mode, "initializing storage");
                let result = backend.init(config).await.map_err(Error::init_failure);
                record(config, backend.interface_name(), &result);
                result
            })
            .await
            .clone()
    }

    /// Outcome if init has already settled; never starts init
    pub(crate) fn peek(&self) -> Option<&Result<Success>> {
        self.cell.get()
    }

    /// The memoized failure, if init settled with one
    pub(crate) fn failure(&self) -> Option<Error> {
        match self.cell.get() {
            Some(Err(e)) => Some(e.clone()),
            _ => None,
        }
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub(crate) fn is_initializing(&self) -> bool {
        self.started.load(Ordering::Acquire) && !self.cell.initialized()
    }
}
