//! Lifecycle state shared by both facade flavours

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use storage_facade_core::{Error, InitConfig, Map, Mode, Result};

use crate::defaults::DefaultStore;

/// Observable lifecycle of a facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacadeStatus {
    /// No operation has triggered init yet
    Uninitialized,
    /// Backend init is in flight
    Initializing,
    /// Init succeeded; operations reach the backend
    Ready,
    /// Init failed; every gated operation replays the failure
    Failed,
    /// `delete_storage` completed; every operation fails
    Deleted,
}

impl FacadeStatus {
    /// Lowercase name for logs and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            FacadeStatus::Uninitialized => "uninitialized",
            FacadeStatus::Initializing => "initializing",
            FacadeStatus::Ready => "ready",
            FacadeStatus::Failed => "failed",
            FacadeStatus::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for FacadeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a facade carries apart from its backend and init gate.
#[derive(Debug)]
pub(crate) struct FacadeState {
    init_config: InitConfig,
    defaults: DefaultStore,
    deleted: AtomicBool,
}

impl FacadeState {
    pub(crate) fn new(init_config: InitConfig) -> Self {
        Self {
            init_config,
            defaults: DefaultStore::new(),
            deleted: AtomicBool::new(false),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.init_config.name
    }

    pub(crate) fn mode(&self) -> Mode {
        self.init_config.mode
    }

    pub(crate) fn init_config(&self) -> &InitConfig {
        &self.init_config
    }

    pub(crate) fn defaults(&self) -> &DefaultStore {
        &self.defaults
    }

    pub(crate) fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    /// Fail with `Deleted` once the storage has been torn down
    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.is_deleted() {
            warn!(target: "storage_facade::lifecycle", name = %self.name(), "access to deleted storage");
            return Err(Error::deleted(self.name()));
        }
        Ok(())
    }

    pub(crate) fn mark_deleted(&self) {
        self.deleted.store(true, Ordering::Release);
        self.defaults.clear();
        info!(target: "storage_facade::lifecycle", name = %self.name(), "storage deleted");
    }

    pub(crate) fn add_default(&self, pairs: Map) {
        self.defaults.merge(pairs);
    }

    pub(crate) fn set_default(&self, pairs: Map) {
        self.defaults.replace(pairs);
    }

    pub(crate) fn get_default(&self) -> Map {
        self.defaults.snapshot()
    }

    pub(crate) fn clear_default(&self) {
        self.defaults.clear();
    }
}
