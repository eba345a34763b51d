//! Facade construction
//!
//! [`create_storage`] turns a [`Setup`] into a facade running in the setup's
//! effective mode.

use storage_facade_core::Mode;

use crate::blocking::StorageFacade;
use crate::setup::Setup;
use crate::state::FacadeStatus;
use crate::suspendable::AsyncStorageFacade;

/// A facade in either mode
#[derive(Debug)]
pub enum Storage {
    /// Blocking facade
    Blocking(StorageFacade),
    /// Suspendable facade
    Suspendable(AsyncStorageFacade),
}

impl Storage {
    /// Mode the facade runs in
    pub fn mode(&self) -> Mode {
        match self {
            Storage::Blocking(_) => Mode::Blocking,
            Storage::Suspendable(_) => Mode::Suspendable,
        }
    }

    /// Instance name handed to the backend
    pub fn name(&self) -> &str {
        match self {
            Storage::Blocking(s) => s.name(),
            Storage::Suspendable(s) => s.name(),
        }
    }

    /// Current lifecycle state
    pub fn status(&self) -> FacadeStatus {
        match self {
            Storage::Blocking(s) => s.status(),
            Storage::Suspendable(s) => s.status(),
        }
    }

    /// The blocking facade, if this is one
    pub fn as_blocking(&self) -> Option<&StorageFacade> {
        match self {
            Storage::Blocking(s) => Some(s),
            Storage::Suspendable(_) => None,
        }
    }

    /// The suspendable facade, if this is one
    pub fn as_suspendable(&self) -> Option<&AsyncStorageFacade> {
        match self {
            Storage::Blocking(_) => None,
            Storage::Suspendable(s) => Some(s),
        }
    }

    /// Unwrap a blocking facade, handing the storage back otherwise
    pub fn into_blocking(self) -> std::result::Result<StorageFacade, Storage> {
        match self {
            Storage::Blocking(s) => Ok(s),
            other => Err(other),
        }
    }

    /// Unwrap a suspendable facade, handing the storage back otherwise
    pub fn into_suspendable(self) -> std::result::Result<AsyncStorageFacade, Storage> {
        match self {
            Storage::Suspendable(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl From<StorageFacade> for Storage {
    fn from(facade: StorageFacade) -> Self {
        Storage::Blocking(facade)
    }
}

impl From<AsyncStorageFacade> for Storage {
    fn from(facade: AsyncStorageFacade) -> Self {
        Storage::Suspendable(facade)
    }
}

/// Build a facade in the setup's effective mode.
///
/// No backend operation runs here; init waits for the first operation.
pub fn create_storage(setup: Setup) -> Storage {
    match setup.effective_mode() {
        Mode::Blocking => Storage::Blocking(StorageFacade::new(setup)),
        Mode::Suspendable => Storage::Suspendable(AsyncStorageFacade::new(setup)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage_facade_storage::testing::{FaultPoint, FaultyBackend};
    use storage_facade_storage::MemoryBackend;

    #[test]
    fn test_mode_follows_setup() {
        let storage = create_storage(Setup::new(MemoryBackend::new()).mode(Mode::Blocking));
        assert_eq!(storage.mode(), Mode::Blocking);
        assert!(storage.as_blocking().is_some());
        assert!(storage.as_suspendable().is_none());
    }

    #[test]
    fn test_mode_follows_backend_preference() {
        let backend = FaultyBackend::failing(FaultPoint::Teardown).prefer(Mode::Blocking);
        let storage = create_storage(Setup::new(backend));
        assert_eq!(storage.mode(), Mode::Blocking);

        let storage = create_storage(Setup::new(MemoryBackend::new()));
        assert_eq!(storage.mode(), Mode::Suspendable);
    }

    #[test]
    fn test_creation_does_not_touch_backend() {
        let backend = FaultyBackend::failing(FaultPoint::Init);
        let storage = create_storage(Setup::new(backend.clone()).name("settings"));

        assert_eq!(storage.name(), "settings");
        assert_eq!(storage.status(), FacadeStatus::Uninitialized);
        assert_eq!(backend.init_calls(), 0);
    }

    #[test]
    fn test_into_conversions() {
        let storage = create_storage(Setup::new(MemoryBackend::new()).mode(Mode::Suspendable));
        let storage = storage.into_blocking().unwrap_err();
        let facade = storage.into_suspendable().unwrap();
        assert_eq!(facade.mode(), Mode::Suspendable);

        let storage: Storage = facade.into();
        assert_eq!(storage.mode(), Mode::Suspendable);
    }
}
