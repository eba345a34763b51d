//! Facade setup
//!
//! A [`Setup`] pairs a backend with a [`FacadeConfig`]. The effective mode is
//! the configured one, or the backend's preferred mode when none is set.

use std::path::Path;

use storage_facade_core::{Backend, FacadeConfig, InitConfig, Mode, Result};

/// Backend plus configuration, consumed when a facade is created
pub struct Setup {
    backend: Box<dyn Backend>,
    config: FacadeConfig,
}

impl std::fmt::Debug for Setup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Setup")
            .field("backend", &self.backend.interface_name())
            .field("config", &self.config)
            .finish()
    }
}

impl Setup {
    /// Default configuration: instance name `"storage"`, backend-preferred mode
    pub fn new(backend: impl Backend) -> Self {
        Self {
            backend: Box::new(backend),
            config: FacadeConfig::default(),
        }
    }

    /// Use an already-built configuration
    pub fn from_config(backend: impl Backend, config: FacadeConfig) -> Self {
        Self {
            backend: Box::new(backend),
            config,
        }
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read or parsed.
    pub fn from_file(backend: impl Backend, path: &Path) -> Result<Self> {
        let config = FacadeConfig::from_file(path)?;
        Ok(Self::from_config(backend, config))
    }

    /// Set the instance name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Force the operating mode
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = Some(mode);
        self
    }

    /// Add a backend-specific option
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.options.insert(key.into(), value.into());
        self
    }

    /// The configuration as it stands
    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// Mode a facade built from this setup will run in
    pub fn effective_mode(&self) -> Mode {
        self.config
            .mode
            .unwrap_or_else(|| self.backend.preferred_mode())
    }

    pub(crate) fn into_parts(self, mode: Mode) -> (Box<dyn Backend>, InitConfig) {
        let init_config = self.config.init_config(mode);
        (self.backend, init_config)
    }
}
