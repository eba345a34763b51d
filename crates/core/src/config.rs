//! Facade configuration
//!
//! A facade is configured with an instance name, an operating mode and an
//! open-ended set of backend-specific options. The same settings can be
//! loaded from a TOML file:
//!
//! ```toml
//! # Instance name handed to the backend at init (default: "storage")
//! name = "settings"
//!
//! # "suspendable" (async, default) or "blocking"
//! mode = "blocking"
//!
//! # Backend-specific options, passed through untouched
//! [options]
//! path = "/var/lib/app/settings"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::names::DEFAULT_STORAGE_NAME;

/// Config file name conventionally used next to application data.
pub const CONFIG_FILE_NAME: &str = "storage-facade.toml";

/// Operating mode of a facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Every operation runs to completion synchronously
    #[serde(alias = "sync")]
    Blocking,
    /// Every backend-touching operation is async
    #[default]
    #[serde(alias = "async")]
    Suspendable,
}

impl Mode {
    /// Lowercase name as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Blocking => "blocking",
            Mode::Suspendable => "suspendable",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blocking" | "sync" => Ok(Mode::Blocking),
            "suspendable" | "async" => Ok(Mode::Suspendable),
            other => Err(Error::invalid_config(format!(
                "unknown mode '{}', expected \"blocking\" or \"suspendable\"",
                other
            ))),
        }
    }
}

/// What a backend receives in its init operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitConfig {
    /// Instance name
    pub name: String,
    /// Mode the facade runs in
    pub mode: Mode,
    /// Backend-specific options
    pub options: BTreeMap<String, String>,
}

impl InitConfig {
    /// Look up a backend-specific option
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

/// Facade configuration loaded from TOML or built in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacadeConfig {
    /// Instance name (default: `"storage"`)
    #[serde(default = "default_name")]
    pub name: String,
    /// Operating mode; `None` defers to the backend's preferred mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// Backend-specific options
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

fn default_name() -> String {
    DEFAULT_STORAGE_NAME.to_string()
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            mode: None,
            options: BTreeMap::new(),
        }
    }
}

impl FacadeConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# storage-facade configuration
#
# Instance name handed to the backend at init (default: "storage")
name = "storage"

# Operating mode: "suspendable" (async) or "blocking".
# Leave unset to use the backend's preferred mode.
# mode = "suspendable"

# Backend-specific options, passed through untouched.
# [options]
# path = "/var/lib/app/storage"
"#
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the content is not valid TOML or has an
    /// unknown mode or an empty name.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FacadeConfig = toml::from_str(content)
            .map_err(|e| Error::invalid_config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::InvalidConfig(msg) => {
                Error::invalid_config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::internal(format!(
                    "failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::internal(format!("failed to serialize config: {}", e)))
    }

    /// Reject configurations no backend could use
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid_config("instance name must not be empty"));
        }
        Ok(())
    }

    /// Resolve into the config a backend receives, given the effective mode
    pub fn init_config(&self, mode: Mode) -> InitConfig {
        InitConfig {
            name: self.name.clone(),
            mode,
            options: self.options.clone(),
        }
    }
}
