//! Error types for storage facades
//!
//! A single [`Error`] enum covers backend failures and facade state errors.
//! We use `thiserror` for the `Display` and `Error` implementations.
//!
//! Errors are `Clone + PartialEq` because a failed initialization is
//! remembered and replayed on every later access: the facade hands out a
//! clone of the recorded error, and callers can compare two failures for
//! identity.
//!
//! # Categories
//!
//! | Variant | Raised by | Sticky |
//! |---------|-----------|--------|
//! | `NotImplemented` | backend lacks a capability | no |
//! | `InitFailure` | initialization gate | yes |
//! | `Backend` | any backend operation | no |
//! | `Deleted` | facade after `delete_storage` | yes |
//! | `InvalidConfig` | configuration loading | no |
//! | `Internal` | async plumbing | no |

use serde::{Deserialize, Serialize};

/// Result type alias for facade and backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for storage facades and backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    /// Backend does not provide the requested operation
    #[error("storage-facade: backend '{interface}': '{method}' is not implemented!")]
    NotImplemented {
        /// Backend name as reported by `Backend::interface_name`
        interface: String,
        /// Name of the missing operation
        method: String,
    },

    /// Backend initialization failed; replayed on every later access
    #[error("storage initialization failed: {cause}")]
    InitFailure {
        /// The error returned by the backend's init operation
        #[source]
        cause: Box<Error>,
    },

    /// A backend read/write/remove/clear/count/key/teardown failed
    #[error("backend error: {message}")]
    Backend {
        /// Backend-supplied description
        message: String,
    },

    /// The storage instance was torn down with `delete_storage`
    #[error("storage '{name}' was deleted")]
    Deleted {
        /// Instance name of the deleted storage
        name: String,
    },

    /// Configuration could not be parsed or validated
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal plumbing failure (missing runtime, panicked background task)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a backend operation failure
    pub fn backend(message: impl Into<String>) -> Self {
        Error::Backend {
            message: message.into(),
        }
    }

    /// Create a not-implemented error for `interface`'s `method`
    pub fn not_implemented(interface: impl Into<String>, method: impl Into<String>) -> Self {
        Error::NotImplemented {
            interface: interface.into(),
            method: method.into(),
        }
    }

    /// Wrap an init error so it can be replayed
    pub fn init_failure(cause: Error) -> Self {
        Error::InitFailure {
            cause: Box::new(cause),
        }
    }

    /// Create a deleted-storage access error
    pub fn deleted(name: impl Into<String>) -> Self {
        Error::Deleted { name: name.into() }
    }

    /// Create a configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    /// True for a replayed initialization failure
    pub fn is_init_failure(&self) -> bool {
        matches!(self, Error::InitFailure { .. })
    }

    /// True for access to a deleted storage
    pub fn is_deleted(&self) -> bool {
        matches!(self, Error::Deleted { .. })
    }

    /// True when the backend lacks the operation
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Error::NotImplemented { .. })
    }

    /// True for an ordinary backend operation failure
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Backend { .. })
    }

    /// The innermost error, unwrapping any `InitFailure` layers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::InitFailure { cause } => cause.root_cause(),
            other => other,
        }
    }
}
