//! Reserved method names
//!
//! The facade mixes arbitrary property names with a fixed method surface.
//! Names in the method surface are reserved: they always resolve to the
//! method and are never forwarded to a backend as data keys.
//!
//! Comparison is exact and case-sensitive, so `"size"` is reserved but
//! `"Size"` is an ordinary property.

use crate::config::Mode;

/// Default instance name when none is configured
pub const DEFAULT_STORAGE_NAME: &str = "storage";

/// A method of the fixed facade surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Explicit wait for initialization (suspendable mode only)
    Open,
    /// Remove all entries
    Clear,
    /// Number of entries
    Size,
    /// Key at an ordinal index
    Key,
    /// Ordered `(key, value)` enumeration
    Entries,
    /// Tear down the whole storage
    DeleteStorage,
    /// Merge into the default mapping
    AddDefault,
    /// Replace the default mapping
    SetDefault,
    /// Copy of the default mapping
    GetDefault,
    /// Empty the default mapping
    ClearDefault,
}

impl Method {
    /// All methods in declaration order
    pub const ALL: [Method; 10] = [
        Method::Open,
        Method::Clear,
        Method::Size,
        Method::Key,
        Method::Entries,
        Method::DeleteStorage,
        Method::AddDefault,
        Method::SetDefault,
        Method::GetDefault,
        Method::ClearDefault,
    ];

    /// The property name this method occupies
    pub fn name(&self) -> &'static str {
        match self {
            Method::Open => "open",
            Method::Clear => "clear",
            Method::Size => "size",
            Method::Key => "key",
            Method::Entries => "entries",
            Method::DeleteStorage => "delete_storage",
            Method::AddDefault => "add_default",
            Method::SetDefault => "set_default",
            Method::GetDefault => "get_default",
            Method::ClearDefault => "clear_default",
        }
    }

    /// Whether this method exists on a facade running in `mode`
    pub fn available_in(&self, mode: Mode) -> bool {
        match self {
            Method::Open => mode == Mode::Suspendable,
            _ => true,
        }
    }

    /// Resolve a property name to a method of the `mode` surface
    pub fn resolve(name: &str, mode: Mode) -> Option<Method> {
        Method::ALL
            .iter()
            .copied()
            .find(|m| m.available_in(mode) && m.name() == name)
    }

    /// Names reserved on a facade running in `mode`
    pub fn reserved_names(mode: Mode) -> impl Iterator<Item = &'static str> {
        Method::ALL
            .into_iter()
            .filter(move |m| m.available_in(mode))
            .map(|m| m.name())
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// True if `name` is a method of the `mode` surface
pub fn is_reserved(name: &str, mode: Mode) -> bool {
    Method::resolve(name, mode).is_some()
}
