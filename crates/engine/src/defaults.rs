//! Per-facade default values
//!
//! Defaults answer reads of names the backend has no entry for. They live in
//! memory only and are never written to the backend.

use parking_lot::Mutex;

use storage_facade_core::{Map, Value};

/// In-memory default layer of one facade
#[derive(Debug, Default)]
pub struct DefaultStore {
    map: Mutex<Map>,
}

impl DefaultStore {
    /// Empty default layer
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `pairs` into the current defaults; later keys overwrite
    pub fn merge(&self, pairs: Map) {
        self.map.lock().extend(pairs);
    }

    /// Replace the whole default layer
    pub fn replace(&self, pairs: Map) {
        *self.map.lock() = pairs;
    }

    /// Independent copy of the current defaults
    pub fn snapshot(&self) -> Map {
        self.map.lock().clone()
    }

    /// Drop every default
    pub fn clear(&self) {
        self.map.lock().clear();
    }

    /// Copy of the default for `name`
    pub fn get(&self, name: &str) -> Option<Value> {
        self.map.lock().get(name).cloned()
    }

    /// `value` if present, the default for `name` otherwise
    pub fn fill(&self, name: &str, value: Option<Value>) -> Option<Value> {
        match value {
            Some(value) => Some(value),
            None => self.get(name),
        }
    }
}

/// Collect caller-supplied pairs into a map, keeping the last duplicate
pub(crate) fn collect_pairs<I, K, V>(pairs: I) -> Map
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
