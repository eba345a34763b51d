//! MemoryBackend: insertion-ordered in-memory backend
//!
//! This module implements the Backend contract using:
//! - `HashMap<String, Slot>` for point lookups
//! - `BTreeMap<u64, String>` keyed by insertion sequence for enumeration
//! - `parking_lot::RwLock` for thread-safe access
//! - optional simulated latency (with jitter) on the async operations
//!
//! # Design Notes
//!
//! - **Insertion order**: overwriting a key keeps its position; removing and
//!   re-adding moves it to the end. Reads, writes and removals are
//!   O(log n); `key_at(i)` walks the first `i` keys of the order.
//! - **Shared handle**: clones share the same entries, so a test can keep a
//!   clone to inspect what a facade wrote.
//! - **Owned copies**: values are cloned on the way in and out.
//! - **Teardown marker**: `delete_everything` clears the data and leaves an
//!   `isDeleted = true` entry behind.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::Rng;
use tracing::debug;

use storage_facade_core::{Backend, InitConfig, Result, Success, Value};

/// Key written by `delete_everything` so teardown is observable.
pub const DELETED_MARKER_KEY: &str = "isDeleted";

#[derive(Debug)]
struct Slot {
    seq: u64,
    value: Option<Value>,
}

#[derive(Debug, Default)]
struct MemoryState {
    slots: HashMap<String, Slot>,
    order: BTreeMap<u64, String>,
    next_seq: u64,
    storage_name: Option<String>,
}

impl MemoryState {
    fn put(&mut self, key: &str, value: Option<Value>) {
        if let Some(slot) = self.slots.get_mut(key) {
            slot.value = value;
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.to_string());
        self.slots.insert(key.to_string(), Slot { seq, value });
    }

    fn take(&mut self, key: &str) {
        if let Some(slot) = self.slots.remove(key) {
            self.order.remove(&slot.seq);
        }
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.order.clear();
    }

    fn entries(&self) -> Vec<(String, Option<Value>)> {
        self.order
            .values()
            .map(|key| {
                let value = self.slots.get(key).and_then(|slot| slot.value.clone());
                (key.clone(), value)
            })
            .collect()
    }
}

/// In-memory backend supporting both blocking and suspendable facades.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<RwLock<MemoryState>>,
    latency: Option<(Duration, Duration)>,
}

impl MemoryBackend {
    /// Create a new empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every async operation by a random duration in `min..=max`
    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.latency = Some((lo, hi));
        self
    }

    /// Instance name recorded at init, if init ran
    pub fn storage_name(&self) -> Option<String> {
        self.state.read().storage_name.clone()
    }

    /// Inspect an entry without going through a facade.
    ///
    /// Returns `None` for a missing key and `Some(None)` for a key stored
    /// as absent.
    pub fn peek(&self, key: &str) -> Option<Option<Value>> {
        self.state.read().slots.get(key).map(|slot| slot.value.clone())
    }

    /// All entries in enumeration order
    pub fn snapshot(&self) -> Vec<(String, Option<Value>)> {
        self.state.read().entries()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.state.read().slots.len()
    }

    /// True if the backend holds no entries
    pub fn is_empty(&self) -> bool {
        self.state.read().slots.is_empty()
    }

    async fn simulate_latency(&self) {
        if let Some((min, max)) = self.latency {
            let delay = {
                let lo = min.as_micros() as u64;
                let hi = max.as_micros() as u64;
                Duration::from_micros(rand::thread_rng().gen_range(lo..=hi))
            };
            tokio::time::sleep(delay).await;
        }
    }

    fn init_now(&self, config: &InitConfig) -> Result<Success> {
        debug!(target: "storage_facade::memory", name = %config.name, mode = %config.mode, "memory backend initialized");
        self.state.write().storage_name = Some(config.name.clone());
        Ok(Success)
    }

    fn read_now(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.peek(key).flatten())
    }

    fn write_now(&self, key: &str, value: Option<Value>) -> Result<Success> {
        self.state.write().put(key, value);
        Ok(Success)
    }

    fn remove_now(&self, key: &str) -> Result<Success> {
        self.state.write().take(key);
        Ok(Success)
    }

    fn clear_now(&self) -> Result<Success> {
        self.state.write().clear();
        Ok(Success)
    }

    fn count_now(&self) -> Result<usize> {
        Ok(self.len())
    }

    fn key_at_now(&self, index: usize) -> Result<Option<String>> {
        Ok(self
            .state
            .read()
            .order
            .values()
            .nth(index)
            .cloned())
    }

    fn delete_everything_now(&self) -> Result<Success> {
        let mut state = self.state.write();
        state.clear();
        state.put(DELETED_MARKER_KEY, Some(Value::Bool(true)));
        Ok(Success)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn interface_name(&self) -> &str {
        "MemoryBackend"
    }

    async fn init(&self, config: &InitConfig) -> Result<Success> {
        self.simulate_latency().await;
        self.init_now(config)
    }

    async fn read(&self, key: &str) -> Result<Option<Value>> {
        self.simulate_latency().await;
        self.read_now(key)
    }

    async fn write(&self, key: &str, value: Option<Value>) -> Result<Success> {
        self.simulate_latency().await;
        self.write_now(key, value)
    }

    async fn remove(&self, key: &str) -> Result<Success> {
        self.simulate_latency().await;
        self.remove_now(key)
    }

    async fn clear(&self) -> Result<Success> {
        self.simulate_latency().await;
        self.clear_now()
    }

    async fn count(&self) -> Result<usize> {
        self.simulate_latency().await;
        self.count_now()
    }

    async fn key_at(&self, index: usize) -> Result<Option<String>> {
        self.simulate_latency().await;
        self.key_at_now(index)
    }

    async fn delete_everything(&self) -> Result<Success> {
        self.simulate_latency().await;
        self.delete_everything_now()
    }

    fn init_blocking(&self, config: &InitConfig) -> Result<Success> {
        self.init_now(config)
    }

    fn read_blocking(&self, key: &str) -> Result<Option<Value>> {
        self.read_now(key)
    }

    fn write_blocking(&self, key: &str, value: Option<Value>) -> Result<Success> {
        self.write_now(key, value)
    }

    fn remove_blocking(&self, key: &str) -> Result<Success> {
        self.remove_now(key)
    }

    fn clear_blocking(&self) -> Result<Success> {
        self.clear_now()
    }

    fn count_blocking(&self) -> Result<usize> {
        self.count_now()
    }

    fn key_at_blocking(&self, index: usize) -> Result<Option<String>> {
        self.key_at_now(index)
    }

    fn delete_everything_blocking(&self) -> Result<Success> {
        self.delete_everything_now()
    }
}
