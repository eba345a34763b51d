//! Integration tests for the suspendable facade
//!
//! Focus on what only the async flavour does:
//! - write-then-read adoption of pending outcomes
//! - per-key ordering of issued writes, including around reads in flight
//! - pruning of settled pending entries
//! - single init shared by concurrent first callers
//! - settling of pending work before enumeration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use storage_facade_core::{Backend, Error, InitConfig, Mode, Result, Success, Value};
use storage_facade_engine::{create_storage, AsyncStorageFacade, FacadeStatus, Setup};
use storage_facade_storage::testing::{FaultPoint, FaultyBackend};
use storage_facade_storage::MemoryBackend;

fn slow_backend() -> MemoryBackend {
    MemoryBackend::new().with_latency(Duration::from_millis(1), Duration::from_millis(15))
}

fn suspendable(backend: MemoryBackend) -> AsyncStorageFacade {
    AsyncStorageFacade::new(Setup::new(backend))
}

/// Memory backend whose first write sleeps before landing
struct StalledFirstWrite {
    inner: MemoryBackend,
    stall: Duration,
    stalled: AtomicBool,
}

impl StalledFirstWrite {
    fn new(inner: MemoryBackend, stall: Duration) -> Self {
        Self {
            inner,
            stall,
            stalled: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Backend for StalledFirstWrite {
    fn interface_name(&self) -> &str {
        "StalledFirstWrite"
    }

    async fn init(&self, config: &InitConfig) -> Result<Success> {
        self.inner.init(config).await
    }

    async fn read(&self, key: &str) -> Result<Option<Value>> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, value: Option<Value>) -> Result<Success> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(self.stall).await;
        }
        self.inner.write(key, value).await
    }
}

// ============================================================================
// Pending-write adoption
// ============================================================================

#[tokio::test]
async fn test_write_then_read_observes_the_write() {
    let storage = suspendable(slow_backend());

    for i in 0..20 {
        storage.set("counter", i).unwrap();
        assert_eq!(storage.get("counter").await.unwrap(), Some(Value::Int(i64::from(i))));
    }
}

#[tokio::test]
async fn test_many_keys_in_flight() {
    let backend = slow_backend();
    let storage = suspendable(backend.clone());

    for i in 0..10 {
        storage.set(&format!("key{}", i), i).unwrap();
    }
    for i in 0..10 {
        assert_eq!(
            storage.get(&format!("key{}", i)).await.unwrap(),
            Some(Value::Int(i64::from(i)))
        );
    }
    assert_eq!(backend.len(), 10);
}

#[tokio::test]
async fn test_superseded_write_still_reaches_backend_in_order() {
    let backend = slow_backend();
    let storage = suspendable(backend.clone());

    storage.set("k", "first").unwrap();
    storage.set("k", "second").unwrap();
    storage.delete("k").unwrap();
    storage.set("k", "last").unwrap();

    assert_eq!(storage.get("k").await.unwrap(), Some(Value::from("last")));
    assert_eq!(backend.peek("k"), Some(Some(Value::from("last"))));
}

#[tokio::test]
async fn test_read_in_flight_keeps_write_order() {
    let backend = MemoryBackend::new();
    let storage = Arc::new(AsyncStorageFacade::new(Setup::new(StalledFirstWrite::new(
        backend.clone(),
        Duration::from_millis(50),
    ))));

    storage.set("k", 1).unwrap();
    let reader = {
        let storage = Arc::clone(&storage);
        tokio::spawn(async move { storage.get("k").await })
    };
    // let the reader start awaiting the stalled write
    tokio::time::sleep(Duration::from_millis(10)).await;
    storage.set("k", 2).unwrap();

    assert_eq!(reader.await.unwrap().unwrap(), Some(Value::Int(1)));
    assert_eq!(storage.get("k").await.unwrap(), Some(Value::Int(2)));
    assert_eq!(backend.peek("k"), Some(Some(Value::Int(2))));
    assert_eq!(storage.get("k").await.unwrap(), Some(Value::Int(2)));
}

#[tokio::test]
async fn test_interleaved_reads_and_writes_land_in_issue_order() {
    let backend = slow_backend();
    let storage = Arc::new(suspendable(backend.clone()));

    let mut readers = Vec::new();
    for i in 0..10 {
        storage.set("k", i).unwrap();
        let storage = Arc::clone(&storage);
        readers.push(tokio::spawn(async move { storage.get("k").await }));
        tokio::task::yield_now().await;
    }
    for reader in readers {
        assert!(reader.await.unwrap().unwrap().is_some());
    }

    assert_eq!(storage.get("k").await.unwrap(), Some(Value::Int(9)));
    assert_eq!(backend.peek("k"), Some(Some(Value::Int(9))));
}

#[tokio::test]
async fn test_settled_writes_leave_no_pending_entries() {
    let backend = MemoryBackend::new();
    let storage = suspendable(backend.clone());

    for i in 0..1_000 {
        storage.set(&format!("key{}", i), i).unwrap();
    }
    assert_eq!(storage.size().await.unwrap(), 1_000);
    assert_eq!(storage.pending_count(), 0);
    assert_eq!(storage.get("key999").await.unwrap(), Some(Value::Int(999)));
}

#[tokio::test]
async fn test_failed_write_stays_parked_until_read() {
    let storage = AsyncStorageFacade::new(Setup::new(FaultyBackend::failing(FaultPoint::Write)));
    storage.set("k", 1).unwrap();

    assert_eq!(storage.size().await.unwrap(), 0);
    assert_eq!(storage.pending_count(), 1);
    assert_eq!(storage.get("k").await.unwrap_err(), FaultPoint::Write.error());
    assert_eq!(storage.pending_count(), 0);
}

#[tokio::test]
async fn test_set_absent_then_read_uses_default() {
    let storage = suspendable(slow_backend());
    storage.set_default([("value", 1)]).await.unwrap();

    storage.set("value", 42).unwrap();
    assert_eq!(storage.get("value").await.unwrap(), Some(Value::Int(42)));

    storage.set("value", None).unwrap();
    assert_eq!(storage.get("value").await.unwrap(), Some(Value::Int(1)));

    storage.set("value", Value::Null).unwrap();
    assert_eq!(storage.get("value").await.unwrap(), Some(Value::Null));
}

#[tokio::test]
async fn test_write_error_surfaces_once() {
    let storage = AsyncStorageFacade::new(Setup::new(FaultyBackend::failing(FaultPoint::Write)));
    storage.add_default([("k", 0)]).await.unwrap();
    storage.set("k", 1).unwrap();

    assert_eq!(storage.get("k").await.unwrap_err(), FaultPoint::Write.error());
    assert_eq!(storage.get("k").await.unwrap(), Some(Value::Int(0)));
}

// ============================================================================
// Init gate
// ============================================================================

#[tokio::test]
async fn test_concurrent_first_access_runs_init_once() {
    let backend = FaultyBackend::failing(FaultPoint::Teardown);
    let storage = Arc::new(AsyncStorageFacade::new(Setup::new(backend.clone())));

    let mut handles = Vec::new();
    for i in 0..8 {
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            storage.get(&format!("k{}", i)).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), None);
    }

    assert_eq!(backend.init_calls(), 1);
    assert_eq!(storage.status(), FacadeStatus::Ready);
}

#[tokio::test]
async fn test_init_failure_replayed_to_pending_writes() {
    let backend = FaultyBackend::failing(FaultPoint::Init);
    let storage = AsyncStorageFacade::new(Setup::new(backend.clone()));

    // issued before init has settled, so it is accepted
    storage.set("k", 1).unwrap();
    let expected = Error::init_failure(FaultPoint::Init.error());

    assert_eq!(storage.get("k").await.unwrap_err(), expected);
    assert_eq!(storage.open().await.unwrap_err(), expected);
    assert_eq!(storage.set("k", 2).unwrap_err(), expected);
    assert_eq!(backend.init_calls(), 1);
    assert!(storage.is_initialized());
}

#[tokio::test]
async fn test_every_operation_triggers_init() {
    let backend = MemoryBackend::new();
    let storage = suspendable(backend.clone());
    storage.get_default().await.unwrap();
    assert_eq!(backend.storage_name().as_deref(), Some("storage"));

    let backend = MemoryBackend::new();
    let storage = suspendable(backend.clone());
    storage.key(0).await.unwrap();
    assert!(storage.is_initialized());
}

#[tokio::test]
async fn test_unsupported_mode_is_sticky_not_implemented() {
    use storage_facade_core::Backend;

    struct BlockingOnly;

    impl Backend for BlockingOnly {
        fn interface_name(&self) -> &str {
            "BlockingOnly"
        }
    }

    let storage = AsyncStorageFacade::new(Setup::new(BlockingOnly));
    let err = storage.open().await.unwrap_err();
    assert_eq!(
        err,
        Error::init_failure(Error::not_implemented("BlockingOnly", "init"))
    );
    assert_eq!(storage.size().await.unwrap_err(), err);
}

// ============================================================================
// Method surface
// ============================================================================

#[tokio::test]
async fn test_entries_after_delete() {
    let storage = suspendable(slow_backend());
    storage.set("a", 1).unwrap();
    storage.set("b", 2).unwrap();
    storage.delete("a").unwrap();
    storage.set("c", 3).unwrap();

    assert_eq!(
        storage.entries().await.unwrap(),
        vec![
            ("b".to_string(), Some(Value::Int(2))),
            ("c".to_string(), Some(Value::Int(3))),
        ]
    );
    assert_eq!(storage.key(1).await.unwrap().as_deref(), Some("c"));
    assert_eq!(storage.size().await.unwrap(), 2);
}

#[tokio::test]
async fn test_clear_then_read() {
    let backend = slow_backend();
    let storage = suspendable(backend.clone());
    storage.add_default([("a", 0)]).await.unwrap();
    storage.set("a", 1).unwrap();
    storage.set("b", 2).unwrap();

    storage.clear().await.unwrap();
    assert!(backend.is_empty());
    assert_eq!(storage.get("a").await.unwrap(), Some(Value::Int(0)));
    assert_eq!(storage.get("b").await.unwrap(), None);
}

#[tokio::test]
async fn test_deleted_storage_rejects_everything() {
    let storage = suspendable(slow_backend());
    storage.set("a", 1).unwrap();
    storage.delete_storage().await.unwrap();

    assert!(storage.get("a").await.unwrap_err().is_deleted());
    assert!(storage.set("a", 1).unwrap_err().is_deleted());
    assert!(storage.delete("a").unwrap_err().is_deleted());
    assert!(storage.size().await.unwrap_err().is_deleted());
    assert!(storage.key(0).await.unwrap_err().is_deleted());
    assert!(storage.clear().await.unwrap_err().is_deleted());
    assert!(storage.get_default().await.unwrap_err().is_deleted());
    assert_eq!(storage.status(), FacadeStatus::Deleted);
}

#[tokio::test]
async fn test_writes_refused_while_deletion_drains() {
    let backend =
        MemoryBackend::new().with_latency(Duration::from_millis(20), Duration::from_millis(30));
    let storage = Arc::new(suspendable(backend.clone()));
    storage.open().await.unwrap();
    storage.set("a", 1).unwrap();

    let deleter = {
        let storage = Arc::clone(&storage);
        tokio::spawn(async move { storage.delete_storage().await })
    };
    // the deleter is now waiting for the write to "a"
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert!(storage.set("b", 2).unwrap_err().is_deleted());
    assert!(storage.delete("a").unwrap_err().is_deleted());
    deleter.await.unwrap().unwrap();

    assert_eq!(backend.peek("b"), None);
    assert_eq!(backend.len(), 1);
    assert_eq!(storage.status(), FacadeStatus::Deleted);
}

#[tokio::test]
async fn test_failed_teardown_accepts_writes_again() {
    let backend = FaultyBackend::failing(FaultPoint::Teardown);
    let storage = AsyncStorageFacade::new(Setup::new(backend.clone()));
    storage.set("a", 1).unwrap();

    assert_eq!(storage.delete_storage().await.unwrap_err(), FaultPoint::Teardown.error());
    assert_eq!(storage.status(), FacadeStatus::Ready);

    storage.set("b", 2).unwrap();
    assert_eq!(storage.get("b").await.unwrap(), Some(Value::Int(2)));
    // drained before the teardown attempt
    assert_eq!(backend.inner().peek("a"), Some(Some(Value::Int(1))));
}

#[tokio::test]
async fn test_create_storage_defaults_to_suspendable() {
    let storage = create_storage(Setup::new(MemoryBackend::new()));
    assert_eq!(storage.mode(), Mode::Suspendable);

    let storage = storage.into_suspendable().unwrap();
    storage.set("k", true).unwrap();
    assert_eq!(storage.get("k").await.unwrap(), Some(Value::Bool(true)));
}
