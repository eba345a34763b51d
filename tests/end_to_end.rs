//! End-to-end tests through the top-level crate
//!
//! These tests drive facades the way an application would:
//! - configuration loaded from a TOML file
//! - JSON-shaped values built with serde_json
//! - a blocking and a suspendable facade sharing one backend

use serde_json::json;
use tempfile::TempDir;

use storage_facade::testing::{FaultPoint, FaultyBackend};
use storage_facade::{
    create_storage, Error, FacadeConfig, FacadeStatus, MemoryBackend, Mode, Setup, Storage,
    Value, CONFIG_FILE_NAME, DELETED_MARKER_KEY,
};

#[test]
fn test_config_file_drives_name_and_mode() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "name = \"settings\"\nmode = \"blocking\"\n\n[options]\nnamespace = \"ui\"\n",
    )
    .unwrap();

    let backend = MemoryBackend::new();
    let setup = Setup::from_file(backend.clone(), &path).unwrap();
    assert_eq!(setup.config().options.len(), 1);

    let storage = create_storage(setup);
    assert_eq!(storage.mode(), Mode::Blocking);
    assert_eq!(storage.name(), "settings");

    let storage = storage.into_blocking().unwrap();
    storage.set("theme", "dark").unwrap();
    assert_eq!(backend.storage_name().as_deref(), Some("settings"));
}

#[test]
fn test_default_config_file_is_written_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    FacadeConfig::write_default_if_missing(&path).unwrap();
    let setup = Setup::from_file(MemoryBackend::new(), &path).unwrap();

    assert_eq!(setup.config(), &FacadeConfig::default());
    assert_eq!(setup.effective_mode(), Mode::Suspendable);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "mode = \"sometimes\"\n").unwrap();

    let err = Setup::from_file(MemoryBackend::new(), &path).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn test_json_values_round_trip() {
    let storage = create_storage(Setup::new(MemoryBackend::new()).mode(Mode::Blocking))
        .into_blocking()
        .unwrap();

    let profile = json!({
        "name": "Ada",
        "languages": ["en", "fr"],
        "admin": false,
        "score": 9.5,
        "manager": null
    });
    storage.set("profile", profile.clone()).unwrap();

    let read = storage.get("profile").unwrap().unwrap();
    assert_eq!(serde_json::Value::from(read), profile);
}

#[tokio::test]
async fn test_both_modes_share_one_backend() {
    let backend = MemoryBackend::new();

    let writer = create_storage(Setup::new(backend.clone()).mode(Mode::Suspendable))
        .into_suspendable()
        .unwrap();
    writer.set("visits", 3).unwrap();
    writer.set("last_page", "/home").unwrap();
    assert_eq!(writer.size().await.unwrap(), 2);

    let reader = create_storage(Setup::new(backend.clone()).mode(Mode::Blocking))
        .into_blocking()
        .unwrap();
    assert_eq!(reader.get("visits").unwrap(), Some(Value::Int(3)));
    assert_eq!(
        reader.entries().unwrap(),
        vec![
            ("visits".to_string(), Some(Value::Int(3))),
            ("last_page".to_string(), Some(Value::from("/home"))),
        ]
    );
}

#[tokio::test]
async fn test_deletion_through_enum() {
    let backend = MemoryBackend::new();
    let storage = create_storage(Setup::new(backend.clone()));

    match &storage {
        Storage::Suspendable(facade) => {
            facade.set("k", 1).unwrap();
            facade.delete_storage().await.unwrap();
            assert!(facade.get("k").await.unwrap_err().is_deleted());
        }
        Storage::Blocking(_) => panic!("memory backend prefers suspendable mode"),
    }

    assert_eq!(storage.status(), FacadeStatus::Deleted);
    assert_eq!(backend.peek(DELETED_MARKER_KEY), Some(Some(Value::Bool(true))));
}

#[test]
fn test_faulty_backend_preference_selects_blocking() {
    let backend = FaultyBackend::failing(FaultPoint::Count).prefer(Mode::Blocking);
    let storage = create_storage(Setup::new(backend)).into_blocking().unwrap();

    storage.set("a", 1).unwrap();
    assert_eq!(storage.get("a").unwrap(), Some(Value::Int(1)));
    assert_eq!(storage.size().unwrap_err(), FaultPoint::Count.error());
}
