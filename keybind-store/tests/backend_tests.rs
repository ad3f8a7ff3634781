use keybind_store::{SecureStorage, SqliteStorage, StorageOp};

#[test]
fn get_missing_returns_none() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    assert!(storage.get("license_key").unwrap().is_none());
}

#[test]
fn set_get_remove() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.set("k", "v1").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v1"));
    storage.set("k", "v2").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));
    storage.remove("k").unwrap();
    assert!(storage.get("k").unwrap().is_none());
}

#[test]
fn remove_missing_is_ok() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.remove("nothing").unwrap();
}

#[test]
fn apply_runs_in_order() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage
        .apply(&[
            StorageOp::Set { key: "a".into(), value: "1".into() },
            StorageOp::Set { key: "b".into(), value: "2".into() },
            StorageOp::Clear,
            StorageOp::Set { key: "c".into(), value: "3".into() },
        ])
        .unwrap();
    assert!(storage.get("a").unwrap().is_none());
    assert!(storage.get("b").unwrap().is_none());
    assert_eq!(storage.get("c").unwrap().as_deref(), Some("3"));
}

#[test]
fn apply_empty_batch_is_noop() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.apply(&[]).unwrap();
}

#[test]
fn writes_are_visible_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("credentials.db");
    {
        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(storage.path(), Some(path.as_path()));
        storage.set("session_token", "sealed").unwrap();
    }
    let storage = SqliteStorage::open(&path).unwrap();
    assert_eq!(storage.get("session_token").unwrap().as_deref(), Some("sealed"));
    assert_eq!(storage.kind(), "sqlite");
}

#[test]
fn in_memory_kind() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    assert_eq!(storage.kind(), "sqlite-memory");
    assert!(storage.path().is_none());
}
