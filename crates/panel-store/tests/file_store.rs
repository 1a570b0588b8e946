use panel_store::{FileSnapshotStore, SnapshotStore, StoreError};

#[test]
fn values_survive_reopening_the_directory() {
  let dir = tempfile::tempdir().unwrap();
  {
    let store = FileSnapshotStore::open(dir.path()).unwrap();
    store.set("solicitudes", r#"[{"id":"1"}]"#).unwrap();
  }
  let reopened = FileSnapshotStore::open(dir.path()).unwrap();
  assert_eq!(reopened.get("solicitudes").unwrap().as_deref(), Some(r#"[{"id":"1"}]"#));
  assert!(dir.path().join("solicitudes.json").exists());
}

#[test]
fn missing_key_reads_as_none_and_remove_is_idempotent() {
  let dir = tempfile::tempdir().unwrap();
  let store = FileSnapshotStore::open(dir.path()).unwrap();
  assert!(store.get("currentUser").unwrap().is_none());
  store.set("currentUser", "{}").unwrap();
  store.remove("currentUser").unwrap();
  store.remove("currentUser").unwrap();
  assert!(store.get("currentUser").unwrap().is_none());
}

#[test]
fn overwrite_leaves_no_temporary_files() {
  let dir = tempfile::tempdir().unwrap();
  let store = FileSnapshotStore::open(dir.path()).unwrap();
  store.set("users", "[1]").unwrap();
  store.set("users", "[1,2]").unwrap();
  assert_eq!(store.get("users").unwrap().as_deref(), Some("[1,2]"));
  let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap()
                                                       .filter_map(|e| e.ok())
                                                       .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
                                                       .collect();
  assert!(leftovers.is_empty());
}

#[test]
fn keys_with_path_separators_are_rejected() {
  let dir = tempfile::tempdir().unwrap();
  let store = FileSnapshotStore::open(dir.path()).unwrap();
  match store.set("../escape", "x") {
    Err(StoreError::Storage(_)) => {}
    other => panic!("expected Storage error, got {:?}", other),
  }
}
