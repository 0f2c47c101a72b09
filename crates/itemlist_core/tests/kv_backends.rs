use itemlist_core::{FileKeyValueStore, KeyValueStore, SqliteKeyValueStore, StoreError};

fn exercise(store: &mut impl KeyValueStore) {
    assert_eq!(store.get("items").unwrap(), None);

    store.set("items", "[1]").unwrap();
    store.set("items", "[1,2]").unwrap();
    store.set("other", "x").unwrap();
    assert_eq!(store.get("items").unwrap().as_deref(), Some("[1,2]"));
    assert_eq!(store.get("other").unwrap().as_deref(), Some("x"));

    store.remove("items").unwrap();
    store.remove("items").unwrap();
    assert_eq!(store.get("items").unwrap(), None);
    assert_eq!(store.get("other").unwrap().as_deref(), Some("x"));
}

#[test]
fn file_store_round_trips_and_removes() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileKeyValueStore::open(dir.path().join("nested")).unwrap();
    exercise(&mut store);
}

#[test]
fn file_store_leaves_no_staging_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileKeyValueStore::open(dir.path()).unwrap();
    store.set("simple_crud_items_v1", "[]").unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["simple_crud_items_v1.json".to_string()]);
    assert!(store.path_for("simple_crud_items_v1").exists());
}

#[test]
fn sqlite_store_round_trips_and_removes() {
    let mut store = SqliteKeyValueStore::open_in_memory().unwrap();
    exercise(&mut store);
}

#[test]
fn sqlite_store_rejects_blank_key() {
    let mut store = SqliteKeyValueStore::open_in_memory().unwrap();
    assert!(matches!(
        store.set("  ", "[]"),
        Err(StoreError::InvalidData(_))
    ));
}
