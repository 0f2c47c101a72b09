use itemlist_core::{
    ControllerError, FileKeyValueStore, FixedClock, IdGenerator, KeyValueStore, KvSnapshotStore,
    LocalRecordStore, MemoryKeyValueStore, Record, RecordController, RecordId,
    RecordValidationError, SequenceIdGenerator, SnapshotStore, SqliteKeyValueStore, StoreError,
    StoreResult, WritePolicy, DEFAULT_STORAGE_KEY,
};
use std::collections::HashSet;
use std::sync::Arc;

const START_MS: i64 = 1_714_550_400_000;

type MemoryStore = LocalRecordStore<KvSnapshotStore<MemoryKeyValueStore>>;

fn memory_store() -> (MemoryStore, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::from_millis(START_MS));
    let store = LocalRecordStore::new(KvSnapshotStore::new(MemoryKeyValueStore::new()))
        .with_id_generator(SequenceIdGenerator::new("item"))
        .with_clock(clock.clone());
    (store, clock)
}

fn titles(store: &impl RecordController) -> Vec<String> {
    store.records().iter().map(|r| r.title.clone()).collect()
}

struct FlakySnapshot {
    inner: KvSnapshotStore<MemoryKeyValueStore>,
    fail_reads: bool,
    fail_writes: bool,
}

impl FlakySnapshot {
    fn new() -> Self {
        Self {
            inner: KvSnapshotStore::new(MemoryKeyValueStore::new()),
            fail_reads: false,
            fail_writes: false,
        }
    }
}

impl SnapshotStore for FlakySnapshot {
    fn fetch_all(&mut self) -> StoreResult<Vec<Record>> {
        if self.fail_reads {
            return Err(StoreError::InvalidData("unreadable".to_string()));
        }
        self.inner.fetch_all()
    }

    fn persist_all(&mut self, records: &[Record]) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.persist_all(records)
    }
}

struct ConstantIds;

impl IdGenerator for ConstantIds {
    fn next_id(&mut self) -> RecordId {
        RecordId::key("same")
    }
}

#[test]
fn buy_milk_scenario() {
    let (mut store, clock) = memory_store();
    assert_eq!(store.load(), 0);

    let milk = store.create("Buy milk", None).unwrap();
    assert_eq!(milk.description, None);
    assert_eq!(titles(&store), vec!["Buy milk"]);

    clock.advance_ms(1_000);
    let mom = store.create("Call mom", Some("Ask about trip")).unwrap();
    assert_eq!(titles(&store), vec!["Call mom", "Buy milk"]);

    clock.advance_ms(1_000);
    let updated = store.update(&milk.id, "Buy milk and eggs", None).unwrap();
    assert_eq!(updated.id, milk.id);
    assert_eq!(updated.created_at, milk.created_at);
    assert_eq!(titles(&store), vec!["Call mom", "Buy milk and eggs"]);
    assert_eq!(store.records()[0], mom);

    let hits = store.filter("call");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, mom.id);

    assert!(store.delete(&mom.id).unwrap());
    assert_eq!(titles(&store), vec!["Buy milk and eggs"]);

    assert_eq!(store.clear_all().unwrap(), 1);
    assert!(store.is_empty());
    assert_eq!(store.load(), 0);
}

#[test]
fn blank_titles_are_rejected_without_state_change() {
    let (mut store, _) = memory_store();
    store.create("keep", None).unwrap();

    for title in ["", "   ", "\t\n"] {
        let err = store.create(title, Some("ignored")).unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Validation(RecordValidationError::BlankTitle)
        ));
        assert!(err.is_validation());
    }
    assert_eq!(titles(&store), vec!["keep"]);
}

#[test]
fn create_trims_title_and_blank_description() {
    let (mut store, _) = memory_store();
    let record = store.create("  Buy milk  ", Some("   ")).unwrap();
    assert_eq!(record.title, "Buy milk");
    assert_eq!(record.description, None);
    assert_eq!(record.created_at.timestamp_millis(), START_MS);
}

#[test]
fn update_changes_only_the_matched_record() {
    let (mut store, _) = memory_store();
    let first = store.create("first", Some("one")).unwrap();
    let second = store.create("second", None).unwrap();

    let updated = store.update(&first.id, "first v2", None).unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.created_at, first.created_at);
    assert_eq!(updated.description, None);
    assert_eq!(store.records()[0], second);
    assert_eq!(store.records()[1], updated);
}

#[test]
fn update_unknown_or_blank_is_a_validation_failure() {
    let (mut store, _) = memory_store();
    let record = store.create("only", None).unwrap();
    let before = store.records().to_vec();

    let err = store
        .update(&RecordId::key("missing"), "title", None)
        .unwrap_err();
    assert!(matches!(err, ControllerError::RecordNotFound(_)));

    let err = store.update(&record.id, "  ", None).unwrap_err();
    assert!(matches!(err, ControllerError::Validation(_)));

    assert_eq!(store.records(), before.as_slice());
}

#[test]
fn delete_unknown_is_a_no_op() {
    let (mut store, _) = memory_store();
    store.create("only", None).unwrap();
    assert!(!store.delete(&RecordId::key("missing")).unwrap());
    assert_eq!(store.len(), 1);
}

#[test]
fn ids_stay_unique_across_mixed_operations() {
    let (mut store, clock) = memory_store();
    for step in 0..60_u32 {
        clock.advance_ms(10);
        match step % 5 {
            0 | 1 | 2 => {
                store.create(&format!("item {step}"), None).unwrap();
            }
            3 => {
                let id = store.records()[0].id.clone();
                store.update(&id, &format!("edited {step}"), Some("x")).unwrap();
            }
            _ => {
                let id = store.records()[store.len() / 2].id.clone();
                store.delete(&id).unwrap();
            }
        }
        let unique: HashSet<_> = store.records().iter().map(|r| r.id.clone()).collect();
        assert_eq!(unique.len(), store.len());
    }
}

#[test]
fn persisted_snapshot_matches_memory() {
    let (mut store, _) = memory_store();
    let first = store.create("a", None).unwrap();
    store.create("b", Some("bee")).unwrap();
    store.update(&first.id, "a2", Some("ay")).unwrap();

    let persisted = store.store_mut().fetch_all().unwrap();
    assert_eq!(persisted.as_slice(), store.records());
}

#[test]
fn snapshot_text_uses_wire_field_names() {
    let (mut store, _) = memory_store();
    store.create("Buy milk", None).unwrap();

    let raw = store
        .store()
        .kv()
        .get(DEFAULT_STORAGE_KEY)
        .unwrap()
        .expect("snapshot written");
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["id"], "item-1");
    assert_eq!(json[0]["createdAt"], "2024-05-01T08:00:00.000Z");
    assert!(json[0].get("description").is_none());
}

#[test]
fn corrupt_snapshot_loads_as_empty_and_is_overwritten() {
    let mut kv = MemoryKeyValueStore::new();
    kv.set(DEFAULT_STORAGE_KEY, "[{broken").unwrap();
    let mut store = LocalRecordStore::new(KvSnapshotStore::new(kv));

    assert_eq!(store.load(), 0);
    store.create("fresh", None).unwrap();
    assert_eq!(store.store_mut().fetch_all().unwrap().len(), 1);
}

#[test]
fn reload_picks_up_snapshot_replaced_underneath() {
    let (mut store, _) = memory_store();
    store.create("a", None).unwrap();
    store.create("b", None).unwrap();

    store
        .store_mut()
        .kv_mut()
        .set(
            DEFAULT_STORAGE_KEY,
            r#"[{"id":"other-1","title":"from another tab","createdAt":"2024-05-01T09:00:00.000Z"}]"#,
        )
        .unwrap();

    assert_eq!(store.load(), 1);
    assert_eq!(titles(&store), vec!["from another tab"]);
}

#[test]
fn clear_then_load_is_empty() {
    let (mut store, _) = memory_store();
    store.create("a", None).unwrap();
    store.create("b", None).unwrap();
    assert_eq!(store.clear_all().unwrap(), 2);
    assert_eq!(store.load(), 0);
}

#[test]
fn best_effort_keeps_change_and_marks_dirty() {
    let mut store = LocalRecordStore::new(FlakySnapshot::new());
    store.store_mut().fail_writes = true;

    store.create("kept in memory", None).unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.is_dirty());

    store.store_mut().fail_writes = false;
    store.create("second", None).unwrap();
    assert!(!store.is_dirty());
    assert_eq!(store.store_mut().fetch_all().unwrap().len(), 2);
}

#[test]
fn strict_policy_applies_only_confirmed_writes() {
    let mut store =
        LocalRecordStore::new(FlakySnapshot::new()).with_write_policy(WritePolicy::Strict);
    let kept = store.create("kept", None).unwrap();

    store.store_mut().fail_writes = true;
    let err = store.create("lost", None).unwrap_err();
    assert!(matches!(err, ControllerError::Persistence(StoreError::Io(_))));
    assert!(!err.is_validation());
    assert!(store.update(&kept.id, "renamed", None).is_err());
    assert!(store.delete(&kept.id).is_err());
    assert!(store.clear_all().is_err());

    assert_eq!(store.records(), &[kept]);
    assert!(!store.is_dirty());
}

#[test]
fn failed_load_is_empty_collection() {
    let mut store = LocalRecordStore::new(FlakySnapshot::new());
    store.create("a", None).unwrap();
    store.store_mut().fail_reads = true;
    assert_eq!(store.load(), 0);
    assert!(store.is_empty());
}

#[test]
fn repeated_id_collisions_are_reported() {
    let mut store = LocalRecordStore::new(KvSnapshotStore::new(MemoryKeyValueStore::new()))
        .with_id_generator(ConstantIds);
    store.create("first", None).unwrap();

    let err = store.create("second", None).unwrap_err();
    assert!(matches!(err, ControllerError::IdCollision(id) if id == RecordId::key("same")));
    assert_eq!(titles(&store), vec!["first"]);
}

#[test]
fn edit_flow_prefills_draft_and_submits_update() {
    let (mut store, _) = memory_store();
    let milk = store.create("Buy milk", Some("2 liters")).unwrap();
    store.create("Call mom", None).unwrap();

    let draft = store.begin_edit(&milk.id).unwrap();
    assert_eq!(draft.title, "Buy milk");
    assert_eq!(draft.description.as_deref(), Some("2 liters"));
    assert_eq!(store.editing().map(|s| s.id.clone()), Some(milk.id.clone()));

    let updated = store.submit("Buy oat milk", None).unwrap();
    assert_eq!(updated.id, milk.id);
    assert!(store.editing().is_none());
    assert_eq!(store.len(), 2);

    let created = store.submit("New item", None).unwrap();
    assert_ne!(created.id, milk.id);
    assert_eq!(store.len(), 3);
}

#[test]
fn edit_marker_rules() {
    let (mut store, _) = memory_store();
    let a = store.create("a", None).unwrap();

    let err = store.begin_edit(&RecordId::key("missing")).unwrap_err();
    assert!(err.is_validation());
    assert!(store.editing().is_none());

    store.begin_edit(&a.id).unwrap();
    store.cancel_edit();
    assert!(store.editing().is_none());
    assert_eq!(titles(&store), vec!["a"]);

    store.begin_edit(&a.id).unwrap();
    store.create("b", None).unwrap();
    assert!(store.editing().is_none());

    store.begin_edit(&a.id).unwrap();
    store.delete(&a.id).unwrap();
    assert!(store.editing().is_none());
}

#[test]
fn filter_is_case_insensitive_and_order_preserving() {
    let (mut store, _) = memory_store();
    store.create("Groceries", Some("milk, EGGS")).unwrap();
    store.create("Call mom", None).unwrap();
    store.create("Eggs benedict", None).unwrap();

    let all: Vec<_> = store.filter("").into_iter().cloned().collect();
    assert_eq!(all.as_slice(), store.records());

    let eggs: Vec<_> = store.filter("eGgS").iter().map(|r| r.title.clone()).collect();
    assert_eq!(eggs, vec!["Eggs benedict", "Groceries"]);

    assert!(store.filter("nothing").is_empty());
}

#[test]
fn file_backend_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let written = {
        let mut store =
            LocalRecordStore::new(KvSnapshotStore::new(FileKeyValueStore::open(dir.path()).unwrap()));
        store.load();
        store.create("first", None).unwrap();
        store.create("second", Some("two")).unwrap();
        store.records().to_vec()
    };

    let mut reopened =
        LocalRecordStore::new(KvSnapshotStore::new(FileKeyValueStore::open(dir.path()).unwrap()));
    assert_eq!(reopened.load(), 2);
    assert_eq!(reopened.records(), written.as_slice());
}

#[test]
fn sqlite_backend_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.db");
    let written = {
        let mut store =
            LocalRecordStore::new(KvSnapshotStore::new(SqliteKeyValueStore::open(&path).unwrap()));
        store.load();
        store.create("first", None).unwrap();
        store.records().to_vec()
    };

    let mut reopened =
        LocalRecordStore::new(KvSnapshotStore::new(SqliteKeyValueStore::open(&path).unwrap()));
    assert_eq!(reopened.load(), 1);
    assert_eq!(reopened.records(), written.as_slice());
}
