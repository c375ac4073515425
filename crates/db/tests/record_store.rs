use std::thread;

use libris_db::{Predicate, Record, RecordStore, SqliteStore, StoreError};
use libris_kernel::Migration;
use rusqlite::types::Value;
use rusqlite::Row;

#[derive(Debug, Clone, PartialEq)]
struct Shelf {
    id: String,
    label: String,
    room: String,
    capacity: i64,
}

impl Shelf {
    fn new(id: &str, label: &str, room: &str, capacity: i64) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            room: room.to_string(),
            capacity,
        }
    }
}

impl Record for Shelf {
    const KIND: &'static str = "shelves";
    const COLUMNS: &'static [&'static str] = &["id", "label", "room", "capacity"];

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.clone()),
            Value::Text(self.label.clone()),
            Value::Text(self.room.clone()),
            Value::Integer(self.capacity),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            room: row.get(2)?,
            capacity: row.get(3)?,
        })
    }
}

fn shelf_migrations() -> Vec<(String, Migration)> {
    vec![(
        "shelf".to_string(),
        Migration {
            id: "001_init",
            up: "CREATE TABLE shelves (
                id TEXT PRIMARY KEY NOT NULL,
                label TEXT NOT NULL,
                room TEXT NOT NULL,
                capacity INTEGER NOT NULL
            );",
        },
    )]
}

fn memory_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store.apply_migrations(&shelf_migrations()).unwrap();
    store
}

fn ids(shelves: &[Shelf]) -> Vec<&str> {
    shelves.iter().map(|shelf| shelf.id.as_str()).collect()
}

#[test]
fn get_missing_returns_none() {
    let store = memory_store();
    assert_eq!(store.get::<Shelf>("nope").unwrap(), None);
}

#[test]
fn put_then_get_roundtrip() {
    let store = memory_store();
    let shelf = Shelf::new("s1", "Poetry", "attic", 40);

    store.put(&shelf).unwrap();

    assert_eq!(store.get::<Shelf>("s1").unwrap(), Some(shelf));
}

#[test]
fn put_same_id_replaces_every_field() {
    let store = memory_store();
    store.put(&Shelf::new("s1", "Poetry", "attic", 40)).unwrap();
    store.put(&Shelf::new("s1", "Drama", "cellar", 12)).unwrap();

    let loaded = store.get::<Shelf>("s1").unwrap().unwrap();
    assert_eq!(loaded, Shelf::new("s1", "Drama", "cellar", 12));
    assert_eq!(store.count::<Shelf>().unwrap(), 1);
}

#[test]
fn put_blank_id_is_rejected_and_store_unchanged() {
    let store = memory_store();

    let err = store.put(&Shelf::new("", "Poetry", "attic", 1)).unwrap_err();

    assert!(matches!(err, StoreError::InvalidRecord { kind: "shelves", .. }));
    assert!(!err.is_storage_failure());
    assert_eq!(store.count::<Shelf>().unwrap(), 0);
}

#[test]
fn scan_combines_conditions_with_and() {
    let store = memory_store();
    store.put(&Shelf::new("s1", "Poetry East", "attic", 40)).unwrap();
    store.put(&Shelf::new("s2", "Poetry West", "cellar", 40)).unwrap();
    store.put(&Shelf::new("s3", "Drama", "attic", 10)).unwrap();

    let all = store.scan::<Shelf>(&Predicate::all()).unwrap();
    assert_eq!(ids(&all), vec!["s1", "s2", "s3"]);

    let poetry_in_attic = store
        .scan::<Shelf>(
            &Predicate::all()
                .contains("label", "Poetry")
                .equals("room", "attic".to_string()),
        )
        .unwrap();
    assert_eq!(ids(&poetry_in_attic), vec!["s1"]);

    let bounded = store
        .scan::<Shelf>(&Predicate::all().at_least("capacity", 10).at_most("capacity", 10))
        .unwrap();
    assert_eq!(ids(&bounded), vec!["s3"]);
}

#[test]
fn contains_is_case_sensitive() {
    let store = memory_store();
    store.put(&Shelf::new("s1", "Poetry", "attic", 1)).unwrap();

    let lower = store
        .scan::<Shelf>(&Predicate::all().contains("label", "poetry"))
        .unwrap();
    assert!(lower.is_empty());

    let inner = store
        .scan::<Shelf>(&Predicate::all().contains("label", "oet"))
        .unwrap();
    assert_eq!(ids(&inner), vec!["s1"]);
}

#[test]
fn upsert_keeps_natural_order() {
    let store = memory_store();
    store.put(&Shelf::new("a", "A", "r", 1)).unwrap();
    store.put(&Shelf::new("b", "B", "r", 1)).unwrap();
    store.put(&Shelf::new("a", "A2", "r", 2)).unwrap();

    let all = store.scan::<Shelf>(&Predicate::all()).unwrap();
    assert_eq!(ids(&all), vec!["a", "b"]);
    assert_eq!(all[0].label, "A2");
}

#[test]
fn delete_all_empties_the_kind() {
    let store = memory_store();
    store.put(&Shelf::new("s1", "A", "r", 1)).unwrap();
    store.put(&Shelf::new("s2", "B", "r", 1)).unwrap();

    assert_eq!(store.delete_all::<Shelf>().unwrap(), 2);
    assert!(store.scan::<Shelf>(&Predicate::all()).unwrap().is_empty());
    assert_eq!(store.delete_all::<Shelf>().unwrap(), 0);
}

#[test]
fn concurrent_writers_leave_one_complete_record() {
    let store = memory_store();

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let store = store.clone();
            thread::spawn(move || {
                let label = format!("label-{n}");
                let room = format!("room-{n}");
                store.put(&Shelf::new("shared", &label, &room, n)).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let shelf = store.get::<Shelf>("shared").unwrap().unwrap();
    let n = shelf.capacity;
    assert_eq!(shelf.label, format!("label-{n}"));
    assert_eq!(shelf.room, format!("room-{n}"));
    assert_eq!(store.count::<Shelf>().unwrap(), 1);
}

#[test]
fn file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shelves.db");

    {
        let store = SqliteStore::open_path(&path).unwrap();
        store.apply_migrations(&shelf_migrations()).unwrap();
        store.put(&Shelf::new("s1", "Poetry", "attic", 40)).unwrap();
    }

    let reopened = SqliteStore::open_path(&path).unwrap();
    assert_eq!(reopened.apply_migrations(&shelf_migrations()).unwrap(), 0);
    assert_eq!(
        reopened.get::<Shelf>("s1").unwrap(),
        Some(Shelf::new("s1", "Poetry", "attic", 40))
    );
}

#[test]
fn scan_on_missing_table_is_a_storage_failure() {
    let store = SqliteStore::open_in_memory().unwrap();

    let err = store.scan::<Shelf>(&Predicate::all()).unwrap_err();

    assert!(matches!(err, StoreError::Sqlite(_)));
    assert!(err.is_storage_failure());
}
