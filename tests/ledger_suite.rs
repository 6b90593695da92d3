//! Ledger store suite: bucket invariants under insert/remove/edit, no-op
//! removals, document round-trips and persistence through local storage.
//!
//! Storage is thread-local, so suites running in parallel threads do not
//! share a database.

mod common;

use common::{date, init_temp_storage, record, seeded_store};
use gastos_client_core::{
    storage, Category, ExpenseChanges, LedgerDocument, LedgerStore, RecordId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn insert_creates_buckets_and_accumulates_totals() {
    let store = seeded_store();
    assert_eq!(store.day_total(date("3/14/2024")), 2000.0);
    assert_eq!(store.get(date("3/14/2024")).unwrap().records.len(), 2);
    assert_eq!(store.day_total(date("2/20/2024")), 6849.0);
    assert!(store.is_consistent());
}

#[test]
fn totals_stay_consistent_under_mixed_mutations() {
    let mut store = seeded_store();
    let groceries_id = store.get(date("3/14/2024")).unwrap().records[0].id.clone();

    assert!(store.remove(date("3/14/2024"), &groceries_id));
    assert!(store.is_consistent());
    assert_eq!(store.day_total(date("3/14/2024")), 133.0);

    store.insert(record("Internet", "Fiber", 1699.0, "3/14/2024"));
    store.insert(record("Food", "Dinner", 450.0, "3/15/2024"));
    assert!(store.is_consistent());
    assert_eq!(store.day_total(date("3/14/2024")), 1832.0);
}

#[test]
fn deleting_the_only_record_removes_the_bucket() {
    let mut store = seeded_store();
    let tuition_id = store.get(date("2/20/2024")).unwrap().records[0].id.clone();
    assert!(store.remove(date("2/20/2024"), &tuition_id));
    assert!(store.get(date("2/20/2024")).is_none(), "empty bucket must be deleted");
    assert_eq!(store.day_total(date("2/20/2024")), 0.0);
    assert!(store.is_consistent());
}

#[test]
fn removing_unknown_date_or_id_is_a_no_op() {
    let mut store = seeded_store();
    let before = store.record_count();
    assert!(!store.remove(date("1/1/1999"), &RecordId::generate()));
    assert!(!store.remove(date("3/14/2024"), &RecordId::generate()));
    assert_eq!(store.record_count(), before);
    assert!(store.is_consistent());
}

#[test]
fn edit_keeps_the_id_and_moves_between_buckets_on_date_change() {
    let mut store = seeded_store();
    let id = store.get(date("3/14/2024")).unwrap().records[0].id.clone();

    let moved = store
        .edit(
            date("3/14/2024"),
            &id,
            ExpenseChanges {
                amount: Some(2000.0),
                occurred_on: Some(date("4/2/2024")),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(moved);
    assert!(store.is_consistent());
    assert_eq!(store.day_total(date("3/14/2024")), 133.0);
    assert_eq!(store.day_total(date("4/2/2024")), 2000.0);
    let moved_record = &store.get(date("4/2/2024")).unwrap().records[0];
    assert_eq!(moved_record.id, id, "edit must keep the record id");
}

#[test]
fn edit_can_change_category_and_rejects_bad_amounts() {
    let mut store = seeded_store();
    let id = store.get(date("3/1/2024")).unwrap().records[0].id.clone();

    store
        .edit(
            date("3/1/2024"),
            &id,
            ExpenseChanges {
                category: Some(Category::new("Internet", "wifi")),
                ..Default::default()
            },
        )
        .unwrap();
    let edited = &store.get(date("3/1/2024")).unwrap().records[0];
    assert_eq!(edited.category, "Internet");
    assert_eq!(edited.icon, "wifi");

    let err = store.edit(
        date("3/1/2024"),
        &id,
        ExpenseChanges {
            amount: Some(-10.0),
            ..Default::default()
        },
    );
    assert!(err.is_err());

    // Unknown record: Ok(false), not an error.
    assert!(!store
        .edit(date("3/1/2024"), &RecordId::generate(), ExpenseChanges::default())
        .unwrap());
}

#[test]
fn observers_see_every_mutation() {
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_in_observer = Arc::clone(&seen);
    let mut store = LedgerStore::new();
    store.subscribe(move |_| {
        seen_in_observer.fetch_add(1, Ordering::SeqCst);
    });
    // Subscription itself delivers the current snapshot once.
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    store.insert(record("Food", "Lunch", 120.0, "3/14/2024"));
    let id = store.get(date("3/14/2024")).unwrap().records[0].id.clone();
    store.remove(date("3/14/2024"), &id);
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[test]
fn document_round_trip_is_structurally_stable() {
    let store = seeded_store();
    let doc = store.to_document();

    let serialized = serde_json::to_string(&doc).unwrap();
    let reparsed: LedgerDocument = serde_json::from_str(&serialized).unwrap();
    let reserialized = serde_json::to_string(&reparsed).unwrap();
    assert_eq!(serialized, reserialized);

    // And a ledger rebuilt from the document renders the same document.
    let rebuilt = LedgerStore::from_document(&doc);
    let mut second = LedgerStore::new();
    for bucket in rebuilt.values() {
        for r in &bucket.records {
            second.insert(r.clone());
        }
    }
    assert_eq!(second.to_document(), doc);
}

#[test]
fn document_uses_the_external_format() {
    let mut store = LedgerStore::new();
    store.insert(record("Food", "Groceries", 125.5, "3/14/2024"));
    let doc = store.to_document();
    let day = doc.get("3/14/2024").expect("M/D/YYYY key");
    assert_eq!(day.total, 125.5);
    assert_eq!(day.categories.len(), 1);
    let entry = &day.categories[0];
    assert_eq!(entry.category, "Food");
    assert_eq!(entry.icon, "fast-food");
    assert_eq!(entry.date, "3/14/2024");
    // No id leaks into the persisted document.
    assert!(!serde_json::to_string(&doc).unwrap().contains("\"id\""));
}

#[test]
fn malformed_day_entries_are_skipped_not_fatal() {
    let body = r#"{
        "3/14/2024": {"total": 10.0, "categories": [
            {"category":"Food","amount":10.0,"title":"Lunch","icon":"fast-food","date":"3/14/2024"}
        ]},
        "not-a-date": {"total": 99.0, "categories": [
            {"category":"Food","amount":99.0,"title":"Ghost","icon":"fast-food","date":"not-a-date"}
        ]}
    }"#;
    let doc: LedgerDocument = serde_json::from_str(body).unwrap();
    let ledger = LedgerStore::from_document(&doc);
    assert_eq!(ledger.len(), 1);
    assert!(ledger.contains_key(&date("3/14/2024")));
}

#[test]
fn load_persists_and_reloads_through_local_storage() {
    let _dir = init_temp_storage();

    let mut store = LedgerStore::load().expect("load empty");
    assert_eq!(store.record_count(), 0);
    store.insert(record("Food", "Groceries", 125.5, "3/14/2024"));
    store.insert(record("Health", "Vitamins", 300.0, "3/15/2024"));

    // A fresh store on the same thread sees the persisted document.
    let reloaded = LedgerStore::load().expect("reload");
    assert_eq!(reloaded.record_count(), 2);
    assert_eq!(reloaded.day_total(date("3/14/2024")), 125.5);
    assert_eq!(reloaded.to_document(), store.to_document());
}

#[test]
fn detached_store_mutations_do_not_touch_storage() {
    let _dir = init_temp_storage();
    let mut store = LedgerStore::new();
    store.insert(record("Food", "Lunch", 50.0, "3/14/2024"));
    assert_eq!(storage::doc_get(storage::DOC_DAILY_EXPENSES).unwrap(), None);
    // An explicit persist is still available.
    store.persist().expect("persist");
    assert!(storage::doc_get(storage::DOC_DAILY_EXPENSES).unwrap().is_some());
}
