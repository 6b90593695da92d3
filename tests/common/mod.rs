//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use gastos_client_core::{
    Category, CategoryRegistry, DateKey, ExpenseRecord, LedgerStore,
};
use tempfile::TempDir;

/// Initialize thread-local storage in a tempdir; keep the guard alive for the
/// duration of the test.
pub fn init_temp_storage() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    gastos_client_core::init_storage(dir.path().to_str().expect("utf8 path")).expect("init");
    dir
}

pub fn registry() -> CategoryRegistry {
    CategoryRegistry::with_defaults()
}

pub fn date(s: &str) -> DateKey {
    s.parse().expect("date key")
}

/// A well-formed record for `category` on `date_key`.
pub fn record(category_label: &str, title: &str, amount: f64, date_key: &str) -> ExpenseRecord {
    let registry = registry();
    let category: &Category = registry.resolve_or_others(category_label);
    ExpenseRecord::create(category, title, amount, date(date_key)).expect("record")
}

/// A store preloaded with a small, multi-month ledger used by several suites.
pub fn seeded_store() -> LedgerStore {
    let mut store = LedgerStore::new();
    store.insert(record("Food", "Groceries", 1867.0, "3/14/2024"));
    store.insert(record("Food", "Snacks", 133.0, "3/14/2024"));
    store.insert(record("Utilities", "Electricity", 3000.0, "3/1/2024"));
    store.insert(record("School", "Tuition", 6849.0, "2/20/2024"));
    store.insert(record("Health", "Checkup", 500.0, "3/14/2023"));
    store
}
