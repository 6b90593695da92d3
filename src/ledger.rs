//! Ledger store: per-day buckets of expense records with cached totals.
//! In-memory state is the source of truth for the session; the persisted
//! document follows every mutation, best-effort.

use crate::dates::DateKey;
use crate::error::CoreError;
use crate::ids::RecordId;
use crate::models::{
    validate_amount, Category, DayDoc, DayEntryDoc, ExpenseRecord, LedgerDocument,
};
use crate::rust_log;
use crate::storage::{self, DOC_DAILY_EXPENSES};
use std::collections::BTreeMap;

/// One day's records and their cached total. The store keeps
/// `total == sum(records.amount)` and never leaves an empty bucket behind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DayBucket {
    pub total: f64,
    pub records: Vec<ExpenseRecord>,
}

impl DayBucket {
    pub fn recomputed_total(&self) -> f64 {
        self.records.iter().map(|r| r.amount).sum()
    }
}

/// Ordered so derived views iterate deterministically.
pub type Ledger = BTreeMap<DateKey, DayBucket>;

/// Field changes for `edit`. Absent fields keep the record's current value;
/// the record keeps its id, a date change moves it between buckets.
#[derive(Clone, Debug, Default)]
pub struct ExpenseChanges {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub occurred_on: Option<DateKey>,
}

type Observer = Box<dyn Fn(&Ledger) + Send>;

pub struct LedgerStore {
    ledger: Ledger,
    observers: Vec<Observer>,
    autosave: bool,
}

impl LedgerStore {
    /// Detached store (no persistence); used by tests and previews.
    pub fn new() -> Self {
        Self {
            ledger: Ledger::new(),
            observers: Vec::new(),
            autosave: false,
        }
    }

    /// Session store: reads the `dailyExpenses` document and persists after
    /// every mutation. An unreadable document is logged and treated as empty;
    /// individual malformed day entries are skipped, not fatal.
    pub fn load() -> Result<Self, CoreError> {
        let ledger = match storage::doc_get(DOC_DAILY_EXPENSES)? {
            Some(body) => match serde_json::from_str::<LedgerDocument>(&body) {
                Ok(doc) => Self::from_document(&doc),
                Err(e) => {
                    rust_log!("[gastos_rs] storage: ledger document unreadable: {}", e);
                    Ledger::new()
                }
            },
            None => Ledger::new(),
        };
        rust_log!(
            "[gastos_rs] ledger::load days={} records={}",
            ledger.len(),
            ledger.values().map(|b| b.records.len()).sum::<usize>()
        );
        Ok(Self {
            ledger,
            observers: Vec::new(),
            autosave: true,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn get(&self, date_key: DateKey) -> Option<&DayBucket> {
        self.ledger.get(&date_key)
    }

    pub fn day_total(&self, date_key: DateKey) -> f64 {
        self.ledger.get(&date_key).map_or(0.0, |b| b.total)
    }

    pub fn record_count(&self) -> usize {
        self.ledger.values().map(|b| b.records.len()).sum()
    }

    /// Observers run after load-time subscription and after every mutation.
    pub fn subscribe(&mut self, observer: impl Fn(&Ledger) + Send + 'static) {
        observer(&self.ledger);
        self.observers.push(Box::new(observer));
    }

    /// Add a record to its day's bucket, creating the bucket if needed.
    /// Well-formed records always insert.
    pub fn insert(&mut self, record: ExpenseRecord) {
        let bucket = self.ledger.entry(record.occurred_on).or_default();
        bucket.total += record.amount;
        rust_log!(
            "[gastos_rs] ledger::insert date_key={} id={} amount={}",
            record.occurred_on,
            record.id,
            record.amount
        );
        bucket.records.push(record);
        self.after_mutation();
    }

    /// Remove the record with `id` from the bucket at `date_key`. Unknown
    /// date or id is a no-op: logged, reported as `false`, never an error.
    pub fn remove(&mut self, date_key: DateKey, id: &RecordId) -> bool {
        let Some(bucket) = self.ledger.get_mut(&date_key) else {
            rust_log!("[gastos_rs] ledger::remove no-op, unknown date_key={}", date_key);
            return false;
        };
        let Some(idx) = bucket.records.iter().position(|r| &r.id == id) else {
            rust_log!(
                "[gastos_rs] ledger::remove no-op, id={} not in date_key={}",
                id,
                date_key
            );
            return false;
        };
        let removed = bucket.records.remove(idx);
        bucket.total -= removed.amount;
        if bucket.records.is_empty() {
            self.ledger.remove(&date_key);
        }
        self.after_mutation();
        true
    }

    /// Remove-then-insert, because a date or category change moves the record
    /// between buckets. The record keeps its id. `Ok(false)` when the record
    /// was not found; invalid changes are validation errors.
    pub fn edit(
        &mut self,
        date_key: DateKey,
        id: &RecordId,
        changes: ExpenseChanges,
    ) -> Result<bool, CoreError> {
        if let Some(amount) = changes.amount {
            validate_amount(amount)?;
        }
        let Some(bucket) = self.ledger.get_mut(&date_key) else {
            return Ok(false);
        };
        let Some(idx) = bucket.records.iter().position(|r| &r.id == id) else {
            return Ok(false);
        };
        let old = bucket.records.remove(idx);
        bucket.total -= old.amount;
        if bucket.records.is_empty() {
            self.ledger.remove(&date_key);
        }

        let mut updated = old;
        if let Some(title) = changes.title {
            updated.title = title;
        }
        if let Some(amount) = changes.amount {
            updated.amount = amount;
        }
        if let Some(category) = changes.category {
            updated.category = category.label;
            updated.icon = category.icon;
        }
        if let Some(occurred_on) = changes.occurred_on {
            updated.occurred_on = occurred_on;
        }
        let bucket = self.ledger.entry(updated.occurred_on).or_default();
        bucket.total += updated.amount;
        bucket.records.push(updated);
        self.after_mutation();
        Ok(true)
    }

    /// True when every cached total matches its records (within float noise)
    /// and no empty bucket exists. Test/verification path.
    pub fn is_consistent(&self) -> bool {
        self.ledger.values().all(|b| {
            !b.records.is_empty() && (b.total - b.recomputed_total()).abs() < 1e-6
        })
    }

    /// Rebuild every cached total from its records.
    pub fn recompute_totals(&mut self) {
        for bucket in self.ledger.values_mut() {
            bucket.total = bucket.recomputed_total();
        }
    }

    /// Render the persisted `dailyExpenses` document. Ids are session-scoped
    /// and not written.
    pub fn to_document(&self) -> LedgerDocument {
        self.ledger
            .iter()
            .map(|(key, bucket)| {
                let doc = DayDoc {
                    total: bucket.total,
                    categories: bucket
                        .records
                        .iter()
                        .map(|r| DayEntryDoc {
                            category: r.category.clone(),
                            amount: r.amount,
                            title: r.title.clone(),
                            icon: r.icon.clone(),
                            date: key.to_string(),
                        })
                        .collect(),
                };
                (key.to_string(), doc)
            })
            .collect()
    }

    /// Parse a persisted document into a ledger. Bad keys or entries are
    /// skipped (logged); totals come from the records, and day entries that
    /// parse to nothing produce no bucket.
    pub fn from_document(doc: &LedgerDocument) -> Ledger {
        let mut ledger = Ledger::new();
        for (key, day) in doc {
            let Ok(date_key) = key.parse::<DateKey>() else {
                rust_log!("[gastos_rs] ledger::load skipping bad date_key={:?}", key);
                continue;
            };
            let mut bucket = DayBucket::default();
            for entry in &day.categories {
                if validate_amount(entry.amount).is_err() {
                    rust_log!(
                        "[gastos_rs] ledger::load skipping bad amount {} on {}",
                        entry.amount,
                        key
                    );
                    continue;
                }
                bucket.total += entry.amount;
                bucket.records.push(ExpenseRecord {
                    id: RecordId::generate(),
                    category: entry.category.clone(),
                    title: entry.title.clone(),
                    amount: entry.amount,
                    occurred_on: date_key,
                    icon: entry.icon.clone(),
                });
            }
            if !bucket.records.is_empty() {
                ledger.insert(date_key, bucket);
            }
        }
        ledger
    }

    /// Write the document now. Failures are the caller's to handle; the
    /// auto-persist path logs them instead.
    pub fn persist(&self) -> Result<(), CoreError> {
        let body = serde_json::to_string(&self.to_document())
            .map_err(|e| CoreError::Persistence(e.to_string()))?;
        storage::doc_set(DOC_DAILY_EXPENSES, &body)
    }

    fn after_mutation(&mut self) {
        for observer in &self.observers {
            observer(&self.ledger);
        }
        if self.autosave {
            if let Err(e) = self.persist() {
                rust_log!("[gastos_rs] storage: ledger save failed: {}", e);
            }
        }
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}
