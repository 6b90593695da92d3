//! Domain and wire types. Persisted documents use string dates; everything
//! in memory holds a `DateKey`. Record ids live in memory only (the document
//! format carries none), assigned when a record is created or loaded.

use crate::dates::DateKey;
use crate::error::CoreError;
use crate::ids::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fallback title when the user (or the extraction service) left it blank.
pub const DEFAULT_TITLE: &str = "Expense";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub label: String,
    pub icon: String,
}

impl Category {
    pub fn new(label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: icon.into(),
        }
    }
}

/// A committed expense, owned by the ledger once inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseRecord {
    pub id: RecordId,
    pub category: String,
    pub title: String,
    pub amount: f64,
    pub occurred_on: DateKey,
    pub icon: String,
}

impl ExpenseRecord {
    /// Manual-entry constructor: validates the amount, defaults a blank title.
    pub fn create(
        category: &Category,
        title: &str,
        amount: f64,
        occurred_on: DateKey,
    ) -> Result<Self, CoreError> {
        validate_amount(amount)?;
        let title = title.trim();
        Ok(Self {
            id: RecordId::generate(),
            category: category.label.clone(),
            title: if title.is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                title.to_string()
            },
            amount,
            occurred_on,
            icon: category.icon.clone(),
        })
    }
}

/// Pipeline output: a record minus its id, pending confirmation.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseDraft {
    pub category: String,
    pub title: String,
    pub amount: f64,
    pub occurred_on: DateKey,
    pub icon: String,
}

impl ExpenseDraft {
    /// Commit: a fresh id is generated here, never reused from elsewhere.
    pub fn into_record(self) -> ExpenseRecord {
        ExpenseRecord {
            id: RecordId::generate(),
            category: self.category,
            title: self.title,
            amount: self.amount,
            occurred_on: self.occurred_on,
            icon: self.icon,
        }
    }
}

pub(crate) fn validate_amount(amount: f64) -> Result<(), CoreError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(CoreError::Validation(format!(
            "Amount must be a non-negative number, got {}",
            amount
        )));
    }
    Ok(())
}

// --- Persisted `dailyExpenses` document -----------------------------------

/// One record inside a day entry of the persisted document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayEntryDoc {
    pub category: String,
    pub amount: f64,
    pub title: String,
    pub icon: String,
    pub date: String,
}

/// One day entry: cached total plus the day's records, field name `categories`
/// kept from the original document format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayDoc {
    pub total: f64,
    pub categories: Vec<DayEntryDoc>,
}

/// The whole `dailyExpenses` document: `"M/D/YYYY"` keys, ordered so that
/// re-serialization is stable.
pub type LedgerDocument = BTreeMap<String, DayDoc>;

/// Selector for the list/chart views.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// The Sunday-started week containing `today`.
    Weekly { today: DateKey },
    /// Calendar month 1-12; the same month of every year shares a bucket.
    Monthly { month: u32 },
    Yearly { year: i32 },
}

/// A display-annotated row backing the expense list.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayRow {
    pub record_id: RecordId,
    pub category: String,
    pub title: String,
    pub icon: String,
    pub amount: f64,
    /// e.g. `-₱1,250.5`
    pub display_amount: String,
    pub date: DateKey,
    /// Per-mode rendering: `Thu, Mar 14` / `Mar 14` / `March 14, 2024`.
    pub display_date: String,
}
