//! Aggregation engine: pure rollups over a ledger snapshot. Nothing here is
//! cached; every call recomputes from the ledger, so derived views can never
//! drift from it, and repeated calls on an unchanged snapshot are identical.

use crate::dates::{DateKey, MONTHS};
use crate::ledger::Ledger;
use crate::models::{DisplayRow, ViewMode};
use chrono::{Datelike, Duration};
use std::collections::BTreeMap;

/// One calendar month's rollup. As in the host app, the same month of
/// different years accumulates into one bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthAggregate {
    pub month: &'static str,
    pub total: f64,
    pub records: Vec<DisplayRow>,
}

/// One year's rollup with its per-month breakdown (index 0 = January).
#[derive(Clone, Debug, PartialEq)]
pub struct YearAggregate {
    pub year: i32,
    pub total: f64,
    pub months: [f64; 12],
}

/// Twelve month buckets, January first.
pub fn compute_monthly(ledger: &Ledger) -> Vec<MonthAggregate> {
    let mut rollup: Vec<MonthAggregate> = MONTHS
        .iter()
        .map(|month| MonthAggregate {
            month,
            total: 0.0,
            records: Vec::new(),
        })
        .collect();
    for (key, bucket) in ledger {
        let slot = &mut rollup[key.month() as usize - 1];
        slot.total += bucket.total;
        for record in &bucket.records {
            slot.records.push(display_row(
                record,
                *key,
                format!("{} {}", key.month_abbr(), key.day()),
            ));
        }
    }
    rollup
}

/// Year buckets for every year present in the ledger.
pub fn compute_yearly(ledger: &Ledger) -> BTreeMap<i32, YearAggregate> {
    let mut rollup: BTreeMap<i32, YearAggregate> = BTreeMap::new();
    for (key, bucket) in ledger {
        let slot = rollup.entry(key.year()).or_insert_with(|| YearAggregate {
            year: key.year(),
            total: 0.0,
            months: [0.0; 12],
        });
        slot.total += bucket.total;
        slot.months[key.month() as usize - 1] += bucket.total;
    }
    rollup
}

/// The Sunday-started week containing `today`.
pub fn week_dates(today: DateKey) -> [DateKey; 7] {
    let start = today.date()
        - Duration::days(today.date().weekday().num_days_from_sunday() as i64);
    std::array::from_fn(|i| DateKey::new(start + Duration::days(i as i64)))
}

/// Display rows backing the weekly/monthly/yearly list, sorted by descending
/// date; same-day rows keep their insertion order (the sort is stable).
pub fn combined_view(ledger: &Ledger, mode: ViewMode) -> Vec<DisplayRow> {
    let mut rows = match mode {
        ViewMode::Weekly { today } => {
            let mut rows = Vec::new();
            for key in week_dates(today) {
                if let Some(bucket) = ledger.get(&key) {
                    for record in &bucket.records {
                        rows.push(display_row(
                            record,
                            key,
                            format!("{}, {} {}", key.weekday_abbr(), key.month_abbr(), key.day()),
                        ));
                    }
                }
            }
            rows
        }
        ViewMode::Monthly { month } => {
            if (1..=12).contains(&month) {
                compute_monthly(ledger)
                    .into_iter()
                    .nth(month as usize - 1)
                    .map(|slot| slot.records)
                    .unwrap_or_default()
            } else {
                Vec::new()
            }
        }
        ViewMode::Yearly { year } => {
            let mut rows = Vec::new();
            for (key, bucket) in ledger {
                if key.year() != year {
                    continue;
                }
                for record in &bucket.records {
                    rows.push(display_row(
                        record,
                        *key,
                        format!("{} {}, {}", key.month_name(), key.day(), key.year()),
                    ));
                }
            }
            rows
        }
    };
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

/// Maximum bucket total for the mode's chart, floored at 1 so proportional
/// bar scaling never divides by zero.
pub fn max_total(ledger: &Ledger, mode: ViewMode) -> f64 {
    let max = match mode {
        ViewMode::Weekly { today } => week_dates(today)
            .iter()
            .map(|key| ledger.get(key).map_or(0.0, |b| b.total))
            .fold(0.0, f64::max),
        ViewMode::Monthly { .. } => compute_monthly(ledger)
            .iter()
            .map(|m| m.total)
            .fold(0.0, f64::max),
        ViewMode::Yearly { .. } => compute_yearly(ledger)
            .values()
            .map(|y| y.total)
            .fold(0.0, f64::max),
    };
    max.max(1.0)
}

/// Headline total for the selected period.
pub fn total(ledger: &Ledger, mode: ViewMode) -> f64 {
    match mode {
        ViewMode::Weekly { today } => week_dates(today)
            .iter()
            .map(|key| ledger.get(key).map_or(0.0, |b| b.total))
            .sum(),
        ViewMode::Monthly { month } if (1..=12).contains(&month) => {
            compute_monthly(ledger)[month as usize - 1].total
        }
        ViewMode::Monthly { .. } => 0.0,
        ViewMode::Yearly { year } => {
            compute_yearly(ledger).get(&year).map_or(0.0, |y| y.total)
        }
    }
}

/// Case-insensitive title/category filter backing the search box.
pub fn filter_rows(rows: &[DisplayRow], query: &str) -> Vec<DisplayRow> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|r| {
            r.title.to_lowercase().contains(&query)
                || r.category.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

fn display_row(
    record: &crate::models::ExpenseRecord,
    date: DateKey,
    display_date: String,
) -> DisplayRow {
    DisplayRow {
        record_id: record.id.clone(),
        category: record.category.clone(),
        title: record.title.clone(),
        icon: record.icon.clone(),
        amount: record.amount,
        display_amount: format!("-₱{}", format_amount(record.amount)),
        date,
        display_date,
    }
}

/// Thousands-grouped, at most two decimals, trailing zeros trimmed: 1250.5
/// renders as `1,250.5`, 40 as `40`.
pub(crate) fn format_amount(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = cents % 100;
    let grouped = group_thousands(whole);
    if frac == 0 {
        grouped
    } else if frac % 10 == 0 {
        format!("{}.{}", grouped, frac / 10)
    } else {
        format!("{}.{:02}", grouped, frac)
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
