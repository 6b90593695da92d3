//! Receipt normalizer: validates and repairs an extraction candidate into a
//! confirmed `ExpenseDraft`, consulting the category registry.

use crate::dates::DateKey;
use crate::extract::RawCandidate;
use crate::models::{ExpenseDraft, DEFAULT_TITLE};
use crate::pipeline::ScanFailure;
use crate::registry::CategoryRegistry;
use serde_json::Value;

/// Candidate -> draft. Rejections carry the offending field and value; an
/// unknown category is not a rejection, it falls back to Others.
pub fn normalize(
    candidate: &RawCandidate,
    registry: &CategoryRegistry,
) -> Result<ExpenseDraft, ScanFailure> {
    let missing = candidate.missing_fields();
    if !missing.is_empty() {
        return Err(ScanFailure::IncompleteExtraction {
            missing,
            raw: candidate.raw.clone(),
        });
    }

    let date_str = candidate.date.as_deref().unwrap_or_default();
    let occurred_on: DateKey = date_str.parse().map_err(|_| ScanFailure::InvalidDraft {
        field: "date",
        value: date_str.to_string(),
    })?;

    let amount_value = candidate.amount.clone().unwrap_or(Value::Null);
    let amount = coerce_amount(&amount_value).ok_or_else(|| ScanFailure::InvalidDraft {
        field: "amount",
        value: amount_value.to_string(),
    })?;

    let category = registry.resolve_or_others(candidate.category.as_deref().unwrap_or_default());

    let title = candidate.title.as_deref().unwrap_or_default().trim();
    Ok(ExpenseDraft {
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

/// Accepts a JSON number or a numeric string (currency symbols and grouping
/// scrubbed). None for anything non-numeric, negative or non-finite.
fn coerce_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse().ok()?
        }
        _ => return None,
    };
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::parse_candidate;

    fn registry() -> CategoryRegistry {
        CategoryRegistry::with_defaults()
    }

    #[test]
    fn normalizes_the_contract_fixture() {
        let candidate = parse_candidate(
            r#"{"title":"Grocery","date":"03/14/2024","amount":"125.50","category":"Food"}"#,
        )
        .unwrap();
        let draft = normalize(&candidate, &registry()).unwrap();
        assert_eq!(draft.title, "Grocery");
        assert_eq!(draft.occurred_on, DateKey::from_ymd(2024, 3, 14).unwrap());
        assert_eq!(draft.amount, 125.50);
        assert_eq!(draft.category, "Food");
        assert_eq!(draft.icon, "fast-food");
    }

    #[test]
    fn fenced_payload_normalizes_to_the_same_draft() {
        let bare = parse_candidate(
            r#"{"title":"Grocery","date":"03/14/2024","amount":"125.50","category":"Food"}"#,
        )
        .unwrap();
        let fenced = parse_candidate(
            "```json\n{\"title\":\"Grocery\",\"date\":\"03/14/2024\",\"amount\":\"125.50\",\"category\":\"Food\"}\n```",
        )
        .unwrap();
        assert_eq!(
            normalize(&bare, &registry()).unwrap(),
            normalize(&fenced, &registry()).unwrap()
        );
    }

    #[test]
    fn case_insensitive_category_match() {
        let candidate = parse_candidate(
            r#"{"title":"Meds","date":"01/02/2024","amount":20,"category":"hEaLtH"}"#,
        )
        .unwrap();
        let draft = normalize(&candidate, &registry()).unwrap();
        assert_eq!(draft.category, "Health");
        assert_eq!(draft.icon, "heart");
    }

    #[test]
    fn unknown_category_falls_back_to_others() {
        let candidate = parse_candidate(
            r#"{"title":"Vape","date":"01/02/2024","amount":5,"category":"Vices"}"#,
        )
        .unwrap();
        let draft = normalize(&candidate, &registry()).unwrap();
        assert_eq!(draft.category, "Others");
        assert_eq!(draft.icon, "help-circle");
    }

    #[test]
    fn out_of_range_date_is_rejected() {
        let candidate = parse_candidate(
            r#"{"title":"T","date":"02/30/2024","amount":5,"category":"Food"}"#,
        )
        .unwrap();
        match normalize(&candidate, &registry()) {
            Err(ScanFailure::InvalidDraft { field: "date", value }) => {
                assert_eq!(value, "02/30/2024")
            }
            other => panic!("expected date rejection, got {:?}", other),
        }
    }

    #[test]
    fn non_numeric_and_negative_amounts_are_rejected() {
        for amount in [r#""abc""#, r#""-12.50""#, "true"] {
            let candidate = parse_candidate(&format!(
                r#"{{"title":"T","date":"01/02/2024","amount":{},"category":"Food"}}"#,
                amount
            ))
            .unwrap();
            assert!(
                matches!(
                    normalize(&candidate, &registry()),
                    Err(ScanFailure::InvalidDraft { field: "amount", .. })
                ),
                "amount {} should be rejected",
                amount
            );
        }
    }

    #[test]
    fn currency_symbols_are_scrubbed_from_string_amounts() {
        let candidate = parse_candidate(
            r#"{"title":"T","date":"01/02/2024","amount":"₱1,250.75","category":"Food"}"#,
        )
        .unwrap();
        assert_eq!(normalize(&candidate, &registry()).unwrap().amount, 1250.75);
    }

    #[test]
    fn blank_title_defaults() {
        let candidate = parse_candidate(
            r#"{"title":"  ","date":"01/02/2024","amount":5,"category":"Food"}"#,
        )
        .unwrap();
        assert_eq!(normalize(&candidate, &registry()).unwrap().title, "Expense");
    }

    #[test]
    fn absent_title_is_incomplete() {
        let candidate =
            parse_candidate(r#"{"date":"01/02/2024","amount":5,"category":"Food"}"#).unwrap();
        match normalize(&candidate, &registry()) {
            Err(ScanFailure::IncompleteExtraction { missing, .. }) => {
                assert_eq!(missing, vec!["title"])
            }
            other => panic!("expected IncompleteExtraction, got {:?}", other),
        }
    }
}
