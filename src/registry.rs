//! Category registry: the default set plus user-defined categories. Custom
//! additions are prepended; the "Others" sentinel is permanent and stays last
//! in every selection surface.

use crate::error::CoreError;
use crate::models::Category;
use crate::rust_log;
use crate::storage::{self, DOC_CATEGORIES};

pub const OTHERS_LABEL: &str = "Others";
pub const OTHERS_ICON: &str = "help-circle";

fn default_entries() -> Vec<Category> {
    vec![
        Category::new("Food", "fast-food"),
        Category::new("Utilities", "flash"),
        Category::new("School", "school"),
        Category::new("Internet", "wifi"),
        Category::new("Health", "heart"),
        Category::new(OTHERS_LABEL, OTHERS_ICON),
    ]
}

pub struct CategoryRegistry {
    entries: Vec<Category>,
    autosave: bool,
}

impl CategoryRegistry {
    /// Detached registry with the default set; used by tests and by sessions
    /// that have no storage.
    pub fn with_defaults() -> Self {
        Self {
            entries: default_entries(),
            autosave: false,
        }
    }

    /// Storage-backed registry; falls back to the defaults when no document
    /// exists yet or the stored one cannot be parsed.
    pub fn load() -> Result<Self, CoreError> {
        let entries = match storage::doc_get(DOC_CATEGORIES)? {
            Some(body) => match serde_json::from_str::<Vec<Category>>(&body) {
                Ok(parsed) => parsed,
                Err(e) => {
                    rust_log!("[gastos_rs] storage: categories document unreadable: {}", e);
                    default_entries()
                }
            },
            None => default_entries(),
        };
        let mut registry = Self {
            entries,
            autosave: true,
        };
        registry.ensure_sentinel();
        Ok(registry)
    }

    /// The sentinel must always resolve, whatever a stored document said.
    fn ensure_sentinel(&mut self) {
        if !self
            .entries
            .iter()
            .any(|c| c.label.eq_ignore_ascii_case(OTHERS_LABEL))
        {
            self.entries.push(Category::new(OTHERS_LABEL, OTHERS_ICON));
        }
    }

    pub fn entries(&self) -> &[Category] {
        &self.entries
    }

    /// Entries in selection order: sentinel last, everything else as stored.
    pub fn selection_list(&self) -> Vec<&Category> {
        let mut list: Vec<&Category> = self
            .entries
            .iter()
            .filter(|c| c.label != OTHERS_LABEL)
            .collect();
        list.push(self.others());
        list
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, label: &str) -> Option<&Category> {
        let label = label.trim();
        self.entries
            .iter()
            .find(|c| c.label.eq_ignore_ascii_case(label))
    }

    /// Lookup that never fails: unknown labels resolve to the sentinel.
    pub fn resolve_or_others(&self, label: &str) -> &Category {
        self.lookup(label).unwrap_or_else(|| self.others())
    }

    pub fn others(&self) -> &Category {
        self.entries
            .iter()
            .find(|c| c.label == OTHERS_LABEL)
            .unwrap_or(&self.entries[0])
    }

    /// Prepend a user-defined category. Empty fields and duplicate labels
    /// (case-insensitive) are validation errors.
    pub fn add_custom(&mut self, label: &str, icon: &str) -> Result<(), CoreError> {
        let label = label.trim();
        let icon = icon.trim();
        if label.is_empty() || icon.is_empty() {
            return Err(CoreError::Validation(
                "Category label and icon are required".to_string(),
            ));
        }
        if self.lookup(label).is_some() {
            return Err(CoreError::Validation(format!(
                "Category {:?} already exists",
                label
            )));
        }
        self.entries.insert(0, Category::new(label, icon));
        rust_log!("[gastos_rs] ledger: custom category added label={:?}", label);
        self.persist_best_effort();
        Ok(())
    }

    /// Remove a user-defined category. Defaults and the sentinel refuse.
    pub fn remove_custom(&mut self, label: &str) -> Result<(), CoreError> {
        if default_entries()
            .iter()
            .any(|c| c.label.eq_ignore_ascii_case(label.trim()))
        {
            return Err(CoreError::Validation(format!(
                "Category {:?} is built in and cannot be removed",
                label.trim()
            )));
        }
        let before = self.entries.len();
        let target = label.trim();
        self.entries
            .retain(|c| !c.label.eq_ignore_ascii_case(target));
        if self.entries.len() == before {
            return Err(CoreError::Validation(format!(
                "Category {:?} not found",
                target
            )));
        }
        self.persist_best_effort();
        Ok(())
    }

    /// Write the full registry document. Failures are the caller's to handle.
    pub fn persist(&self) -> Result<(), CoreError> {
        let body = serde_json::to_string(&self.entries)
            .map_err(|e| CoreError::Persistence(e.to_string()))?;
        storage::doc_set(DOC_CATEGORIES, &body)
    }

    fn persist_best_effort(&self) {
        if !self.autosave {
            return;
        }
        if let Err(e) = self.persist() {
            rust_log!("[gastos_rs] storage: categories save failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_end_with_the_sentinel() {
        let registry = CategoryRegistry::with_defaults();
        assert_eq!(registry.entries().last().map(|c| c.label.as_str()), Some("Others"));
        assert_eq!(registry.entries().len(), 6);
    }

    #[test]
    fn custom_categories_are_prepended_and_sentinel_stays_last() {
        let mut registry = CategoryRegistry::with_defaults();
        registry.add_custom("Gym", "barbell").unwrap();
        registry.add_custom("Pets", "paw").unwrap();
        assert_eq!(registry.entries()[0].label, "Pets");
        assert_eq!(registry.entries()[1].label, "Gym");
        let selection = registry.selection_list();
        assert_eq!(selection.last().map(|c| c.label.as_str()), Some("Others"));
    }

    #[test]
    fn empty_fields_and_duplicates_are_rejected() {
        let mut registry = CategoryRegistry::with_defaults();
        assert!(registry.add_custom("", "star").is_err());
        assert!(registry.add_custom("Gym", "  ").is_err());
        registry.add_custom("Gym", "barbell").unwrap();
        assert!(registry.add_custom("gym", "barbell").is_err());
    }

    #[test]
    fn lookup_is_case_insensitive_and_fallback_resolves() {
        let registry = CategoryRegistry::with_defaults();
        assert_eq!(registry.lookup("fOoD").map(|c| c.icon.as_str()), Some("fast-food"));
        assert!(registry.lookup("Vices").is_none());
        assert_eq!(registry.resolve_or_others("Vices").label, "Others");
    }

    #[test]
    fn built_ins_cannot_be_removed_but_customs_can() {
        let mut registry = CategoryRegistry::with_defaults();
        assert!(registry.remove_custom("Others").is_err());
        assert!(registry.remove_custom("Food").is_err());
        registry.add_custom("Gym", "barbell").unwrap();
        registry.remove_custom("Gym").unwrap();
        assert!(registry.lookup("Gym").is_none());
        assert!(registry.remove_custom("Gym").is_err());
    }
}
