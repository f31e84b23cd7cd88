//! Data mapping table.
//!
//! Source values come from the HR system, target values from payroll; the
//! owner pairs them up per category. Entries are keyed by
//! `(category, source_value)`, so re-saving a pair replaces its target.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::container::ArtifactContent;
use super::view::ItemView;
use crate::core::{ItemState, Party};
use crate::errors::{GateflowError, Result};

/// Values available per category.
pub type CategoryValues = BTreeMap<String, Vec<String>>;

/// One source-to-target pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Category, e.g. `leave_types`.
    pub category: String,
    /// Value in the source system.
    pub source_value: String,
    /// Value in the target system.
    pub target_value: String,
}

impl MappingEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        source_value: impl Into<String>,
        target_value: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            source_value: source_value.into(),
            target_value: target_value.into(),
        }
    }

    fn matches_key(&self, other: &Self) -> bool {
        self.category == other.category && self.source_value == other.source_value
    }

    fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() || self.source_value.trim().is_empty() {
            return Err(GateflowError::invalid_input(
                "Mapping entries need a category and a source value",
            ));
        }
        Ok(())
    }
}

/// Mapping configuration and entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingBody {
    /// Source system values per category.
    #[serde(default)]
    pub source_values: CategoryValues,
    /// Target system values per category.
    #[serde(default)]
    pub target_values: CategoryValues,
    /// Entries in save order.
    #[serde(default)]
    pub entries: Vec<MappingEntry>,
}

impl MappingBody {
    /// Creates an empty mapping over the given values.
    #[must_use]
    pub fn new(source_values: CategoryValues, target_values: CategoryValues) -> Self {
        Self {
            source_values,
            target_values,
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces entries by `(category, source_value)`.
    pub fn upsert(&mut self, entries: &[MappingEntry]) -> Result<()> {
        entries.iter().try_for_each(MappingEntry::validate)?;
        for entry in entries {
            match self.entries.iter_mut().find(|e| e.matches_key(entry)) {
                Some(existing) => existing.target_value.clone_from(&entry.target_value),
                None => self.entries.push(entry.clone()),
            }
        }
        Ok(())
    }

    /// Replaces all entries. Later duplicates of a key win.
    pub fn replace(&mut self, entries: &[MappingEntry]) -> Result<()> {
        entries.iter().try_for_each(MappingEntry::validate)?;
        self.entries.clear();
        self.upsert(entries)
    }

    /// Replaces the value maps that are provided.
    pub fn update_values(
        &mut self,
        source_values: Option<&CategoryValues>,
        target_values: Option<&CategoryValues>,
    ) {
        if let Some(values) = source_values {
            self.source_values.clone_from(values);
        }
        if let Some(values) = target_values {
            self.target_values.clone_from(values);
        }
    }

    /// Entries ordered by category then source value, for export.
    #[must_use]
    pub fn export_rows(&self) -> Vec<MappingEntry> {
        let mut rows = self.entries.clone();
        rows.sort_by(|a, b| {
            (a.category.as_str(), a.source_value.as_str())
                .cmp(&(b.category.as_str(), b.source_value.as_str()))
        });
        rows
    }

    /// Categories with at least one source value.
    fn populated_categories(&self) -> impl Iterator<Item = &String> {
        self.source_values
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(category, _)| category)
    }

    fn has_entries(&self, category: &str) -> bool {
        self.entries.iter().any(|e| e.category == category)
    }
}

impl ArtifactContent for MappingBody {
    fn outstanding(&self) -> Vec<String> {
        self.populated_categories()
            .filter(|category| !self.has_entries(category))
            .cloned()
            .collect()
    }

    fn item_views(&self, owner: Party) -> Vec<ItemView> {
        self.populated_categories()
            .map(|category| ItemView {
                id: category.clone(),
                title: category.replace('_', " "),
                owner,
                state: if self.has_entries(category) {
                    ItemState::Completed
                } else {
                    ItemState::NotStarted
                },
                required: true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(pairs: &[(&str, &[&str])]) -> CategoryValues {
        pairs
            .iter()
            .map(|(k, vs)| ((*k).to_string(), vs.iter().map(|v| (*v).to_string()).collect()))
            .collect()
    }

    fn body() -> MappingBody {
        MappingBody::new(
            values(&[
                ("leave_types", &["Annual", "Sick"]),
                ("locations", &["Sydney"]),
                ("pay_periods", &[]),
            ]),
            values(&[("leave_types", &["Annual Leave", "Personal Leave"])]),
        )
    }

    #[test]
    fn test_upsert_replaces_target_for_same_key() {
        let mut body = body();
        body.upsert(&[MappingEntry::new("leave_types", "Sick", "Annual Leave")])
            .unwrap();
        body.upsert(&[MappingEntry::new("leave_types", "Sick", "Personal Leave")])
            .unwrap();
        assert_eq!(body.entries.len(), 1);
        assert_eq!(body.entries[0].target_value, "Personal Leave");
    }

    #[test]
    fn test_outstanding_lists_unmapped_populated_categories() {
        let mut body = body();
        assert_eq!(
            body.outstanding(),
            vec!["leave_types".to_string(), "locations".to_string()]
        );
        body.upsert(&[MappingEntry::new("locations", "Sydney", "NSW")])
            .unwrap();
        assert_eq!(body.outstanding(), vec!["leave_types".to_string()]);
    }

    #[test]
    fn test_no_populated_categories_is_submittable() {
        let body = MappingBody::default();
        assert!(body.outstanding().is_empty());
    }

    #[test]
    fn test_replace_drops_previous_entries() {
        let mut body = body();
        body.upsert(&[MappingEntry::new("locations", "Sydney", "NSW")])
            .unwrap();
        body.replace(&[MappingEntry::new("leave_types", "Annual", "Annual Leave")])
            .unwrap();
        assert_eq!(body.entries.len(), 1);
        assert_eq!(body.entries[0].category, "leave_types");
    }

    #[test]
    fn test_invalid_entry_rejected() {
        let mut body = body();
        let err = body
            .upsert(&[MappingEntry::new("", "Sydney", "NSW")])
            .unwrap_err();
        assert!(err.is(crate::errors::ErrorKind::InvalidInput));
        assert!(body.entries.is_empty());
    }

    #[test]
    fn test_update_values_only_touches_provided_maps() {
        let mut body = body();
        body.update_values(None, Some(&values(&[("locations", &["NSW", "VIC"])])));
        assert_eq!(body.source_values.len(), 3);
        assert_eq!(body.target_values["locations"].len(), 2);
        assert!(!body.target_values.contains_key("leave_types"));
    }

    #[test]
    fn test_export_rows_sorted_by_key() {
        let mut body = body();
        body.upsert(&[
            MappingEntry::new("locations", "Sydney", "NSW"),
            MappingEntry::new("leave_types", "Sick", "Personal Leave"),
            MappingEntry::new("leave_types", "Annual", "Annual Leave"),
        ])
        .unwrap();

        let rows = body.export_rows();
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|e| (e.category.as_str(), e.source_value.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("leave_types", "Annual"), ("leave_types", "Sick"), ("locations", "Sydney")]
        );
        assert_eq!(body.entries[0].category, "locations");
    }
}
