//! Single-party configuration checklist.

use serde::{Deserialize, Serialize};

use super::container::ArtifactContent;
use super::item::{outstanding_items, ItemTemplate, WorkflowItem};
use super::view::ItemView;
use crate::core::Party;
use crate::errors::{GateflowError, Result};
use crate::utils::Timestamp;

/// Built-in configuration checklist content.
#[must_use]
pub fn default_configuration_items() -> Vec<ItemTemplate> {
    vec![
        ItemTemplate::new("org_units", "Organisation units (departments)").with_description(
            "Make sure departments and the org structure in the HR system match how payroll categorises employees.",
        ),
        ItemTemplate::new("leave_types", "Leave types").with_description(
            "Confirm every leave type is configured with the correct names and accrual rules.",
        ),
        ItemTemplate::new("employee_fields", "Employee profiles and fields").with_description(
            "Check that employment type, work location, pay rate type and start date are populated for every employee.",
        ),
        ItemTemplate::new("pay_groups", "Pay groups and pay calendars").with_description(
            "Assign each employee to the pay group whose calendar matches their payroll schedule.",
        ),
        ItemTemplate::new("work_locations", "Work locations").with_description(
            "Configure all offices, sites and remote locations and assign them to employees.",
        ),
        ItemTemplate::new("custom_fields", "Custom fields review").with_description(
            "Populate any custom fields flagged as relevant to the integration for all active employees.",
        ),
    ]
}

/// A list of items completed by the owning party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistBody {
    /// Items in display order.
    pub items: Vec<WorkflowItem>,
}

impl ChecklistBody {
    /// Seeds a checklist owned by `owner`.
    #[must_use]
    pub fn from_templates(templates: &[ItemTemplate], owner: Party) -> Self {
        Self {
            items: templates.iter().map(|t| t.instantiate(owner)).collect(),
        }
    }

    /// Seeds the built-in configuration checklist.
    #[must_use]
    pub fn with_default_items() -> Self {
        Self::from_templates(&default_configuration_items(), Party::Client)
    }

    /// Sets or clears one item's completion.
    pub fn toggle(
        &mut self,
        item_id: &str,
        completed: bool,
        user_id: &str,
        now: Timestamp,
    ) -> Result<&WorkflowItem> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| GateflowError::not_found("Checklist item", item_id))?;
        item.set_completed(completed, user_id, now);
        Ok(item)
    }
}

impl ArtifactContent for ChecklistBody {
    fn outstanding(&self) -> Vec<String> {
        outstanding_items(&self.items)
    }

    fn item_views(&self, _owner: Party) -> Vec<ItemView> {
        self.items.iter().map(ItemView::from).collect()
    }

    fn on_changes_requested(&mut self) {
        for item in &mut self.items {
            item.clear_completion();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ItemState;
    use crate::utils::now_utc;

    #[test]
    fn test_default_items_are_required() {
        let body = ChecklistBody::with_default_items();
        assert_eq!(body.items.len(), 6);
        assert_eq!(body.outstanding().len(), 6);
    }

    #[test]
    fn test_toggle_and_outstanding() {
        let mut body = ChecklistBody::with_default_items();
        let ids: Vec<String> = body.items.iter().map(|i| i.id.clone()).collect();
        for id in &ids {
            body.toggle(id, true, "c-1", now_utc()).unwrap();
        }
        assert!(body.outstanding().is_empty());

        body.toggle(&ids[2], false, "c-1", now_utc()).unwrap();
        assert_eq!(body.outstanding(), vec![ids[2].clone()]);
    }

    #[test]
    fn test_toggle_unknown_item() {
        let mut body = ChecklistBody::with_default_items();
        let err = body.toggle("nope", true, "c-1", now_utc()).unwrap_err();
        assert!(err.is(crate::errors::ErrorKind::NotFound));
    }

    #[test]
    fn test_changes_requested_clears_completion() {
        let mut body = ChecklistBody::with_default_items();
        let id = body.items[0].id.clone();
        body.toggle(&id, true, "c-1", now_utc()).unwrap();
        body.on_changes_requested();
        assert!(body.item_views(Party::Client).iter().all(|v| v.state == ItemState::NotStarted));
    }

    #[test]
    fn test_empty_checklist_has_nothing_outstanding() {
        assert!(ChecklistBody::default().outstanding().is_empty());
    }
}
