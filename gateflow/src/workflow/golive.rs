//! The two-party go-live checklist.
//!
//! Admins and clients each own a collection of items. The first time a side
//! becomes fully complete the other party is told about it, once; the
//! announcement is persisted so toggling items off and on again never
//! repeats it. A go-live event freezes the checklist.

use serde::{Deserialize, Serialize};

use super::item::{outstanding_items, ItemTemplate, WorkflowItem};
use super::view::ItemView;
use crate::core::{Caller, Party};
use crate::errors::{GateflowError, Result};
use crate::utils::{generate_id, now_utc, Timestamp};

/// Built-in items for one side of the checklist.
#[must_use]
pub fn default_go_live_items(party: Party) -> Vec<ItemTemplate> {
    match party {
        Party::Admin => vec![
            ItemTemplate::new("admin_1", "Production recipes configured and tested"),
            ItemTemplate::new("admin_2", "API credentials refreshed for production"),
            ItemTemplate::new("admin_3", "Final employee mapping verified"),
            ItemTemplate::new("admin_4", "Error notification recipients configured"),
            ItemTemplate::new("admin_5", "Test run passed successfully"),
        ],
        Party::Client => vec![
            ItemTemplate::new(
                "client_1",
                "Payslip export folder is hidden from employees in the HR system",
            ),
            ItemTemplate::new(
                "client_2",
                "Email addresses designated for error and report emails",
            ),
            ItemTemplate::new("client_3", "Employee data confirmed accurate and up to date"),
            ItemTemplate::new("client_4", "Pay categories confirmed"),
            ItemTemplate::new("client_5", "Leave types confirmed"),
            ItemTemplate::new("client_6", "Final test results approved"),
        ],
    }
}

fn seed(party: Party) -> Vec<WorkflowItem> {
    default_go_live_items(party)
        .iter()
        .map(|t| t.instantiate_with_id(t.key.clone(), party))
        .collect()
}

/// Result of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Whether the toggling side is now fully complete.
    pub side_complete: bool,
    /// Whether this toggle is the one that must announce completion.
    pub announce: bool,
}

/// Admin and client item collections for a project's go-live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoLiveChecklist {
    /// Checklist id.
    pub id: String,
    /// Owning project, unique.
    pub project_id: String,
    /// Items owned by admins.
    pub admin_items: Vec<WorkflowItem>,
    /// Items owned by clients.
    pub client_items: Vec<WorkflowItem>,
    /// When admin completion was announced to clients.
    pub admin_completion_announced_at: Option<Timestamp>,
    /// When client completion was announced to admins.
    pub client_completion_announced_at: Option<Timestamp>,
    /// Set when go-live is triggered.
    pub frozen_at: Option<Timestamp>,
    /// Optimistic concurrency version, maintained by the store.
    pub version: u64,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}

impl GoLiveChecklist {
    /// Creates a checklist with the built-in items.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            id: generate_id(),
            project_id: project_id.into(),
            admin_items: seed(Party::Admin),
            client_items: seed(Party::Client),
            admin_completion_announced_at: None,
            client_completion_announced_at: None,
            frozen_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Items owned by `party`.
    #[must_use]
    pub fn items(&self, party: Party) -> &[WorkflowItem] {
        match party {
            Party::Admin => &self.admin_items,
            Party::Client => &self.client_items,
        }
    }

    fn items_mut(&mut self, party: Party) -> &mut Vec<WorkflowItem> {
        match party {
            Party::Admin => &mut self.admin_items,
            Party::Client => &mut self.client_items,
        }
    }

    fn announced_at_mut(&mut self, party: Party) -> &mut Option<Timestamp> {
        match party {
            Party::Admin => &mut self.admin_completion_announced_at,
            Party::Client => &mut self.client_completion_announced_at,
        }
    }

    /// Returns true once a go-live event froze the checklist.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen_at.is_some()
    }

    /// Required items of `party` not yet completed.
    #[must_use]
    pub fn outstanding(&self, party: Party) -> Vec<String> {
        outstanding_items(self.items(party))
    }

    /// Whether every required item of `party` is completed.
    #[must_use]
    pub fn is_side_complete(&self, party: Party) -> bool {
        self.outstanding(party).is_empty()
    }

    /// Item views for one side.
    #[must_use]
    pub fn item_views(&self, party: Party) -> Vec<ItemView> {
        self.items(party).iter().map(ItemView::from).collect()
    }

    /// Sets or clears one of the caller's items.
    ///
    /// Fails with `ChecklistFrozen` after go-live, `NotFound` for an unknown
    /// item and `WrongParty` for an item of the other side.
    pub fn toggle(
        &mut self,
        caller: &Caller,
        item_id: &str,
        completed: bool,
        now: Timestamp,
    ) -> Result<ToggleOutcome> {
        if self.is_frozen() {
            return Err(GateflowError::checklist_frozen());
        }

        let party = caller.party;
        if !self.items(party).iter().any(|item| item.id == item_id) {
            let other = party.counterparty();
            return Err(if self.items(other).iter().any(|item| item.id == item_id) {
                GateflowError::wrong_party(other)
            } else {
                GateflowError::not_found("Go-live checklist item", item_id)
            });
        }

        if let Some(item) = self
            .items_mut(party)
            .iter_mut()
            .find(|item| item.id == item_id)
        {
            item.set_completed(completed, &caller.user_id, now);
        }

        let side_complete = self.is_side_complete(party);
        let announced = self.announced_at_mut(party);
        let announce = side_complete && announced.is_none();
        if announce {
            *announced = Some(now);
        }

        Ok(ToggleOutcome {
            side_complete,
            announce,
        })
    }

    /// Freezes the checklist for go-live.
    pub fn freeze(&mut self, now: Timestamp) -> Result<()> {
        if self.is_frozen() {
            return Err(GateflowError::checklist_frozen());
        }
        self.frozen_at = Some(now);
        Ok(())
    }
}

/// The go-live trigger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoLiveEvent {
    /// Event id.
    pub id: String,
    /// Project, unique.
    pub project_id: String,
    /// Triggering admin.
    pub triggered_by: String,
    /// Trigger time.
    pub triggered_at: Timestamp,
}

impl GoLiveEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(project_id: impl Into<String>, triggered_by: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: generate_id(),
            project_id: project_id.into(),
            triggered_by: triggered_by.into(),
            triggered_at: now,
        }
    }
}
