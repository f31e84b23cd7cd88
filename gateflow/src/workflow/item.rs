//! The workflow item model shared by checklists, provisioning steps and the
//! go-live checklist.

use serde::{Deserialize, Serialize};

use crate::core::{ItemState, Party};
use crate::errors::{GateflowError, Result};
use crate::utils::{generate_id, Timestamp};

/// Content definition an item is seeded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplate {
    /// Stable content key, e.g. a step key or template question id.
    pub key: String,
    /// Display title.
    pub title: String,
    /// Longer guidance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the item gates submission.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl ItemTemplate {
    /// Creates a required template.
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            description: None,
            required: true,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the item optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Creates an item owned by `owner` with a fresh id.
    #[must_use]
    pub fn instantiate(&self, owner: Party) -> WorkflowItem {
        self.instantiate_with_id(generate_id(), owner)
    }

    /// Creates an item owned by `owner` with the given id.
    #[must_use]
    pub fn instantiate_with_id(&self, id: impl Into<String>, owner: Party) -> WorkflowItem {
        WorkflowItem {
            id: id.into(),
            content_ref: self.key.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            owner,
            required: self.required,
            completed_at: None,
            completed_by: None,
            verified_at: None,
            verified_by: None,
        }
    }
}

/// A unit of work within a container.
///
/// Verification is only ever recorded on top of a completion; clearing the
/// completion clears the verification with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowItem {
    /// Item id, unique within its collection.
    pub id: String,
    /// Reference to the content the item was seeded from.
    pub content_ref: String,
    /// Display title.
    pub title: String,
    /// Longer guidance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Party that completes the item.
    pub owner: Party,
    /// Whether the item gates submission.
    pub required: bool,
    /// Completion time.
    pub completed_at: Option<Timestamp>,
    /// Completing user.
    pub completed_by: Option<String>,
    /// Verification time.
    pub verified_at: Option<Timestamp>,
    /// Verifying user.
    pub verified_by: Option<String>,
}

impl WorkflowItem {
    /// Derived state.
    #[must_use]
    pub fn state(&self) -> ItemState {
        match (self.completed_at, self.verified_at) {
            (Some(_), Some(_)) => ItemState::Verified,
            (Some(_), None) => ItemState::Completed,
            _ => ItemState::NotStarted,
        }
    }

    /// Returns true once the item is completed (or verified).
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Returns true once the item is verified.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }

    /// Sets or clears completion. Completing an already completed item keeps
    /// the original stamp.
    pub fn set_completed(&mut self, completed: bool, user_id: &str, now: Timestamp) {
        if completed {
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
                self.completed_by = Some(user_id.to_string());
            }
        } else {
            self.clear_completion();
        }
    }

    /// Records completion, failing if the item is already completed.
    pub fn complete(&mut self, user_id: &str, now: Timestamp) -> Result<()> {
        if self.is_completed() {
            return Err(GateflowError::already_completed(&self.title));
        }
        self.set_completed(true, user_id, now);
        Ok(())
    }

    /// Records verification.
    ///
    /// Fails with `NotYetCompleted` before completion and `AlreadyVerified`
    /// on repeats.
    pub fn verify(&mut self, user_id: &str, now: Timestamp) -> Result<()> {
        if !self.is_completed() {
            return Err(GateflowError::not_yet_completed(&self.title));
        }
        if self.is_verified() {
            return Err(GateflowError::already_verified(&self.title));
        }
        self.verified_at = Some(now);
        self.verified_by = Some(user_id.to_string());
        Ok(())
    }

    /// Clears completion and verification together.
    pub fn clear_completion(&mut self) {
        self.completed_at = None;
        self.completed_by = None;
        self.verified_at = None;
        self.verified_by = None;
    }
}

/// Ids of required items that are not completed.
#[must_use]
pub fn outstanding_items(items: &[WorkflowItem]) -> Vec<String> {
    items
        .iter()
        .filter(|item| item.required && !item.is_completed())
        .map(|item| item.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::now_utc;

    fn item() -> WorkflowItem {
        ItemTemplate::new("org_units", "Organisation units").instantiate_with_id("i-1", Party::Client)
    }

    #[test]
    fn test_state_progression() {
        let mut item = item();
        assert_eq!(item.state(), ItemState::NotStarted);

        item.complete("u-1", now_utc()).unwrap();
        assert_eq!(item.state(), ItemState::Completed);

        item.verify("a-1", now_utc()).unwrap();
        assert_eq!(item.state(), ItemState::Verified);
    }

    #[test]
    fn test_verify_requires_completion() {
        let mut item = item();
        let err = item.verify("a-1", now_utc()).unwrap_err();
        assert!(err.is(crate::errors::ErrorKind::NotYetCompleted));
        assert!(item.verified_at.is_none());
    }

    #[test]
    fn test_repeats_rejected() {
        let mut item = item();
        item.complete("u-1", now_utc()).unwrap();
        assert!(item
            .complete("u-1", now_utc())
            .unwrap_err()
            .is(crate::errors::ErrorKind::AlreadyCompleted));

        item.verify("a-1", now_utc()).unwrap();
        assert!(item
            .verify("a-1", now_utc())
            .unwrap_err()
            .is(crate::errors::ErrorKind::AlreadyVerified));
    }

    #[test]
    fn test_clearing_completion_clears_verification() {
        let mut item = item();
        item.complete("u-1", now_utc()).unwrap();
        item.verify("a-1", now_utc()).unwrap();

        item.set_completed(false, "u-1", now_utc());
        assert_eq!(item.state(), ItemState::NotStarted);
        assert!(item.verified_by.is_none());
    }

    #[test]
    fn test_set_completed_keeps_first_stamp() {
        let mut item = item();
        item.set_completed(true, "u-1", now_utc());
        item.set_completed(true, "u-2", now_utc());
        assert_eq!(item.completed_by.as_deref(), Some("u-1"));
    }

    #[test]
    fn test_outstanding_ignores_optional() {
        let mut items = vec![
            ItemTemplate::new("a", "A").instantiate_with_id("a", Party::Client),
            ItemTemplate::new("b", "B").optional().instantiate_with_id("b", Party::Client),
        ];
        assert_eq!(outstanding_items(&items), vec!["a".to_string()]);
        items[0].set_completed(true, "u", now_utc());
        assert!(outstanding_items(&items).is_empty());
    }

    #[test]
    fn test_template_required_defaults_true() {
        let template: ItemTemplate =
            serde_json::from_str(r#"{"key": "k", "title": "T"}"#).unwrap();
        assert!(template.required);
    }
}
