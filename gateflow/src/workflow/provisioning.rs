//! Per-item two-phase provisioning steps.
//!
//! Each step is completed by the client and verified by an admin. There is
//! no container-level review gate; "all verified" is derived on read.

use serde::{Deserialize, Serialize};

use super::container::ArtifactContent;
use super::item::{outstanding_items, ItemTemplate, WorkflowItem};
use super::view::ItemView;
use crate::core::Party;
use crate::errors::{GateflowError, Result};
use crate::utils::Timestamp;

/// Built-in provisioning steps, one per system the specialists need
/// access to.
#[must_use]
pub fn default_provisioning_steps() -> Vec<ItemTemplate> {
    vec![
        ItemTemplate::new("hr_system", "HR system access").with_description(
            "Create an administrator account for your integration specialist in the HR system production environment.",
        ),
        ItemTemplate::new("payroll", "Payroll system access").with_description(
            "Add your integration specialist as an administrator in the payroll system.",
        ),
        ItemTemplate::new("integration_platform", "Integration platform access").with_description(
            "Invite your integration specialist as a collaborator with admin rights in every environment.",
        ),
    ]
}

/// Completion and verification counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProvisioningSummary {
    /// Number of steps.
    pub total: usize,
    /// Steps completed (including verified).
    pub completed: usize,
    /// Steps verified.
    pub verified: usize,
}

impl ProvisioningSummary {
    /// Every step completed.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    /// Every step verified.
    #[must_use]
    pub fn all_verified(&self) -> bool {
        self.total > 0 && self.verified == self.total
    }
}

/// Provisioning steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningBody {
    /// Steps in display order.
    pub steps: Vec<WorkflowItem>,
}

impl ProvisioningBody {
    /// Seeds steps owned by the client.
    #[must_use]
    pub fn from_templates(templates: &[ItemTemplate]) -> Self {
        Self {
            steps: templates.iter().map(|t| t.instantiate(Party::Client)).collect(),
        }
    }

    /// Seeds the built-in steps.
    #[must_use]
    pub fn with_default_steps() -> Self {
        Self::from_templates(&default_provisioning_steps())
    }

    fn step_mut(&mut self, step_id: &str) -> Result<&mut WorkflowItem> {
        self.steps
            .iter_mut()
            .find(|step| step.id == step_id)
            .ok_or_else(|| GateflowError::not_found("Provisioning step", step_id))
    }

    /// Marks a step completed.
    pub fn complete(&mut self, step_id: &str, user_id: &str, now: Timestamp) -> Result<WorkflowItem> {
        let step = self.step_mut(step_id)?;
        step.complete(user_id, now)?;
        Ok(step.clone())
    }

    /// Marks a completed step verified.
    pub fn verify(&mut self, step_id: &str, user_id: &str, now: Timestamp) -> Result<WorkflowItem> {
        let step = self.step_mut(step_id)?;
        step.verify(user_id, now)?;
        Ok(step.clone())
    }

    /// Clears a step's completion and verification.
    pub fn reset(&mut self, step_id: &str) -> Result<WorkflowItem> {
        let step = self.step_mut(step_id)?;
        step.clear_completion();
        Ok(step.clone())
    }

    /// Counts.
    #[must_use]
    pub fn summary(&self) -> ProvisioningSummary {
        ProvisioningSummary {
            total: self.steps.len(),
            completed: self.steps.iter().filter(|s| s.is_completed()).count(),
            verified: self.steps.iter().filter(|s| s.is_verified()).count(),
        }
    }
}

impl ArtifactContent for ProvisioningBody {
    fn outstanding(&self) -> Vec<String> {
        outstanding_items(&self.steps)
    }

    fn item_views(&self, _owner: Party) -> Vec<ItemView> {
        self.steps.iter().map(ItemView::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::utils::now_utc;

    fn body() -> (ProvisioningBody, Vec<String>) {
        let body = ProvisioningBody::with_default_steps();
        let ids = body.steps.iter().map(|s| s.id.clone()).collect();
        (body, ids)
    }

    #[test]
    fn test_verify_before_complete_fails() {
        let (mut body, ids) = body();
        let err = body.verify(&ids[0], "a-1", now_utc()).unwrap_err();
        assert!(err.is(ErrorKind::NotYetCompleted));
        assert_eq!(body.summary().verified, 0);
    }

    #[test]
    fn test_summary_flags() {
        let (mut body, ids) = body();
        for id in &ids {
            body.complete(id, "c-1", now_utc()).unwrap();
        }
        let summary = body.summary();
        assert!(summary.all_completed());
        assert!(!summary.all_verified());

        for id in &ids {
            body.verify(id, "a-1", now_utc()).unwrap();
        }
        assert!(body.summary().all_verified());
    }

    #[test]
    fn test_reset_clears_both_phases() {
        let (mut body, ids) = body();
        body.complete(&ids[1], "c-1", now_utc()).unwrap();
        body.verify(&ids[1], "a-1", now_utc()).unwrap();

        let step = body.reset(&ids[1]).unwrap();
        assert!(!step.is_completed());
        assert!(!step.is_verified());
    }

    #[test]
    fn test_empty_body_is_never_all_verified() {
        assert!(!ProvisioningBody::default().summary().all_verified());
    }

    #[test]
    fn test_unknown_step() {
        let (mut body, _) = body();
        assert!(body
            .complete("missing", "c-1", now_utc())
            .unwrap_err()
            .is(ErrorKind::NotFound));
    }
}
