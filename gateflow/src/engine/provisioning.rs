//! Provisioning step operations.

use serde::Serialize;
use tracing::info;

use super::WorkflowEngine;
use crate::core::{ArtifactType, Caller, Party};
use crate::errors::{GateflowError, Result};
use crate::events::{event_types, AuditEvent};
use crate::notifications::messages;
use crate::utils::{iso_timestamp, now_utc};
use crate::workflow::{
    ArtifactBody, ItemView, ProvisioningBody, ProvisioningSummary, WorkflowContainer, WorkflowItem,
};

/// Provisioning steps as presented to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningView {
    /// Project id.
    pub project_id: String,
    /// Steps with their guidance.
    pub steps: Vec<WorkflowItem>,
    /// Steps with their derived state.
    pub items: Vec<ItemView>,
    /// Counts; `all_verified` drives the completion banner.
    pub summary: ProvisioningSummary,
    /// Container version.
    pub version: u64,
}

impl ProvisioningView {
    fn from_container(container: &WorkflowContainer) -> Result<Self> {
        let body = provisioning_body(container)?;
        Ok(Self {
            project_id: container.project_id.clone(),
            steps: body.steps.clone(),
            items: body.steps.iter().map(ItemView::from).collect(),
            summary: body.summary(),
            version: container.version,
        })
    }
}

fn provisioning_body(container: &WorkflowContainer) -> Result<&ProvisioningBody> {
    match &container.body {
        ArtifactBody::Provisioning(body) => Ok(body),
        other => Err(GateflowError::storage(format!(
            "provisioning container holds a {} body",
            other.kind()
        ))),
    }
}

fn provisioning_body_mut(container: &mut WorkflowContainer) -> Result<&mut ProvisioningBody> {
    match &mut container.body {
        ArtifactBody::Provisioning(body) => Ok(body),
        other => Err(GateflowError::storage(format!(
            "provisioning container holds a {} body",
            other.kind()
        ))),
    }
}

fn require_party(caller: &Caller, party: Party, action: &str) -> Result<()> {
    if caller.party == party {
        Ok(())
    } else {
        Err(GateflowError::forbidden(format!(
            "Only the {party} party can {action} provisioning steps"
        )))
    }
}

impl WorkflowEngine {
    /// The project's provisioning steps.
    pub async fn get_provisioning(&self, caller: &Caller, project_id: &str) -> Result<ProvisioningView> {
        self.load_project(caller, project_id).await?;
        let container = self
            .require_container(project_id, ArtifactType::Provisioning)
            .await?;
        ProvisioningView::from_container(&container)
    }

    /// Marks a step completed (client).
    ///
    /// Admins hear about every completion when configured to, and always
    /// about the one that completes the last step.
    pub async fn complete_provisioning_step(
        &self,
        caller: &Caller,
        project_id: &str,
        step_id: &str,
    ) -> Result<ProvisioningView> {
        let project = self.load_project(caller, project_id).await?;
        require_party(caller, Party::Client, "complete")?;

        let (container, (step, summary)) = self
            .modify_container(project_id, ArtifactType::Provisioning, |container| {
                let body = provisioning_body_mut(container)?;
                let step = body.complete(step_id, &caller.user_id, now_utc())?;
                Ok((step, body.summary()))
            })
            .await?;

        info!(project_id, step = %step.content_ref, actor = %caller.user_id, "Provisioning step completed");
        self.audit_step(project_id, caller, &step, "completed").await;

        if self.config.notify_on_step_completion || summary.all_completed() {
            let occurrence = step
                .completed_at
                .map(|at| format!("{}:{}", step.id, iso_timestamp(&at)))
                .unwrap_or_else(|| step.id.clone());
            self.notify(
                &project,
                messages::step_completed(&project.name, &step.title, summary.all_completed()),
                &occurrence,
            )
            .await;
        }
        ProvisioningView::from_container(&container)
    }

    /// Marks a completed step verified (admin).
    ///
    /// The verification that makes every step verified notifies clients.
    pub async fn verify_provisioning_step(
        &self,
        caller: &Caller,
        project_id: &str,
        step_id: &str,
    ) -> Result<ProvisioningView> {
        let project = self.load_project(caller, project_id).await?;
        require_party(caller, Party::Admin, "verify")?;

        let (container, (step, was_all_verified, summary)) = self
            .modify_container(project_id, ArtifactType::Provisioning, |container| {
                let body = provisioning_body_mut(container)?;
                let was_all_verified = body.summary().all_verified();
                let step = body.verify(step_id, &caller.user_id, now_utc())?;
                Ok((step, was_all_verified, body.summary()))
            })
            .await?;

        info!(project_id, step = %step.content_ref, actor = %caller.user_id, "Provisioning step verified");
        self.audit_step(project_id, caller, &step, "verified").await;

        if summary.all_verified() && !was_all_verified {
            self.notify(
                &project,
                messages::steps_verified(&project.name),
                &container.version.to_string(),
            )
            .await;
        }
        ProvisioningView::from_container(&container)
    }

    /// Clears a step's completion and verification (admin).
    pub async fn reset_provisioning_step(
        &self,
        caller: &Caller,
        project_id: &str,
        step_id: &str,
    ) -> Result<ProvisioningView> {
        self.load_project(caller, project_id).await?;
        require_party(caller, Party::Admin, "reset")?;

        let (container, step) = self
            .modify_container(project_id, ArtifactType::Provisioning, |container| {
                provisioning_body_mut(container)?.reset(step_id)
            })
            .await?;

        info!(project_id, step = %step.content_ref, actor = %caller.user_id, "Provisioning step reset");
        self.audit_step(project_id, caller, &step, "reset").await;
        ProvisioningView::from_container(&container)
    }

    async fn audit_step(&self, project_id: &str, caller: &Caller, step: &WorkflowItem, change: &str) {
        self.audit(
            AuditEvent::new(event_types::PROVISIONING_STEP_UPDATED, project_id, &caller.user_id)
                .with_data(serde_json::json!({
                    "step_id": step.id,
                    "step": step.content_ref,
                    "change": change,
                    "state": step.state(),
                })),
        )
        .await;
    }
}
