//! Single-party review workflow operations.

use tracing::{debug, info};

use super::WorkflowEngine;
use crate::core::{ArtifactType, Caller, ContainerStatus};
use crate::errors::{GateflowError, Result};
use crate::events::{event_types, AuditEvent};
use crate::notifications::messages;
use crate::store::StoreError;
use crate::utils::now_utc;
use crate::workflow::{
    apply_action, countersign, ArtifactBody, ContainerAction, ContainerMutation, ContainerView,
    InitializeRequest, MappingEntry, WorkflowContainer,
};

impl WorkflowEngine {
    /// The caller's view of a container.
    pub async fn get_container(
        &self,
        caller: &Caller,
        project_id: &str,
        artifact: ArtifactType,
    ) -> Result<ContainerView> {
        self.load_project(caller, project_id).await?;
        let container = self.require_container(project_id, artifact).await?;
        Ok(ContainerView::for_caller(&container, caller))
    }

    /// Creates the container for `request.artifact_type()`.
    ///
    /// Admin only. A second initialize, concurrent or not, fails with
    /// `AlreadyInitialized`.
    pub async fn initialize(
        &self,
        caller: &Caller,
        project_id: &str,
        request: InitializeRequest,
    ) -> Result<WorkflowContainer> {
        let project = self.load_project(caller, project_id).await?;
        let artifact = request.artifact_type();
        if !caller.is_admin() {
            return Err(GateflowError::forbidden(format!(
                "Only admins can initialize the {}",
                artifact.label()
            )));
        }

        let container = WorkflowContainer::new(&project.id, artifact, request.into_body());
        let container = self
            .store()
            .insert_container(&container)
            .await
            .map_err(|err| match err {
                StoreError::Duplicate { .. } => GateflowError::already_initialized(artifact.title()),
                other => other.into(),
            })?;

        info!(
            project_id,
            artifact = %artifact,
            container_id = %container.id,
            actor = %caller.user_id,
            "Container initialized"
        );
        self.audit(
            AuditEvent::new(event_types::CONTAINER_INITIALIZED, project_id, &caller.user_id)
                .with_data(serde_json::json!({
                    "artifact_type": artifact,
                    "container_id": container.id,
                })),
        )
        .await;

        // A build specification is published to the client when submitted.
        if artifact != ArtifactType::BuildSpec {
            self.notify(
                &project,
                messages::artifact_ready(artifact, &project.name),
                &container.id,
            )
            .await;
        }
        Ok(container)
    }

    /// Applies a partial save.
    pub async fn mutate(
        &self,
        caller: &Caller,
        project_id: &str,
        artifact: ArtifactType,
        mutation: ContainerMutation,
    ) -> Result<WorkflowContainer> {
        self.perform(caller, project_id, artifact, ContainerAction::Mutate(mutation))
            .await
    }

    /// Submits the container for review.
    pub async fn submit(
        &self,
        caller: &Caller,
        project_id: &str,
        artifact: ArtifactType,
    ) -> Result<WorkflowContainer> {
        self.perform(caller, project_id, artifact, ContainerAction::Submit)
            .await
    }

    /// Approves a submitted container.
    pub async fn approve(
        &self,
        caller: &Caller,
        project_id: &str,
        artifact: ArtifactType,
        notes: Option<String>,
    ) -> Result<WorkflowContainer> {
        self.perform(caller, project_id, artifact, ContainerAction::Approve { notes })
            .await
    }

    /// Sends a submitted container back with notes.
    pub async fn request_changes(
        &self,
        caller: &Caller,
        project_id: &str,
        artifact: ArtifactType,
        notes: impl Into<String>,
    ) -> Result<WorkflowContainer> {
        let action = ContainerAction::RequestChanges {
            notes: notes.into(),
        };
        self.perform(caller, project_id, artifact, action).await
    }

    /// Runs any single-party action.
    pub async fn perform(
        &self,
        caller: &Caller,
        project_id: &str,
        artifact: ArtifactType,
        action: ContainerAction,
    ) -> Result<WorkflowContainer> {
        let project = self.load_project(caller, project_id).await?;
        let (container, transition) = self
            .modify_container(project_id, artifact, |container| {
                apply_action(container, caller, &action, now_utc())
            })
            .await?;

        let event_type = match &action {
            ContainerAction::Mutate(mutation) => {
                debug!(
                    project_id,
                    artifact = %artifact,
                    op = mutation.name(),
                    version = container.version,
                    "Container updated"
                );
                event_types::CONTAINER_MUTATED
            }
            ContainerAction::Submit => event_types::CONTAINER_SUBMITTED,
            ContainerAction::Approve { .. } => event_types::CONTAINER_APPROVED,
            ContainerAction::RequestChanges { .. } => event_types::CONTAINER_CHANGES_REQUESTED,
        };
        if transition.from != transition.to {
            info!(
                project_id,
                artifact = %artifact,
                from = %transition.from,
                to = %transition.to,
                actor = %caller.user_id,
                "Container transitioned"
            );
        }
        self.audit(
            AuditEvent::new(event_type, project_id, &caller.user_id).with_data(serde_json::json!({
                "artifact_type": artifact,
                "from": transition.from,
                "to": transition.to,
                "version": container.version,
            })),
        )
        .await;

        if transition.notify.is_some() {
            let draft = match &action {
                ContainerAction::Submit => Some(messages::artifact_submitted(artifact, &project.name)),
                ContainerAction::Approve { notes } => Some(messages::artifact_approved(
                    artifact,
                    &project.name,
                    notes.as_deref().map(str::trim).filter(|n| !n.is_empty()),
                )),
                ContainerAction::RequestChanges { notes } => Some(messages::changes_requested(
                    artifact,
                    &project.name,
                    notes.trim(),
                )),
                ContainerAction::Mutate(_) => None,
            };
            if let Some(draft) = draft {
                self.notify(&project, draft, &container.version.to_string())
                    .await;
            }
        }
        Ok(container)
    }

    /// Records the admin countersignature on an approved build
    /// specification.
    pub async fn countersign_build_spec(
        &self,
        caller: &Caller,
        project_id: &str,
    ) -> Result<WorkflowContainer> {
        self.load_project(caller, project_id).await?;
        let (container, ()) = self
            .modify_container(project_id, ArtifactType::BuildSpec, |container| {
                countersign(container, caller, now_utc())
            })
            .await?;

        info!(project_id, actor = %caller.user_id, "Build specification countersigned");
        self.audit(AuditEvent::new(
            event_types::CONTAINER_COUNTERSIGNED,
            project_id,
            &caller.user_id,
        ))
        .await;
        Ok(container)
    }

    /// Exports the entries of an approved mapping (admin), ordered by
    /// category and source value.
    pub async fn export_mapping(&self, caller: &Caller, project_id: &str) -> Result<Vec<MappingEntry>> {
        self.load_project(caller, project_id).await?;
        if !caller.is_admin() {
            return Err(GateflowError::forbidden("Only admins can export the data mapping"));
        }
        let container = self.require_container(project_id, ArtifactType::Mapping).await?;
        if container.status != ContainerStatus::Approved {
            return Err(GateflowError::not_editable(
                "Data mapping must be approved before exporting",
            ));
        }
        let ArtifactBody::Mapping(body) = &container.body else {
            return Err(GateflowError::storage(format!(
                "mapping container holds a {} body",
                container.body.kind()
            )));
        };

        let rows = body.export_rows();
        info!(project_id, rows = rows.len(), actor = %caller.user_id, "Data mapping exported");
        self.audit(
            AuditEvent::new(event_types::MAPPING_EXPORTED, project_id, &caller.user_id)
                .with_data(serde_json::json!({ "rows": rows.len() })),
        )
        .await;
        Ok(rows)
    }
}
