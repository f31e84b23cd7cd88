//! The workflow engine.
//!
//! [`WorkflowEngine`] exposes one method per portal endpoint. Each call
//! loads fresh state, checks the caller's access to the project, lets the
//! pure rules in [`crate::workflow`] decide, persists with an optimistic
//! version check and then, after commit, notifies and audits. Notification
//! failures are logged and swallowed.

mod golive;
mod provisioning;
mod single_party;


pub use golive::{GoLiveOutcome, GoLiveView};
pub use provisioning::ProvisioningView;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::core::{ArtifactType, Caller, Project, StagePosition};
use crate::errors::{GateflowError, Result};
use crate::events::{AuditEvent, EventSink, NoOpEventSink};
use crate::notifications::{NotificationDispatcher, NotificationDraft};
use crate::stages::{self, StageOverviewEntry, StageProgressionController};
use crate::store::WorkflowStore;
use crate::utils::now_utc;
use crate::workflow::WorkflowContainer;

/// Stateless workflow engine over a store, a dispatcher and an audit sink.
#[derive(Clone)]
pub struct WorkflowEngine {
    store: Arc<dyn WorkflowStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    events: Arc<dyn EventSink>,
    config: EngineConfig,
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WorkflowEngine {
    /// Creates an engine with default configuration and no audit sink.
    #[must_use]
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            events: Arc::new(NoOpEventSink),
            config: EngineConfig::default(),
        }
    }

    /// Sets the audit sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A stage controller sharing this engine's store and audit sink.
    #[must_use]
    pub fn stage_controller(&self) -> StageProgressionController {
        StageProgressionController::new(
            Arc::clone(&self.store),
            Arc::clone(&self.events),
            self.config.clone(),
        )
    }

    /// Loads a project the caller can see.
    pub async fn project(&self, caller: &Caller, project_id: &str) -> Result<Project> {
        self.load_project(caller, project_id).await
    }

    /// Every catalog stage with its position for the project.
    pub async fn stage_overview(
        &self,
        caller: &Caller,
        project_id: &str,
    ) -> Result<Vec<StageOverviewEntry>> {
        let project = self.load_project(caller, project_id).await?;
        Ok(stages::stage_overview(project.current_stage))
    }

    /// Position of one stage for the project.
    pub async fn stage_position(
        &self,
        caller: &Caller,
        project_id: &str,
        stage_key: &str,
    ) -> Result<StagePosition> {
        let project = self.load_project(caller, project_id).await?;
        stages::resolve_status(stage_key, project.current_stage.as_str())
    }

    /// Loads a project and checks that the caller may see it.
    pub(crate) async fn load_project(&self, caller: &Caller, project_id: &str) -> Result<Project> {
        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| GateflowError::not_found("Project", project_id))?;
        if !project.is_visible_to(caller) {
            return Err(GateflowError::forbidden(
                "You do not have access to this project",
            ));
        }
        Ok(project)
    }

    pub(crate) async fn require_container(
        &self,
        project_id: &str,
        artifact: ArtifactType,
    ) -> Result<WorkflowContainer> {
        self.store
            .get_container(project_id, artifact)
            .await?
            .ok_or_else(|| GateflowError::not_found(artifact.title(), project_id))
    }

    /// Loads a container, applies `f` and saves it, re-running `f` on fresh
    /// state after a version conflict.
    ///
    /// When every attempt conflicts the error reflects the latest state:
    /// `Immutable` if the container was approved meanwhile, otherwise
    /// `NotEditable`.
    pub(crate) async fn modify_container<T, F>(
        &self,
        project_id: &str,
        artifact: ArtifactType,
        mut f: F,
    ) -> Result<(WorkflowContainer, T)>
    where
        F: FnMut(&mut WorkflowContainer) -> Result<T>,
    {
        for attempt in 1..=self.config.attempts() {
            let mut container = self.require_container(project_id, artifact).await?;
            let expected = container.version;
            let out = f(&mut container)?;
            container.updated_at = now_utc();

            match self.store.save_container(&container, expected).await {
                Ok(saved) => return Ok((saved, out)),
                Err(err) if err.is_conflict() => {
                    debug!(
                        project_id,
                        artifact = %artifact,
                        attempt,
                        "Container save conflicted, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        let latest = self.require_container(project_id, artifact).await?;
        warn!(
            project_id,
            artifact = %artifact,
            status = %latest.status,
            "Container conflict retries exhausted"
        );
        Err(if latest.status.is_terminal() {
            GateflowError::immutable(artifact.title())
        } else {
            GateflowError::not_editable(format!(
                "{} was modified concurrently, please reload",
                artifact.title()
            ))
        })
    }

    /// Delivers a notification to every member of the draft's audience.
    ///
    /// Never fails: lookup and dispatch errors are logged.
    pub(crate) async fn notify(&self, project: &Project, draft: NotificationDraft, occurrence: &str) {
        let recipients = match self.store.party_members(project, draft.audience).await {
            Ok(recipients) => recipients,
            Err(err) => {
                warn!(
                    project_id = %project.id,
                    kind = %draft.kind,
                    error = %err,
                    "Could not resolve notification recipients"
                );
                return;
            }
        };
        if recipients.is_empty() {
            debug!(
                project_id = %project.id,
                kind = %draft.kind,
                audience = %draft.audience,
                "No recipients for notification"
            );
            return;
        }

        let record = draft.into_record(project, recipients, &self.config, occurrence);
        if let Err(err) = self.dispatcher.dispatch(&record).await {
            warn!(
                project_id = %project.id,
                notification_id = %record.id,
                kind = %record.kind,
                error = %err,
                "Notification dispatch failed"
            );
        }
    }

    pub(crate) async fn audit(&self, event: AuditEvent) {
        self.events.emit(event).await;
    }

    pub(crate) fn store(&self) -> &dyn WorkflowStore {
        self.store.as_ref()
    }
}
