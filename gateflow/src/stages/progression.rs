//! The stage progression controller.
//!
//! Only explicit admin actions move a project's stage pointer; approving an
//! artifact never does.

use std::sync::Arc;
use tracing::{debug, info};

use super::catalog::StageKey;
use crate::config::EngineConfig;
use crate::core::{BuildComponent, BuildComponentStatus, Caller, Project};
use crate::errors::{GateflowError, Result};
use crate::events::{event_types, AuditEvent, EventSink};
use crate::store::WorkflowStore;
use crate::utils::now_utc;

/// Loads a project, applies `f` and saves it with an optimistic version
/// check, re-running `f` on fresh state after a conflict.
pub(crate) async fn modify_project<T, F>(
    store: &dyn WorkflowStore,
    attempts: u32,
    project_id: &str,
    mut f: F,
) -> Result<(Project, T)>
where
    F: FnMut(&mut Project) -> Result<T>,
{
    for attempt in 1..=attempts {
        let mut project = store
            .get_project(project_id)
            .await?
            .ok_or_else(|| GateflowError::not_found("Project", project_id))?;
        let expected = project.version;
        let out = f(&mut project)?;
        project.updated_at = now_utc();

        match store.save_project(&project, expected).await {
            Ok(saved) => return Ok((saved, out)),
            Err(err) if err.is_conflict() => {
                debug!(project_id, attempt, "Project save conflicted, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(GateflowError::not_editable(
        "Project was modified concurrently, please retry",
    ))
}

/// Moves projects through the stage catalog.
#[derive(Clone)]
pub struct StageProgressionController {
    store: Arc<dyn WorkflowStore>,
    events: Arc<dyn EventSink>,
    config: EngineConfig,
}

impl std::fmt::Debug for StageProgressionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageProgressionController")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StageProgressionController {
    /// Creates a controller.
    #[must_use]
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        events: Arc<dyn EventSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            events,
            config,
        }
    }

    async fn authorize(&self, caller: &Caller, project_id: &str) -> Result<()> {
        self.store
            .get_project(project_id)
            .await?
            .ok_or_else(|| GateflowError::not_found("Project", project_id))?;
        if !caller.is_admin() {
            return Err(GateflowError::forbidden(
                "Only admins can change a project's stage",
            ));
        }
        Ok(())
    }

    async fn move_to<F>(&self, caller: &Caller, project_id: &str, event_type: &str, target: F) -> Result<Project>
    where
        F: Fn(StageKey) -> Result<StageKey>,
    {
        self.authorize(caller, project_id).await?;
        let (project, from) = modify_project(
            self.store.as_ref(),
            self.config.attempts(),
            project_id,
            |project| {
                let from = project.current_stage;
                project.current_stage = target(from)?;
                Ok(from)
            },
        )
        .await?;

        info!(
            project_id,
            from = %from,
            to = %project.current_stage,
            actor = %caller.user_id,
            "Project stage changed"
        );
        self.events
            .emit(
                AuditEvent::new(event_type, project_id, &caller.user_id).with_data(
                    serde_json::json!({
                        "from": from,
                        "to": project.current_stage,
                    }),
                ),
            )
            .await;
        Ok(project)
    }

    /// Moves the project to the next catalog stage.
    pub async fn advance(&self, caller: &Caller, project_id: &str) -> Result<Project> {
        self.move_to(caller, project_id, event_types::STAGE_ADVANCED, |current| {
            current
                .next()
                .ok_or_else(|| GateflowError::already_at_final_stage(current))
        })
        .await
    }

    /// Moves the project back to the previous catalog stage.
    pub async fn lock(&self, caller: &Caller, project_id: &str) -> Result<Project> {
        self.move_to(caller, project_id, event_types::STAGE_LOCKED, |current| {
            current
                .prev()
                .ok_or_else(|| GateflowError::already_at_first_stage(current))
        })
        .await
    }

    /// Moves the project back to `target`, which must come strictly before
    /// the current stage.
    pub async fn lock_to(&self, caller: &Caller, project_id: &str, target: &str) -> Result<Project> {
        let target = target.parse::<StageKey>();
        self.move_to(caller, project_id, event_types::STAGE_LOCKED, |current| {
            let target = target.clone()?;
            if target.ordinal() < current.ordinal() {
                Ok(target)
            } else {
                Err(GateflowError::invalid_target_stage(target, current))
            }
        })
        .await
    }

    /// Records the progress of one integration build component.
    pub async fn set_build_component_status(
        &self,
        caller: &Caller,
        project_id: &str,
        component: BuildComponent,
        status: BuildComponentStatus,
    ) -> Result<Project> {
        self.authorize(caller, project_id).await?;
        let (project, previous) = modify_project(
            self.store.as_ref(),
            self.config.attempts(),
            project_id,
            |project| {
                let previous = project.build_components.get(component);
                project.build_components.set(component, status);
                Ok(previous)
            },
        )
        .await?;

        info!(
            project_id,
            component = %component,
            status = ?status,
            "Build component status updated"
        );
        self.events
            .emit(
                AuditEvent::new(event_types::BUILD_COMPONENT_UPDATED, project_id, &caller.user_id)
                    .with_data(serde_json::json!({
                        "component": component,
                        "from": previous,
                        "to": status,
                    })),
            )
            .await;
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::events::CollectingEventSink;
    use crate::store::InMemoryStore;

    fn controller(stage: StageKey) -> (StageProgressionController, Arc<CollectingEventSink>) {
        let store = Arc::new(InMemoryStore::new());
        store.insert_project(Project::new("p-1", "acme", "Acme").at_stage(stage));
        let events = Arc::new(CollectingEventSink::new());
        let controller =
            StageProgressionController::new(store, events.clone(), EngineConfig::default());
        (controller, events)
    }

    fn admin() -> Caller {
        Caller::admin("a-1")
    }

    #[tokio::test]
    async fn test_advance_walks_catalog() {
        let (controller, events) = controller(StageKey::PreSales);
        let project = controller.advance(&admin(), "p-1").await.unwrap();
        assert_eq!(project.current_stage, StageKey::Discovery);
        let project = controller.advance(&admin(), "p-1").await.unwrap();
        assert_eq!(project.current_stage, StageKey::Provisioning);
        assert_eq!(events.events_of_type("stage.advanced").len(), 2);
    }

    #[tokio::test]
    async fn test_advance_at_final_stage() {
        let (controller, _) = controller(StageKey::Support);
        let err = controller.advance(&admin(), "p-1").await.unwrap_err();
        assert!(err.is(ErrorKind::AlreadyAtFinalStage));
    }

    #[tokio::test]
    async fn test_lock_at_first_stage() {
        let (controller, _) = controller(StageKey::PreSales);
        let err = controller.lock(&admin(), "p-1").await.unwrap_err();
        assert!(err.is(ErrorKind::AlreadyAtFirstStage));
    }

    #[tokio::test]
    async fn test_lock_repeatedly_moves_back() {
        let (controller, _) = controller(StageKey::Mapping);
        controller.lock(&admin(), "p-1").await.unwrap();
        let project = controller.lock(&admin(), "p-1").await.unwrap();
        assert_eq!(project.current_stage, StageKey::Provisioning);
    }

    #[tokio::test]
    async fn test_lock_to_target() {
        let (controller, _) = controller(StageKey::Uat);
        let err = controller.lock_to(&admin(), "p-1", "uat").await.unwrap_err();
        assert!(err.is(ErrorKind::InvalidTargetStage));
        let err = controller.lock_to(&admin(), "p-1", "staging").await.unwrap_err();
        assert!(err.is(ErrorKind::UnknownStageKind));

        let project = controller.lock_to(&admin(), "p-1", "discovery").await.unwrap();
        assert_eq!(project.current_stage, StageKey::Discovery);
    }

    #[tokio::test]
    async fn test_clients_cannot_move_stages() {
        let (controller, events) = controller(StageKey::Discovery);
        let err = controller
            .advance(&Caller::client("c-1", "acme"), "p-1")
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Forbidden));
        assert!(events.is_empty());

        let err = controller.advance(&admin(), "missing").await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_build_component_status() {
        let (controller, events) = controller(StageKey::Build);
        let project = controller
            .set_build_component_status(
                &admin(),
                "p-1",
                BuildComponent::Payslip,
                BuildComponentStatus::InProgress,
            )
            .await
            .unwrap();
        assert_eq!(project.build_components.payslip, BuildComponentStatus::InProgress);
        assert_eq!(project.version, 2);
        assert_eq!(events.len(), 1);
    }
}
