//! Go-live checklist operations and the go-live trigger.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::WorkflowEngine;
use crate::core::{Caller, Party, Project};
use crate::errors::{GateflowError, Result};
use crate::events::{event_types, AuditEvent};
use crate::notifications::messages;
use crate::stages::{modify_project, StageKey};
use crate::store::StoreError;
use crate::utils::{iso_timestamp, now_utc};
use crate::workflow::{GoLiveChecklist, GoLiveEvent, ItemView};

/// The go-live checklist as presented to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoLiveView {
    /// Full checklist.
    pub checklist: GoLiveChecklist,
    /// Admin items with their derived state.
    pub admin_items: Vec<ItemView>,
    /// Client items with their derived state.
    pub client_items: Vec<ItemView>,
    /// Whether every admin item is done.
    pub admin_complete: bool,
    /// Whether every client item is done.
    pub client_complete: bool,
    /// The go-live event, once triggered.
    pub event: Option<GoLiveEvent>,
}

/// Everything a go-live trigger changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoLiveOutcome {
    /// The new event.
    pub event: GoLiveEvent,
    /// The frozen checklist.
    pub checklist: GoLiveChecklist,
    /// The project with its go-live date set.
    pub project: Project,
}

impl WorkflowEngine {
    /// The project's go-live checklist and event.
    pub async fn get_go_live(&self, caller: &Caller, project_id: &str) -> Result<GoLiveView> {
        self.load_project(caller, project_id).await?;
        let checklist = self.require_checklist(project_id).await?;
        let event = self.store().get_go_live_event(project_id).await?;
        Ok(GoLiveView {
            admin_items: checklist.item_views(Party::Admin),
            client_items: checklist.item_views(Party::Client),
            admin_complete: checklist.is_side_complete(Party::Admin),
            client_complete: checklist.is_side_complete(Party::Client),
            checklist,
            event,
        })
    }

    /// Creates the go-live checklist (admin) and tells clients.
    pub async fn initialize_go_live(&self, caller: &Caller, project_id: &str) -> Result<GoLiveChecklist> {
        let project = self.load_project(caller, project_id).await?;
        if !caller.is_admin() {
            return Err(GateflowError::forbidden(
                "Only admins can initialize the go-live checklist",
            ));
        }

        let checklist = self
            .store()
            .insert_go_live_checklist(&GoLiveChecklist::new(&project.id))
            .await
            .map_err(|err| match err {
                StoreError::Duplicate { .. } => GateflowError::already_initialized("Go-live checklist"),
                other => other.into(),
            })?;

        info!(project_id, actor = %caller.user_id, "Go-live checklist initialized");
        self.audit(AuditEvent::new(
            event_types::GOLIVE_INITIALIZED,
            project_id,
            &caller.user_id,
        ))
        .await;
        self.notify(
            &project,
            messages::go_live_checklist_ready(&project.name),
            &checklist.id,
        )
        .await;
        Ok(checklist)
    }

    /// Sets or clears one of the caller's go-live items.
    ///
    /// The toggle that first completes a side notifies every user of the
    /// other party, exactly once per side. Fails with `ChecklistFrozen`
    /// once the go-live event exists.
    pub async fn toggle_go_live_item(
        &self,
        caller: &Caller,
        project_id: &str,
        item_id: &str,
        completed: bool,
    ) -> Result<GoLiveChecklist> {
        let project = self.load_project(caller, project_id).await?;
        if self.store().get_go_live_event(project_id).await?.is_some() {
            return Err(GateflowError::checklist_frozen());
        }
        let (checklist, outcome) = self
            .modify_checklist(project_id, |checklist| {
                checklist.toggle(caller, item_id, completed, now_utc())
            })
            .await?;

        debug!(
            project_id,
            item_id,
            completed,
            party = %caller.party,
            side_complete = outcome.side_complete,
            "Go-live item toggled"
        );
        self.audit(
            AuditEvent::new(event_types::GOLIVE_ITEM_TOGGLED, project_id, &caller.user_id).with_data(
                serde_json::json!({
                    "item_id": item_id,
                    "completed": completed,
                    "party": caller.party,
                }),
            ),
        )
        .await;

        if outcome.announce {
            info!(project_id, party = %caller.party, "Go-live checklist side complete");
            self.notify(
                &project,
                messages::checklist_side_complete(caller.party, &project.name),
                &checklist.id,
            )
            .await;
        }
        Ok(checklist)
    }

    /// Triggers go-live (admin).
    ///
    /// Requires both sides complete. Inserting the go-live event is the
    /// commit point: once it exists the checklist counts as frozen. The
    /// checklist freeze, the project's go-live date, the optional move to
    /// support and the notifications follow. A trigger interrupted after
    /// the event was recorded is finished by the next call.
    pub async fn trigger_go_live(&self, caller: &Caller, project_id: &str) -> Result<GoLiveOutcome> {
        let project = self.load_project(caller, project_id).await?;
        if !caller.is_admin() {
            return Err(GateflowError::forbidden("Only admins can trigger go-live"));
        }

        let event = match self.store().get_go_live_event(project_id).await? {
            Some(_) if project.go_live_date.is_some() => {
                return Err(GateflowError::checklist_frozen());
            }
            Some(event) => {
                warn!(project_id, event_id = %event.id, "Resuming interrupted go-live");
                event
            }
            None => self.record_go_live_event(caller, project_id).await?,
        };

        let (checklist, ()) = self
            .modify_checklist(project_id, |checklist| {
                if !checklist.is_frozen() {
                    checklist.freeze(event.triggered_at)?;
                }
                Ok(())
            })
            .await?;

        let moves_to_support = self.config.go_live_moves_to_support;
        let go_live_date = event.triggered_at;
        let (project, ()) = modify_project(self.store(), self.config.attempts(), project_id, |project| {
            project.go_live_date = Some(go_live_date);
            if moves_to_support {
                project.current_stage = StageKey::Support;
            }
            Ok(())
        })
        .await?;

        info!(
            project_id,
            actor = %caller.user_id,
            go_live_date = %iso_timestamp(&go_live_date),
            stage = %project.current_stage,
            "Go-live triggered"
        );
        self.audit(
            AuditEvent::new(event_types::GOLIVE_TRIGGERED, project_id, &caller.user_id).with_data(
                serde_json::json!({
                    "event_id": event.id,
                    "stage": project.current_stage,
                }),
            ),
        )
        .await;

        for audience in [Party::Client, Party::Admin] {
            self.notify(
                &project,
                messages::go_live_triggered(audience, &project.name),
                &event.id,
            )
            .await;
        }

        Ok(GoLiveOutcome {
            event,
            checklist,
            project,
        })
    }

    async fn record_go_live_event(&self, caller: &Caller, project_id: &str) -> Result<GoLiveEvent> {
        let checklist = self.require_checklist(project_id).await?;
        let mut outstanding = checklist.outstanding(Party::Admin);
        outstanding.extend(checklist.outstanding(Party::Client));
        if !outstanding.is_empty() {
            return Err(GateflowError::incomplete_items(outstanding));
        }

        self.store()
            .insert_go_live_event(&GoLiveEvent::new(project_id, &caller.user_id, now_utc()))
            .await
            .map_err(|err| match err {
                StoreError::Duplicate { .. } => GateflowError::checklist_frozen(),
                other => other.into(),
            })
    }

    async fn require_checklist(&self, project_id: &str) -> Result<GoLiveChecklist> {
        self.store()
            .get_go_live_checklist(project_id)
            .await?
            .ok_or_else(|| GateflowError::not_found("Go-live checklist", project_id))
    }

    async fn modify_checklist<T, F>(&self, project_id: &str, mut f: F) -> Result<(GoLiveChecklist, T)>
    where
        F: FnMut(&mut GoLiveChecklist) -> Result<T>,
    {
        for attempt in 1..=self.config.attempts() {
            let mut checklist = self.require_checklist(project_id).await?;
            let expected = checklist.version;
            let out = f(&mut checklist)?;
            checklist.updated_at = now_utc();

            match self.store().save_go_live_checklist(&checklist, expected).await {
                Ok(saved) => return Ok((saved, out)),
                Err(err) if err.is_conflict() => {
                    debug!(project_id, attempt, "Go-live checklist save conflicted, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let latest = self.require_checklist(project_id).await?;
        warn!(project_id, frozen = latest.is_frozen(), "Go-live checklist conflict retries exhausted");
        Err(if latest.is_frozen() {
            GateflowError::checklist_frozen()
        } else {
            GateflowError::not_editable("Go-live checklist was modified concurrently, please reload")
        })
    }
}
