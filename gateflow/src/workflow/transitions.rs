//! Guards and effects of the single-party review state machine.
//!
//! ```text
//! active --submit--> submitted --approve--> approved
//!    ^                   |
//!    +--request changes--+
//! ```
//!
//! Everything here is pure: the engine loads a container, calls
//! [`apply_action`] and persists the result. Guards are checked in a fixed
//! order (immutable, role, status, input) so a caller always sees the most
//! fundamental reason an action is refused.

use serde::{Deserialize, Serialize};

use super::container::{ArtifactContent, ArtifactBody, ContainerMutation, WorkflowContainer};
use crate::core::{ArtifactType, Caller, ContainerStatus, Party};
use crate::errors::{GateflowError, Result};
use crate::utils::Timestamp;

/// An action against a single-party container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ContainerAction {
    /// Partial save by the owner (or an admin value edit).
    Mutate(ContainerMutation),
    /// Hand the artifact to the reviewer.
    Submit,
    /// Accept the artifact.
    Approve {
        /// Optional approval notes.
        #[serde(default)]
        notes: Option<String>,
    },
    /// Send the artifact back to its owner.
    RequestChanges {
        /// Reviewer feedback; must not be blank.
        notes: String,
    },
}

impl ContainerAction {
    /// Action name, used in logs and audit events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mutate(_) => "mutate",
            Self::Submit => "submit",
            Self::Approve { .. } => "approve",
            Self::RequestChanges { .. } => "request_changes",
        }
    }

    fn required_party(&self, artifact_type: ArtifactType) -> Party {
        match self {
            Self::Mutate(mutation) => mutation.required_party(artifact_type),
            Self::Submit => artifact_type.owner(),
            Self::Approve { .. } | Self::RequestChanges { .. } => artifact_type.reviewer(),
        }
    }

    fn required_status(&self) -> ContainerStatus {
        match self {
            Self::Mutate(_) | Self::Submit => ContainerStatus::Active,
            Self::Approve { .. } | Self::RequestChanges { .. } => ContainerStatus::Submitted,
        }
    }
}

/// The effect of an applied action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Status before.
    pub from: ContainerStatus,
    /// Status after.
    pub to: ContainerStatus,
    /// Party to notify after commit, if any.
    pub notify: Option<Party>,
}

fn status_error(container: &WorkflowContainer, required: ContainerStatus) -> GateflowError {
    let title = container.artifact_type.title();
    match required {
        ContainerStatus::Active => GateflowError::not_editable(format!(
            "{title} has been submitted and is awaiting review"
        )),
        _ => GateflowError::not_editable(format!("{title} is not awaiting review")),
    }
}

/// Checks and applies `action` to `container` on behalf of `caller`.
///
/// On error the container is left untouched.
pub fn apply_action(
    container: &mut WorkflowContainer,
    caller: &Caller,
    action: &ContainerAction,
    now: Timestamp,
) -> Result<Transition> {
    let artifact = container.artifact_type;
    if !artifact.has_review_gate() {
        return Err(GateflowError::invalid_input(format!(
            "{} has no review workflow",
            artifact.title()
        )));
    }
    if container.status.is_terminal() {
        return Err(GateflowError::immutable(artifact.title()));
    }

    let required_party = action.required_party(artifact);
    if caller.party != required_party {
        return Err(GateflowError::forbidden(format!(
            "Only the {required_party} party can {} the {}",
            action.name().replace('_', " "),
            artifact.label()
        )));
    }

    let required_status = action.required_status();
    if container.status != required_status {
        return Err(status_error(container, required_status));
    }

    let from = container.status;
    let notify = match action {
        ContainerAction::Mutate(mutation) => {
            let mut body = container.body.clone();
            mutation.apply(&mut body, &caller.user_id, now)?;
            container.body = body;
            None
        }
        ContainerAction::Submit => {
            let outstanding = container.outstanding();
            if !outstanding.is_empty() {
                return Err(GateflowError::incomplete_items(outstanding));
            }
            container.status = ContainerStatus::Submitted;
            container.submitted_at = Some(now);
            Some(artifact.reviewer())
        }
        ContainerAction::Approve { notes } => {
            let notes = notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string);
            if let (ArtifactBody::Signoff(body), Some(text)) = (&mut container.body, &notes) {
                body.confirm_text = Some(text.clone());
            }
            container.status = ContainerStatus::Approved;
            container.approved_at = Some(now);
            container.approved_by = Some(caller.user_id.clone());
            container.reviewed_at = Some(now);
            container.reviewed_by = Some(caller.user_id.clone());
            if notes.is_some() {
                container.review_notes = notes;
            }
            Some(artifact.owner())
        }
        ContainerAction::RequestChanges { notes } => {
            let notes = notes.trim();
            if notes.is_empty() {
                return Err(GateflowError::missing_review_notes());
            }
            container.body.on_changes_requested();
            container.status = ContainerStatus::Active;
            container.submitted_at = None;
            container.reviewed_at = Some(now);
            container.reviewed_by = Some(caller.user_id.clone());
            container.review_notes = Some(notes.to_string());
            Some(artifact.owner())
        }
    };

    container.updated_at = now;
    Ok(Transition {
        from,
        to: container.status,
        notify,
    })
}

/// Records the authoring admin's countersignature on an approved build
/// specification.
pub fn countersign(container: &mut WorkflowContainer, caller: &Caller, now: Timestamp) -> Result<()> {
    let ArtifactBody::Signoff(body) = &mut container.body else {
        return Err(GateflowError::invalid_input(format!(
            "{} cannot be countersigned",
            container.artifact_type.title()
        )));
    };
    if !caller.is_admin() {
        return Err(GateflowError::forbidden(
            "Only the admin party can countersign the build specification",
        ));
    }
    if container.status != ContainerStatus::Approved {
        return Err(GateflowError::not_editable(
            "Build specification must be approved before it is countersigned",
        ));
    }
    body.countersign(&caller.user_id, now)?;
    container.updated_at = now;
    Ok(())
}
