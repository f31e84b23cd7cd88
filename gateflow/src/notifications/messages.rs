//! Notification copy.
//!
//! One builder per event. Copy names the project and the artifact but
//! never a vendor system.

use super::{NotificationDraft, NotificationKind};
use crate::core::{ArtifactType, Party};
use crate::stages::StageKey;

/// An artifact is ready for its owner to work on.
#[must_use]
pub fn artifact_ready(artifact: ArtifactType, project_name: &str) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::ArtifactReady,
        audience: artifact.owner(),
        stage: artifact.stage(),
        title: format!("{} ready", artifact.title()),
        message: format!(
            "Your {} for \"{project_name}\" is ready. Please work through each item.",
            artifact.label()
        ),
    }
}

/// The owner submitted an artifact; published to the reviewer.
#[must_use]
pub fn artifact_submitted(artifact: ArtifactType, project_name: &str) -> NotificationDraft {
    let message = if artifact == ArtifactType::BuildSpec {
        format!(
            "The {} for \"{project_name}\" has been published and is ready for your sign-off.",
            artifact.label()
        )
    } else {
        format!(
            "The {} for \"{project_name}\" has been submitted and is ready for review.",
            artifact.label()
        )
    };
    NotificationDraft {
        kind: NotificationKind::ArtifactSubmitted,
        audience: artifact.reviewer(),
        stage: artifact.stage(),
        title: format!("{} submitted", artifact.title()),
        message,
    }
}

/// The reviewer approved an artifact.
#[must_use]
pub fn artifact_approved(
    artifact: ArtifactType,
    project_name: &str,
    notes: Option<&str>,
) -> NotificationDraft {
    let mut message = format!(
        "The {} for \"{project_name}\" has been approved.",
        artifact.label()
    );
    if let Some(notes) = notes {
        message.push_str(&format!(" Notes: {notes}"));
    }
    NotificationDraft {
        kind: NotificationKind::ArtifactApproved,
        audience: artifact.owner(),
        stage: artifact.stage(),
        title: format!("{} approved", artifact.title()),
        message,
    }
}

/// The reviewer sent an artifact back.
#[must_use]
pub fn changes_requested(
    artifact: ArtifactType,
    project_name: &str,
    notes: &str,
) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::ChangesRequested,
        audience: artifact.owner(),
        stage: artifact.stage(),
        title: format!("Changes requested: {}", artifact.title()),
        message: format!(
            "Changes were requested on the {} for \"{project_name}\": {notes}",
            artifact.label()
        ),
    }
}

/// A client completed a provisioning step.
#[must_use]
pub fn step_completed(project_name: &str, step_title: &str, all_completed: bool) -> NotificationDraft {
    let (title, message) = if all_completed {
        (
            "Provisioning complete".to_string(),
            format!("All provisioning steps for \"{project_name}\" are complete and ready to verify."),
        )
    } else {
        (
            format!("Provisioning step completed: {step_title}"),
            format!("\"{step_title}\" was completed for \"{project_name}\" and is ready to verify."),
        )
    };
    NotificationDraft {
        kind: NotificationKind::StepCompleted,
        audience: Party::Admin,
        stage: StageKey::Provisioning,
        title,
        message,
    }
}

/// Every provisioning step has been verified.
#[must_use]
pub fn steps_verified(project_name: &str) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::StepsVerified,
        audience: Party::Client,
        stage: StageKey::Provisioning,
        title: "Provisioning verified".to_string(),
        message: format!("All system access for \"{project_name}\" has been verified."),
    }
}

/// The go-live checklist is ready.
#[must_use]
pub fn go_live_checklist_ready(project_name: &str) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::ArtifactReady,
        audience: Party::Client,
        stage: StageKey::GoLive,
        title: "Go-live checklist ready".to_string(),
        message: format!(
            "The go-live checklist for \"{project_name}\" is ready. Please complete your items."
        ),
    }
}

/// One side finished its go-live items; told to the other side.
#[must_use]
pub fn checklist_side_complete(side: Party, project_name: &str) -> NotificationDraft {
    let (title, message) = match side {
        Party::Client => (
            "Client checklist complete",
            format!("The client has completed all go-live checklist items for \"{project_name}\"."),
        ),
        Party::Admin => (
            "Delivery team checklist complete",
            format!(
                "The delivery team has completed all go-live checklist items for \"{project_name}\"."
            ),
        ),
    };
    NotificationDraft {
        kind: NotificationKind::ChecklistSideComplete,
        audience: side.counterparty(),
        stage: StageKey::GoLive,
        title: title.to_string(),
        message,
    }
}

/// Go-live was triggered.
#[must_use]
pub fn go_live_triggered(audience: Party, project_name: &str) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::GoLiveTriggered,
        audience,
        stage: StageKey::GoLive,
        title: "You're live".to_string(),
        message: format!("\"{project_name}\" has gone live."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_goes_to_reviewer() {
        assert_eq!(
            artifact_submitted(ArtifactType::Mapping, "Acme").audience,
            Party::Admin
        );
        let draft = artifact_submitted(ArtifactType::BuildSpec, "Acme");
        assert_eq!(draft.audience, Party::Client);
        assert!(draft.message.contains("published"));
    }

    #[test]
    fn test_feedback_in_changes_requested() {
        let draft = changes_requested(ArtifactType::Uat, "Acme", "Scenario 3 failed");
        assert_eq!(draft.audience, Party::Client);
        assert!(draft.message.ends_with("Scenario 3 failed"));
        assert_eq!(draft.stage, StageKey::Uat);
    }

    #[test]
    fn test_side_complete_targets_counterparty() {
        assert_eq!(
            checklist_side_complete(Party::Client, "Acme").audience,
            Party::Admin
        );
        assert_eq!(
            checklist_side_complete(Party::Admin, "Acme").audience,
            Party::Client
        );
    }

    #[test]
    fn test_step_completed_switches_copy() {
        assert!(step_completed("Acme", "Payroll", true).title.contains("complete"));
        assert!(step_completed("Acme", "Payroll", false).message.contains("Payroll"));
    }
}
