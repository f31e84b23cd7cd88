//! Notification records and the dispatch contract.
//!
//! The engine builds a [`NotificationRecord`] after a state change commits
//! and hands it to a [`NotificationDispatcher`]. Delivery (in-app rows,
//! email) belongs to the dispatcher. Dispatch is best effort: failures are
//! logged and never reach the caller of the workflow operation.

mod dispatcher;
pub mod messages;

pub use dispatcher::{DispatchError, LoggingDispatcher, NoOpDispatcher, NotificationDispatcher};

#[cfg(test)]
pub use dispatcher::MockNotificationDispatcher;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EngineConfig;
use crate::core::{Party, Project};
use crate::stages::StageKey;
use crate::utils::{dedupe_key, now_utc, Timestamp};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An artifact was initialized and is ready for its owner.
    ArtifactReady,
    /// An artifact was submitted for review.
    ArtifactSubmitted,
    /// An artifact was approved.
    ArtifactApproved,
    /// The reviewer sent an artifact back.
    ChangesRequested,
    /// A provisioning step was completed.
    StepCompleted,
    /// Every provisioning step is verified.
    StepsVerified,
    /// One side of the go-live checklist is complete.
    ChecklistSideComplete,
    /// Go-live was triggered.
    GoLiveTriggered,
}

impl NotificationKind {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ArtifactReady => "artifact_ready",
            Self::ArtifactSubmitted => "artifact_submitted",
            Self::ArtifactApproved => "artifact_approved",
            Self::ChangesRequested => "changes_requested",
            Self::StepCompleted => "step_completed",
            Self::StepsVerified => "steps_verified",
            Self::ChecklistSideComplete => "checklist_side_complete",
            Self::GoLiveTriggered => "go_live_triggered",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification before recipients and links are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    /// Kind.
    pub kind: NotificationKind,
    /// Party that receives it.
    pub audience: Party,
    /// Stage whose page the notification links to.
    pub stage: StageKey,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl NotificationDraft {
    /// Resolves the draft into a record.
    ///
    /// `occurrence` distinguishes repeated occurrences of the same kind on
    /// the same subject (for instance a second submission after changes were
    /// requested); identical inputs always yield the same record id.
    #[must_use]
    pub fn into_record(
        self,
        project: &Project,
        recipients: Vec<String>,
        config: &EngineConfig,
        occurrence: &str,
    ) -> NotificationRecord {
        let audience = self.audience.to_string();
        let id = dedupe_key(&[
            project.id.as_str(),
            self.kind.as_str(),
            self.stage.as_str(),
            audience.as_str(),
            occurrence,
        ]);
        let link_url = config.link_for(self.audience, &project.id, self.stage);
        NotificationRecord {
            id,
            project_id: project.id.clone(),
            kind: self.kind,
            audience: self.audience,
            recipients,
            title: self.title,
            message: self.message,
            link_url,
            created_at: now_utc(),
        }
    }
}

/// A resolved notification handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Deterministic dedupe key.
    pub id: String,
    /// Project.
    pub project_id: String,
    /// Kind.
    pub kind: NotificationKind,
    /// Receiving party.
    pub audience: Party,
    /// Receiving user ids.
    pub recipients: Vec<String>,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Deep link into the portal.
    pub link_url: String,
    /// Creation time.
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NotificationDraft {
        NotificationDraft {
            kind: NotificationKind::ArtifactSubmitted,
            audience: Party::Admin,
            stage: StageKey::Mapping,
            title: "Data mapping submitted".to_string(),
            message: "Review it".to_string(),
        }
    }

    #[test]
    fn test_record_id_is_deterministic() {
        let project = Project::new("p-1", "acme", "Acme");
        let config = EngineConfig::default();
        let a = draft().into_record(&project, vec!["a-1".to_string()], &config, "v2");
        let b = draft().into_record(&project, vec!["a-1".to_string()], &config, "v2");
        let c = draft().into_record(&project, vec!["a-1".to_string()], &config, "v4");
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_record_link_follows_audience() {
        let project = Project::new("p-1", "acme", "Acme");
        let record = draft().into_record(&project, vec![], &EngineConfig::default(), "1");
        assert_eq!(record.link_url, "/dashboard/admin/projects/p-1/mapping");
        assert_eq!(record.kind.to_string(), "artifact_submitted");
    }
}
