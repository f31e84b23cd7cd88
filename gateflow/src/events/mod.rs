//! Audit trail.
//!
//! Every committed workflow change emits an [`AuditEvent`] to the engine's
//! [`EventSink`]. Sinks never fail the operation that emitted the event.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use serde::{Deserialize, Serialize};

use crate::utils::{now_utc, Timestamp};

/// Event type names.
pub mod event_types {
    /// A container was created.
    pub const CONTAINER_INITIALIZED: &str = "container.initialized";
    /// A container body was edited.
    pub const CONTAINER_MUTATED: &str = "container.mutated";
    /// A container was submitted.
    pub const CONTAINER_SUBMITTED: &str = "container.submitted";
    /// A container was approved.
    pub const CONTAINER_APPROVED: &str = "container.approved";
    /// A container was sent back.
    pub const CONTAINER_CHANGES_REQUESTED: &str = "container.changes_requested";
    /// A build specification was countersigned.
    pub const CONTAINER_COUNTERSIGNED: &str = "container.countersigned";
    /// Approved mapping entries were exported.
    pub const MAPPING_EXPORTED: &str = "mapping.exported";
    /// A provisioning step changed.
    pub const PROVISIONING_STEP_UPDATED: &str = "provisioning.step_updated";
    /// A go-live checklist was created.
    pub const GOLIVE_INITIALIZED: &str = "golive.initialized";
    /// A go-live item was toggled.
    pub const GOLIVE_ITEM_TOGGLED: &str = "golive.item_toggled";
    /// Go-live was triggered.
    pub const GOLIVE_TRIGGERED: &str = "golive.triggered";
    /// The stage pointer moved forward.
    pub const STAGE_ADVANCED: &str = "stage.advanced";
    /// The stage pointer moved back.
    pub const STAGE_LOCKED: &str = "stage.locked";
    /// A build component status changed.
    pub const BUILD_COMPONENT_UPDATED: &str = "build.component_updated";
}

/// A committed change, for the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event type, one of [`event_types`].
    pub event_type: String,
    /// Project the change belongs to.
    pub project_id: String,
    /// Acting user.
    pub actor: String,
    /// Event-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
    /// When the change committed.
    pub occurred_at: Timestamp,
}

impl AuditEvent {
    /// Creates an event stamped now.
    #[must_use]
    pub fn new(
        event_type: impl Into<String>,
        project_id: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            project_id: project_id.into(),
            actor: actor.into(),
            data: serde_json::Value::Null,
            occurred_at: now_utc(),
        }
    }

    /// Attaches a payload.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}
