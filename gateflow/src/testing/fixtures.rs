//! A seeded portal for engine tests.

use std::sync::Arc;

use super::mocks::CollectingDispatcher;
use crate::config::EngineConfig;
use crate::core::{Caller, Party, Project};
use crate::engine::WorkflowEngine;
use crate::events::CollectingEventSink;
use crate::stages::StageKey;
use crate::store::{InMemoryStore, WorkflowStore};

/// Client organisation of the seeded project.
pub const TEST_CLIENT_ID: &str = "client-acme";

/// Name of the seeded project.
pub const TEST_PROJECT_NAME: &str = "Acme Payroll Integration";

/// One project, one admin and one client user, wired to an engine that
/// records notifications and audit events.
pub struct TestPortal {
    /// Backing store.
    pub store: Arc<InMemoryStore>,
    /// Records every dispatched notification.
    pub dispatcher: Arc<CollectingDispatcher>,
    /// Records every audit event.
    pub events: Arc<CollectingEventSink>,
    /// The engine under test.
    pub engine: WorkflowEngine,
    /// The seeded project.
    pub project: Project,
}

impl TestPortal {
    /// Seeds a project at the discovery stage.
    #[must_use]
    pub fn new() -> Self {
        Self::at_stage(StageKey::Discovery)
    }

    /// Seeds a project at `stage`.
    #[must_use]
    pub fn at_stage(stage: StageKey) -> Self {
        Self::with_config(stage, EngineConfig::default())
    }

    /// Seeds a project at `stage` with a custom engine configuration.
    #[must_use]
    pub fn with_config(stage: StageKey, config: EngineConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let project = store.insert_project(
            Project::new("project-1", TEST_CLIENT_ID, TEST_PROJECT_NAME).at_stage(stage),
        );
        store.register_user("admin-1", Party::Admin, None);
        store.register_user("client-1", Party::Client, Some(TEST_CLIENT_ID));
        store.register_user("other-client-1", Party::Client, Some("client-other"));

        let dispatcher = Arc::new(CollectingDispatcher::new());
        let events = Arc::new(CollectingEventSink::new());
        let engine = WorkflowEngine::new(
            Arc::clone(&store) as Arc<dyn WorkflowStore>,
            Arc::clone(&dispatcher) as _,
        )
        .with_event_sink(Arc::clone(&events) as _)
        .with_config(config);

        Self {
            store,
            dispatcher,
            events,
            engine,
            project,
        }
    }

    /// The seeded project's id.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project.id
    }

    /// The seeded admin.
    #[must_use]
    pub fn admin(&self) -> Caller {
        Caller::admin("admin-1")
    }

    /// The seeded client user.
    #[must_use]
    pub fn client(&self) -> Caller {
        Caller::client("client-1", TEST_CLIENT_ID)
    }

    /// A client user of another organisation.
    #[must_use]
    pub fn outsider(&self) -> Caller {
        Caller::client("other-client-1", "client-other")
    }
}

impl Default for TestPortal {
    fn default() -> Self {
        Self::new()
    }
}
