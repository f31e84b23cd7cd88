//! Storage contract.
//!
//! The engine is stateless: every operation loads fresh state through a
//! [`WorkflowStore`] and commits with an optimistic version check. The store
//! owns versions; callers pass the version they loaded and the store rejects
//! the write with [`StoreError::Conflict`] if another writer got there first.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{ArtifactType, Party, Project};
use crate::workflow::{GoLiveChecklist, GoLiveEvent, WorkflowContainer};

/// Errors reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Row key.
        id: String,
    },

    /// A uniqueness constraint rejected the insert.
    #[error("{entity} already exists: {id}")]
    Duplicate {
        /// Entity name.
        entity: &'static str,
        /// Row key.
        id: String,
    },

    /// The stored version no longer matches the caller's.
    #[error("{entity} {id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        /// Entity name.
        entity: &'static str,
        /// Row key.
        id: String,
        /// Version the caller loaded.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true for optimistic concurrency conflicts.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence collaborator.
///
/// Inserts assign version 1; successful saves return the row with its
/// version incremented by one.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Loads a project.
    async fn get_project(&self, project_id: &str) -> StoreResult<Option<Project>>;

    /// Saves a project if its stored version equals `expected_version`.
    async fn save_project(&self, project: &Project, expected_version: u64)
        -> StoreResult<Project>;

    /// Lists the user ids of one party that should hear about a project.
    ///
    /// Admin users are global; client users belong to the project's
    /// client organisation.
    async fn party_members(&self, project: &Project, party: Party) -> StoreResult<Vec<String>>;

    /// Loads the container for a (project, artifact type) pair.
    async fn get_container(
        &self,
        project_id: &str,
        artifact_type: ArtifactType,
    ) -> StoreResult<Option<WorkflowContainer>>;

    /// Inserts a container, failing with `Duplicate` if one exists for the
    /// same (project, artifact type) pair.
    async fn insert_container(&self, container: &WorkflowContainer)
        -> StoreResult<WorkflowContainer>;

    /// Saves a container if its stored version equals `expected_version`.
    async fn save_container(
        &self,
        container: &WorkflowContainer,
        expected_version: u64,
    ) -> StoreResult<WorkflowContainer>;

    /// Loads a project's go-live checklist.
    async fn get_go_live_checklist(&self, project_id: &str)
        -> StoreResult<Option<GoLiveChecklist>>;

    /// Inserts a go-live checklist, one per project.
    async fn insert_go_live_checklist(
        &self,
        checklist: &GoLiveChecklist,
    ) -> StoreResult<GoLiveChecklist>;

    /// Saves a go-live checklist if its stored version equals
    /// `expected_version`.
    async fn save_go_live_checklist(
        &self,
        checklist: &GoLiveChecklist,
        expected_version: u64,
    ) -> StoreResult<GoLiveChecklist>;

    /// Loads a project's go-live event.
    async fn get_go_live_event(&self, project_id: &str) -> StoreResult<Option<GoLiveEvent>>;

    /// Inserts a go-live event, one per project.
    async fn insert_go_live_event(&self, event: &GoLiveEvent) -> StoreResult<GoLiveEvent>;
}
