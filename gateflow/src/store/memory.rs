//! In-memory store used by tests and embedders without a database.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use super::{StoreError, StoreResult, WorkflowStore};
use crate::core::{ArtifactType, Party, Project};
use crate::workflow::{GoLiveChecklist, GoLiveEvent, WorkflowContainer};

#[derive(Debug, Clone)]
struct Member {
    user_id: String,
    party: Party,
    client_id: Option<String>,
}

/// A [`WorkflowStore`] backed by concurrent hash maps.
///
/// Uniqueness and version checks happen under the map's per-shard entry
/// lock, so concurrent inserts of the same key produce exactly one row.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    projects: DashMap<String, Project>,
    containers: DashMap<(String, ArtifactType), WorkflowContainer>,
    checklists: DashMap<String, GoLiveChecklist>,
    events: DashMap<String, GoLiveEvent>,
    members: RwLock<Vec<Member>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a project, assigning version 1 if the project carries none.
    pub fn insert_project(&self, mut project: Project) -> Project {
        if project.version == 0 {
            project.version = 1;
        }
        self.projects.insert(project.id.clone(), project.clone());
        project
    }

    /// Registers a user so that notifications can find them.
    pub fn register_user(
        &self,
        user_id: impl Into<String>,
        party: Party,
        client_id: Option<&str>,
    ) {
        self.members.write().push(Member {
            user_id: user_id.into(),
            party,
            client_id: client_id.map(str::to_string),
        });
    }

    /// Returns the number of stored containers.
    #[must_use]
    pub fn container_count(&self) -> usize {
        self.containers.len()
    }
}

fn check_version(
    entity: &'static str,
    id: &str,
    stored: u64,
    expected: u64,
) -> StoreResult<()> {
    if stored == expected {
        Ok(())
    } else {
        Err(StoreError::Conflict {
            entity,
            id: id.to_string(),
            expected,
            actual: stored,
        })
    }
}

#[async_trait]
impl WorkflowStore for InMemoryStore {
    async fn get_project(&self, project_id: &str) -> StoreResult<Option<Project>> {
        Ok(self.projects.get(project_id).map(|p| p.value().clone()))
    }

    async fn save_project(&self, project: &Project, expected_version: u64) -> StoreResult<Project> {
        let mut slot = self
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "project",
                id: project.id.clone(),
            })?;
        check_version("project", &project.id, slot.version, expected_version)?;

        let mut saved = project.clone();
        saved.version = expected_version + 1;
        *slot = saved.clone();
        Ok(saved)
    }

    async fn party_members(&self, project: &Project, party: Party) -> StoreResult<Vec<String>> {
        let members = self.members.read();
        Ok(members
            .iter()
            .filter(|m| m.party == party)
            .filter(|m| match party {
                Party::Admin => true,
                Party::Client => m.client_id.as_deref() == Some(project.client_id.as_str()),
            })
            .map(|m| m.user_id.clone())
            .collect())
    }

    async fn get_container(
        &self,
        project_id: &str,
        artifact_type: ArtifactType,
    ) -> StoreResult<Option<WorkflowContainer>> {
        Ok(self
            .containers
            .get(&(project_id.to_string(), artifact_type))
            .map(|c| c.value().clone()))
    }

    async fn insert_container(
        &self,
        container: &WorkflowContainer,
    ) -> StoreResult<WorkflowContainer> {
        let key = (container.project_id.clone(), container.artifact_type);
        match self.containers.entry(key) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                entity: "container",
                id: format!("{}/{}", container.project_id, container.artifact_type),
            }),
            Entry::Vacant(slot) => {
                let mut stored = container.clone();
                stored.version = 1;
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn save_container(
        &self,
        container: &WorkflowContainer,
        expected_version: u64,
    ) -> StoreResult<WorkflowContainer> {
        let key = (container.project_id.clone(), container.artifact_type);
        let mut slot = self
            .containers
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound {
                entity: "container",
                id: container.id.clone(),
            })?;
        check_version("container", &container.id, slot.version, expected_version)?;

        let mut saved = container.clone();
        saved.version = expected_version + 1;
        *slot = saved.clone();
        Ok(saved)
    }

    async fn get_go_live_checklist(
        &self,
        project_id: &str,
    ) -> StoreResult<Option<GoLiveChecklist>> {
        Ok(self.checklists.get(project_id).map(|c| c.value().clone()))
    }

    async fn insert_go_live_checklist(
        &self,
        checklist: &GoLiveChecklist,
    ) -> StoreResult<GoLiveChecklist> {
        match self.checklists.entry(checklist.project_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                entity: "go-live checklist",
                id: checklist.project_id.clone(),
            }),
            Entry::Vacant(slot) => {
                let mut stored = checklist.clone();
                stored.version = 1;
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn save_go_live_checklist(
        &self,
        checklist: &GoLiveChecklist,
        expected_version: u64,
    ) -> StoreResult<GoLiveChecklist> {
        let mut slot = self
            .checklists
            .get_mut(&checklist.project_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "go-live checklist",
                id: checklist.project_id.clone(),
            })?;
        check_version(
            "go-live checklist",
            &checklist.id,
            slot.version,
            expected_version,
        )?;

        let mut saved = checklist.clone();
        saved.version = expected_version + 1;
        *slot = saved.clone();
        Ok(saved)
    }

    async fn get_go_live_event(&self, project_id: &str) -> StoreResult<Option<GoLiveEvent>> {
        Ok(self.events.get(project_id).map(|e| e.value().clone()))
    }

    async fn insert_go_live_event(&self, event: &GoLiveEvent) -> StoreResult<GoLiveEvent> {
        match self.events.entry(event.project_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                entity: "go-live event",
                id: event.project_id.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(event.clone());
                Ok(event.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{ArtifactBody, ChecklistBody};

    fn container(project_id: &str) -> WorkflowContainer {
        WorkflowContainer::new(
            project_id,
            ArtifactType::BobConfig,
            ArtifactBody::Checklist(ChecklistBody::default()),
        )
    }

    #[tokio::test]
    async fn test_insert_container_is_unique() {
        let store = InMemoryStore::new();
        let first = store.insert_container(&container("p-1")).await.unwrap();
        assert_eq!(first.version, 1);

        let err = store.insert_container(&container("p-1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert_eq!(store.container_count(), 1);
    }

    #[tokio::test]
    async fn test_save_container_checks_version() {
        let store = InMemoryStore::new();
        let stored = store.insert_container(&container("p-1")).await.unwrap();

        let saved = store.save_container(&stored, 1).await.unwrap();
        assert_eq!(saved.version, 2);

        let err = store.save_container(&stored, 1).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_party_members_scoped_to_client() {
        let store = InMemoryStore::new();
        let project = store.insert_project(Project::new("p-1", "acme", "Acme"));
        store.register_user("admin-1", Party::Admin, None);
        store.register_user("client-1", Party::Client, Some("acme"));
        store.register_user("client-2", Party::Client, Some("globex"));

        let clients = store.party_members(&project, Party::Client).await.unwrap();
        assert_eq!(clients, vec!["client-1".to_string()]);
        let admins = store.party_members(&project, Party::Admin).await.unwrap();
        assert_eq!(admins, vec!["admin-1".to_string()]);
    }

    #[tokio::test]
    async fn test_save_missing_project() {
        let store = InMemoryStore::new();
        let err = store
            .save_project(&Project::new("ghost", "acme", "Ghost"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "project", .. }));
    }
}
