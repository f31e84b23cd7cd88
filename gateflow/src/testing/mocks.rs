//! Mock collaborators for engine tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::{ArtifactType, Party, Project};
use crate::notifications::{DispatchError, NotificationDispatcher, NotificationKind, NotificationRecord};
use crate::store::{InMemoryStore, StoreError, StoreResult, WorkflowStore};
use crate::workflow::{GoLiveChecklist, GoLiveEvent, WorkflowContainer};

/// A dispatcher that keeps every record it receives.
#[derive(Debug, Default)]
pub struct CollectingDispatcher {
    records: Mutex<Vec<NotificationRecord>>,
}

impl CollectingDispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all received records.
    #[must_use]
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.records.lock().clone()
    }

    /// Returns the received records of one kind.
    #[must_use]
    pub fn records_of_kind(&self, kind: NotificationKind) -> Vec<NotificationRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect()
    }

    /// Returns the received records addressed to one party.
    #[must_use]
    pub fn records_for(&self, audience: Party) -> Vec<NotificationRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.audience == audience)
            .cloned()
            .collect()
    }

    /// Returns the number of received records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing was received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Forgets every record.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

#[async_trait]
impl NotificationDispatcher for CollectingDispatcher {
    async fn dispatch(&self, record: &NotificationRecord) -> Result<(), DispatchError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// A dispatcher whose channel is always down.
#[derive(Debug, Default)]
pub struct FailingDispatcher {
    attempts: AtomicUsize,
}

impl FailingDispatcher {
    /// Creates a failing dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many records it was asked to deliver.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationDispatcher for FailingDispatcher {
    async fn dispatch(&self, _record: &NotificationRecord) -> Result<(), DispatchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DispatchError::Unavailable("mail relay offline".to_string()))
    }
}

type InterleavedWrite = Box<dyn Fn(&mut WorkflowContainer) + Send + Sync>;

/// Wraps an [`InMemoryStore`] and injects storage faults.
///
/// Armed container saves lose a race: each either fails with a plain
/// version conflict or, when an interleaved write is set, first commits
/// that write on behalf of a competing request so the real save conflicts
/// on the stored version. Armed go-live event inserts fail with a backend
/// error before reaching the inner store.
pub struct FaultInjectingStore {
    inner: Arc<InMemoryStore>,
    armed: AtomicU32,
    injected: AtomicU32,
    interleave: Option<InterleavedWrite>,
    failing_event_inserts: AtomicU32,
}

impl std::fmt::Debug for FaultInjectingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultInjectingStore")
            .field("armed", &self.armed)
            .field("injected", &self.injected)
            .finish_non_exhaustive()
    }
}

impl FaultInjectingStore {
    /// Wraps `inner` with `conflicts` armed plain conflicts.
    #[must_use]
    pub fn new(inner: Arc<InMemoryStore>, conflicts: u32) -> Self {
        Self {
            inner,
            armed: AtomicU32::new(conflicts),
            injected: AtomicU32::new(0),
            interleave: None,
            failing_event_inserts: AtomicU32::new(0),
        }
    }

    /// Makes the next `count` go-live event inserts fail.
    #[must_use]
    pub fn with_failing_event_inserts(self, count: u32) -> Self {
        self.failing_event_inserts.store(count, Ordering::SeqCst);
        self
    }

    /// Commits `write` to the stored container before each armed save.
    #[must_use]
    pub fn with_interleaved_write(
        mut self,
        write: impl Fn(&mut WorkflowContainer) + Send + Sync + 'static,
    ) -> Self {
        self.interleave = Some(Box::new(write));
        self
    }

    /// Returns how many conflicts were injected so far.
    #[must_use]
    pub fn injected(&self) -> u32 {
        self.injected.load(Ordering::SeqCst)
    }

    fn take_armed(&self) -> bool {
        take_one(&self.armed)
    }
}

fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl WorkflowStore for FaultInjectingStore {
    async fn get_project(&self, project_id: &str) -> StoreResult<Option<Project>> {
        self.inner.get_project(project_id).await
    }

    async fn save_project(&self, project: &Project, expected_version: u64) -> StoreResult<Project> {
        self.inner.save_project(project, expected_version).await
    }

    async fn party_members(&self, project: &Project, party: Party) -> StoreResult<Vec<String>> {
        self.inner.party_members(project, party).await
    }

    async fn get_container(
        &self,
        project_id: &str,
        artifact_type: ArtifactType,
    ) -> StoreResult<Option<WorkflowContainer>> {
        self.inner.get_container(project_id, artifact_type).await
    }

    async fn insert_container(&self, container: &WorkflowContainer) -> StoreResult<WorkflowContainer> {
        self.inner.insert_container(container).await
    }

    async fn save_container(
        &self,
        container: &WorkflowContainer,
        expected_version: u64,
    ) -> StoreResult<WorkflowContainer> {
        if self.take_armed() {
            self.injected.fetch_add(1, Ordering::SeqCst);
            let Some(write) = &self.interleave else {
                return Err(StoreError::Conflict {
                    entity: "container",
                    id: container.id.clone(),
                    expected: expected_version,
                    actual: expected_version + 1,
                });
            };
            if let Some(mut current) = self
                .inner
                .get_container(&container.project_id, container.artifact_type)
                .await?
            {
                let version = current.version;
                write(&mut current);
                self.inner.save_container(&current, version).await?;
            }
        }
        self.inner.save_container(container, expected_version).await
    }

    async fn get_go_live_checklist(&self, project_id: &str) -> StoreResult<Option<GoLiveChecklist>> {
        self.inner.get_go_live_checklist(project_id).await
    }

    async fn insert_go_live_checklist(&self, checklist: &GoLiveChecklist) -> StoreResult<GoLiveChecklist> {
        self.inner.insert_go_live_checklist(checklist).await
    }

    async fn save_go_live_checklist(
        &self,
        checklist: &GoLiveChecklist,
        expected_version: u64,
    ) -> StoreResult<GoLiveChecklist> {
        self.inner.save_go_live_checklist(checklist, expected_version).await
    }

    async fn get_go_live_event(&self, project_id: &str) -> StoreResult<Option<GoLiveEvent>> {
        self.inner.get_go_live_event(project_id).await
    }

    async fn insert_go_live_event(&self, event: &GoLiveEvent) -> StoreResult<GoLiveEvent> {
        if take_one(&self.failing_event_inserts) {
            return Err(StoreError::Backend("go-live event write timed out".to_string()));
        }
        self.inner.insert_go_live_event(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ContainerStatus;
    use crate::utils::now_utc;
    use crate::workflow::InitializeRequest;

    fn record(kind: NotificationKind, audience: Party) -> NotificationRecord {
        NotificationRecord {
            id: format!("ntf:{kind}"),
            project_id: "p-1".to_string(),
            kind,
            audience,
            recipients: vec!["u-1".to_string()],
            title: "t".to_string(),
            message: "m".to_string(),
            link_url: "/p-1".to_string(),
            created_at: now_utc(),
        }
    }

    #[test]
    fn test_collecting_dispatcher_filters() {
        let dispatcher = CollectingDispatcher::new();
        tokio_test::block_on(async {
            dispatcher
                .dispatch(&record(NotificationKind::ArtifactReady, Party::Client))
                .await
                .unwrap();
            dispatcher
                .dispatch(&record(NotificationKind::ArtifactSubmitted, Party::Admin))
                .await
                .unwrap();
        });

        assert_eq!(dispatcher.len(), 2);
        assert_eq!(dispatcher.records_of_kind(NotificationKind::ArtifactReady).len(), 1);
        assert_eq!(dispatcher.records_for(Party::Admin).len(), 1);
        dispatcher.clear();
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_failing_dispatcher_counts_attempts() {
        let dispatcher = FailingDispatcher::new();
        let result = tokio_test::block_on(
            dispatcher.dispatch(&record(NotificationKind::StepsVerified, Party::Client)),
        );
        assert!(result.is_err());
        assert_eq!(dispatcher.attempts(), 1);
    }

    #[test]
    fn test_interleaved_write_wins_the_race() {
        let inner = Arc::new(InMemoryStore::new());
        let store = FaultInjectingStore::new(Arc::clone(&inner), 1).with_interleaved_write(|c| {
            c.status = ContainerStatus::Submitted;
        });

        tokio_test::block_on(async {
            let container = WorkflowContainer::new(
                "p-1",
                ArtifactType::BobConfig,
                InitializeRequest::BobConfig { items: None }.into_body(),
            );
            let stored = store.insert_container(&container).await.unwrap();

            let err = store.save_container(&stored, stored.version).await.unwrap_err();
            assert!(err.is_conflict());

            let current = store
                .get_container("p-1", ArtifactType::BobConfig)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(current.status, ContainerStatus::Submitted);
            assert_eq!(current.version, 2);

            let saved = store.save_container(&current, current.version).await.unwrap();
            assert_eq!(saved.version, 3);
        });
        assert_eq!(store.injected(), 1);
    }
}
