//! Role-filtered read models.

use serde::Serialize;

use super::container::{ArtifactBody, ArtifactContent, WorkflowContainer};
use super::item::WorkflowItem;
use crate::core::{ArtifactType, Caller, ContainerStatus, ItemState, Party};
use crate::utils::Timestamp;

/// An item as presented to a caller, tagged with its owner and explicit
/// derived state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    /// Item id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Party that completes the item.
    pub owner: Party,
    /// Derived state.
    pub state: ItemState,
    /// Whether the item gates submission.
    pub required: bool,
}

impl From<&WorkflowItem> for ItemView {
    fn from(item: &WorkflowItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            owner: item.owner,
            state: item.state(),
            required: item.required,
        }
    }
}

/// An action the caller may take on a container right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailableAction {
    /// Edit items.
    Edit,
    /// Submit for review.
    Submit,
    /// Approve.
    Approve,
    /// Send back with notes.
    RequestChanges,
    /// Replace the mapping's source and target value lists (admin).
    EditValues,
}

/// A container as presented to one caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerView {
    /// Container id.
    pub id: String,
    /// Project id.
    pub project_id: String,
    /// Artifact type.
    pub artifact_type: ArtifactType,
    /// Container status.
    pub status: ContainerStatus,
    /// Owning party.
    pub owner: Party,
    /// Reviewing party.
    pub reviewer: Party,
    /// Items with their derived state.
    pub items: Vec<ItemView>,
    /// Required items still open.
    pub outstanding: Vec<String>,
    /// Actions open to the caller.
    pub actions: Vec<AvailableAction>,
    /// Full body; withheld from the reviewing party while a draft is still
    /// being prepared by an admin owner.
    pub body: Option<ArtifactBody>,
    /// Submission time.
    pub submitted_at: Option<Timestamp>,
    /// Last review time.
    pub reviewed_at: Option<Timestamp>,
    /// Last reviewer.
    pub reviewed_by: Option<String>,
    /// Approval time.
    pub approved_at: Option<Timestamp>,
    /// Approver.
    pub approved_by: Option<String>,
    /// Reviewer notes, kept across resubmission.
    pub review_notes: Option<String>,
    /// Version.
    pub version: u64,
}

impl ContainerView {
    /// Builds the view of `container` for `caller`.
    #[must_use]
    pub fn for_caller(container: &WorkflowContainer, caller: &Caller) -> Self {
        let owner = container.artifact_type.owner();
        let reviewer = container.artifact_type.reviewer();
        let draft_hidden = owner == Party::Admin
            && caller.party != owner
            && container.status == ContainerStatus::Active;

        let mut actions = Vec::new();
        if container.artifact_type.has_review_gate() {
            match container.status {
                ContainerStatus::Active if caller.party == owner => {
                    actions.push(AvailableAction::Edit);
                    actions.push(AvailableAction::Submit);
                }
                ContainerStatus::Submitted if caller.party == reviewer => {
                    actions.push(AvailableAction::Approve);
                    actions.push(AvailableAction::RequestChanges);
                }
                _ => {}
            }
        }
        if container.artifact_type == ArtifactType::Mapping
            && container.status == ContainerStatus::Active
            && caller.is_admin()
        {
            actions.push(AvailableAction::EditValues);
        }

        let (items, outstanding, body) = if draft_hidden {
            (Vec::new(), Vec::new(), None)
        } else {
            (
                container.body.item_views(owner),
                container.body.outstanding(),
                Some(container.body.clone()),
            )
        };

        Self {
            id: container.id.clone(),
            project_id: container.project_id.clone(),
            artifact_type: container.artifact_type,
            status: container.status,
            owner,
            reviewer,
            items,
            outstanding,
            actions,
            body,
            submitted_at: container.submitted_at,
            reviewed_at: container.reviewed_at,
            reviewed_by: container.reviewed_by.clone(),
            approved_at: container.approved_at,
            approved_by: container.approved_by.clone(),
            review_notes: container.review_notes.clone(),
            version: container.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{ChecklistBody, MappingBody, SignoffBody};

    #[test]
    fn test_owner_sees_edit_actions() {
        let container = WorkflowContainer::new(
            "p-1",
            ArtifactType::BobConfig,
            ArtifactBody::Checklist(ChecklistBody::with_default_items()),
        );
        let view = ContainerView::for_caller(&container, &Caller::client("c-1", "acme"));
        assert_eq!(view.actions, vec![AvailableAction::Edit, AvailableAction::Submit]);
        assert!(view.items.iter().all(|i| i.owner == Party::Client));
        assert!(view.items.iter().all(|i| i.state == ItemState::NotStarted));

        let admin_view = ContainerView::for_caller(&container, &Caller::admin("a-1"));
        assert!(admin_view.actions.is_empty());
        assert_eq!(admin_view.items.len(), view.items.len());
    }

    #[test]
    fn test_draft_build_spec_hidden_from_client() {
        let mut container = WorkflowContainer::new(
            "p-1",
            ArtifactType::BuildSpec,
            ArtifactBody::Signoff(SignoffBody::new("Build spec", "Draft")),
        );
        let client = Caller::client("c-1", "acme");
        assert!(ContainerView::for_caller(&container, &client).body.is_none());

        container.status = ContainerStatus::Submitted;
        let view = ContainerView::for_caller(&container, &client);
        assert!(view.body.is_some());
        assert_eq!(
            view.actions,
            vec![AvailableAction::Approve, AvailableAction::RequestChanges]
        );
    }

    #[test]
    fn test_admin_can_edit_values_of_active_mapping() {
        let mut container = WorkflowContainer::new(
            "p-1",
            ArtifactType::Mapping,
            ArtifactBody::Mapping(MappingBody::default()),
        );
        let admin = Caller::admin("a-1");
        let client = Caller::client("c-1", "acme");

        assert_eq!(
            ContainerView::for_caller(&container, &admin).actions,
            vec![AvailableAction::EditValues]
        );
        assert!(!ContainerView::for_caller(&container, &client)
            .actions
            .contains(&AvailableAction::EditValues));

        container.status = ContainerStatus::Submitted;
        assert_eq!(
            ContainerView::for_caller(&container, &admin).actions,
            vec![AvailableAction::Approve, AvailableAction::RequestChanges]
        );
    }
}
