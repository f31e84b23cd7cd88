//! The workflow container: a common header around a closed set of
//! artifact bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::checklist::ChecklistBody;
use super::item::ItemTemplate;
use super::mapping::{CategoryValues, MappingBody, MappingEntry};
use super::provisioning::ProvisioningBody;
use super::questionnaire::{QuestionnaireBody, QuestionnaireTemplate};
use super::signoff::SignoffBody;
use super::uat::{ScenarioResultInput, UatBody, UatTemplate};
use super::view::ItemView;
use crate::core::{ArtifactType, ContainerStatus, Party};
use crate::errors::{GateflowError, Result};
use crate::utils::{generate_id, now_utc, Timestamp};

/// Behaviour every artifact body provides to the transition engine.
pub trait ArtifactContent {
    /// References of required items that are not yet done.
    fn outstanding(&self) -> Vec<String>;

    /// Items with their derived state. `owner` is the artifact's owning
    /// party, used by bodies whose items carry no owner of their own.
    fn item_views(&self, owner: Party) -> Vec<ItemView>;

    /// Called when the reviewer sends the container back.
    fn on_changes_requested(&mut self) {}
}

/// Artifact body, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactBody {
    /// Questionnaire responses.
    Questionnaire(QuestionnaireBody),
    /// Checklist items.
    Checklist(ChecklistBody),
    /// Mapping table.
    Mapping(MappingBody),
    /// UAT results.
    Uat(UatBody),
    /// Sign-off document.
    Signoff(SignoffBody),
    /// Two-phase provisioning steps.
    Provisioning(ProvisioningBody),
}

impl ArtifactBody {
    /// Short name of the body shape.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Questionnaire(_) => "questionnaire",
            Self::Checklist(_) => "checklist",
            Self::Mapping(_) => "mapping",
            Self::Uat(_) => "uat",
            Self::Signoff(_) => "signoff",
            Self::Provisioning(_) => "provisioning",
        }
    }

    fn content(&self) -> &dyn ArtifactContent {
        match self {
            Self::Questionnaire(body) => body,
            Self::Checklist(body) => body,
            Self::Mapping(body) => body,
            Self::Uat(body) => body,
            Self::Signoff(body) => body,
            Self::Provisioning(body) => body,
        }
    }

    fn content_mut(&mut self) -> &mut dyn ArtifactContent {
        match self {
            Self::Questionnaire(body) => body,
            Self::Checklist(body) => body,
            Self::Mapping(body) => body,
            Self::Uat(body) => body,
            Self::Signoff(body) => body,
            Self::Provisioning(body) => body,
        }
    }
}

impl ArtifactContent for ArtifactBody {
    fn outstanding(&self) -> Vec<String> {
        self.content().outstanding()
    }

    fn item_views(&self, owner: Party) -> Vec<ItemView> {
        self.content().item_views(owner)
    }

    fn on_changes_requested(&mut self) {
        self.content_mut().on_changes_requested();
    }
}

/// Per-project, per-artifact-type workflow instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowContainer {
    /// Container id.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Artifact type; unique per project.
    pub artifact_type: ArtifactType,
    /// Life-cycle status.
    pub status: ContainerStatus,
    /// Artifact content.
    pub body: ArtifactBody,
    /// Set on submit, cleared when changes are requested.
    pub submitted_at: Option<Timestamp>,
    /// Last review decision time.
    pub reviewed_at: Option<Timestamp>,
    /// Last reviewer.
    pub reviewed_by: Option<String>,
    /// Approval time.
    pub approved_at: Option<Timestamp>,
    /// Approver.
    pub approved_by: Option<String>,
    /// Reviewer notes.
    pub review_notes: Option<String>,
    /// Optimistic concurrency version, maintained by the store.
    pub version: u64,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}

impl WorkflowContainer {
    /// Creates an active container.
    #[must_use]
    pub fn new(project_id: impl Into<String>, artifact_type: ArtifactType, body: ArtifactBody) -> Self {
        let now = now_utc();
        Self {
            id: generate_id(),
            project_id: project_id.into(),
            artifact_type,
            status: ContainerStatus::Active,
            body,
            submitted_at: None,
            reviewed_at: None,
            reviewed_by: None,
            approved_at: None,
            approved_by: None,
            review_notes: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Required items still open.
    #[must_use]
    pub fn outstanding(&self) -> Vec<String> {
        self.body.outstanding()
    }
}

/// Content an admin supplies when initializing a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "artifact_type", rename_all = "snake_case")]
pub enum InitializeRequest {
    /// Discovery questionnaire from a template.
    Discovery {
        /// Template to copy.
        template: QuestionnaireTemplate,
    },
    /// Configuration checklist; built-in items when `items` is absent.
    BobConfig {
        /// Custom items.
        #[serde(default)]
        items: Option<Vec<ItemTemplate>>,
    },
    /// Mapping over pulled source values.
    Mapping {
        /// Source system values.
        #[serde(default)]
        source_values: CategoryValues,
        /// Target system values.
        #[serde(default)]
        target_values: CategoryValues,
    },
    /// UAT scenarios from a template.
    Uat {
        /// Template to copy.
        template: UatTemplate,
    },
    /// Build specification draft.
    BuildSpec {
        /// Document title.
        title: String,
        /// Document content.
        #[serde(default)]
        content: String,
    },
    /// Provisioning steps; built-in steps when `steps` is absent.
    Provisioning {
        /// Custom steps.
        #[serde(default)]
        steps: Option<Vec<ItemTemplate>>,
    },
}

impl InitializeRequest {
    /// The artifact type the request creates.
    #[must_use]
    pub const fn artifact_type(&self) -> ArtifactType {
        match self {
            Self::Discovery { .. } => ArtifactType::Discovery,
            Self::BobConfig { .. } => ArtifactType::BobConfig,
            Self::Mapping { .. } => ArtifactType::Mapping,
            Self::Uat { .. } => ArtifactType::Uat,
            Self::BuildSpec { .. } => ArtifactType::BuildSpec,
            Self::Provisioning { .. } => ArtifactType::Provisioning,
        }
    }

    /// Builds the initial body.
    #[must_use]
    pub fn into_body(self) -> ArtifactBody {
        match self {
            Self::Discovery { template } => {
                ArtifactBody::Questionnaire(QuestionnaireBody::new(template))
            }
            Self::BobConfig { items } => ArtifactBody::Checklist(match items {
                Some(items) => ChecklistBody::from_templates(&items, Party::Client),
                None => ChecklistBody::with_default_items(),
            }),
            Self::Mapping {
                source_values,
                target_values,
            } => ArtifactBody::Mapping(MappingBody::new(source_values, target_values)),
            Self::Uat { template } => ArtifactBody::Uat(UatBody::new(template)),
            Self::BuildSpec { title, content } => {
                ArtifactBody::Signoff(SignoffBody::new(title, content))
            }
            Self::Provisioning { steps } => ArtifactBody::Provisioning(match steps {
                Some(steps) => ProvisioningBody::from_templates(&steps),
                None => ProvisioningBody::with_default_steps(),
            }),
        }
    }
}

/// A partial save against a container's body.
///
/// Every mutation is a keyed upsert so repeated or reordered saves converge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ContainerMutation {
    /// Merge questionnaire answers; `null` clears an answer.
    MergeResponses {
        /// Answers keyed by question id.
        responses: BTreeMap<String, Option<Value>>,
    },
    /// Set or clear a checklist item.
    ToggleItem {
        /// Item id.
        item_id: String,
        /// Target completion.
        completed: bool,
    },
    /// Upsert mapping entries.
    UpsertMappingEntries {
        /// Entries keyed by (category, source value).
        entries: Vec<MappingEntry>,
    },
    /// Replace all mapping entries.
    ReplaceMappingEntries {
        /// New entries.
        entries: Vec<MappingEntry>,
    },
    /// Replace mapping value lists (admin).
    UpdateMappingValues {
        /// Source system values.
        #[serde(default)]
        source_values: Option<CategoryValues>,
        /// Target system values.
        #[serde(default)]
        target_values: Option<CategoryValues>,
    },
    /// Upsert UAT results.
    RecordUatResults {
        /// Results keyed by scenario id.
        results: BTreeMap<String, ScenarioResultInput>,
    },
    /// Edit the sign-off document.
    EditDocument {
        /// New title.
        #[serde(default)]
        title: Option<String>,
        /// New content.
        content: String,
    },
}

impl ContainerMutation {
    /// Operation name, used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MergeResponses { .. } => "merge_responses",
            Self::ToggleItem { .. } => "toggle_item",
            Self::UpsertMappingEntries { .. } => "upsert_mapping_entries",
            Self::ReplaceMappingEntries { .. } => "replace_mapping_entries",
            Self::UpdateMappingValues { .. } => "update_mapping_values",
            Self::RecordUatResults { .. } => "record_uat_results",
            Self::EditDocument { .. } => "edit_document",
        }
    }

    /// The party allowed to perform the mutation on `artifact_type`.
    #[must_use]
    pub const fn required_party(&self, artifact_type: ArtifactType) -> Party {
        match self {
            Self::UpdateMappingValues { .. } => Party::Admin,
            _ => artifact_type.owner(),
        }
    }

    /// Applies the mutation to `body`.
    ///
    /// Fails with `InvalidInput` when the mutation does not fit the body.
    pub fn apply(&self, body: &mut ArtifactBody, user_id: &str, now: Timestamp) -> Result<()> {
        match (self, body) {
            (Self::MergeResponses { responses }, ArtifactBody::Questionnaire(b)) => {
                b.merge(responses)
            }
            (Self::ToggleItem { item_id, completed }, ArtifactBody::Checklist(b)) => {
                b.toggle(item_id, *completed, user_id, now).map(|_| ())
            }
            (Self::UpsertMappingEntries { entries }, ArtifactBody::Mapping(b)) => b.upsert(entries),
            (Self::ReplaceMappingEntries { entries }, ArtifactBody::Mapping(b)) => {
                b.replace(entries)
            }
            (
                Self::UpdateMappingValues {
                    source_values,
                    target_values,
                },
                ArtifactBody::Mapping(b),
            ) => {
                b.update_values(source_values.as_ref(), target_values.as_ref());
                Ok(())
            }
            (Self::RecordUatResults { results }, ArtifactBody::Uat(b)) => {
                b.record(results, user_id, now)
            }
            (Self::EditDocument { title, content }, ArtifactBody::Signoff(b)) => {
                b.edit(title.as_deref(), content);
                Ok(())
            }
            (mutation, body) => Err(GateflowError::invalid_input(format!(
                "Operation '{}' does not apply to a {} body",
                mutation.name(),
                body.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initialize_request_builds_matching_body() {
        let request = InitializeRequest::BobConfig { items: None };
        assert_eq!(request.artifact_type(), ArtifactType::BobConfig);
        match request.into_body() {
            ArtifactBody::Checklist(body) => assert_eq!(body.items.len(), 6),
            other => panic!("unexpected body {}", other.kind()),
        }
    }

    #[test]
    fn test_initialize_request_from_json() {
        let request: InitializeRequest = serde_json::from_value(json!({
            "artifact_type": "build_spec",
            "title": "Build specification",
            "content": "Nightly employee sync"
        }))
        .unwrap();
        assert_eq!(request.artifact_type(), ArtifactType::BuildSpec);
    }

    #[test]
    fn test_mutation_body_mismatch() {
        let mut body = ArtifactBody::Checklist(ChecklistBody::default());
        let mutation = ContainerMutation::EditDocument {
            title: None,
            content: "x".to_string(),
        };
        let err = mutation.apply(&mut body, "u", now_utc()).unwrap_err();
        assert!(err.is(crate::errors::ErrorKind::InvalidInput));
        assert!(err.to_string().contains("checklist"));
    }

    #[test]
    fn test_mapping_values_need_admin() {
        let mutation = ContainerMutation::UpdateMappingValues {
            source_values: None,
            target_values: None,
        };
        assert_eq!(mutation.required_party(ArtifactType::Mapping), Party::Admin);

        let toggle = ContainerMutation::ToggleItem {
            item_id: "i".to_string(),
            completed: true,
        };
        assert_eq!(toggle.required_party(ArtifactType::BobConfig), Party::Client);
        assert_eq!(toggle.required_party(ArtifactType::BuildSpec), Party::Admin);
    }

    #[test]
    fn test_body_serializes_with_kind_tag() {
        let body = ArtifactBody::Signoff(SignoffBody::new("T", "C"));
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["kind"], "signoff");
        assert_eq!(value["title"], "T");
    }

    #[test]
    fn test_mutation_from_json() {
        let mutation: ContainerMutation = serde_json::from_value(json!({
            "op": "merge_responses",
            "responses": {"q1": "yes", "q2": null}
        }))
        .unwrap();
        match mutation {
            ContainerMutation::MergeResponses { responses } => {
                assert_eq!(responses["q1"], Some(json!("yes")));
                assert_eq!(responses["q2"], None);
            }
            other => panic!("unexpected {}", other.name()),
        }
    }
}
