//! Workflow items, containers and their state machines.
//!
//! This module is pure: it owns the data shapes and the rules, and never
//! touches storage or notifications. The engine composes it with a store.

mod checklist;
mod container;
mod golive;
mod item;
mod mapping;
mod provisioning;
mod questionnaire;
mod signoff;
mod transitions;
mod uat;
mod view;

pub use checklist::{default_configuration_items, ChecklistBody};
pub use container::{
    ArtifactBody, ArtifactContent, ContainerMutation, InitializeRequest, WorkflowContainer,
};
pub use golive::{default_go_live_items, GoLiveChecklist, GoLiveEvent, ToggleOutcome};
pub use item::{outstanding_items, ItemTemplate, WorkflowItem};
pub use mapping::{CategoryValues, MappingBody, MappingEntry};
pub use provisioning::{default_provisioning_steps, ProvisioningBody, ProvisioningSummary};
pub use questionnaire::{Question, QuestionnaireBody, QuestionnaireTemplate};
pub use signoff::SignoffBody;
pub use transitions::{apply_action, countersign, ContainerAction, Transition};
pub use uat::{ScenarioResult, ScenarioResultInput, UatBody, UatOutcome, UatScenario, UatTemplate};
pub use view::{AvailableAction, ContainerView, ItemView};
