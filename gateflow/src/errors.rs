//! Error types for the gateflow engine.
//!
//! Every failure the engine surfaces is a [`GateflowError`] carrying an
//! [`ErrorKind`]. Kinds are grouped into [`ErrorCategory`] values so that a
//! presentation layer can tell "you are not allowed" apart from "this is not
//! possible right now" and "you are missing required input".

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::store::StoreError;

/// Result alias used across the crate.
pub type Result<T, E = GateflowError> = std::result::Result<T, E>;

/// The kind of a workflow failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Project, container, checklist or item is absent.
    NotFound,
    /// The caller's party or organisation does not match the operation.
    Forbidden,
    /// A container already exists for the (project, artifact type) pair.
    AlreadyInitialized,
    /// The container is not in a status that allows the operation.
    NotEditable,
    /// The container has been approved and can no longer change.
    Immutable,
    /// Submit attempted while required items are outstanding.
    IncompleteItems,
    /// Request-changes attempted without reviewer notes.
    MissingReviewNotes,
    /// A party tried to toggle an item owned by the other party.
    WrongParty,
    /// The go-live checklist is frozen by a go-live event.
    ChecklistFrozen,
    /// Advance attempted at the last catalog stage.
    AlreadyAtFinalStage,
    /// Lock attempted at the first catalog stage.
    AlreadyAtFirstStage,
    /// A stage key is not part of the catalog.
    UnknownStageKind,
    /// Verification attempted before completion.
    NotYetCompleted,
    /// Completion attempted on an already completed item.
    AlreadyCompleted,
    /// Verification attempted on an already verified item.
    AlreadyVerified,
    /// A lock target is not strictly before the current stage.
    InvalidTargetStage,
    /// Structurally invalid request payload.
    InvalidInput,
    /// The storage collaborator failed.
    Storage,
}

impl ErrorKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::AlreadyInitialized => "already_initialized",
            Self::NotEditable => "not_editable",
            Self::Immutable => "immutable",
            Self::IncompleteItems => "incomplete_items",
            Self::MissingReviewNotes => "missing_review_notes",
            Self::WrongParty => "wrong_party",
            Self::ChecklistFrozen => "checklist_frozen",
            Self::AlreadyAtFinalStage => "already_at_final_stage",
            Self::AlreadyAtFirstStage => "already_at_first_stage",
            Self::UnknownStageKind => "unknown_stage_kind",
            Self::NotYetCompleted => "not_yet_completed",
            Self::AlreadyCompleted => "already_completed",
            Self::AlreadyVerified => "already_verified",
            Self::InvalidTargetStage => "invalid_target_stage",
            Self::InvalidInput => "invalid_input",
            Self::Storage => "storage",
        }
    }

    /// Groups the kind for presentation layers.
    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::Forbidden | Self::WrongParty => ErrorCategory::NotAllowed,
            Self::AlreadyInitialized
            | Self::NotEditable
            | Self::Immutable
            | Self::ChecklistFrozen
            | Self::AlreadyAtFinalStage
            | Self::AlreadyAtFirstStage
            | Self::NotYetCompleted
            | Self::AlreadyCompleted
            | Self::AlreadyVerified
            | Self::InvalidTargetStage => ErrorCategory::NotPossibleNow,
            Self::IncompleteItems
            | Self::MissingReviewNotes
            | Self::InvalidInput
            | Self::UnknownStageKind => ErrorCategory::MissingInput,
            Self::NotFound => ErrorCategory::NotFound,
            Self::Storage => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse grouping of error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The caller is not allowed to do this.
    NotAllowed,
    /// The operation is not possible in the current state.
    NotPossibleNow,
    /// The caller must supply more input first.
    MissingInput,
    /// The target does not exist.
    NotFound,
    /// Infrastructure failure.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotAllowed => "not_allowed",
            Self::NotPossibleNow => "not_possible_now",
            Self::MissingInput => "missing_input",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// A structured workflow failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GateflowError {
    /// The failure kind.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// References of outstanding items, populated for `IncompleteItems`.
    pub outstanding: Vec<String>,
}

impl GateflowError {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            outstanding: Vec::new(),
        }
    }

    /// Something the caller referenced does not exist.
    #[must_use]
    pub fn not_found(entity: &str, id: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NotFound, format!("{entity} not found: {id}"))
    }

    /// The caller may not perform the operation.
    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, reason)
    }

    /// A container already exists.
    #[must_use]
    pub fn already_initialized(what: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::AlreadyInitialized,
            format!("{what} already initialized for this project"),
        )
    }

    /// The container is not in a mutable status.
    #[must_use]
    pub fn not_editable(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotEditable, reason)
    }

    /// The container is approved.
    #[must_use]
    pub fn immutable(what: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::Immutable,
            format!("{what} has been approved and can no longer change"),
        )
    }

    /// Submit attempted with outstanding required items.
    #[must_use]
    pub fn incomplete_items(outstanding: Vec<String>) -> Self {
        Self {
            kind: ErrorKind::IncompleteItems,
            message: format!(
                "Please complete all required items before submitting. {} item(s) remaining.",
                outstanding.len()
            ),
            outstanding,
        }
    }

    /// Request-changes without notes.
    #[must_use]
    pub fn missing_review_notes() -> Self {
        Self::new(
            ErrorKind::MissingReviewNotes,
            "Reviewer notes are required when requesting changes",
        )
    }

    /// Item belongs to the other party.
    #[must_use]
    pub fn wrong_party(owner: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::WrongParty,
            format!("Only the {owner} party can update this checklist item"),
        )
    }

    /// The go-live checklist is frozen.
    #[must_use]
    pub fn checklist_frozen() -> Self {
        Self::new(
            ErrorKind::ChecklistFrozen,
            "Go-live already triggered, checklist is frozen",
        )
    }

    /// No stage after the current one.
    #[must_use]
    pub fn already_at_final_stage(stage: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::AlreadyAtFinalStage,
            format!("Project is already at the final stage ({stage})"),
        )
    }

    /// No stage before the current one.
    #[must_use]
    pub fn already_at_first_stage(stage: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::AlreadyAtFirstStage,
            format!("Project is already at the first stage ({stage})"),
        )
    }

    /// Stage key not in the catalog.
    #[must_use]
    pub fn unknown_stage_kind(key: &str) -> Self {
        Self::new(ErrorKind::UnknownStageKind, format!("Unknown stage: '{key}'"))
    }

    /// Verification before completion.
    #[must_use]
    pub fn not_yet_completed(item: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::NotYetCompleted,
            format!("'{item}' must be marked complete before it can be verified"),
        )
    }

    /// Completion repeated.
    #[must_use]
    pub fn already_completed(item: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::AlreadyCompleted,
            format!("'{item}' is already marked as complete"),
        )
    }

    /// Verification repeated.
    #[must_use]
    pub fn already_verified(item: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::AlreadyVerified,
            format!("'{item}' is already verified"),
        )
    }

    /// Lock target not strictly before the current stage.
    #[must_use]
    pub fn invalid_target_stage(target: impl fmt::Display, current: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::InvalidTargetStage,
            format!("Target stage '{target}' must be before the current stage '{current}'"),
        )
    }

    /// Structurally invalid payload.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, reason)
    }

    /// Storage failure.
    #[must_use]
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, reason)
    }

    /// Returns true if the error has the given kind.
    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Returns the category of the error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Converts to a dictionary representation for API payloads.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("kind".to_string(), serde_json::json!(self.kind.as_str()));
        map.insert(
            "category".to_string(),
            serde_json::json!(self.category().to_string()),
        );
        map.insert("message".to_string(), serde_json::json!(self.message));
        if !self.outstanding.is_empty() {
            map.insert("outstanding".to_string(), serde_json::json!(self.outstanding));
        }
        map
    }
}

impl From<StoreError> for GateflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::not_found(entity, id),
            other => Self::storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_categories_separate_calls_to_action() {
        assert_eq!(ErrorKind::Forbidden.category(), ErrorCategory::NotAllowed);
        assert_eq!(ErrorKind::WrongParty.category(), ErrorCategory::NotAllowed);
        assert_eq!(ErrorKind::NotEditable.category(), ErrorCategory::NotPossibleNow);
        assert_eq!(ErrorKind::Immutable.category(), ErrorCategory::NotPossibleNow);
        assert_eq!(ErrorKind::ChecklistFrozen.category(), ErrorCategory::NotPossibleNow);
        assert_eq!(ErrorKind::IncompleteItems.category(), ErrorCategory::MissingInput);
        assert_eq!(ErrorKind::MissingReviewNotes.category(), ErrorCategory::MissingInput);
    }

    #[test]
    fn test_incomplete_items_carries_outstanding() {
        let err = GateflowError::incomplete_items(vec!["q1".to_string(), "q3".to_string()]);
        assert!(err.is(ErrorKind::IncompleteItems));
        assert!(err.to_string().contains("2 item(s) remaining"));

        let dict = err.to_dict();
        assert_eq!(dict["kind"], "incomplete_items");
        assert_eq!(dict["category"], "missing_input");
        assert_eq!(dict["outstanding"], serde_json::json!(["q1", "q3"]));
    }

    #[test]
    fn test_kind_serialize() {
        let json = serde_json::to_string(&ErrorKind::AlreadyAtFinalStage).unwrap();
        assert_eq!(json, r#""already_at_final_stage""#);
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: GateflowError = StoreError::NotFound {
            entity: "project",
            id: "p-1".to_string(),
        }
        .into();
        assert!(err.is(ErrorKind::NotFound));
        assert_eq!(err.to_string(), "project not found: p-1");
    }
}
