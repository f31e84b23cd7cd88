//! Status enums shared by the workflow variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Container-level status of a single-party workflow.
///
/// An absent container is the "uninitialized" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    /// The owning party may edit.
    Active,
    /// Waiting for the reviewing party.
    Submitted,
    /// Approved; no further changes.
    Approved,
}

impl Default for ContainerStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Submitted => write!(f, "submitted"),
            Self::Approved => write!(f, "approved"),
        }
    }
}

impl ContainerStatus {
    /// Returns true if the owning party may mutate items.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns true once the container can never change again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Derived state of a single workflow item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Nothing recorded yet.
    NotStarted,
    /// Completed by the owning party.
    Completed,
    /// Completed and verified by the reviewing party.
    Verified,
}

impl ItemState {
    /// Returns true for `Completed` and `Verified`.
    #[must_use]
    pub fn is_done(&self) -> bool {
        !matches!(self, Self::NotStarted)
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Completed => write!(f, "completed"),
            Self::Verified => write!(f, "verified"),
        }
    }
}

/// Status of a viewed stage relative to a project's current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePosition {
    /// Later than the current stage.
    Locked,
    /// The current stage.
    Active,
    /// Earlier than the current stage.
    Complete,
}

impl fmt::Display for StagePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "locked"),
            Self::Active => write!(f, "active"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Progress of one integration build component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildComponentStatus {
    /// Work has not begun.
    NotStarted,
    /// Being built.
    InProgress,
    /// Built.
    Built,
}

impl Default for BuildComponentStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_status_display() {
        assert_eq!(ContainerStatus::Active.to_string(), "active");
        assert_eq!(ContainerStatus::Submitted.to_string(), "submitted");
        assert_eq!(ContainerStatus::Approved.to_string(), "approved");
    }

    #[test]
    fn test_container_status_flags() {
        assert!(ContainerStatus::Active.is_editable());
        assert!(!ContainerStatus::Submitted.is_editable());
        assert!(ContainerStatus::Approved.is_terminal());
        assert!(!ContainerStatus::Submitted.is_terminal());
    }

    #[test]
    fn test_item_state_serialize() {
        let json = serde_json::to_string(&ItemState::NotStarted).unwrap();
        assert_eq!(json, r#""not_started""#);
        assert!(ItemState::Verified.is_done());
        assert!(!ItemState::NotStarted.is_done());
    }

    #[test]
    fn test_stage_position_display() {
        assert_eq!(StagePosition::Locked.to_string(), "locked");
        assert_eq!(StagePosition::Complete.to_string(), "complete");
    }
}
