//! The project record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{BuildComponentStatus, Caller, Party};
use crate::errors::GateflowError;
use crate::stages::StageKey;
use crate::utils::{now_utc, Timestamp};

/// A component of the integration build whose progress is tracked on the
/// project record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildComponent {
    /// Employee create/update sync.
    EmployeeUpsert,
    /// Leave sync.
    LeaveSync,
    /// Payslip export.
    Payslip,
}

impl fmt::Display for BuildComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmployeeUpsert => write!(f, "employee_upsert"),
            Self::LeaveSync => write!(f, "leave_sync"),
            Self::Payslip => write!(f, "payslip"),
        }
    }
}

impl FromStr for BuildComponent {
    type Err = GateflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee_upsert" => Ok(Self::EmployeeUpsert),
            "leave_sync" => Ok(Self::LeaveSync),
            "payslip" => Ok(Self::Payslip),
            other => Err(GateflowError::invalid_input(format!(
                "Invalid build component: '{other}'"
            ))),
        }
    }
}

/// Denormalised build-component statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildComponents {
    /// Employee upsert status.
    pub employee_upsert: BuildComponentStatus,
    /// Leave sync status.
    pub leave_sync: BuildComponentStatus,
    /// Payslip status.
    pub payslip: BuildComponentStatus,
}

impl BuildComponents {
    /// Returns the status of a component.
    #[must_use]
    pub fn get(&self, component: BuildComponent) -> BuildComponentStatus {
        match component {
            BuildComponent::EmployeeUpsert => self.employee_upsert,
            BuildComponent::LeaveSync => self.leave_sync,
            BuildComponent::Payslip => self.payslip,
        }
    }

    /// Sets the status of a component.
    pub fn set(&mut self, component: BuildComponent, status: BuildComponentStatus) {
        match component {
            BuildComponent::EmployeeUpsert => self.employee_upsert = status,
            BuildComponent::LeaveSync => self.leave_sync = status,
            BuildComponent::Payslip => self.payslip = status,
        }
    }
}

/// The unit of work moving through the stage catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Opaque identifier.
    pub id: String,
    /// Owning client organisation.
    pub client_id: String,
    /// Display name used in notifications.
    pub name: String,
    /// Current stage pointer.
    pub current_stage: StageKey,
    /// Build component progress.
    #[serde(default)]
    pub build_components: BuildComponents,
    /// Set when go-live is triggered.
    #[serde(default)]
    pub go_live_date: Option<Timestamp>,
    /// Optimistic concurrency version, maintained by the store.
    #[serde(default)]
    pub version: u64,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}

impl Project {
    /// Creates a project at the first catalog stage.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        client_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = now_utc();
        Self {
            id: id.into(),
            client_id: client_id.into(),
            name: name.into(),
            current_stage: StageKey::first(),
            build_components: BuildComponents::default(),
            go_live_date: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the current stage.
    #[must_use]
    pub fn at_stage(mut self, stage: StageKey) -> Self {
        self.current_stage = stage;
        self
    }

    /// Returns true if the caller may see and act on the project at all.
    ///
    /// Admins see every project; client users only their organisation's.
    #[must_use]
    pub fn is_visible_to(&self, caller: &Caller) -> bool {
        match caller.party {
            Party::Admin => true,
            Party::Client => caller.client_id.as_deref() == Some(self.client_id.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_starts_at_first_stage() {
        let project = Project::new("p-1", "acme", "Acme rollout");
        assert_eq!(project.current_stage, StageKey::PreSales);
        assert_eq!(project.build_components.payslip, BuildComponentStatus::NotStarted);
    }

    #[test]
    fn test_visibility() {
        let project = Project::new("p-1", "acme", "Acme rollout");
        assert!(project.is_visible_to(&Caller::admin("a")));
        assert!(project.is_visible_to(&Caller::client("c", "acme")));
        assert!(!project.is_visible_to(&Caller::client("c", "globex")));
    }

    #[test]
    fn test_build_components_set() {
        let mut components = BuildComponents::default();
        components.set(BuildComponent::LeaveSync, BuildComponentStatus::Built);
        assert_eq!(components.get(BuildComponent::LeaveSync), BuildComponentStatus::Built);
        assert_eq!(
            components.get(BuildComponent::EmployeeUpsert),
            BuildComponentStatus::NotStarted
        );
        assert!("payroll".parse::<BuildComponent>().is_err());
    }
}
