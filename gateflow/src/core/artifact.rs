//! Artifact types and their ownership rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Party;
use crate::errors::GateflowError;
use crate::stages::StageKey;

/// The per-stage artifact a workflow container tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    /// Discovery questionnaire.
    Discovery,
    /// System provisioning steps.
    Provisioning,
    /// HR system configuration checklist.
    BobConfig,
    /// Data mapping table.
    Mapping,
    /// Build specification sign-off.
    BuildSpec,
    /// User acceptance test results.
    Uat,
}

impl ArtifactType {
    /// Every artifact type.
    pub const ALL: [Self; 6] = [
        Self::Discovery,
        Self::Provisioning,
        Self::BobConfig,
        Self::Mapping,
        Self::BuildSpec,
        Self::Uat,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Provisioning => "provisioning",
            Self::BobConfig => "bob_config",
            Self::Mapping => "mapping",
            Self::BuildSpec => "build_spec",
            Self::Uat => "uat",
        }
    }

    /// The party allowed to edit the artifact while it is active.
    ///
    /// Determined by the artifact type alone, never by the caller.
    #[must_use]
    pub const fn owner(self) -> Party {
        match self {
            Self::BuildSpec => Party::Admin,
            _ => Party::Client,
        }
    }

    /// The party allowed to approve or request changes.
    #[must_use]
    pub const fn reviewer(self) -> Party {
        self.owner().counterparty()
    }

    /// The stage the artifact belongs to.
    #[must_use]
    pub const fn stage(self) -> StageKey {
        match self {
            Self::Discovery => StageKey::Discovery,
            Self::Provisioning => StageKey::Provisioning,
            Self::BobConfig => StageKey::BobConfig,
            Self::Mapping => StageKey::Mapping,
            Self::BuildSpec => StageKey::Build,
            Self::Uat => StageKey::Uat,
        }
    }

    /// Returns false for artifacts whose items are verified one by one
    /// instead of going through submit and approve.
    #[must_use]
    pub const fn has_review_gate(self) -> bool {
        !matches!(self, Self::Provisioning)
    }

    /// Lower-case noun used in notification copy.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Discovery => "discovery questionnaire",
            Self::Provisioning => "provisioning checklist",
            Self::BobConfig => "HR system configuration checklist",
            Self::Mapping => "data mapping",
            Self::BuildSpec => "build specification",
            Self::Uat => "UAT results",
        }
    }

    /// Capitalised noun used in notification titles.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Discovery => "Discovery questionnaire",
            Self::Provisioning => "Provisioning checklist",
            Self::BobConfig => "HR system configuration",
            Self::Mapping => "Data mapping",
            Self::BuildSpec => "Build specification",
            Self::Uat => "UAT results",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactType {
    type Err = GateflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|artifact| artifact.as_str() == s)
            .ok_or_else(|| GateflowError::invalid_input(format!("Unknown artifact type: '{s}'")))
    }
}
