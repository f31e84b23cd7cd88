//! The static, ordered stage catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::GateflowError;

/// Key of a delivery stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKey {
    /// Project set-up before delivery begins.
    PreSales,
    /// Discovery questionnaire.
    Discovery,
    /// System access provisioning.
    Provisioning,
    /// HR system configuration checklist.
    BobConfig,
    /// Data mapping.
    Mapping,
    /// Integration build.
    Build,
    /// User acceptance testing.
    Uat,
    /// Go-live preparation.
    GoLive,
    /// Post go-live support.
    Support,
}

/// Client-facing "what's next" copy for a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageGuidance {
    /// Short headline.
    pub title: &'static str,
    /// One or two sentences of guidance.
    pub description: &'static str,
}

/// An immutable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageDefinition {
    /// Stage key.
    pub key: StageKey,
    /// Human label.
    pub label: &'static str,
    /// Route slug; `None` for informational stages that cannot be opened.
    pub slug: Option<&'static str>,
    /// Guidance copy.
    pub guidance: StageGuidance,
}

impl StageDefinition {
    /// Position of the stage in the catalog.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.key.ordinal()
    }

    /// Returns true if the stage has its own page.
    #[must_use]
    pub fn is_routable(&self) -> bool {
        self.slug.is_some()
    }
}

/// Stage definitions in delivery order.
pub static STAGE_CATALOG: [StageDefinition; 9] = [
    StageDefinition {
        key: StageKey::PreSales,
        label: "Pre-Sales",
        slug: None,
        guidance: StageGuidance {
            title: "Getting Started",
            description: "Your project is being set up. You'll be notified when discovery begins.",
        },
    },
    StageDefinition {
        key: StageKey::Discovery,
        label: "Discovery",
        slug: Some("discovery"),
        guidance: StageGuidance {
            title: "Complete the Discovery Questionnaire",
            description: "Tell us about your organisation and integration requirements so we can plan the build.",
        },
    },
    StageDefinition {
        key: StageKey::Provisioning,
        label: "Provisioning",
        slug: Some("provisioning"),
        guidance: StageGuidance {
            title: "Set Up Your Systems",
            description: "Grant our specialists access to each system involved in the integration.",
        },
    },
    StageDefinition {
        key: StageKey::BobConfig,
        label: "HR System Config",
        slug: Some("bob-config"),
        guidance: StageGuidance {
            title: "Configure Your HR System",
            description: "Work through the configuration checklist so your HR data is ready for integration.",
        },
    },
    StageDefinition {
        key: StageKey::Mapping,
        label: "Data Mapping",
        slug: Some("mapping"),
        guidance: StageGuidance {
            title: "Map Your Data",
            description: "Match your HR system values to your payroll system values.",
        },
    },
    StageDefinition {
        key: StageKey::Build,
        label: "Integration Build",
        slug: Some("build"),
        guidance: StageGuidance {
            title: "Integration Build In Progress",
            description: "Our team is building your integration. Review and sign the build specification here.",
        },
    },
    StageDefinition {
        key: StageKey::Uat,
        label: "UAT",
        slug: Some("uat"),
        guidance: StageGuidance {
            title: "Test Your Integration",
            description: "Work through the test scenarios to verify everything works before go-live.",
        },
    },
    StageDefinition {
        key: StageKey::GoLive,
        label: "Go-Live",
        slug: Some("go-live"),
        guidance: StageGuidance {
            title: "Preparing for Go-Live",
            description: "Complete the final checklist items before the switch to production.",
        },
    },
    StageDefinition {
        key: StageKey::Support,
        label: "Support",
        slug: None,
        guidance: StageGuidance {
            title: "You're Live!",
            description: "Your integration is running. Use the support portal for any questions.",
        },
    },
];

impl StageKey {
    /// Every key in catalog order.
    pub const ALL: [Self; 9] = [
        Self::PreSales,
        Self::Discovery,
        Self::Provisioning,
        Self::BobConfig,
        Self::Mapping,
        Self::Build,
        Self::Uat,
        Self::GoLive,
        Self::Support,
    ];

    /// Returns the wire name of the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreSales => "pre_sales",
            Self::Discovery => "discovery",
            Self::Provisioning => "provisioning",
            Self::BobConfig => "bob_config",
            Self::Mapping => "mapping",
            Self::Build => "build",
            Self::Uat => "uat",
            Self::GoLive => "go_live",
            Self::Support => "support",
        }
    }

    /// Position of the key in the catalog.
    #[must_use]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// The catalog entry for the key.
    #[must_use]
    pub fn definition(self) -> &'static StageDefinition {
        &STAGE_CATALOG[self.ordinal()]
    }

    /// Human label.
    #[must_use]
    pub fn label(self) -> &'static str {
        self.definition().label
    }

    /// Route slug, if the stage is routable.
    #[must_use]
    pub fn slug(self) -> Option<&'static str> {
        self.definition().slug
    }

    /// Guidance copy.
    #[must_use]
    pub fn guidance(self) -> StageGuidance {
        self.definition().guidance
    }

    /// The next key in catalog order.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.ordinal() + 1).copied()
    }

    /// The previous key in catalog order.
    #[must_use]
    pub fn prev(self) -> Option<Self> {
        self.ordinal().checked_sub(1).map(|idx| Self::ALL[idx])
    }

    /// Looks a key up by its route slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        STAGE_CATALOG
            .iter()
            .find(|def| def.slug == Some(slug))
            .map(|def| def.key)
    }

    /// The first stage of the catalog.
    #[must_use]
    pub const fn first() -> Self {
        Self::PreSales
    }

    /// The last stage of the catalog.
    #[must_use]
    pub const fn last() -> Self {
        Self::Support
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKey {
    type Err = GateflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| GateflowError::unknown_stage_kind(s))
    }
}

/// Returns the full catalog.
#[must_use]
pub fn catalog() -> &'static [StageDefinition] {
    &STAGE_CATALOG
}

/// Returns the stages that have their own page.
pub fn routable_stages() -> impl Iterator<Item = &'static StageDefinition> {
    STAGE_CATALOG.iter().filter(|def| def.is_routable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_catalog_order_matches_ordinals() {
        for (idx, def) in STAGE_CATALOG.iter().enumerate() {
            assert_eq!(def.ordinal(), idx);
            assert_eq!(StageKey::ALL[idx], def.key);
        }
    }

    #[test]
    fn test_parse_round_trip_and_unknown() {
        for key in StageKey::ALL {
            assert_eq!(key.as_str().parse::<StageKey>().unwrap(), key);
        }
        let err = "launch".parse::<StageKey>().unwrap_err();
        assert!(err.is(ErrorKind::UnknownStageKind));
    }

    #[test]
    fn test_next_and_prev_at_edges() {
        assert_eq!(StageKey::PreSales.prev(), None);
        assert_eq!(StageKey::PreSales.next(), Some(StageKey::Discovery));
        assert_eq!(StageKey::Support.next(), None);
        assert_eq!(StageKey::Support.prev(), Some(StageKey::GoLive));
    }

    #[test]
    fn test_slugs() {
        assert_eq!(StageKey::BobConfig.slug(), Some("bob-config"));
        assert_eq!(StageKey::from_slug("go-live"), Some(StageKey::GoLive));
        assert_eq!(StageKey::from_slug("support"), None);
        assert_eq!(routable_stages().count(), 7);
    }

    #[test]
    fn test_stage_key_serialize() {
        let json = serde_json::to_string(&StageKey::GoLive).unwrap();
        assert_eq!(json, r#""go_live""#);
    }
}
