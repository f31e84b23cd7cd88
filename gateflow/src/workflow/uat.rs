//! User acceptance testing scenarios and results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::container::ArtifactContent;
use super::view::ItemView;
use crate::core::{ItemState, Party};
use crate::errors::{GateflowError, Result};
use crate::utils::Timestamp;

/// A test scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UatScenario {
    /// Scenario id, the key of the result map.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Steps to perform.
    #[serde(default)]
    pub steps: Vec<String>,
    /// Whether a result is needed before submission.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl UatScenario {
    /// Creates a required scenario.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            steps: Vec::new(),
            required: true,
        }
    }

    /// Marks the scenario optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// A UAT template, copied into the container on initialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UatTemplate {
    /// Template name.
    pub name: String,
    /// Scenarios in display order.
    pub scenarios: Vec<UatScenario>,
}

/// Outcome of running a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UatOutcome {
    /// Behaved as expected.
    Passed,
    /// Did not behave as expected.
    Failed,
    /// Does not apply to this client.
    #[serde(rename = "na")]
    NotApplicable,
}

/// A result as submitted by the tester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResultInput {
    /// Outcome.
    pub outcome: UatOutcome,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Linked support ticket.
    #[serde(default)]
    pub ticket_id: Option<String>,
}

/// A recorded scenario result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Outcome.
    pub outcome: UatOutcome,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Linked support ticket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    /// Recording user.
    pub recorded_by: String,
    /// Recording time.
    pub recorded_at: Timestamp,
}

/// Scenario template plus results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UatBody {
    /// Template snapshot.
    pub template: UatTemplate,
    /// Results keyed by scenario id.
    #[serde(default)]
    pub results: BTreeMap<String, ScenarioResult>,
}

impl UatBody {
    /// Creates a body with no results.
    #[must_use]
    pub fn new(template: UatTemplate) -> Self {
        Self {
            template,
            results: BTreeMap::new(),
        }
    }

    /// Upserts results by scenario id.
    pub fn record(
        &mut self,
        results: &BTreeMap<String, ScenarioResultInput>,
        user_id: &str,
        now: Timestamp,
    ) -> Result<()> {
        if let Some(unknown) = results
            .keys()
            .find(|id| !self.template.scenarios.iter().any(|s| &s.id == *id))
        {
            return Err(GateflowError::invalid_input(format!(
                "Unknown scenario: '{unknown}'"
            )));
        }

        for (id, input) in results {
            self.results.insert(
                id.clone(),
                ScenarioResult {
                    outcome: input.outcome,
                    notes: input.notes.clone(),
                    ticket_id: input.ticket_id.clone(),
                    recorded_by: user_id.to_string(),
                    recorded_at: now,
                },
            );
        }
        Ok(())
    }

    /// Number of failed scenarios.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results
            .values()
            .filter(|r| r.outcome == UatOutcome::Failed)
            .count()
    }
}

impl ArtifactContent for UatBody {
    fn outstanding(&self) -> Vec<String> {
        self.template
            .scenarios
            .iter()
            .filter(|s| s.required && !self.results.contains_key(&s.id))
            .map(|s| s.id.clone())
            .collect()
    }

    fn item_views(&self, owner: Party) -> Vec<ItemView> {
        self.template
            .scenarios
            .iter()
            .map(|s| ItemView {
                id: s.id.clone(),
                title: s.title.clone(),
                owner,
                state: if self.results.contains_key(&s.id) {
                    ItemState::Completed
                } else {
                    ItemState::NotStarted
                },
                required: s.required,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::now_utc;

    fn body() -> UatBody {
        UatBody::new(UatTemplate {
            name: "Payroll UAT".to_string(),
            scenarios: vec![
                UatScenario::new("s1", "New starter syncs"),
                UatScenario::new("s2", "Leave request syncs"),
                UatScenario::new("s3", "Termination syncs").optional(),
            ],
        })
    }

    fn result(outcome: UatOutcome) -> ScenarioResultInput {
        ScenarioResultInput {
            outcome,
            notes: None,
            ticket_id: None,
        }
    }

    #[test]
    fn test_required_scenarios_gate_submission() {
        let mut body = body();
        let mut results = BTreeMap::new();
        results.insert("s1".to_string(), result(UatOutcome::Passed));
        body.record(&results, "c-1", now_utc()).unwrap();
        assert_eq!(body.outstanding(), vec!["s2".to_string()]);

        results.insert("s2".to_string(), result(UatOutcome::Failed));
        body.record(&results, "c-1", now_utc()).unwrap();
        assert!(body.outstanding().is_empty());
        assert_eq!(body.failed_count(), 1);
    }

    #[test]
    fn test_rerecording_overwrites() {
        let mut body = body();
        let mut results = BTreeMap::new();
        results.insert("s1".to_string(), result(UatOutcome::Failed));
        body.record(&results, "c-1", now_utc()).unwrap();
        results.insert("s1".to_string(), result(UatOutcome::Passed));
        body.record(&results, "c-2", now_utc()).unwrap();

        assert_eq!(body.results["s1"].outcome, UatOutcome::Passed);
        assert_eq!(body.results["s1"].recorded_by, "c-2");
    }

    #[test]
    fn test_unknown_scenario_rejected() {
        let mut body = body();
        let mut results = BTreeMap::new();
        results.insert("s9".to_string(), result(UatOutcome::Passed));
        assert!(body.record(&results, "c-1", now_utc()).is_err());
    }

    #[test]
    fn test_outcome_wire_names() {
        assert_eq!(
            serde_json::to_string(&UatOutcome::NotApplicable).unwrap(),
            r#""na""#
        );
        let parsed: UatOutcome = serde_json::from_str(r#""passed""#).unwrap();
        assert_eq!(parsed, UatOutcome::Passed);
    }
}
