//! Discovery questionnaire.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::container::ArtifactContent;
use super::view::ItemView;
use crate::core::{ItemState, Party};
use crate::errors::{GateflowError, Result};

/// A template question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question id, the key of the response map.
    pub id: String,
    /// Prompt text.
    pub prompt: String,
    /// Optional section heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Whether an answer is required before submission.
    #[serde(default)]
    pub required: bool,
}

impl Question {
    /// Creates a required question.
    #[must_use]
    pub fn required(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            section: None,
            required: true,
        }
    }

    /// Creates an optional question.
    #[must_use]
    pub fn optional(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(id, prompt)
        }
    }

    /// Sets the section heading.
    #[must_use]
    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

/// A questionnaire template, copied into the container on initialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireTemplate {
    /// Template name.
    pub name: String,
    /// Questions in display order.
    pub questions: Vec<Question>,
}

/// Questionnaire template plus the owner's answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireBody {
    /// Template snapshot.
    pub template: QuestionnaireTemplate,
    /// Answers keyed by question id.
    #[serde(default)]
    pub responses: BTreeMap<String, Value>,
}

fn is_answered(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

impl QuestionnaireBody {
    /// Creates an unanswered questionnaire.
    #[must_use]
    pub fn new(template: QuestionnaireTemplate) -> Self {
        Self {
            template,
            responses: BTreeMap::new(),
        }
    }

    /// Merges a partial save. `None` (JSON `null`) clears an answer.
    ///
    /// Unknown question ids are rejected before anything is written.
    pub fn merge(&mut self, responses: &BTreeMap<String, Option<Value>>) -> Result<()> {
        if let Some(unknown) = responses
            .keys()
            .find(|id| !self.template.questions.iter().any(|q| &q.id == *id))
        {
            return Err(GateflowError::invalid_input(format!(
                "Unknown question: '{unknown}'"
            )));
        }

        for (id, answer) in responses {
            match answer {
                Some(value) if !value.is_null() => {
                    self.responses.insert(id.clone(), value.clone());
                }
                _ => {
                    self.responses.remove(id);
                }
            }
        }
        Ok(())
    }

    fn answered(&self, question_id: &str) -> bool {
        self.responses.get(question_id).is_some_and(is_answered)
    }
}

impl ArtifactContent for QuestionnaireBody {
    fn outstanding(&self) -> Vec<String> {
        self.template
            .questions
            .iter()
            .filter(|q| q.required && !self.answered(&q.id))
            .map(|q| q.id.clone())
            .collect()
    }

    fn item_views(&self, owner: Party) -> Vec<ItemView> {
        self.template
            .questions
            .iter()
            .map(|q| ItemView {
                id: q.id.clone(),
                title: q.prompt.clone(),
                owner,
                state: if self.answered(&q.id) {
                    ItemState::Completed
                } else {
                    ItemState::NotStarted
                },
                required: q.required,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> QuestionnaireBody {
        QuestionnaireBody::new(QuestionnaireTemplate {
            name: "Standard discovery".to_string(),
            questions: vec![
                Question::required("q1", "How many employees?").in_section("Organisation"),
                Question::optional("q2", "Anything else?"),
                Question::required("q3", "Which payroll frequencies?"),
            ],
        })
    }

    fn answers(pairs: &[(&str, Option<Value>)]) -> BTreeMap<String, Option<Value>> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_merge_is_keyed_upsert() {
        let mut body = body();
        body.merge(&answers(&[("q1", Some(json!("120")))])).unwrap();
        body.merge(&answers(&[("q3", Some(json!(["weekly"])))])).unwrap();
        body.merge(&answers(&[("q1", Some(json!("125")))])).unwrap();

        assert_eq!(body.responses["q1"], json!("125"));
        assert!(body.outstanding().is_empty());
    }

    #[test]
    fn test_null_clears_answer() {
        let mut body = body();
        body.merge(&answers(&[("q1", Some(json!("120")))])).unwrap();
        body.merge(&answers(&[("q1", None)])).unwrap();
        assert!(!body.responses.contains_key("q1"));
        assert_eq!(body.outstanding(), vec!["q1".to_string(), "q3".to_string()]);
    }

    #[test]
    fn test_blank_answers_do_not_count() {
        let mut body = body();
        body.merge(&answers(&[("q1", Some(json!("  "))), ("q3", Some(json!([])))]))
            .unwrap();
        assert_eq!(body.outstanding().len(), 2);
    }

    #[test]
    fn test_unknown_question_rejected_without_writing() {
        let mut body = body();
        let err = body
            .merge(&answers(&[("q1", Some(json!("1"))), ("zz", Some(json!("x")))]))
            .unwrap_err();
        assert!(err.is(crate::errors::ErrorKind::InvalidInput));
        assert!(body.responses.is_empty());
    }

    #[test]
    fn test_item_views_track_answers() {
        let mut body = body();
        body.merge(&answers(&[("q2", Some(json!("no")))])).unwrap();
        let views = body.item_views(Party::Client);
        assert_eq!(views[1].state, ItemState::Completed);
        assert_eq!(views[0].state, ItemState::NotStarted);
        assert!(!views[1].required);
    }
}
