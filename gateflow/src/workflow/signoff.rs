//! Build specification sign-off document.

use serde::{Deserialize, Serialize};

use super::container::ArtifactContent;
use super::view::ItemView;
use crate::core::{ItemState, Party};
use crate::errors::{ErrorKind, GateflowError, Result};
use crate::utils::Timestamp;

/// A document the reviewing party signs off, optionally countersigned by
/// the authoring party afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignoffBody {
    /// Document title.
    pub title: String,
    /// Document content.
    pub content: String,
    /// Confirmation text entered by the signing party on approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_text: Option<String>,
    /// Countersignature time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countersigned_at: Option<Timestamp>,
    /// Countersigning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countersigned_by: Option<String>,
}

impl SignoffBody {
    /// Creates an unsigned document.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Replaces the content and, if given, the title.
    pub fn edit(&mut self, title: Option<&str>, content: &str) {
        if let Some(title) = title {
            self.title = title.to_string();
        }
        self.content = content.to_string();
    }

    /// Returns true once countersigned.
    #[must_use]
    pub fn is_countersigned(&self) -> bool {
        self.countersigned_at.is_some()
    }

    /// Records the countersignature, once.
    pub fn countersign(&mut self, user_id: &str, now: Timestamp) -> Result<()> {
        if self.is_countersigned() {
            return Err(GateflowError::new(
                ErrorKind::AlreadyCompleted,
                "Build specification has already been countersigned",
            ));
        }
        self.countersigned_at = Some(now);
        self.countersigned_by = Some(user_id.to_string());
        Ok(())
    }
}

impl ArtifactContent for SignoffBody {
    fn outstanding(&self) -> Vec<String> {
        if self.content.trim().is_empty() {
            vec!["content".to_string()]
        } else {
            Vec::new()
        }
    }

    fn item_views(&self, owner: Party) -> Vec<ItemView> {
        vec![ItemView {
            id: "content".to_string(),
            title: self.title.clone(),
            owner,
            state: if self.content.trim().is_empty() {
                ItemState::NotStarted
            } else {
                ItemState::Completed
            },
            required: true,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::now_utc;

    #[test]
    fn test_empty_document_is_outstanding() {
        let mut body = SignoffBody::new("Build spec", "   ");
        assert_eq!(body.outstanding(), vec!["content".to_string()]);
        body.edit(None, "Employee upsert: nightly");
        assert!(body.outstanding().is_empty());
        assert_eq!(body.title, "Build spec");
    }

    #[test]
    fn test_countersign_once() {
        let mut body = SignoffBody::new("Build spec", "Body");
        body.countersign("a-1", now_utc()).unwrap();
        assert!(body.is_countersigned());
        let err = body.countersign("a-2", now_utc()).unwrap_err();
        assert!(err.is(ErrorKind::AlreadyCompleted));
        assert_eq!(body.countersigned_by.as_deref(), Some("a-1"));
    }
}
