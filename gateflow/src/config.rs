//! Engine configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::Party;
use crate::stages::StageKey;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid configuration JSON.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Workflow engine behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Extra attempts after an optimistic concurrency conflict.
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
    /// Path prefix of admin project pages in notification links.
    #[serde(default = "default_admin_link_prefix")]
    pub admin_link_prefix: String,
    /// Path prefix of client project pages in notification links.
    #[serde(default = "default_client_link_prefix")]
    pub client_link_prefix: String,
    /// Move the project to the support stage when go-live is triggered.
    #[serde(default = "default_true")]
    pub go_live_moves_to_support: bool,
    /// Notify admins each time a provisioning step is completed.
    #[serde(default = "default_true")]
    pub notify_on_step_completion: bool,
}

fn default_conflict_retries() -> u32 {
    1
}

fn default_admin_link_prefix() -> String {
    "/dashboard/admin/projects".to_string()
}

fn default_client_link_prefix() -> String {
    "/dashboard/client/projects".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conflict_retries: default_conflict_retries(),
            admin_link_prefix: default_admin_link_prefix(),
            client_link_prefix: default_client_link_prefix(),
            go_live_moves_to_support: true,
            notify_on_step_completion: true,
        }
    }
}

impl EngineConfig {
    /// Sets the conflict retry count.
    #[must_use]
    pub fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.conflict_retries = retries;
        self
    }

    /// Sets whether go-live moves the project to support.
    #[must_use]
    pub fn with_go_live_moves_to_support(mut self, enabled: bool) -> Self {
        self.go_live_moves_to_support = enabled;
        self
    }

    /// Sets whether every provisioning step completion notifies admins.
    #[must_use]
    pub fn with_notify_on_step_completion(mut self, enabled: bool) -> Self {
        self.notify_on_step_completion = enabled;
        self
    }

    /// Total attempts for one read-modify-write.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.conflict_retries.saturating_add(1)
    }

    /// Deep link to a stage page for `audience`.
    ///
    /// Informational stages without a slug link to the project overview.
    #[must_use]
    pub fn link_for(&self, audience: Party, project_id: &str, stage: StageKey) -> String {
        let prefix = match audience {
            Party::Admin => &self.admin_link_prefix,
            Party::Client => &self.client_link_prefix,
        };
        let prefix = prefix.trim_end_matches('/');
        match stage.slug() {
            Some(slug) => format!("{prefix}/{project_id}/{slug}"),
            None => format!("{prefix}/{project_id}"),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, prefix) in [
            ("admin_link_prefix", &self.admin_link_prefix),
            ("client_link_prefix", &self.client_link_prefix),
        ] {
            if !prefix.starts_with('/') {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("'{prefix}' must start with '/'"),
                });
            }
        }
        Ok(())
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Sets the level.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Switches JSON output on or off.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateflowConfig {
    /// Engine behaviour.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GateflowConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("failed to load config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GateflowConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GateflowConfig::default());
        assert_eq!(config.engine.conflict_retries, 1);
        assert_eq!(config.engine.attempts(), 2);
        assert_eq!(config.logging.level, "info");
        assert!(config.engine.go_live_moves_to_support);
    }

    #[test]
    fn test_partial_override() {
        let config = GateflowConfig::from_json_str(
            r#"{"engine": {"conflict_retries": 3, "go_live_moves_to_support": false}, "logging": {"json": true}}"#,
        )
        .unwrap();
        assert_eq!(config.engine.conflict_retries, 3);
        assert!(!config.engine.go_live_moves_to_support);
        assert!(config.engine.notify_on_step_completion);
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let err = GateflowConfig::from_json_str(r#"{"engine": {"admin_link_prefix": "admin"}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "admin_link_prefix", .. }));
    }

    #[test]
    fn test_link_for_stage() {
        let config = EngineConfig::default();
        assert_eq!(
            config.link_for(Party::Client, "p-1", StageKey::BobConfig),
            "/dashboard/client/projects/p-1/bob-config"
        );
        assert_eq!(
            config.link_for(Party::Admin, "p-1", StageKey::Support),
            "/dashboard/admin/projects/p-1"
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"logging": {{"level": "debug"}}}}"#).unwrap();
        let config = GateflowConfig::load(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");

        let err = GateflowConfig::load("/nonexistent/gateflow.json").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
