//! Configuration types for crowdguard
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::Deserialize;
use std::collections::HashMap;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Access level registry
    pub data_access: DataAccessConfig,

    /// Task field rules
    pub tasks: TaskConfig,

    /// Bulk importer settings
    pub importer: ImporterConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Data access level configuration
///
/// Each compatibility table maps a single level to the list of levels it
/// permits on the related entity. Keys missing from a table permit nothing.
///
/// ```toml
/// [data_access]
/// enabled = true
/// valid_access_levels = ["L1", "L2"]
///
/// [data_access.valid_task_levels_for_project_level]
/// L1 = ["L1", "L2"]
/// L2 = ["L2"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataAccessConfig {
    /// Whether access levels are enforced at all
    pub enabled: bool,

    /// Every level token the platform knows about
    pub valid_access_levels: Vec<String>,

    /// Levels a project may declare, given a task level
    pub valid_project_levels_for_task_level: HashMap<String, Vec<String>>,

    /// Levels a task may declare, given a project level
    pub valid_task_levels_for_project_level: HashMap<String, Vec<String>>,

    /// Levels a user needs to work on a project/task level
    pub valid_user_levels_for_project_task_level: HashMap<String, Vec<String>>,

    /// Task levels reachable from a user level
    pub valid_task_levels_for_user_level: HashMap<String, Vec<String>>,

    /// Levels each user type may declare
    pub valid_access_levels_for_user_types: HashMap<String, Vec<String>>,
}

/// Task field rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Required `info` fields. An empty list accepts any non-empty value,
    /// otherwise the value must be one of the listed ones.
    pub required_fields: HashMap<String, Vec<String>>,

    /// `n_answers` used when neither the payload nor the project sets one
    pub default_n_answers: u32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            required_fields: HashMap::new(),
            default_n_answers: 1,
        }
    }
}

/// Bulk importer settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// Remote CSV request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(!config.data_access.enabled);
        assert!(config.data_access.valid_access_levels.is_empty());
        assert!(config.tasks.required_fields.is_empty());
        assert_eq!(config.importer.timeout_secs, 30);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_deserialize_log_format() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, LogFormat::Json);

        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
    }

    #[test]
    fn test_deserialize_data_access() {
        let json = r#"{
            "enabled": true,
            "valid_access_levels": ["L1", "L2"],
            "valid_task_levels_for_project_level": {"L1": ["L1", "L2"]}
        }"#;
        let config: DataAccessConfig = serde_json::from_str(json).unwrap();
        assert!(config.enabled);
        assert_eq!(config.valid_access_levels, vec!["L1", "L2"]);
        assert_eq!(
            config.valid_task_levels_for_project_level["L1"],
            vec!["L1", "L2"]
        );
        assert!(config.valid_access_levels_for_user_types.is_empty());
    }
}
