//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (CROWDGUARD__*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::config::types::{AppConfig, DataAccessConfig};
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "crowdguard.toml",
    ".crowdguard.toml",
    "~/.config/crowdguard/config.toml",
    "/etc/crowdguard/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // First existing default path wins
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // e.g. CROWDGUARD__DATA_ACCESS__ENABLED, CROWDGUARD__IMPORTER__TIMEOUT_SECS
    builder = builder.add_source(
        Environment::with_prefix("CROWDGUARD")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.importer.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            message: "importer.timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.tasks.default_n_answers == 0 {
        return Err(ConfigError::Invalid {
            message: "tasks.default_n_answers must be greater than 0".to_string(),
        });
    }

    validate_data_access(&config.data_access)?;

    Ok(())
}

/// Validate that every level named by a table is a known level
fn validate_data_access(config: &DataAccessConfig) -> Result<(), ConfigError> {
    if config.enabled && config.valid_access_levels.is_empty() {
        return Err(ConfigError::Missing {
            field: "data_access.valid_access_levels".to_string(),
        });
    }

    let known: HashSet<&str> = config
        .valid_access_levels
        .iter()
        .map(String::as_str)
        .collect();

    let tables = [
        (
            "valid_project_levels_for_task_level",
            &config.valid_project_levels_for_task_level,
        ),
        (
            "valid_task_levels_for_project_level",
            &config.valid_task_levels_for_project_level,
        ),
        (
            "valid_user_levels_for_project_task_level",
            &config.valid_user_levels_for_project_task_level,
        ),
        (
            "valid_task_levels_for_user_level",
            &config.valid_task_levels_for_user_level,
        ),
    ];

    for (name, table) in tables {
        validate_table(table, &known, &format!("data_access.{}", name), true)?;
    }

    // User type keys are not levels
    validate_table(
        &config.valid_access_levels_for_user_types,
        &known,
        "data_access.valid_access_levels_for_user_types",
        false,
    )
}

fn validate_table(
    table: &HashMap<String, Vec<String>>,
    known: &HashSet<&str>,
    field_path: &str,
    keys_are_levels: bool,
) -> Result<(), ConfigError> {
    for (key, values) in table {
        if keys_are_levels && !known.contains(key.as_str()) {
            return Err(ConfigError::UnknownLevel {
                level: key.clone(),
                field: field_path.to_string(),
            });
        }
        if let Some(level) = values.iter().find(|v| !known.contains(v.as_str())) {
            return Err(ConfigError::UnknownLevel {
                level: level.clone(),
                field: format!("{}.{}", field_path, key),
            });
        }
    }
    Ok(())
}
