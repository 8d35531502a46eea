//! Access level registry
//!
//! Holds the valid level tokens and the compatibility tables. A registry is
//! built once from configuration and never mutated afterwards; callers share
//! it as `Arc<LevelRegistry>`. [`RegistryHandle`] swaps the whole registry
//! on reload.

use crate::config::DataAccessConfig;
use crate::data_access::types::{AccessLevel, CompatibilityTable, LevelSet, UserTypeTable};
use crate::error::ConfigError;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Immutable set of access level tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelRegistry {
    enabled: bool,
    valid_access_levels: LevelSet,
    project_levels_for_task_level: CompatibilityTable,
    task_levels_for_project_level: CompatibilityTable,
    user_levels_for_project_task_level: CompatibilityTable,
    task_levels_for_user_level: CompatibilityTable,
    access_levels_for_user_types: UserTypeTable,
}

impl LevelRegistry {
    /// Create an enabled registry with the given levels and empty tables
    pub fn new(valid_access_levels: LevelSet) -> Self {
        Self {
            enabled: true,
            valid_access_levels,
            ..Default::default()
        }
    }

    /// Registry with enforcement turned off
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Build a registry from configuration
    pub fn from_config(config: &DataAccessConfig) -> Result<Self, ConfigError> {
        if config.enabled && config.valid_access_levels.is_empty() {
            return Err(ConfigError::Missing {
                field: "data_access.valid_access_levels".to_string(),
            });
        }

        let registry = Self {
            enabled: config.enabled,
            valid_access_levels: config
                .valid_access_levels
                .iter()
                .map(|l| AccessLevel::new(l.as_str()))
                .collect(),
            project_levels_for_task_level: config
                .valid_project_levels_for_task_level
                .iter()
                .map(|(k, v)| (k.as_str(), v.iter().map(String::as_str)))
                .collect(),
            task_levels_for_project_level: config
                .valid_task_levels_for_project_level
                .iter()
                .map(|(k, v)| (k.as_str(), v.iter().map(String::as_str)))
                .collect(),
            user_levels_for_project_task_level: config
                .valid_user_levels_for_project_task_level
                .iter()
                .map(|(k, v)| (k.as_str(), v.iter().map(String::as_str)))
                .collect(),
            task_levels_for_user_level: config
                .valid_task_levels_for_user_level
                .iter()
                .map(|(k, v)| (k.as_str(), v.iter().map(String::as_str)))
                .collect(),
            access_levels_for_user_types: config
                .valid_access_levels_for_user_types
                .iter()
                .map(|(k, v)| (k.as_str(), v.iter().map(String::as_str)))
                .collect(),
        };

        info!(
            enabled = registry.enabled,
            levels = registry.valid_access_levels.len(),
            "Loaded access level registry"
        );

        Ok(registry)
    }

    pub fn with_project_levels_for_task_level(mut self, table: CompatibilityTable) -> Self {
        self.project_levels_for_task_level = table;
        self
    }

    pub fn with_task_levels_for_project_level(mut self, table: CompatibilityTable) -> Self {
        self.task_levels_for_project_level = table;
        self
    }

    pub fn with_user_levels_for_project_task_level(mut self, table: CompatibilityTable) -> Self {
        self.user_levels_for_project_task_level = table;
        self
    }

    pub fn with_task_levels_for_user_level(mut self, table: CompatibilityTable) -> Self {
        self.task_levels_for_user_level = table;
        self
    }

    pub fn with_access_levels_for_user_types(mut self, table: UserTypeTable) -> Self {
        self.access_levels_for_user_types = table;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn valid_access_levels(&self) -> &LevelSet {
        &self.valid_access_levels
    }

    pub fn is_valid_level(&self, level: &AccessLevel) -> bool {
        self.valid_access_levels.contains(level)
    }

    /// Levels in `levels` that the registry does not know
    pub fn unrecognized<'a>(&self, levels: &'a LevelSet) -> Vec<&'a AccessLevel> {
        levels.iter().filter(|l| !self.is_valid_level(l)).collect()
    }

    pub fn project_levels_for_task_level(&self) -> &CompatibilityTable {
        &self.project_levels_for_task_level
    }

    pub fn task_levels_for_project_level(&self) -> &CompatibilityTable {
        &self.task_levels_for_project_level
    }

    pub fn user_levels_for_project_task_level(&self) -> &CompatibilityTable {
        &self.user_levels_for_project_task_level
    }

    pub fn task_levels_for_user_level(&self) -> &CompatibilityTable {
        &self.task_levels_for_user_level
    }

    pub fn access_levels_for_user_types(&self) -> &UserTypeTable {
        &self.access_levels_for_user_types
    }
}

/// Shared, swappable reference to the current registry
///
/// `current()` hands out a snapshot; a check holding it keeps evaluating
/// against that snapshot even if `swap()` runs meanwhile.
#[derive(Debug, Default)]
pub struct RegistryHandle {
    inner: RwLock<Arc<LevelRegistry>>,
}

impl RegistryHandle {
    pub fn new(registry: LevelRegistry) -> Self {
        Self {
            inner: RwLock::new(Arc::new(registry)),
        }
    }

    /// Snapshot of the current registry
    pub fn current(&self) -> Arc<LevelRegistry> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Replace the registry, returning the previous one
    pub fn swap(&self, registry: LevelRegistry) -> Arc<LevelRegistry> {
        let next = Arc::new(registry);
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_access::types::level_set;
    use std::collections::HashMap;

    fn sample_config() -> DataAccessConfig {
        DataAccessConfig {
            enabled: true,
            valid_access_levels: vec!["L1".into(), "L2".into()],
            valid_task_levels_for_project_level: HashMap::from([(
                "L1".to_string(),
                vec!["L1".to_string(), "L2".to_string()],
            )]),
            valid_access_levels_for_user_types: HashMap::from([(
                "Researcher".to_string(),
                vec!["L1".to_string()],
            )]),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_config() {
        let registry = LevelRegistry::from_config(&sample_config()).unwrap();
        assert!(registry.is_enabled());
        assert_eq!(registry.valid_access_levels(), &level_set(["L1", "L2"]));
        assert_eq!(
            registry
                .task_levels_for_project_level()
                .get(&AccessLevel::new("L1")),
            level_set(["L1", "L2"])
        );
        assert!(registry.project_levels_for_task_level().is_empty());
        assert_eq!(
            registry.access_levels_for_user_types().allowed("Researcher"),
            level_set(["L1"])
        );
    }

    #[test]
    fn test_from_config_enabled_without_levels() {
        let config = DataAccessConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(LevelRegistry::from_config(&config).is_err());
    }

    #[test]
    fn test_unrecognized_levels() {
        let registry = LevelRegistry::new(level_set(["L1", "L2"]));
        let levels = level_set(["L1", "L5", "L6"]);
        let unknown: Vec<&str> = registry
            .unrecognized(&levels)
            .into_iter()
            .map(|l| l.as_str())
            .collect();
        assert_eq!(unknown, vec!["L5", "L6"]);
    }

    #[test]
    fn test_disabled_registry() {
        assert!(!LevelRegistry::disabled().is_enabled());
        assert!(LevelRegistry::new(LevelSet::new()).is_enabled());
    }

    #[test]
    fn test_handle_swap_keeps_snapshot() {
        let handle = RegistryHandle::new(LevelRegistry::new(level_set(["L1"])));
        let before = handle.current();

        let previous = handle.swap(LevelRegistry::new(level_set(["L1", "L2"])));

        assert_eq!(previous, before);
        assert_eq!(before.valid_access_levels().len(), 1);
        assert_eq!(handle.current().valid_access_levels().len(), 2);
    }
}
