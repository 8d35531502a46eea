//! Data access types
//!
//! Core types shared by the registry and the policy.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Opaque access level token (e.g. `L1`)
///
/// Levels carry no ordering of their own; only the compatibility tables
/// relate them. `Ord` exists so level sets iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLevel(String);

impl AccessLevel {
    pub fn new(level: impl Into<String>) -> Self {
        Self(level.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccessLevel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccessLevel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for AccessLevel {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Set of access levels declared on, or permitted for, one entity
pub type LevelSet = BTreeSet<AccessLevel>;

/// Build a [`LevelSet`] from anything string-like
pub fn level_set<I, S>(levels: I) -> LevelSet
where
    I: IntoIterator<Item = S>,
    S: Into<AccessLevel>,
{
    levels.into_iter().map(Into::into).collect()
}

/// Compatibility table mapping one entity's level to the levels permitted
/// on a related entity.
///
/// Absent keys permit nothing; lookups never fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityTable {
    entries: HashMap<AccessLevel, LevelSet>,
}

impl CompatibilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels permitted for a single key (empty when the key is absent)
    pub fn get(&self, level: &AccessLevel) -> LevelSet {
        self.entries.get(level).cloned().unwrap_or_default()
    }

    /// Union of the permitted levels over every key in `levels`
    pub fn permitted(&self, levels: &LevelSet) -> LevelSet {
        levels
            .iter()
            .filter_map(|level| self.entries.get(level))
            .flatten()
            .cloned()
            .collect()
    }

    pub fn insert(&mut self, level: AccessLevel, permitted: LevelSet) {
        self.entries.insert(level, permitted);
    }

    /// Every level named by the table, as key or as value
    pub fn referenced_levels(&self) -> impl Iterator<Item = &AccessLevel> {
        self.entries
            .iter()
            .flat_map(|(key, values)| std::iter::once(key).chain(values.iter()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, I, V> FromIterator<(K, I)> for CompatibilityTable
where
    K: Into<AccessLevel>,
    I: IntoIterator<Item = V>,
    V: Into<AccessLevel>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, values)| (key.into(), level_set(values)))
                .collect(),
        }
    }
}

/// Levels each user type may declare
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTypeTable {
    entries: HashMap<String, LevelSet>,
}

impl UserTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels allowed for `user_type`; unconfigured types get none
    pub fn allowed(&self, user_type: &str) -> LevelSet {
        self.entries.get(user_type).cloned().unwrap_or_default()
    }

    pub fn user_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn referenced_levels(&self) -> impl Iterator<Item = &AccessLevel> {
        self.entries.values().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, I, V> FromIterator<(K, I)> for UserTypeTable
where
    K: Into<String>,
    I: IntoIterator<Item = V>,
    V: Into<AccessLevel>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, values)| (key.into(), level_set(values)))
                .collect(),
        }
    }
}
