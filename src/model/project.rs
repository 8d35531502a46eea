use crate::data_access::LevelSet;
use crate::model::{levels_from_info, set_levels_in_info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A crowdsourcing project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,

    pub short_name: String,

    /// Owner and co-owner user ids
    #[serde(default)]
    pub owners_ids: Vec<u64>,

    #[serde(default)]
    pub info: Map<String, Value>,
}

impl Project {
    pub fn new(id: u64, short_name: impl Into<String>) -> Self {
        Self {
            id,
            short_name: short_name.into(),
            ..Default::default()
        }
    }

    pub fn with_owner(mut self, user_id: u64) -> Self {
        self.owners_ids.push(user_id);
        self
    }

    /// Levels declared in `info.data_access`
    pub fn data_access(&self) -> LevelSet {
        levels_from_info(&self.info)
    }

    pub fn set_data_access<I, S>(&mut self, levels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        set_levels_in_info(&mut self.info, levels);
    }

    /// External tracking reference at `info.ext_config.data_access.tracking_id`
    ///
    /// Empty strings count as missing.
    pub fn tracking_id(&self) -> Option<&str> {
        self.info
            .get("ext_config")?
            .get("data_access")?
            .get("tracking_id")?
            .as_str()
            .filter(|id| !id.is_empty())
    }

    pub fn set_tracking_id(&mut self, tracking_id: impl Into<String>) {
        self.info.insert(
            "ext_config".to_string(),
            json!({ "data_access": { "tracking_id": tracking_id.into() } }),
        );
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owners_ids.contains(&user_id)
    }

    /// Answers collected per task unless a task says otherwise; `fallback`
    /// applies when the project sets no `info.default_n_answers`
    pub fn default_n_answers(&self, fallback: u32) -> u32 {
        self.info
            .get("default_n_answers")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(fallback)
    }
}
