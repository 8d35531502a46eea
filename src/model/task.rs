use crate::data_access::LevelSet;
use crate::model::{levels_from_info, set_levels_in_info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    #[default]
    Ongoing,
    Completed,
}

impl TaskState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TaskState::Ongoing => "ongoing",
            TaskState::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A unit of work belonging to exactly one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Assigned by the repository on first save
    #[serde(default)]
    pub id: Option<u64>,

    pub project_id: u64,

    #[serde(default)]
    pub info: Map<String, Value>,

    #[serde(default)]
    pub state: TaskState,

    #[serde(default = "default_n_answers")]
    pub n_answers: u32,

    #[serde(default)]
    pub calibration: u8,

    #[serde(default)]
    pub exported: bool,

    /// Known-correct answers; present on gold (calibration) tasks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold_answers: Option<Value>,

    #[serde(default)]
    pub priority_0: f64,

    /// Answers needed before the task completes, when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quorum: Option<u32>,

    /// Preferences used to route the task to matching users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_pref: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,

    /// Task runs submitted so far
    #[serde(default)]
    pub task_run_count: usize,
}

fn default_n_answers() -> u32 {
    30
}

impl Task {
    pub fn new(project_id: u64, info: Map<String, Value>) -> Self {
        Self {
            id: None,
            project_id,
            info,
            state: TaskState::Ongoing,
            n_answers: default_n_answers(),
            calibration: 0,
            exported: false,
            gold_answers: None,
            priority_0: 0.0,
            quorum: None,
            user_pref: None,
            expiration: None,
            task_run_count: 0,
        }
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

    /// Gold tasks carry non-empty gold answers
    pub fn is_gold(&self) -> bool {
        match &self.gold_answers {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}
