//! Domain objects consumed by the policies
//!
//! Only the fields the policies and importers read are modelled; the rest of
//! each record lives in its free-form `info` object.

pub mod announcement;
pub mod project;
pub mod task;
pub mod user;

pub use announcement::Announcement;
pub use project::Project;
pub use task::{Task, TaskState};
pub use user::{CurrentUser, User};

use crate::data_access::{AccessLevel, LevelSet};
use serde_json::{Map, Value};

/// Key holding declared access levels inside an `info` object
pub const DATA_ACCESS_KEY: &str = "data_access";

/// Read `info.data_access`; absent or malformed entries count as no levels
pub(crate) fn levels_from_info(info: &Map<String, Value>) -> LevelSet {
    info.get(DATA_ACCESS_KEY)
        .and_then(Value::as_array)
        .map(|levels| {
            levels
                .iter()
                .filter_map(Value::as_str)
                .map(AccessLevel::from)
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn set_levels_in_info<I, S>(info: &mut Map<String, Value>, levels: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let levels: Vec<Value> = levels
        .into_iter()
        .map(|l| Value::String(l.into()))
        .collect();
    info.insert(DATA_ACCESS_KEY.to_string(), Value::Array(levels));
}
