//! Project stats resource rules

use serde_json::Value;

/// Bulky breakdowns only returned when the caller asks for full stats
const DETAILED_STATS: &[&str] = &["hours_stats", "dates_stats", "users_stats"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectStatsApi;

impl ProjectStatsApi {
    pub fn new() -> Self {
        Self
    }

    /// Strip the detailed breakdowns from `stats.info` unless `full` is set
    pub fn select_attributes(&self, mut stats: Value, full: bool) -> Value {
        if full {
            return stats;
        }
        if let Some(info) = stats.get_mut("info").and_then(Value::as_object_mut) {
            for key in DETAILED_STATS {
                info.remove(*key);
            }
        }
        stats
    }
}
