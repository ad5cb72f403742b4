use serde::{Deserialize, Serialize};

/// User adjustable parameters, persisted under the `settings` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Number of occurrences returned by an exercise history query without explicit limit.
    pub history_limit: usize,
    pub backup_interval_days: i64,
    pub reminder_interval_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_limit: 10,
            backup_interval_days: 7,
            reminder_interval_days: 1,
        }
    }
}
