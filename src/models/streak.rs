use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Consecutive-day completion counters
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreakData {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// `YYYY-MM-DD` of the last day a task was completed
    pub last_completion_date: Option<String>,
    /// Completed-task count per `YYYY-MM-DD`
    #[serde(default)]
    pub completion_history: BTreeMap<String, u32>,
}
