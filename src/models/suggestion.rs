use serde::{Deserialize, Serialize};

use crate::models::task::{Energy, TimeBlock};

/// Candidate task offered to the user; never persisted itself
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskSuggestion {
    pub text: String,
    pub energy: Energy,
    pub time_block: SuggestedBlock,
    pub reason: String,
    pub category: Option<SuggestionCategory>,
}

impl TaskSuggestion {
    pub fn new(
        text: &str,
        energy: Energy,
        time_block: SuggestedBlock,
        reason: &str,
        category: SuggestionCategory,
    ) -> Self {
        Self {
            text: text.to_string(),
            energy,
            time_block,
            reason: reason.to_string(),
            category: Some(category),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestedBlock {
    Morning,
    Afternoon,
    Evening,
    Any,
}

impl SuggestedBlock {
    /// Bucket an accepted suggestion lands in
    pub fn resolve(self) -> TimeBlock {
        match self {
            SuggestedBlock::Morning => TimeBlock::Morning,
            SuggestedBlock::Afternoon | SuggestedBlock::Any => TimeBlock::Afternoon,
            SuggestedBlock::Evening => TimeBlock::Evening,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Work,
    Personal,
    Both,
}
