use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category id assigned to tasks added during work time or from work suggestions
pub const WORK_CATEGORY: &str = "work";
/// Category id assigned to everything else
pub const PERSONAL_CATEGORY: &str = "personal";
/// Minutes a freshly added task is estimated to take
pub const DEFAULT_ESTIMATE_MINUTES: u32 = 30;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// UUID to identify the task
    pub id: Uuid,
    /// What the user wants to do
    pub text: String,
    pub completed: bool,
    /// Set exactly when `completed` is true
    pub completed_at: Option<Timestamp>,
    pub energy: Energy,
    /// Estimated duration in minutes
    pub estimated: u32,
    /// Category id, either a built-in one or a custom category slug
    pub category: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Template this task was generated from, only set on recurring instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<Uuid>,
}

impl Task {
    pub fn new(text: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
            completed_at: None,
            energy: Energy::default(),
            estimated: DEFAULT_ESTIMATE_MINUTES,
            category: PERSONAL_CATEGORY.to_string(),
            created_at,
            recurrence: Recurrence::default(),
            parent_task_id: None,
        }
    }

    /// A template carries a recurrence rule and was authored by the user
    pub fn is_template(&self) -> bool {
        self.recurrence.kind != RecurrenceKind::None && self.parent_task_id.is_none()
    }

    /// Flips completion keeping `completed_at` in lock-step. Returns the new state.
    pub fn toggle_complete(&mut self, now: Timestamp) -> bool {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
        self.completed
    }

    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(energy) = patch.energy {
            self.energy = energy;
        }
        if let Some(estimated) = patch.estimated {
            self.estimated = estimated;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(recurrence) = patch.recurrence {
            self.recurrence = recurrence;
        }
    }
}

/// Fields of a task that may be edited after creation.
/// Completion is left out: it only changes through toggling.
#[derive(Default, Clone, Debug)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub energy: Option<Energy>,
    pub estimated: Option<u32>,
    pub category: Option<String>,
    pub recurrence: Option<Recurrence>,
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Energy {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Energy::Low => "low",
            Energy::Medium => "medium",
            Energy::High => "high",
        };
        f.write_str(label)
    }
}

impl FromStr for Energy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Energy::Low),
            "medium" => Ok(Energy::Medium),
            "high" => Ok(Energy::High),
            other => Err(format!("unknown energy level '{other}'")),
        }
    }
}

/// The three segments of the day tasks are bucketed into
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeBlock {
    Morning,
    Afternoon,
    Evening,
}

impl TimeBlock {
    pub const ALL: [TimeBlock; 3] = [TimeBlock::Morning, TimeBlock::Afternoon, TimeBlock::Evening];
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeBlock::Morning => "morning",
            TimeBlock::Afternoon => "afternoon",
            TimeBlock::Evening => "evening",
        };
        f.write_str(label)
    }
}

impl FromStr for TimeBlock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morning" | "m" => Ok(TimeBlock::Morning),
            "afternoon" | "a" => Ok(TimeBlock::Afternoon),
            "evening" | "e" => Ok(TimeBlock::Evening),
            other => Err(format!("unknown time block '{other}'")),
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    /// Weekday numbers, 0 = Sunday through 6 = Saturday
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<BTreeSet<u8>>,
    /// Every n days for daily rules; treated as 1 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
}

impl Recurrence {
    pub fn daily(interval: u32) -> Self {
        Self {
            kind: RecurrenceKind::Daily,
            days_of_week: None,
            interval: Some(interval.max(1)),
        }
    }

    pub fn weekly(days: impl IntoIterator<Item = u8>) -> Self {
        Self {
            kind: RecurrenceKind::Weekly,
            days_of_week: Some(days.into_iter().filter(|d| *d <= 6).collect()),
            interval: None,
        }
    }

    pub fn monthly() -> Self {
        Self {
            kind: RecurrenceKind::Monthly,
            days_of_week: None,
            interval: None,
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for RecurrenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(RecurrenceKind::None),
            "daily" => Ok(RecurrenceKind::Daily),
            "weekly" => Ok(RecurrenceKind::Weekly),
            "monthly" => Ok(RecurrenceKind::Monthly),
            other => Err(format!("unknown recurrence '{other}'")),
        }
    }
}
