use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::schedule::WorkSchedule;
use crate::models::streak::StreakData;
use crate::models::task::Energy;

/// Current schema version of the persisted profile
pub const PROFILE_VERSION: u32 = 2;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Empty until onboarding completes
    pub name: String,
    pub app_usage_mode: AppUsageMode,
    pub work_schedule: WorkSchedule,
    pub notification_mute_preferences: MutePreferences,
    pub goals: Vec<String>,
    pub goal_steps: BTreeMap<String, Vec<String>>,
    pub todays_mood: Option<String>,
    pub energy_level: Energy,
    pub important_tasks: Vec<String>,
    /// Cached resolution of `theme_mode`
    pub theme: Theme,
    pub theme_mode: ThemeMode,
    pub body_doubling_active: bool,
    /// Free text per `YYYY-MM-DD`, last write wins
    pub brain_dump_history: BTreeMap<String, String>,
    pub brain_dump_title_history: BTreeMap<String, String>,
    pub streak_data: StreakData,
    pub preferences: Preferences,
    pub custom_categories: Vec<Category>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            app_usage_mode: AppUsageMode::Unset,
            work_schedule: WorkSchedule::default(),
            notification_mute_preferences: MutePreferences::default(),
            goals: vec![String::new()],
            goal_steps: BTreeMap::new(),
            todays_mood: None,
            energy_level: Energy::Medium,
            important_tasks: vec![],
            theme: Theme::Dark,
            theme_mode: ThemeMode::Dark,
            body_doubling_active: false,
            brain_dump_history: BTreeMap::new(),
            brain_dump_title_history: BTreeMap::new(),
            streak_data: StreakData::default(),
            preferences: Preferences::default(),
            custom_categories: vec![],
        }
    }
}

impl UserProfile {
    /// Shallow merge: every field present in `patch` replaces the current one
    pub fn merge(&mut self, patch: ProfilePatch) {
        let ProfilePatch {
            name,
            app_usage_mode,
            work_schedule,
            notification_mute_preferences,
            goals,
            goal_steps,
            todays_mood,
            energy_level,
            important_tasks,
            theme,
            theme_mode,
            body_doubling_active,
            brain_dump_history,
            brain_dump_title_history,
            streak_data,
            preferences,
            custom_categories,
        } = patch;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = app_usage_mode {
            self.app_usage_mode = v;
        }
        if let Some(v) = work_schedule {
            self.work_schedule = v;
        }
        if let Some(v) = notification_mute_preferences {
            self.notification_mute_preferences = v;
        }
        if let Some(v) = goals {
            self.goals = v;
        }
        if let Some(v) = goal_steps {
            self.goal_steps = v;
        }
        if let Some(v) = todays_mood {
            self.todays_mood = v;
        }
        if let Some(v) = energy_level {
            self.energy_level = v;
        }
        if let Some(v) = important_tasks {
            self.important_tasks = v;
        }
        if let Some(v) = theme {
            self.theme = v;
        }
        if let Some(v) = theme_mode {
            self.theme_mode = v;
        }
        if let Some(v) = body_doubling_active {
            self.body_doubling_active = v;
        }
        if let Some(v) = brain_dump_history {
            self.brain_dump_history = v;
        }
        if let Some(v) = brain_dump_title_history {
            self.brain_dump_title_history = v;
        }
        if let Some(v) = streak_data {
            self.streak_data = v;
        }
        if let Some(v) = preferences {
            self.preferences = v;
        }
        if let Some(v) = custom_categories {
            self.custom_categories = v;
        }
    }

    /// Goals with the onboarding placeholder filtered out
    pub fn active_goals(&self) -> impl Iterator<Item = &String> {
        self.goals.iter().filter(|g| !g.trim().is_empty())
    }
}

/// Partial profile update. `None` leaves a field untouched.
#[derive(Default, Clone, Debug)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub app_usage_mode: Option<AppUsageMode>,
    pub work_schedule: Option<WorkSchedule>,
    pub notification_mute_preferences: Option<MutePreferences>,
    pub goals: Option<Vec<String>>,
    pub goal_steps: Option<BTreeMap<String, Vec<String>>>,
    pub todays_mood: Option<Option<String>>,
    pub energy_level: Option<Energy>,
    pub important_tasks: Option<Vec<String>>,
    pub theme: Option<Theme>,
    pub theme_mode: Option<ThemeMode>,
    pub body_doubling_active: Option<bool>,
    pub brain_dump_history: Option<BTreeMap<String, String>>,
    pub brain_dump_title_history: Option<BTreeMap<String, String>>,
    pub streak_data: Option<StreakData>,
    pub preferences: Option<Preferences>,
    pub custom_categories: Option<Vec<Category>>,
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppUsageMode {
    Personal,
    Work,
    Both,
    #[default]
    Unset,
}

impl fmt::Display for AppUsageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AppUsageMode::Personal => "personal",
            AppUsageMode::Work => "work",
            AppUsageMode::Both => "both",
            AppUsageMode::Unset => "unset",
        };
        f.write_str(label)
    }
}

impl FromStr for AppUsageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "personal" => Ok(AppUsageMode::Personal),
            "work" => Ok(AppUsageMode::Work),
            "both" => Ok(AppUsageMode::Both),
            "" | "unset" => Ok(AppUsageMode::Unset),
            other => Err(format!("unknown usage mode '{other}'")),
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MutePreferences {
    pub during_work: bool,
    pub after_work: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub notifications: bool,
    pub auto_save: bool,
    pub energy_reminders: bool,
    pub focus_mode: bool,
    pub work_life_separation: bool,
    pub smart_scheduling: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications: true,
            auto_save: true,
            energy_reminders: true,
            focus_mode: false,
            work_life_separation: false,
            smart_scheduling: true,
        }
    }
}

impl Preferences {
    pub fn get(&self, key: PreferenceKey) -> bool {
        match key {
            PreferenceKey::Notifications => self.notifications,
            PreferenceKey::AutoSave => self.auto_save,
            PreferenceKey::EnergyReminders => self.energy_reminders,
            PreferenceKey::FocusMode => self.focus_mode,
            PreferenceKey::WorkLifeSeparation => self.work_life_separation,
            PreferenceKey::SmartScheduling => self.smart_scheduling,
        }
    }

    pub fn set(&mut self, key: PreferenceKey, value: bool) {
        let slot = match key {
            PreferenceKey::Notifications => &mut self.notifications,
            PreferenceKey::AutoSave => &mut self.auto_save,
            PreferenceKey::EnergyReminders => &mut self.energy_reminders,
            PreferenceKey::FocusMode => &mut self.focus_mode,
            PreferenceKey::WorkLifeSeparation => &mut self.work_life_separation,
            PreferenceKey::SmartScheduling => &mut self.smart_scheduling,
        };
        *slot = value;
    }
}

/// One switch of [`Preferences`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreferenceKey {
    Notifications,
    AutoSave,
    EnergyReminders,
    FocusMode,
    WorkLifeSeparation,
    SmartScheduling,
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PreferenceKey::Notifications => "notifications",
            PreferenceKey::AutoSave => "auto-save",
            PreferenceKey::EnergyReminders => "energy-reminders",
            PreferenceKey::FocusMode => "focus-mode",
            PreferenceKey::WorkLifeSeparation => "work-life-separation",
            PreferenceKey::SmartScheduling => "smart-scheduling",
        };
        f.write_str(label)
    }
}

impl FromStr for PreferenceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "notifications" => Ok(PreferenceKey::Notifications),
            "auto-save" | "autosave" => Ok(PreferenceKey::AutoSave),
            "energy-reminders" => Ok(PreferenceKey::EnergyReminders),
            "focus-mode" => Ok(PreferenceKey::FocusMode),
            "work-life-separation" => Ok(PreferenceKey::WorkLifeSeparation),
            "smart-scheduling" => Ok(PreferenceKey::SmartScheduling),
            other => Err(format!("unknown preference '{other}'")),
        }
    }
}

/// Which side of the work window notifications are muted for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MuteWindow {
    DuringWork,
    AfterWork,
}

impl MutePreferences {
    pub fn set(&mut self, window: MuteWindow, muted: bool) {
        match window {
            MuteWindow::DuringWork => self.during_work = muted,
            MuteWindow::AfterWork => self.after_work = muted,
        }
    }
}

impl FromStr for MuteWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "work" | "during-work" => Ok(MuteWindow::DuringWork),
            "after" | "after-work" => Ok(MuteWindow::AfterWork),
            other => Err(format!("unknown mute window '{other}'")),
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    System,
    Light,
    #[default]
    Dark,
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(ThemeMode::System),
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme mode '{other}'")),
        }
    }
}

/// User-defined task category
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Category {
    /// Slug of the name, unique among custom categories
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
}
