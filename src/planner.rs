use jiff::Span;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    clock::{Clock, checkin_marker, date_key},
    models::{
        collection::{TASKS_VERSION, TaskCollection},
        ledger::{DISMISSAL_RETENTION_DAYS, DismissalLedger},
        profile::{
            Category, MuteWindow, PROFILE_VERSION, PreferenceKey, ProfilePatch, Theme, ThemeMode,
            UserProfile,
        },
        store::Store,
        suggestion::{SuggestionCategory, TaskSuggestion},
        task::{PERSONAL_CATEGORY, Recurrence, Task, TaskPatch, TimeBlock, WORK_CATEGORY},
    },
    services::{
        categories::{self, CategoryError, CreateCategoryParameters},
        recurrence, streak, suggestions,
        work_time::{self, WorkTimeStatus},
    },
    storage::{
        DISMISSED_KEY, LAST_CHECKIN_KEY, PROFILE_KEY, Storage, StorageError, TASKS_KEY,
        migrations::{self, MigrationFn, profile_migrations, tasks_migrations},
    },
};

/// Moods calm enough to offer a goal step during check-in
const GOAL_FRIENDLY_MOODS: [&str; 2] = ["calm", "neutral"];

/// Screen the caller should present after [`Planner::load_all`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchState {
    NeedsOnboarding,
    NeedsDailyCheckIn,
    Ready,
}

/// Single source of truth for the profile, tasks and dismissal ledger.
///
/// Every mutation updates memory first and then writes the affected blob
/// through to storage. Write failures are logged and swallowed: the
/// in-memory state stays authoritative for the rest of the session.
pub struct Planner<S: Storage, C: Clock> {
    storage: S,
    clock: C,
    store: Store,
    /// Last OS appearance reported by the caller
    observed_appearance: Option<Theme>,
    work_time: WorkTimeStatus,
    /// Local date recurring templates were last expanded for
    expanded_on: Option<jiff::civil::Date>,
}

impl<S: Storage, C: Clock> Planner<S, C> {
    pub fn new(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            store: Store::default(),
            observed_appearance: None,
            work_time: WorkTimeStatus::default(),
            expanded_on: None,
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.store.profile
    }

    pub fn tasks(&self) -> &TaskCollection {
        &self.store.tasks
    }

    pub fn dismissed(&self) -> &DismissalLedger {
        &self.store.dismissed
    }

    pub fn brain_dump(&self) -> &str {
        &self.store.brain_dump
    }

    pub fn brain_dump_title(&self) -> &str {
        &self.store.brain_dump_title
    }

    pub fn work_time(&self) -> WorkTimeStatus {
        self.work_time
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads every blob from storage, falling back to defaults for anything
    /// missing or unreadable, and reports which screen should come next.
    pub fn load_all(&mut self) -> LaunchState {
        let profile = self.read_versioned::<UserProfile>(
            PROFILE_KEY,
            PROFILE_VERSION,
            &profile_migrations(),
        );
        let has_profile = profile.is_some();

        self.store = Store {
            profile: profile.unwrap_or_default(),
            tasks: self
                .read_versioned(TASKS_KEY, TASKS_VERSION, &tasks_migrations())
                .unwrap_or_default(),
            dismissed: self.read_plain(DISMISSED_KEY).unwrap_or_default(),
            brain_dump: String::new(),
            brain_dump_title: String::new(),
        };

        let today_key = self.clock.today_key();
        let profile = &self.store.profile;
        if let Some(text) = profile.brain_dump_history.get(&today_key) {
            self.store.brain_dump = text.clone();
        }
        if let Some(title) = profile.brain_dump_title_history.get(&today_key) {
            self.store.brain_dump_title = title.clone();
        }

        self.refresh_work_time();
        if !self.store.tasks.is_empty() {
            self.expand_recurring();
        }

        let marker = checkin_marker(self.clock.local_date());
        let state = if !has_profile || self.store.profile.name.trim().is_empty() {
            LaunchState::NeedsOnboarding
        } else if self.last_checkin().as_deref() != Some(marker.as_str()) {
            LaunchState::NeedsDailyCheckIn
        } else {
            LaunchState::Ready
        };

        tracing::info!(
            tasks = self.store.tasks.len(),
            work_time = self.work_time.is_work_time,
            ?state,
            "planner loaded"
        );
        state
    }

    /// Shallow-merges `patch` into the profile and persists the result.
    /// Setting a theme mode also resolves the cached `theme`: system mode takes
    /// the observed appearance, light and dark take themselves, whatever
    /// `patch.theme` says.
    pub fn save_profile(&mut self, patch: ProfilePatch) {
        let theme_mode = patch.theme_mode;
        let schedule_changed = patch.work_schedule.is_some();

        self.store.profile.merge(patch);
        match theme_mode {
            Some(ThemeMode::System) => self.store.profile.theme = self.system_appearance(),
            Some(ThemeMode::Light) => self.store.profile.theme = Theme::Light,
            Some(ThemeMode::Dark) => self.store.profile.theme = Theme::Dark,
            None => {}
        }
        if schedule_changed {
            self.refresh_work_time();
        }

        self.persist_profile();
    }

    /// Replaces the whole collection
    pub fn save_tasks(&mut self, tasks: TaskCollection) {
        self.store.tasks = tasks;
        self.persist_tasks();
    }

    pub fn add_task(
        &mut self,
        block: TimeBlock,
        text: &str,
        suggestion: Option<&TaskSuggestion>,
        recurrence: Option<Recurrence>,
    ) -> Uuid {
        let mut task = Task::new(text.trim(), self.clock.now().timestamp());

        if let Some(suggestion) = suggestion {
            task.energy = suggestion.energy;
        }
        let from_work_suggestion =
            suggestion.and_then(|s| s.category) == Some(SuggestionCategory::Work);
        task.category = if from_work_suggestion || self.work_time.is_work_time {
            WORK_CATEGORY.to_string()
        } else {
            PERSONAL_CATEGORY.to_string()
        };
        if let Some(recurrence) = recurrence {
            task.recurrence = recurrence;
        }

        let id = task.id;
        tracing::debug!(%id, %block, category = %task.category, "adding task");
        self.store.tasks.bucket_mut(block).push(task);
        self.persist_tasks();
        id
    }

    /// Flips completion. Returns the new state, or `None` when no such task exists.
    pub fn toggle_task_complete(&mut self, block: TimeBlock, id: Uuid) -> Option<bool> {
        let now = self.clock.now().timestamp();
        let Some(task) = self.store.tasks.get_mut(block, id) else {
            tracing::debug!(%id, %block, "toggle ignored, task not found");
            return None;
        };
        let completed = task.toggle_complete(now);
        self.persist_tasks();

        if completed {
            self.record_streak();
        }
        Some(completed)
    }

    /// Applies `patch` to the task. Returns whether the task existed.
    pub fn update_task(&mut self, block: TimeBlock, id: Uuid, patch: TaskPatch) -> bool {
        let Some(task) = self.store.tasks.get_mut(block, id) else {
            tracing::debug!(%id, %block, "update ignored, task not found");
            return false;
        };
        task.apply(patch);
        self.persist_tasks();
        true
    }

    pub fn delete_task(&mut self, block: TimeBlock, id: Uuid) -> Option<Task> {
        let removed = self.store.tasks.remove(block, id);
        if removed.is_some() {
            self.persist_tasks();
        } else {
            tracing::debug!(%id, %block, "delete ignored, task not found");
        }
        removed
    }

    pub fn save_brain_dump(&mut self, text: &str) {
        self.store.brain_dump = text.to_string();
        let mut history = self.store.profile.brain_dump_history.clone();
        history.insert(self.clock.today_key(), text.to_string());
        self.save_profile(ProfilePatch {
            brain_dump_history: Some(history),
            ..ProfilePatch::default()
        });
    }

    pub fn save_brain_dump_title(&mut self, title: &str) {
        self.store.brain_dump_title = title.to_string();
        let mut history = self.store.profile.brain_dump_title_history.clone();
        history.insert(self.clock.today_key(), title.to_string());
        self.save_profile(ProfilePatch {
            brain_dump_title_history: Some(history),
            ..ProfilePatch::default()
        });
    }

    /// Hides a suggestion for the rest of the day and prunes old days
    pub fn dismiss_suggestion_for_today(&mut self, text: &str) {
        let today = self.clock.utc_date();
        self.store.dismissed.dismiss(&date_key(today), text);

        match today.checked_sub(Span::new().days(DISMISSAL_RETENTION_DAYS)) {
            Ok(cutoff) => {
                let pruned = self.store.dismissed.prune_before(&date_key(cutoff));
                if pruned > 0 {
                    tracing::debug!(pruned, "pruned old dismissals");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not compute dismissal cutoff"),
        }

        self.persist_ledger();
    }

    /// Current suggestions; empty until onboarding is done
    pub fn suggestions(&self) -> Vec<TaskSuggestion> {
        if self.store.profile.name.trim().is_empty() {
            return vec![];
        }
        suggestions::generate(
            self.clock.now().hour(),
            self.work_time.is_work_time,
            self.store.profile.app_usage_mode,
            self.store.dismissed.for_day(&self.clock.today_key()),
        )
    }

    /// Turns a suggestion into a task and keeps it from resurfacing today
    pub fn accept_suggestion(&mut self, suggestion: &TaskSuggestion) -> Uuid {
        let block = suggestion.time_block.resolve();
        let id = self.add_task(block, &suggestion.text, Some(suggestion), None);
        self.dismiss_suggestion_for_today(&suggestion.text);
        id
    }

    /// Periodic re-evaluation, meant to run once a minute. Re-runs recurring
    /// expansion once the local date has moved on. Returns whether the work
    /// time status changed.
    pub fn tick(&mut self) -> bool {
        let previous = self.work_time;
        self.refresh_work_time();

        let today = self.clock.local_date();
        if self.expanded_on != Some(today) && !self.store.tasks.is_empty() {
            self.expand_recurring();
        }

        previous != self.work_time
    }

    /// Materializes today's recurring instances, persisting once if any were made
    pub fn expand_recurring(&mut self) -> usize {
        let now = self.clock.now();
        self.expanded_on = Some(now.date());

        let created = recurrence::expand(&mut self.store.tasks, &now);
        if created > 0 {
            tracing::info!(created, "materialized recurring tasks");
            self.persist_tasks();
        }
        created
    }

    /// Records today's mood and marks the daily check-in as done
    pub fn set_mood(&mut self, mood: &str) {
        self.save_profile(ProfilePatch {
            todays_mood: Some(Some(mood.to_string())),
            ..ProfilePatch::default()
        });

        let marker = checkin_marker(self.clock.local_date());
        if let Err(e) = self.storage.set(LAST_CHECKIN_KEY, &marker) {
            tracing::error!(key = LAST_CHECKIN_KEY, error = %e, "failed to record check-in");
        }
    }

    /// Goal steps worth offering after checking in with `mood`, as
    /// `(goal, step)` pairs in goal order. Empty unless the mood is calm or
    /// neutral.
    pub fn checkin_step_offers(&self, mood: &str) -> Vec<(&str, &str)> {
        let mood = mood.trim().to_lowercase();
        if !GOAL_FRIENDLY_MOODS.contains(&mood.as_str()) {
            return vec![];
        }

        let goal_steps = &self.store.profile.goal_steps;
        self.store
            .profile
            .active_goals()
            .flat_map(move |goal| {
                goal_steps
                    .get(goal)
                    .into_iter()
                    .flatten()
                    .filter(|step| !step.trim().is_empty())
                    .map(move |step| (goal.as_str(), step.as_str()))
            })
            .collect()
    }

    /// Tasks completed today with their block, newest first
    pub fn completed_today(&self) -> Vec<(TimeBlock, &Task)> {
        let today_key = self.clock.today_key();
        let mut done: Vec<_> = self
            .store
            .tasks
            .iter()
            .filter(|(_, task)| task.completed)
            .filter(|(_, task)| {
                task.completed_at.is_some_and(|at| {
                    date_key(at.to_zoned(jiff::tz::TimeZone::UTC).date()) == today_key
                })
            })
            .collect();

        done.sort_by(|(_, a), (_, b)| {
            let a = a.completed_at.unwrap_or(a.created_at);
            let b = b.completed_at.unwrap_or(b.created_at);
            b.cmp(&a)
        });
        done
    }

    pub fn add_category(
        &mut self,
        parameters: CreateCategoryParameters,
    ) -> Result<Category, CategoryError> {
        let mut categories = self.store.profile.custom_categories.clone();
        let category = categories::create_category(&mut categories, parameters)?;
        self.save_profile(ProfilePatch {
            custom_categories: Some(categories),
            ..ProfilePatch::default()
        });
        Ok(category)
    }

    pub fn remove_category(&mut self, id: &str) -> Result<Category, CategoryError> {
        let mut categories = self.store.profile.custom_categories.clone();
        let removed = categories::remove_category(&mut categories, id)?;
        self.save_profile(ProfilePatch {
            custom_categories: Some(categories),
            ..ProfilePatch::default()
        });
        Ok(removed)
    }

    /// Appends a goal, dropping the blank onboarding placeholder
    pub fn add_goal(&mut self, goal: &str) {
        let goal = goal.trim();
        if goal.is_empty() {
            return;
        }
        let mut goals: Vec<String> = self.store.profile.active_goals().cloned().collect();
        if !goals.iter().any(|g| g == goal) {
            goals.push(goal.to_string());
        }
        self.save_profile(ProfilePatch {
            goals: Some(goals),
            ..ProfilePatch::default()
        });
    }

    pub fn set_goal_steps(&mut self, goal: &str, steps: Vec<String>) {
        let mut goal_steps = self.store.profile.goal_steps.clone();
        goal_steps.insert(goal.to_string(), steps);
        self.save_profile(ProfilePatch {
            goal_steps: Some(goal_steps),
            ..ProfilePatch::default()
        });
    }

    pub fn set_body_doubling(&mut self, active: bool) {
        self.save_profile(ProfilePatch {
            body_doubling_active: Some(active),
            ..ProfilePatch::default()
        });
    }

    pub fn set_preference(&mut self, key: PreferenceKey, value: bool) {
        let mut preferences = self.store.profile.preferences;
        preferences.set(key, value);
        self.save_profile(ProfilePatch {
            preferences: Some(preferences),
            ..ProfilePatch::default()
        });
    }

    pub fn set_notification_mute(&mut self, window: MuteWindow, muted: bool) {
        let mut mute = self.store.profile.notification_mute_preferences;
        mute.set(window, muted);
        self.save_profile(ProfilePatch {
            notification_mute_preferences: Some(mute),
            ..ProfilePatch::default()
        });
    }

    /// Whether the caller should keep observing OS appearance changes
    pub fn follows_system_appearance(&self) -> bool {
        self.store.profile.theme_mode == ThemeMode::System
    }

    /// Caches the OS appearance, applying it while in system mode
    pub fn set_system_appearance(&mut self, theme: Theme) {
        self.observed_appearance = Some(theme);
        if self.follows_system_appearance() && self.store.profile.theme != theme {
            self.save_profile(ProfilePatch {
                theme: Some(theme),
                ..ProfilePatch::default()
            });
        }
    }

    fn system_appearance(&self) -> Theme {
        self.observed_appearance.unwrap_or(self.store.profile.theme)
    }

    fn refresh_work_time(&mut self) {
        self.work_time = work_time::evaluate(&self.store.profile.work_schedule, &self.clock.now());
    }

    fn record_streak(&mut self) {
        let today = self.clock.utc_date();
        let Some(next) =
            streak::record_completion(&self.store.profile.streak_data, &self.store.tasks, today)
        else {
            return;
        };
        tracing::debug!(current = next.current_streak, longest = next.longest_streak, "streak updated");
        self.save_profile(ProfilePatch {
            streak_data: Some(next),
            ..ProfilePatch::default()
        });
    }

    fn last_checkin(&self) -> Option<String> {
        self.storage.get(LAST_CHECKIN_KEY).unwrap_or_else(|e| {
            tracing::error!(key = LAST_CHECKIN_KEY, error = %e, "failed to read check-in date");
            None
        })
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to read, using defaults");
                None
            }
        }
    }

    fn read_versioned<T: DeserializeOwned>(
        &self,
        key: &str,
        current: u32,
        migrations: &[MigrationFn],
    ) -> Option<T> {
        let content = self.read_raw(key)?;
        migrations::decode(key, &content, current, migrations)
            .map_err(|e| tracing::error!(key, error = %e, "failed to decode, using defaults"))
            .ok()
    }

    fn read_plain<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = self.read_raw(key)?;
        serde_json::from_str(&content)
            .map_err(|e| tracing::error!(key, error = %e, "failed to parse, using defaults"))
            .ok()
    }

    fn write(&self, key: &str, encoded: Result<String, StorageError>) {
        if let Err(e) = encoded.and_then(|json| self.storage.set(key, &json)) {
            tracing::error!(key, error = %e, "failed to persist, keeping in-memory state");
        }
    }

    fn persist_profile(&self) {
        let encoded = migrations::encode(PROFILE_KEY, &self.store.profile, PROFILE_VERSION);
        self.write(PROFILE_KEY, encoded);
    }

    fn persist_tasks(&self) {
        let encoded = migrations::encode(TASKS_KEY, &self.store.tasks, TASKS_VERSION);
        self.write(TASKS_KEY, encoded);
    }

    fn persist_ledger(&self) {
        let encoded = serde_json::to_string(&self.store.dismissed).map_err(|e| {
            StorageError::SerializeFailed {
                key: DISMISSED_KEY.to_string(),
                source: e,
            }
        });
        self.write(DISMISSED_KEY, encoded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::schedule::WorkSchedule;
    use crate::models::suggestion::SuggestedBlock;
    use crate::models::task::{Energy, RecurrenceKind};
    use crate::services::work_time::work_day;
    use crate::storage::memory::MemoryStorage;
    use jiff::civil::{Weekday, date};
    use jiff::tz::TimeZone;
    use jiff::{SignedDuration, Zoned};

    // 2026-10-16 is a Friday
    fn friday_at(hour: i8, minute: i8) -> Zoned {
        date(2026, 10, 16)
            .at(hour, minute, 0, 0)
            .to_zoned(TimeZone::UTC)
            .unwrap()
    }

    fn onboarded<'a>(
        storage: &'a MemoryStorage,
        clock: &'a FixedClock,
    ) -> Planner<&'a MemoryStorage, &'a FixedClock> {
        let mut planner = Planner::new(storage, clock);
        planner.load_all();
        planner.save_profile(ProfilePatch {
            name: Some("Sam".to_string()),
            ..ProfilePatch::default()
        });
        planner
    }

    fn friday_schedule() -> WorkSchedule {
        let mut schedule = WorkSchedule {
            enabled: true,
            ..WorkSchedule::default()
        };
        *schedule.days.day_mut(Weekday::Friday) = work_day("09:00", "17:00").unwrap();
        schedule
    }

    #[test]
    fn launch_state_walks_onboarding_then_checkin() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));

        let mut planner = Planner::new(&storage, &clock);
        assert_eq!(planner.load_all(), LaunchState::NeedsOnboarding);

        planner.save_profile(ProfilePatch {
            name: Some("Sam".to_string()),
            ..ProfilePatch::default()
        });
        let mut planner = Planner::new(&storage, &clock);
        assert_eq!(planner.load_all(), LaunchState::NeedsDailyCheckIn);

        planner.set_mood("calm");
        let mut planner = Planner::new(&storage, &clock);
        assert_eq!(planner.load_all(), LaunchState::Ready);
        assert_eq!(planner.profile().todays_mood.as_deref(), Some("calm"));

        clock.advance(SignedDuration::from_hours(24));
        let mut planner = Planner::new(&storage, &clock);
        assert_eq!(planner.load_all(), LaunchState::NeedsDailyCheckIn);
    }

    #[test]
    fn blank_name_still_needs_onboarding() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = Planner::new(&storage, &clock);
        planner.save_profile(ProfilePatch {
            name: Some("   ".to_string()),
            ..ProfilePatch::default()
        });

        let mut planner = Planner::new(&storage, &clock);
        assert_eq!(planner.load_all(), LaunchState::NeedsOnboarding);
    }

    #[test]
    fn streak_counts_consecutive_days_and_resets_after_a_gap() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(12, 0));
        let mut planner = onboarded(&storage, &clock);

        let first = planner.add_task(TimeBlock::Morning, "Stretch", None, None);
        assert_eq!(planner.toggle_task_complete(TimeBlock::Morning, first), Some(true));
        assert_eq!(planner.profile().streak_data.current_streak, 1);

        clock.advance(SignedDuration::from_hours(24));
        let second = planner.add_task(TimeBlock::Morning, "Read", None, None);
        planner.toggle_task_complete(TimeBlock::Morning, second);
        assert_eq!(planner.profile().streak_data.current_streak, 2);

        let third = planner.add_task(TimeBlock::Evening, "Tidy", None, None);
        planner.toggle_task_complete(TimeBlock::Evening, third);
        let streak = &planner.profile().streak_data;
        assert_eq!(streak.current_streak, 2);
        assert_eq!(streak.completion_history.get("2026-10-17"), Some(&2));

        clock.advance(SignedDuration::from_hours(48));
        let fourth = planner.add_task(TimeBlock::Morning, "Walk", None, None);
        planner.toggle_task_complete(TimeBlock::Morning, fourth);
        let streak = &planner.profile().streak_data;
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 2);
        assert_eq!(streak.last_completion_date.as_deref(), Some("2026-10-19"));
    }

    #[test]
    fn toggling_twice_clears_completed_at() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(12, 0));
        let mut planner = onboarded(&storage, &clock);

        let id = planner.add_task(TimeBlock::Afternoon, "Email", None, None);
        planner.toggle_task_complete(TimeBlock::Afternoon, id);
        let task = planner.tasks().get(TimeBlock::Afternoon, id).unwrap();
        assert!(task.completed && task.completed_at.is_some());

        assert_eq!(planner.toggle_task_complete(TimeBlock::Afternoon, id), Some(false));
        let task = planner.tasks().get(TimeBlock::Afternoon, id).unwrap();
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn missing_tasks_are_ignored() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(12, 0));
        let mut planner = onboarded(&storage, &clock);
        let id = planner.add_task(TimeBlock::Morning, "Stretch", None, None);

        assert_eq!(planner.toggle_task_complete(TimeBlock::Evening, id), None);
        assert!(!planner.update_task(TimeBlock::Evening, id, TaskPatch::default()));
        assert!(planner.delete_task(TimeBlock::Evening, id).is_none());
        assert_eq!(planner.tasks().len(), 1);

        assert!(planner.delete_task(TimeBlock::Morning, id).is_some());
        assert!(planner.tasks().is_empty());
    }

    #[test]
    fn save_tasks_replaces_the_collection() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(12, 0));
        let mut planner = onboarded(&storage, &clock);
        planner.add_task(TimeBlock::Morning, "Stretch", None, None);

        let mut tasks = TaskCollection::default();
        tasks
            .evening
            .push(Task::new("Read", clock.now().timestamp()));
        planner.save_tasks(tasks);

        let mut reloaded = Planner::new(&storage, &clock);
        reloaded.load_all();
        assert!(reloaded.tasks().morning.is_empty());
        assert_eq!(reloaded.tasks().evening[0].text, "Read");
    }

    #[test]
    fn update_task_applies_patch_and_persists() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(12, 0));
        let mut planner = onboarded(&storage, &clock);
        let id = planner.add_task(TimeBlock::Morning, "Stretch", None, None);

        planner.update_task(
            TimeBlock::Morning,
            id,
            TaskPatch {
                energy: Some(Energy::High),
                estimated: Some(10),
                ..TaskPatch::default()
            },
        );

        let mut reloaded = Planner::new(&storage, &clock);
        reloaded.load_all();
        let task = reloaded.tasks().get(TimeBlock::Morning, id).unwrap();
        assert_eq!(task.energy, Energy::High);
        assert_eq!(task.estimated, 10);
        assert_eq!(task.text, "Stretch");
    }

    #[test]
    fn daily_template_expands_once_per_day() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(7, 0));
        let mut planner = onboarded(&storage, &clock);

        let template = planner.add_task(
            TimeBlock::Morning,
            "Take meds",
            None,
            Some(Recurrence::daily(1)),
        );
        assert_eq!(planner.expand_recurring(), 0);

        clock.advance(SignedDuration::from_hours(24));
        assert_eq!(planner.expand_recurring(), 1);
        assert_eq!(planner.expand_recurring(), 0);

        let instances: Vec<_> = planner
            .tasks()
            .morning
            .iter()
            .filter(|t| t.parent_task_id == Some(template))
            .collect();
        assert_eq!(instances.len(), 1);
        assert!(!instances[0].completed);
        assert_eq!(instances[0].recurrence.kind, RecurrenceKind::Daily);
        assert_eq!(instances[0].created_at.to_string(), "2026-10-17T00:00:00Z");
    }

    #[test]
    fn load_expands_templates_for_a_new_day() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(7, 0));
        let mut planner = onboarded(&storage, &clock);
        planner.add_task(TimeBlock::Evening, "Journal", None, Some(Recurrence::daily(1)));

        clock.advance(SignedDuration::from_hours(24));
        let mut reloaded = Planner::new(&storage, &clock);
        reloaded.load_all();
        assert_eq!(reloaded.tasks().evening.len(), 2);

        let mut again = Planner::new(&storage, &clock);
        again.load_all();
        assert_eq!(again.tasks().evening.len(), 2);
    }

    #[test]
    fn tick_expands_after_midnight() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(23, 59));
        let mut planner = onboarded(&storage, &clock);
        planner.add_task(TimeBlock::Morning, "Water plants", None, Some(Recurrence::daily(1)));
        planner.expand_recurring();

        planner.tick();
        assert_eq!(planner.tasks().morning.len(), 1);

        clock.advance(SignedDuration::from_mins(2));
        planner.tick();
        assert_eq!(planner.tasks().morning.len(), 2);
    }

    #[test]
    fn tick_reports_work_time_transitions() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(16, 59));
        let mut planner = onboarded(&storage, &clock);
        planner.save_profile(ProfilePatch {
            work_schedule: Some(friday_schedule()),
            ..ProfilePatch::default()
        });
        assert!(planner.work_time().is_work_time);
        assert_eq!(planner.work_time().remaining_minutes, Some(1));

        assert!(!planner.tick());
        clock.advance(SignedDuration::from_mins(1));
        assert!(planner.tick());
        assert!(!planner.work_time().is_work_time);
    }

    #[test]
    fn add_task_category_follows_work_time() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(10, 0));
        let mut planner = onboarded(&storage, &clock);
        planner.save_profile(ProfilePatch {
            work_schedule: Some(friday_schedule()),
            ..ProfilePatch::default()
        });

        let at_work = planner.add_task(TimeBlock::Morning, "Standup notes", None, None);
        assert_eq!(
            planner.tasks().get(TimeBlock::Morning, at_work).unwrap().category,
            WORK_CATEGORY
        );

        clock.set(friday_at(19, 0));
        planner.tick();
        let at_home = planner.add_task(TimeBlock::Evening, "Call mum", None, None);
        assert_eq!(
            planner.tasks().get(TimeBlock::Evening, at_home).unwrap().category,
            PERSONAL_CATEGORY
        );

        let suggestion = TaskSuggestion::new(
            "Check team messages",
            Energy::Low,
            SuggestedBlock::Any,
            "Stay connected",
            SuggestionCategory::Work,
        );
        let from_suggestion =
            planner.add_task(TimeBlock::Evening, &suggestion.text, Some(&suggestion), None);
        let task = planner.tasks().get(TimeBlock::Evening, from_suggestion).unwrap();
        assert_eq!(task.category, WORK_CATEGORY);
        assert_eq!(task.energy, Energy::Low);
    }

    #[test]
    fn suggestions_wait_for_onboarding() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = Planner::new(&storage, &clock);
        planner.load_all();
        assert!(planner.suggestions().is_empty());

        let planner = onboarded(&storage, &clock);
        assert!(!planner.suggestions().is_empty());
    }

    #[test]
    fn accepting_a_suggestion_adds_it_and_hides_it() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);

        let suggestion = planner.suggestions()[0].clone();
        let id = planner.accept_suggestion(&suggestion);

        let block = suggestion.time_block.resolve();
        assert_eq!(planner.tasks().get(block, id).unwrap().text, suggestion.text);
        assert!(planner.suggestions().iter().all(|s| s.text != suggestion.text));
    }

    #[test]
    fn dismissals_are_idempotent_and_pruned() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);

        planner.dismiss_suggestion_for_today("Gentle morning routine");
        planner.dismiss_suggestion_for_today("Gentle morning routine");
        assert_eq!(planner.dismissed().for_day("2026-10-16").len(), 1);

        clock.advance(SignedDuration::from_hours(24 * 15));
        planner.dismiss_suggestion_for_today("Self-care activity");
        assert!(planner.dismissed().for_day("2026-10-16").is_empty());
        assert_eq!(planner.dismissed().for_day("2026-10-31"), ["Self-care activity"]);

        let mut reloaded = Planner::new(&storage, &clock);
        reloaded.load_all();
        assert_eq!(reloaded.dismissed(), planner.dismissed());
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);

        storage.reject_writes(true);
        planner.add_task(TimeBlock::Morning, "Survives in memory", None, None);
        assert_eq!(planner.tasks().len(), 1);

        storage.reject_writes(false);
        let mut reloaded = Planner::new(&storage, &clock);
        reloaded.load_all();
        assert!(reloaded.tasks().is_empty());
        assert_eq!(reloaded.profile().name, "Sam");
    }

    #[test]
    fn corrupt_blob_falls_back_to_defaults() {
        let storage = MemoryStorage::new().with_entry(TASKS_KEY, "{not json");
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = Planner::new(&storage, &clock);
        planner.load_all();
        assert!(planner.tasks().is_empty());
    }

    #[test]
    fn system_theme_mode_takes_observed_appearance() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);

        planner.set_system_appearance(Theme::Light);
        assert_eq!(planner.profile().theme, Theme::Dark);

        planner.save_profile(ProfilePatch {
            theme_mode: Some(ThemeMode::System),
            theme: Some(Theme::Dark),
            ..ProfilePatch::default()
        });
        assert!(planner.follows_system_appearance());
        assert_eq!(planner.profile().theme, Theme::Light);

        planner.set_system_appearance(Theme::Dark);
        assert_eq!(planner.profile().theme, Theme::Dark);
    }

    #[test]
    fn explicit_theme_mode_resolves_the_cached_theme() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);
        planner.set_system_appearance(Theme::Light);

        let switch = |planner: &mut Planner<_, _>, mode| {
            planner.save_profile(ProfilePatch {
                theme_mode: Some(mode),
                ..ProfilePatch::default()
            });
        };

        switch(&mut planner, ThemeMode::System);
        assert_eq!(planner.profile().theme, Theme::Light);

        switch(&mut planner, ThemeMode::Light);
        assert_eq!(planner.profile().theme, Theme::Light);

        switch(&mut planner, ThemeMode::Dark);
        assert_eq!(planner.profile().theme, Theme::Dark);
        assert!(!planner.follows_system_appearance());

        let mut reloaded = Planner::new(&storage, &clock);
        reloaded.load_all();
        assert_eq!(reloaded.profile().theme_mode, ThemeMode::Dark);
        assert_eq!(reloaded.profile().theme, Theme::Dark);
    }

    #[test]
    fn brain_dump_is_restored_for_today_only() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);
        planner.save_brain_dump("buy milk\nrenew passport");
        planner.save_brain_dump_title("Errands");

        let mut reloaded = Planner::new(&storage, &clock);
        reloaded.load_all();
        assert_eq!(reloaded.brain_dump(), "buy milk\nrenew passport");
        assert_eq!(reloaded.brain_dump_title(), "Errands");

        clock.advance(SignedDuration::from_hours(24));
        let mut next_day = Planner::new(&storage, &clock);
        next_day.load_all();
        assert_eq!(next_day.brain_dump(), "");
        assert_eq!(
            next_day.profile().brain_dump_history.get("2026-10-16").map(String::as_str),
            Some("buy milk\nrenew passport")
        );
    }

    #[test]
    fn goals_survive_a_reload() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);
        planner.add_goal("Run a 5k");
        planner.add_goal("Run a 5k");
        planner.set_goal_steps("Run a 5k", vec!["Buy shoes".to_string()]);

        let mut reloaded = Planner::new(&storage, &clock);
        reloaded.load_all();
        assert_eq!(reloaded.profile().goals, ["Run a 5k"]);
        assert_eq!(
            reloaded.profile().goal_steps.get("Run a 5k"),
            Some(&vec!["Buy shoes".to_string()])
        );
    }

    #[test]
    fn calm_checkin_offers_goal_steps() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);
        planner.add_goal("Run a 5k");
        planner.add_goal("Learn Spanish");
        planner.set_goal_steps(
            "Run a 5k",
            vec!["Buy shoes".to_string(), "Jog 10 minutes".to_string()],
        );
        planner.set_goal_steps("Learn Spanish", vec!["Install an app".to_string()]);

        planner.set_mood("Calm");
        let offers = planner.checkin_step_offers("Calm");
        assert_eq!(
            offers,
            [
                ("Run a 5k", "Buy shoes"),
                ("Run a 5k", "Jog 10 minutes"),
                ("Learn Spanish", "Install an app"),
            ]
        );
        assert_eq!(planner.checkin_step_offers("neutral").len(), 3);

        let step = offers[1].1.to_string();
        let id = planner.add_task(TimeBlock::Morning, &step, None, None);
        assert_eq!(
            planner.tasks().get(TimeBlock::Morning, id).unwrap().text,
            "Jog 10 minutes"
        );
    }

    #[test]
    fn other_moods_and_missing_goals_offer_nothing() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);
        assert!(planner.checkin_step_offers("Calm").is_empty());

        planner.add_goal("Run a 5k");
        planner.set_goal_steps("Run a 5k", vec!["Buy shoes".to_string()]);
        assert!(planner.checkin_step_offers("Overwhelmed").is_empty());
        assert!(planner.checkin_step_offers("Underwhelmed").is_empty());
        assert_eq!(planner.checkin_step_offers("Calm").len(), 1);
    }

    #[test]
    fn preference_and_mute_switches_persist() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);

        planner.set_preference(PreferenceKey::Notifications, false);
        planner.set_preference(PreferenceKey::WorkLifeSeparation, true);
        planner.set_notification_mute(MuteWindow::AfterWork, true);

        let mut reloaded = Planner::new(&storage, &clock);
        reloaded.load_all();
        let profile = reloaded.profile();
        assert!(!profile.preferences.notifications);
        assert!(profile.preferences.work_life_separation);
        assert!(profile.preferences.auto_save);
        assert!(profile.notification_mute_preferences.after_work);
        assert!(!profile.notification_mute_preferences.during_work);
    }

    #[test]
    fn completed_today_is_newest_first() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);

        let early = planner.add_task(TimeBlock::Morning, "Early", None, None);
        let late = planner.add_task(TimeBlock::Evening, "Late", None, None);
        planner.add_task(TimeBlock::Afternoon, "Open", None, None);

        planner.toggle_task_complete(TimeBlock::Morning, early);
        clock.advance(SignedDuration::from_mins(30));
        planner.toggle_task_complete(TimeBlock::Evening, late);

        let done: Vec<_> = planner
            .completed_today()
            .into_iter()
            .map(|(block, task)| (block, task.text.as_str()))
            .collect();
        assert_eq!(done, [(TimeBlock::Evening, "Late"), (TimeBlock::Morning, "Early")]);
    }

    #[test]
    fn custom_categories_round_trip() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(friday_at(8, 0));
        let mut planner = onboarded(&storage, &clock);

        let category = planner
            .add_category(CreateCategoryParameters {
                name: "Side Hustle".to_string(),
                color: "#ff0000".to_string(),
                icon: "rocket".to_string(),
            })
            .unwrap();
        assert_eq!(category.id, "side-hustle");

        assert!(matches!(
            planner.remove_category("nope"),
            Err(CategoryError::NotFound(_))
        ));
        planner.remove_category("side-hustle").unwrap();
        assert!(planner.profile().custom_categories.is_empty());
    }
}
