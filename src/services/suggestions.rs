use crate::models::{
    profile::AppUsageMode,
    suggestion::{SuggestedBlock, SuggestionCategory, TaskSuggestion},
    task::Energy,
};

/// Most suggestions shown at once
pub const MAX_SUGGESTIONS: usize = 4;

fn work_context() -> [TaskSuggestion; 3] {
    [
        TaskSuggestion::new(
            "Review work priorities",
            Energy::Medium,
            SuggestedBlock::Morning,
            "Focus on work tasks",
            SuggestionCategory::Work,
        ),
        TaskSuggestion::new(
            "Deep work session",
            Energy::High,
            SuggestedBlock::Afternoon,
            "Productive work time",
            SuggestionCategory::Work,
        ),
        TaskSuggestion::new(
            "Check team messages",
            Energy::Low,
            SuggestedBlock::Any,
            "Stay connected",
            SuggestionCategory::Work,
        ),
    ]
}

fn personal_context() -> [TaskSuggestion; 2] {
    [
        TaskSuggestion::new(
            "Personal project time",
            Energy::Medium,
            SuggestedBlock::Evening,
            "Your time now",
            SuggestionCategory::Personal,
        ),
        TaskSuggestion::new(
            "Self-care activity",
            Energy::Low,
            SuggestedBlock::Evening,
            "Recharge yourself",
            SuggestionCategory::Personal,
        ),
    ]
}

fn time_of_day(hour: i8) -> [TaskSuggestion; 2] {
    if hour < 10 {
        [
            TaskSuggestion::new(
                "Gentle morning routine",
                Energy::Low,
                SuggestedBlock::Morning,
                "Start your day softly",
                SuggestionCategory::Personal,
            ),
            TaskSuggestion::new(
                "Review today's priorities",
                Energy::Low,
                SuggestedBlock::Morning,
                "Set intentions",
                SuggestionCategory::Both,
            ),
        ]
    } else if hour < 15 {
        [
            TaskSuggestion::new(
                "Tackle one important project",
                Energy::High,
                SuggestedBlock::Afternoon,
                "Peak focus time",
                SuggestionCategory::Both,
            ),
            TaskSuggestion::new(
                "Creative work session",
                Energy::Medium,
                SuggestedBlock::Afternoon,
                "Good energy for creativity",
                SuggestionCategory::Both,
            ),
        ]
    } else {
        [
            TaskSuggestion::new(
                "Wrap up loose ends",
                Energy::Medium,
                SuggestedBlock::Evening,
                "Organize for tomorrow",
                SuggestionCategory::Both,
            ),
            TaskSuggestion::new(
                "Gentle wind-down",
                Energy::Low,
                SuggestedBlock::Evening,
                "Transition to rest",
                SuggestionCategory::Personal,
            ),
        ]
    }
}

fn allowed(mode: AppUsageMode, category: Option<SuggestionCategory>) -> bool {
    match mode {
        AppUsageMode::Work => matches!(
            category,
            Some(SuggestionCategory::Work | SuggestionCategory::Both)
        ),
        AppUsageMode::Personal => matches!(
            category,
            Some(SuggestionCategory::Personal | SuggestionCategory::Both)
        ),
        AppUsageMode::Both | AppUsageMode::Unset => true,
    }
}

/// Context suggestions first, then time-of-day ones, filtered by usage mode
/// and today's dismissals, capped at [`MAX_SUGGESTIONS`].
pub fn generate(
    hour: i8,
    is_work_time: bool,
    mode: AppUsageMode,
    dismissed_today: &[String],
) -> Vec<TaskSuggestion> {
    let mut suggestions = Vec::new();

    if is_work_time && mode != AppUsageMode::Personal {
        suggestions.extend(work_context());
    } else if !is_work_time && mode != AppUsageMode::Work {
        suggestions.extend(personal_context());
    }
    suggestions.extend(time_of_day(hour));

    suggestions
        .into_iter()
        .filter(|s| allowed(mode, s.category))
        .filter(|s| !dismissed_today.contains(&s.text))
        .take(MAX_SUGGESTIONS)
        .collect()
}
