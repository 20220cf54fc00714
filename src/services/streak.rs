use jiff::civil::Date;

use crate::clock::date_key;
use crate::models::{collection::TaskCollection, streak::StreakData};

/// Number of tasks completed on `today_key` across all blocks
pub fn completed_on(tasks: &TaskCollection, today_key: &str) -> u32 {
    let count = tasks
        .iter()
        .filter(|(_, task)| task.completed)
        .filter(|(_, task)| {
            task.completed_at
                .is_some_and(|at| date_key(at.to_zoned(jiff::tz::TimeZone::UTC).date()) == today_key)
        })
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Next streak state after a completion on `today`, or `None` when nothing
/// was completed today.
pub fn record_completion(
    streak: &StreakData,
    tasks: &TaskCollection,
    today: Date,
) -> Option<StreakData> {
    let today_key = date_key(today);
    let completed_today = completed_on(tasks, &today_key);
    if completed_today == 0 {
        return None;
    }

    let yesterday_key = today.yesterday().ok().map(date_key);
    let new_streak = match streak.last_completion_date.as_deref() {
        None => 1,
        Some(last) if last == today_key => streak.current_streak,
        Some(last) if Some(last) == yesterday_key.as_deref() => streak.current_streak + 1,
        Some(_) => 1,
    };

    let mut next = streak.clone();
    next.current_streak = new_streak;
    next.longest_streak = streak.longest_streak.max(new_streak);
    next.completion_history.insert(today_key.clone(), completed_today);
    next.last_completion_date = Some(today_key);
    Some(next)
}
