pub mod categories;
pub mod focus;
pub mod recurrence;
pub mod streak;
pub mod suggestions;
pub mod work_time;
