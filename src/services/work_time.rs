use std::fmt;

use jiff::Zoned;
use thiserror::Error;

use crate::models::schedule::{WorkDay, WorkSchedule, parse_hhmm};

/// Whether now falls inside today's work window
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkTimeStatus {
    pub is_work_time: bool,
    /// Minutes until the window closes, only set during work time
    pub remaining_minutes: Option<u32>,
}

impl WorkTimeStatus {
    pub fn remaining(&self) -> Option<Remaining> {
        self.remaining_minutes.map(Remaining)
    }
}

/// Minutes left in the window, displayed as `3h 15m`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Remaining(pub u32);

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.0 / 60, self.0 % 60)
    }
}

/// Evaluates the schedule against a local wall-clock instant.
/// Windows are start-inclusive, end-exclusive and never span midnight.
/// Unparseable window times count as outside work.
pub fn evaluate(schedule: &WorkSchedule, now: &Zoned) -> WorkTimeStatus {
    if !schedule.enabled {
        return WorkTimeStatus::default();
    }

    let day = schedule.days.day(now.weekday());
    if !day.enabled {
        return WorkTimeStatus::default();
    }

    let current = i32::from(now.hour()) * 60 + i32::from(now.minute());
    let (Some(start), Some(end)) = (parse_hhmm(&day.start), parse_hhmm(&day.end)) else {
        tracing::warn!(start = %day.start, end = %day.end, "ignoring malformed work window");
        return WorkTimeStatus::default();
    };

    if start <= current && current < end {
        WorkTimeStatus {
            is_work_time: true,
            remaining_minutes: u32::try_from(end - current).ok(),
        }
    } else {
        WorkTimeStatus::default()
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Work window must end after it starts ({start} - {end})")]
    EmptyWindow { start: String, end: String },

    #[error("Unknown weekday '{0}'")]
    UnknownWeekday(String),
}

/// Builds a validated enabled work day from `HH:MM` strings
pub fn work_day(start: &str, end: &str) -> Result<WorkDay, ScheduleError> {
    let start_minutes =
        parse_hhmm(start).ok_or_else(|| ScheduleError::InvalidTime(start.to_string()))?;
    let end_minutes = parse_hhmm(end).ok_or_else(|| ScheduleError::InvalidTime(end.to_string()))?;
    if end_minutes <= start_minutes {
        return Err(ScheduleError::EmptyWindow {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(WorkDay {
        enabled: true,
        start: start.trim().to_string(),
        end: end.trim().to_string(),
    })
}
