use std::fmt;

use jiff::{SignedDuration, Timestamp};

/// Default focus session length
pub const DEFAULT_SESSION: SignedDuration = SignedDuration::from_mins(25);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerState {
    Idle,
    Running { since: Timestamp },
    Paused,
}

/// Pausable countdown measured against wall-clock timestamps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusTimer {
    session: SignedDuration,
    /// Time left when the timer last stopped running
    banked: SignedDuration,
    state: TimerState,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION)
    }
}

impl FocusTimer {
    pub fn new(session: SignedDuration) -> Self {
        Self {
            session,
            banked: session,
            state: TimerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn start(&mut self, now: Timestamp) {
        if !self.is_running() {
            self.state = TimerState::Running { since: now };
        }
    }

    pub fn pause(&mut self, now: Timestamp) {
        if self.is_running() {
            self.banked = self.remaining(now);
            self.state = TimerState::Paused;
        }
    }

    pub fn toggle(&mut self, now: Timestamp) {
        if self.is_running() {
            self.pause(now);
        } else {
            self.start(now);
        }
    }

    pub fn reset(&mut self) {
        self.banked = self.session;
        self.state = TimerState::Idle;
    }

    pub fn remaining(&self, now: Timestamp) -> SignedDuration {
        match self.state {
            TimerState::Running { since } => {
                let elapsed = now.duration_since(since);
                (self.banked - elapsed).max(SignedDuration::ZERO)
            }
            TimerState::Idle | TimerState::Paused => self.banked,
        }
    }

    pub fn is_finished(&self, now: Timestamp) -> bool {
        self.remaining(now).is_zero()
    }
}

/// Countdown rendered as `MM:SS`
pub struct Countdown(pub SignedDuration);

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs().max(0);
        write!(f, "{:02}:{:02}", secs / 60, secs % 60)
    }
}
