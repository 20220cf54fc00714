use std::cell::RefCell;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Zoned};

/// Source of "now" for every time-dependent rule
pub trait Clock {
    fn now(&self) -> Zoned;

    /// Device-local calendar date
    fn local_date(&self) -> Date {
        self.now().date()
    }

    /// Current UTC calendar date
    fn utc_date(&self) -> Date {
        self.now().with_time_zone(TimeZone::UTC).date()
    }

    /// `YYYY-MM-DD` of the current UTC date, used to key daily history
    fn today_key(&self) -> String {
        date_key(self.utc_date())
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Zoned {
        (**self).now()
    }
}

/// Wall clock in the device time zone
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Zoned {
        Zoned::now()
    }
}

/// Clock frozen at a given instant until moved
#[derive(Debug)]
pub struct FixedClock {
    now: RefCell<Zoned>,
}

impl FixedClock {
    pub fn new(now: Zoned) -> Self {
        Self {
            now: RefCell::new(now),
        }
    }

    pub fn set(&self, now: Zoned) {
        *self.now.borrow_mut() = now;
    }

    /// Moves the clock forward; saturates instead of overflowing
    pub fn advance(&self, by: SignedDuration) {
        let mut now = self.now.borrow_mut();
        if let Ok(next) = now.checked_add(by) {
            *now = next;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Zoned {
        self.now.borrow().clone()
    }
}

pub fn date_key(date: Date) -> String {
    date.strftime("%Y-%m-%d").to_string()
}

/// Format of the stored check-in marker, e.g. `Sat Oct 17 2026`
pub fn checkin_marker(date: Date) -> String {
    date.strftime("%a %b %d %Y").to_string()
}
