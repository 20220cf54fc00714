use jiff::civil::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkSchedule {
    pub enabled: bool,
    /// IANA zone name recorded at setup. Windows are read in device-local time.
    pub timezone: String,
    pub days: WorkDays,
}

impl Default for WorkSchedule {
    fn default() -> Self {
        Self {
            enabled: false,
            timezone: jiff::tz::TimeZone::system()
                .iana_name()
                .unwrap_or("UTC")
                .to_string(),
            days: WorkDays::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkDay {
    pub enabled: bool,
    /// Window start, `HH:MM`, inclusive
    pub start: String,
    /// Window end, `HH:MM`, exclusive
    pub end: String,
}

impl Default for WorkDay {
    fn default() -> Self {
        Self {
            enabled: false,
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct WorkDays {
    pub monday: WorkDay,
    pub tuesday: WorkDay,
    pub wednesday: WorkDay,
    pub thursday: WorkDay,
    pub friday: WorkDay,
    pub saturday: WorkDay,
    pub sunday: WorkDay,
}

impl WorkDays {
    pub fn day(&self, weekday: Weekday) -> &WorkDay {
        match weekday {
            Weekday::Monday => &self.monday,
            Weekday::Tuesday => &self.tuesday,
            Weekday::Wednesday => &self.wednesday,
            Weekday::Thursday => &self.thursday,
            Weekday::Friday => &self.friday,
            Weekday::Saturday => &self.saturday,
            Weekday::Sunday => &self.sunday,
        }
    }

    pub fn day_mut(&mut self, weekday: Weekday) -> &mut WorkDay {
        match weekday {
            Weekday::Monday => &mut self.monday,
            Weekday::Tuesday => &mut self.tuesday,
            Weekday::Wednesday => &mut self.wednesday,
            Weekday::Thursday => &mut self.thursday,
            Weekday::Friday => &mut self.friday,
            Weekday::Saturday => &mut self.saturday,
            Weekday::Sunday => &mut self.sunday,
        }
    }
}

/// Parses `HH:MM` into minutes since midnight
pub fn parse_hhmm(value: &str) -> Option<i32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours: i32 = hours.trim().parse().ok()?;
    let minutes: i32 = minutes.trim().parse().ok()?;
    if !(0..=24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Parses a weekday name or its three-letter abbreviation
pub fn parse_weekday(value: &str) -> Option<Weekday> {
    let weekday = match value.trim().to_lowercase().as_str() {
        "mon" | "monday" => Weekday::Monday,
        "tue" | "tuesday" => Weekday::Tuesday,
        "wed" | "wednesday" => Weekday::Wednesday,
        "thu" | "thursday" => Weekday::Thursday,
        "fri" | "friday" => Weekday::Friday,
        "sat" | "saturday" => Weekday::Saturday,
        "sun" | "sunday" => Weekday::Sunday,
        _ => return None,
    };
    Some(weekday)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_times() {
        assert_eq!(parse_hhmm("09:00"), Some(540));
        assert_eq!(parse_hhmm("17:30"), Some(1050));
        assert_eq!(parse_hhmm("0:05"), Some(5));
    }

    #[test]
    fn rejects_malformed_times() {
        assert_eq!(parse_hhmm("9am"), None);
        assert_eq!(parse_hhmm("09:xx"), None);
        assert_eq!(parse_hhmm("09:75"), None);
        assert_eq!(parse_hhmm(""), None);
    }

    #[test]
    fn weekday_names() {
        assert_eq!(parse_weekday("Monday"), Some(Weekday::Monday));
        assert_eq!(parse_weekday("sun"), Some(Weekday::Sunday));
        assert_eq!(parse_weekday("xy"), None);
    }

    #[test]
    fn weekday_prefixed_words_are_rejected() {
        assert_eq!(parse_weekday("monkey"), None);
        assert_eq!(parse_weekday("thursdayish"), None);
        assert_eq!(parse_weekday(" WED "), Some(Weekday::Wednesday));
    }

    #[test]
    fn defaults_match_office_hours() {
        let days = WorkDays::default();
        let friday = days.day(Weekday::Friday);
        assert!(!friday.enabled);
        assert_eq!(friday.start, "09:00");
        assert_eq!(friday.end, "17:00");
    }
}
