use chrono::{DateTime, Datelike, Days, Duration, TimeZone, Weekday};
use thiserror::Error;

/// Days of the week a confirmation deadline is allowed to land on.
///
/// Deadlines falling outside this set are pushed to the next working day so
/// that no reservation silently expires while nobody is around to react.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDays(Vec<Weekday>);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkingDaysError {
    /// An empty set would make the deadline adjustment loop forever.
    #[error("working day set must not be empty")]
    Empty,

    #[error("unknown weekday name: {0}")]
    UnknownDay(String),
}

impl WorkingDays {
    pub fn new(days: Vec<Weekday>) -> Result<Self, WorkingDaysError> {
        if days.is_empty() {
            return Err(WorkingDaysError::Empty);
        }
        Ok(Self(days))
    }

    pub fn monday_to_friday() -> Self {
        Self(vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ])
    }

    /// Parse configuration values like "mon" or "Monday"
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, WorkingDaysError> {
        let mut days = Vec::with_capacity(names.len());
        for name in names {
            let day = name
                .as_ref()
                .parse::<Weekday>()
                .map_err(|_| WorkingDaysError::UnknownDay(name.as_ref().to_string()))?;
            if !days.contains(&day) {
                days.push(day);
            }
        }
        Self::new(days)
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }
}

impl Default for WorkingDays {
    fn default() -> Self {
        Self::monday_to_friday()
    }
}

/// Compute the confirmation deadline for one distribution run.
///
/// Adds `timeout_hours` to `now` (already in the event's own timezone), then
/// advances day by day until the deadline lands on a working day, keeping the
/// local time of day. Pure: identical inputs give identical deadlines.
pub fn reservation_deadline<Tz: TimeZone>(
    now: DateTime<Tz>,
    timeout_hours: i64,
    working_days: &WorkingDays,
) -> DateTime<Tz> {
    let mut deadline = now + Duration::hours(timeout_hours);
    while !working_days.contains(deadline.weekday()) {
        // checked_add_days keeps the local time of day; the Duration fallback
        // only fires on calendar edge cases like a DST gap at that exact time
        deadline = match deadline.clone().checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => deadline + Duration::days(1),
        };
    }
    deadline
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::Europe::Zurich;

    // 2026-08-04 is a Tuesday
    fn tuesday_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 4, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_deadline_on_working_day_is_unshifted() {
        let deadline = reservation_deadline(tuesday_morning(), 4, &WorkingDays::default());
        assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 8, 4, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_deadline_landing_on_saturday_moves_to_monday() {
        // Friday 23:00 + 4h = Saturday 03:00 -> Monday 03:00
        let friday_night = Utc.with_ymd_and_hms(2026, 8, 7, 23, 0, 0).unwrap();
        let deadline = reservation_deadline(friday_night, 4, &WorkingDays::default());
        assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 8, 10, 3, 0, 0).unwrap());
        assert_eq!(deadline.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_deadline_landing_on_sunday_moves_to_monday() {
        let saturday = Utc.with_ymd_and_hms(2026, 8, 8, 22, 0, 0).unwrap();
        let deadline = reservation_deadline(saturday, 4, &WorkingDays::default());
        assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 8, 10, 2, 0, 0).unwrap());
    }

    #[test]
    fn test_custom_working_days_keep_saturday() {
        let working = WorkingDays::parse(&["mon", "tue", "wed", "thu", "fri", "sat"]).unwrap();
        let friday_night = Utc.with_ymd_and_hms(2026, 8, 7, 23, 0, 0).unwrap();
        let deadline = reservation_deadline(friday_night, 4, &working);
        // Saturday 03:00 is now acceptable
        assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 8, 8, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_deadline_in_event_timezone_keeps_local_time() {
        let friday_night = Zurich.with_ymd_and_hms(2026, 8, 7, 22, 30, 0).unwrap();
        let deadline = reservation_deadline(friday_night, 4, &WorkingDays::default());
        assert_eq!(deadline, Zurich.with_ymd_and_hms(2026, 8, 10, 2, 30, 0).unwrap());
    }

    #[test]
    fn test_deadline_is_idempotent_for_identical_inputs() {
        let working = WorkingDays::default();
        let a = reservation_deadline(tuesday_morning(), 48, &working);
        let b = reservation_deadline(tuesday_morning(), 48, &working);
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_rejects_empty_set() {
        let names: [&str; 0] = [];
        assert_eq!(WorkingDays::parse(&names), Err(WorkingDaysError::Empty));
    }

    #[test]
    fn test_parse_rejects_unknown_day() {
        assert_eq!(
            WorkingDays::parse(&["mon", "noday"]),
            Err(WorkingDaysError::UnknownDay("noday".to_string()))
        );
    }

    #[test]
    fn test_parse_accepts_full_names_and_dedups() {
        let working = WorkingDays::parse(&["Monday", "monday", "fri"]).unwrap();
        assert!(working.contains(Weekday::Mon));
        assert!(working.contains(Weekday::Fri));
        assert!(!working.contains(Weekday::Wed));
    }
}
