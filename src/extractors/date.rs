// src/extractors/date.rs
use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

// Weekday abbreviations as whole words, e.g. the "Sat" in "31 Jan, Sat"
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:mon|tue|wed|thu|fri|sat|sun)\b")
        .expect("Failed to compile WEEKDAY_RE")
});

/// Parses a sheet date label such as "31 Jan, Sat" or "Fri 07 Feb" into a date in `reference_year`.
///
/// Anything that is not a "day month" pair after removing the weekday yields `None`;
/// the caller treats such cells as continuation columns, never as errors.
pub fn parse_date_token(text: &str, reference_year: i32) -> Option<NaiveDate> {
    let stripped = WEEKDAY_RE.replace_all(text, "");
    let cleaned = stripped
        .trim()
        .trim_matches(|c: char| c == ',' || c == '.' || c.is_whitespace());

    if cleaned.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(&format!("{} {}", cleaned, reference_year), "%d %b %Y").ok()
}

/// Inclusive day-offset range around "today" that decides which date columns survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub days_before: i64,
    pub days_after: i64,
}

impl Default for DateWindow {
    /// Two days back through ten days ahead.
    fn default() -> Self {
        Self { days_before: 2, days_after: 10 }
    }
}

impl DateWindow {
    pub fn new(days_before: i64, days_after: i64) -> Self {
        Self { days_before, days_after }
    }

    /// True iff `date - today` lies in `[-days_before, +days_after]`.
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        let delta = date.signed_duration_since(today);
        delta >= Duration::days(-self.days_before) && delta <= Duration::days(self.days_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_trailing_weekday() {
        assert_eq!(parse_date_token("31 Jan, Sat", 2026), Some(ymd(2026, 1, 31)));
        assert_eq!(parse_date_token("07 Feb, fri", 2026), Some(ymd(2026, 2, 7)));
    }

    #[test]
    fn test_parse_leading_weekday_and_bare_date() {
        assert_eq!(parse_date_token("Sat, 31 Jan", 2026), Some(ymd(2026, 1, 31)));
        assert_eq!(parse_date_token("  5 Mar  ", 2026), Some(ymd(2026, 3, 5)));
    }

    #[test]
    fn test_not_a_date() {
        assert_eq!(parse_date_token("", 2026), None);
        assert_eq!(parse_date_token("Sat", 2026), None);
        assert_eq!(parse_date_token("9:00 AM", 2026), None);
        assert_eq!(parse_date_token("Room 1", 2026), None);
        assert_eq!(parse_date_token("32 Jan", 2026), None);
        // No such day outside leap years
        assert_eq!(parse_date_token("29 Feb, Sun", 2026), None);
        assert_eq!(parse_date_token("29 Feb", 2028), Some(ymd(2028, 2, 29)));
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let today = ymd(2026, 10, 19);
        let window = DateWindow::default();
        assert!(window.contains(today, today));
        assert!(window.contains(today + Duration::days(10), today));
        assert!(!window.contains(today + Duration::days(11), today));
        assert!(window.contains(today - Duration::days(2), today));
        assert!(!window.contains(today - Duration::days(3), today));
    }

    #[test]
    fn test_custom_window() {
        let today = ymd(2026, 10, 19);
        let window = DateWindow::new(0, 1);
        assert!(!window.contains(today - Duration::days(1), today));
        assert!(window.contains(today + Duration::days(1), today));
        assert!(!window.contains(today + Duration::days(2), today));
    }
}
