use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// First of `as_of`'s month through `as_of`, inclusive.
    pub fn month_to_date(as_of: NaiveDate) -> Self {
        let first = as_of - Days::new(u64::from(as_of.day0()));
        DateRange::new(first, as_of)
    }
}

/// A Monday..=Sunday ISO week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for WeekRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week of {}", self.start)
    }
}

impl WeekRange {
    pub fn containing(date: NaiveDate) -> Self {
        let monday = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
        WeekRange {
            start: monday,
            end: monday + Days::new(6),
        }
    }

    pub fn previous(self) -> Self {
        WeekRange::containing(self.start - Days::new(7))
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        self.as_range().contains(date)
    }

    pub fn as_range(self) -> DateRange {
        DateRange::new(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_range_contains() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31));
        assert!(range.contains(date(2024, 6, 15)));
        assert!(range.contains(date(2024, 1, 1))); // inclusive start
        assert!(range.contains(date(2024, 12, 31))); // inclusive end
        assert!(!range.contains(date(2023, 12, 31)));
        assert!(!range.contains(date(2025, 1, 1)));
    }

    #[test]
    fn date_range_display() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31));
        assert_eq!(range.to_string(), "2024-01-01 to 2024-12-31");
    }

    #[test]
    fn month_to_date_starts_on_the_first() {
        let range = DateRange::month_to_date(date(2026, 10, 17));
        assert_eq!(range.start, date(2026, 10, 1));
        assert_eq!(range.end, date(2026, 10, 17));

        let first = DateRange::month_to_date(date(2026, 3, 1));
        assert_eq!(first.start, first.end);
    }

    #[test]
    fn week_containing_midweek_date() {
        // 2026-10-17 is a Saturday.
        let week = WeekRange::containing(date(2026, 10, 17));
        assert_eq!(week.start, date(2026, 10, 12));
        assert_eq!(week.end, date(2026, 10, 18));
    }

    #[test]
    fn week_containing_monday_and_sunday() {
        let monday = WeekRange::containing(date(2026, 10, 12));
        let sunday = WeekRange::containing(date(2026, 10, 18));
        assert_eq!(monday, sunday);
    }

    #[test]
    fn week_spanning_year_end() {
        let week = WeekRange::containing(date(2027, 1, 1));
        assert_eq!(week.start, date(2026, 12, 28));
        assert_eq!(week.end, date(2027, 1, 3));
        assert!(week.contains(date(2026, 12, 31)));
    }

    #[test]
    fn previous_week() {
        let week = WeekRange::containing(date(2026, 10, 17));
        let prev = week.previous();
        assert_eq!(prev.start, date(2026, 10, 5));
        assert_eq!(prev.end, date(2026, 10, 11));
    }
}
