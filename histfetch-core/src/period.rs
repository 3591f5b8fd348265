//! Year/month periods and the month-by-month range enumerator.
//!
//! A period is the unit of archive data on HistData: one symbol, one
//! calendar month. Ranges are inclusive on both ends and truncated to month
//! granularity, so any day inside a month selects the whole month.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One (year, month) unit of archive data.
///
/// Ordering is chronological: field order (year, then month) drives the
/// derived `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// Build a period, returning `None` if `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The period containing a date.
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following month, rolling December over into January.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding month, rolling January back into December.
    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Months since year 0; consecutive periods differ by exactly one.
    pub fn index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Lazy, inclusive, chronological sequence of periods.
///
/// Cloning the range restarts it from the original start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthRange {
    next: Period,
    last: Period,
}

impl MonthRange {
    pub fn new(first: Period, last: Period) -> Self {
        Self { next: first, last }
    }
}

/// Every month from `start` through `end`, inclusive.
///
/// Empty only when `start` falls in a later month than `end`.
pub fn month_range<S: Datelike, E: Datelike>(start: &S, end: &E) -> MonthRange {
    MonthRange::new(Period::of(start), Period::of(end))
}

impl Iterator for MonthRange {
    type Item = Period;

    fn next(&mut self) -> Option<Period> {
        if self.next > self.last {
            return None;
        }
        let current = self.next;
        self.next = current.next();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.last.index() - self.next.index() + 1).max(0) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MonthRange {}

impl std::iter::FusedIterator for MonthRange {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_month() {
        let periods: Vec<_> = month_range(&date(2021, 5, 10), &date(2021, 5, 20)).collect();
        assert_eq!(periods, vec![Period { year: 2021, month: 5 }]);
    }

    #[test]
    fn crosses_year_boundary() {
        let periods: Vec<_> = month_range(&date(2021, 12, 15), &date(2022, 1, 5)).collect();
        assert_eq!(
            periods,
            vec![
                Period { year: 2021, month: 12 },
                Period { year: 2022, month: 1 },
            ]
        );
    }

    #[test]
    fn end_before_start_is_empty() {
        let mut range = month_range(&date(2022, 3, 1), &date(2022, 2, 28));
        assert_eq!(range.len(), 0);
        assert_eq!(range.next(), None);
    }

    #[test]
    fn same_month_reversed_days_still_yields_one() {
        // Truncation happens before comparison.
        let periods: Vec<_> = month_range(&date(2020, 4, 30), &date(2020, 4, 1)).collect();
        assert_eq!(periods.len(), 1);
    }

    #[test]
    fn clone_restarts() {
        let range = month_range(&date(2020, 11, 1), &date(2021, 2, 1));
        let first: Vec<_> = range.clone().collect();
        let second: Vec<_> = range.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn next_and_prev_roll_over() {
        let dec = Period::new(2019, 12).unwrap();
        assert_eq!(dec.next(), Period::new(2020, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
    }

    #[test]
    fn rejects_invalid_month() {
        assert!(Period::new(2020, 0).is_none());
        assert!(Period::new(2020, 13).is_none());
    }

    #[test]
    fn displays_zero_padded() {
        assert_eq!(Period::new(2020, 4).unwrap().to_string(), "2020-04");
    }
}
