//! Calendar helpers for backfill ranges: inclusive day spans, month bounds,
//! and month iteration for multi-period jobs.

use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use thiserror::Error;

/// A calendar month, parseable from `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Error)]
pub enum ParseMonthError {
    #[error("expected YYYY-MM, got \"{0}\"")]
    Format(String),

    #[error("month out of range in \"{0}\"")]
    OutOfRange(String),
}

impl Month {
    /// First and last day of the month, or `None` if the month is not a
    /// valid calendar month.
    #[must_use]
    pub fn bounds(self) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let end = start
            .checked_add_months(Months::new(1))?
            .checked_sub_days(Days::new(1))?;
        Some((start, end))
    }

    /// The following calendar month.
    #[must_use]
    pub fn next(self) -> Month {
        if self.month == 12 {
            Month {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Month {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| ParseMonthError::Format(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| ParseMonthError::Format(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| ParseMonthError::Format(s.to_string()))?;
        if !(1..=12).contains(&month) {
            return Err(ParseMonthError::OutOfRange(s.to_string()));
        }
        Ok(Month { year, month })
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Every month from `from` through `to`, inclusive. Empty if `from > to`.
#[must_use]
pub fn months_between(from: Month, to: Month) -> Vec<Month> {
    let mut months = Vec::new();
    let mut cur = from;
    while cur <= to {
        months.push(cur);
        cur = cur.next();
    }
    months
}

/// Every day from `start` through `end`, inclusive, in order. Empty if
/// `start > end`.
#[must_use]
pub fn date_span(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut cur = start;
    while cur <= end {
        days.push(cur);
        match cur.succ_opt() {
            Some(next) => cur = next,
            None => break,
        }
    }
    days
}
