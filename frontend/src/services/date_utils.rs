use chrono::{Datelike, Local, Months, NaiveDate};
use shared::{parse_iso_date, DateRange};
use std::fmt;
use thiserror::Error;

/// Single-letter weekday header, Sunday first
pub const WEEKDAY_HEADER: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Invalid month: {0}. Must be between 0 and 11")]
    InvalidMonth(u32),
    #[error("Year out of range: {0}")]
    YearOutOfRange(i32),
    #[error("Invalid date string: {0}. Expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// A calendar month addressed by year and zero-based month (0 = January)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthRef {
    first: NaiveDate,
}

impl MonthRef {
    pub fn new(year: i32, month0: u32) -> Result<Self, DateError> {
        if month0 > 11 {
            return Err(DateError::InvalidMonth(month0));
        }
        NaiveDate::from_ymd_opt(year, month0 + 1, 1)
            .map(|first| Self { first })
            .ok_or(DateError::YearOutOfRange(year))
    }

    /// The month a given date falls in
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// The month of today's local date
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month0(&self) -> u32 {
        self.first.month0()
    }

    /// Move by `delta` months, wrapping across year boundaries.
    /// Saturates at the edge of the supported date range.
    pub fn shift(&self, delta: i32) -> Self {
        let months = Months::new(delta.unsigned_abs());
        let shifted = if delta >= 0 {
            self.first.checked_add_months(months)
        } else {
            self.first.checked_sub_months(months)
        };
        shifted.map(|first| Self { first }).unwrap_or(*self)
    }

    pub fn days_in_month(&self) -> u32 {
        match self.first.checked_add_months(Months::new(1)) {
            Some(next) => (next - self.first).num_days() as u32,
            None => 31,
        }
    }

    /// Weekday of day 1 (0 = Sunday .. 6 = Saturday)
    pub fn first_weekday(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    pub fn date_str(&self, day: u32) -> String {
        format_date_str(self.year(), self.month0(), day)
    }

    /// Inclusive `[first-of-month, last-of-month]` as ISO strings
    pub fn range(&self) -> DateRange {
        DateRange::new(self.date_str(1), self.date_str(self.days_in_month()))
    }

    pub fn contains(&self, date: &str) -> bool {
        self.range().contains(date)
    }

    /// e.g. "February 2024"
    pub fn label(&self) -> String {
        format!("{} {}", month_name(self.month0()), self.year())
    }
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Zero-padded `YYYY-MM-DD` from a zero-based month
pub fn format_date_str(year: i32, month0: u32, day: u32) -> String {
    format!("{:04}-{:02}-{:02}", year, month0 + 1, day)
}

/// Validate a canonical date key
pub fn parse_date_str(date_str: &str) -> Result<NaiveDate, DateError> {
    parse_iso_date(date_str).ok_or_else(|| DateError::InvalidDate(date_str.to_string()))
}

pub fn month_name(month0: u32) -> &'static str {
    MONTH_NAMES.get(month0 as usize).copied().unwrap_or("Invalid Month")
}
