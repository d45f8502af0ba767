//! Month-key handling
//!
//! A month key is a `YYYY-MM` bucket that every expense, investment, budget,
//! and report row is grouped under. It is always derived from the record's
//! timestamp, never supplied by the caller, so it cannot drift from the date.
//!
//! Window arithmetic subtracts real calendar months (rolling over year
//! boundaries) rather than approximating a month as 30 days.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of months in the analytics window.
pub const ANALYTICS_WINDOW: usize = 12;

/// A year-month bucket, e.g. "2024-03".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::Invalid(format!("Invalid month number: {}", month)));
        }
        Ok(Self { year, month })
    }

    /// Derive the month key from a record timestamp.
    pub fn from_datetime(at: &DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// The current month.
    pub fn current() -> Self {
        Self::from_datetime(&Utc::now())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The previous calendar month, rolling over year boundaries.
    pub fn pred(&self) -> Self {
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

    /// The `len` months ending at `self` inclusive, oldest first.
    ///
    /// Always returns exactly `len` entries; months before any recorded data
    /// are still present so that series built from the window keep a fixed
    /// length.
    pub fn window_ending(&self, len: usize) -> Vec<MonthKey> {
        let mut months = Vec::with_capacity(len);
        let mut current = *self;
        for _ in 0..len {
            months.push(current);
            current = current.pred();
        }
        months.reverse();
        months
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| Error::Invalid(format!("Invalid month key: {}", s)))?;
        let year: i32 = year
            .parse()
            .map_err(|_| Error::Invalid(format!("Invalid month key: {}", s)))?;
        let month: u32 = month
            .parse()
            .map_err(|_| Error::Invalid(format!("Invalid month key: {}", s)))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, String> {
        s.parse().map_err(|e: Error| e.to_string())
    }
}

impl From<MonthKey> for String {
    fn from(m: MonthKey) -> String {
        m.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_key_from_datetime() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap();
        assert_eq!(MonthKey::from_datetime(&at).to_string(), "2024-03");
    }

    #[test]
    fn test_month_key_parse_roundtrip() {
        let m: MonthKey = "2024-03".parse().unwrap();
        assert_eq!(m.year(), 2024);
        assert_eq!(m.month(), 3);
        assert_eq!(m.to_string(), "2024-03");

        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("2024".parse::<MonthKey>().is_err());
        assert!("march".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_pred_rolls_over_year() {
        let jan: MonthKey = "2024-01".parse().unwrap();
        assert_eq!(jan.pred().to_string(), "2023-12");
    }

    #[test]
    fn test_window_is_exact_length_oldest_first() {
        let m: MonthKey = "2024-03".parse().unwrap();
        let window = m.window_ending(12);
        assert_eq!(window.len(), 12);
        assert_eq!(window[0].to_string(), "2023-04");
        assert_eq!(window[11].to_string(), "2024-03");
        // strictly increasing
        for pair in window.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_ordering_sorts_chronologically() {
        let a: MonthKey = "2023-12".parse().unwrap();
        let b: MonthKey = "2024-01".parse().unwrap();
        assert!(a < b);
    }
}
