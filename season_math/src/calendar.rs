//! Month-granularity date helpers
//!
//! Every series in the pipeline is keyed by the first day of a month, so
//! these helpers normalise dates to month starts and step through months
//! with the "start of month" frequency.

use crate::{MathError, Result};
use chrono::{Datelike, Months, NaiveDate};

/// Number of calendar months in a year
pub const MONTHS_PER_YEAR: u32 = 12;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Check that a month number lies in 1..=12
pub fn validate_month(month: u32) -> Result<u32> {
    if (1..=MONTHS_PER_YEAR).contains(&month) {
        Ok(month)
    } else {
        Err(MathError::InvalidInput(format!(
            "Month must be between 1 and 12, got {}",
            month
        )))
    }
}

/// Truncate a date to the first day of its month
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month
    date.with_day(1).unwrap_or(date)
}

/// Move `months` month starts forward from the month containing `date`
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    first_of_month(date)
        .checked_add_months(Months::new(months))
        .ok_or_else(|| {
            MathError::InvalidInput(format!(
                "Date {} plus {} months is out of range",
                date, months
            ))
        })
}

/// Short English label for a month number, e.g. `11` -> `"Nov"`
///
/// Out-of-range months fall back to their number.
pub fn month_label(month: u32) -> String {
    match validate_month(month) {
        Ok(m) => MONTH_LABELS[(m - 1) as usize].to_string(),
        Err(_) => month.to_string(),
    }
}

/// Zero-based index of a month, for month-keyed arrays
pub fn month_index(date: NaiveDate) -> usize {
    date.month0() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_of_month() {
        assert_eq!(first_of_month(ymd(2024, 11, 15)), ymd(2024, 11, 1));
        assert_eq!(first_of_month(ymd(2024, 2, 1)), ymd(2024, 2, 1));
    }

    #[test]
    fn test_add_months_crosses_year() {
        assert_eq!(add_months(ymd(2024, 11, 20), 3).unwrap(), ymd(2025, 2, 1));
        assert_eq!(add_months(ymd(2024, 4, 1), 0).unwrap(), ymd(2024, 4, 1));
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(11), "Nov");
        assert_eq!(month_label(1), "Jan");
        assert_eq!(month_label(13), "13");
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month(0).is_err());
        assert_eq!(validate_month(12).unwrap(), 12);
    }
}
