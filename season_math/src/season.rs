//! Ski-season labelling
//!
//! A ski season runs from the season start month (November by default) of
//! year `Y` through the spring of year `Y + 1` and is labelled `"Y-(Y+1)"`.

use crate::calendar::{validate_month, MONTHS_PER_YEAR};
use crate::{MathError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Month in which a new ski season begins
pub const DEFAULT_SEASON_START_MONTH: u32 = 11;

/// Winter months compared across seasons, in season order
pub const DEFAULT_WINTER_MONTHS: [u32; 6] = [11, 12, 1, 2, 3, 4];

/// Number of seasons kept for comparison: ten past seasons plus the forecast one
pub const DEFAULT_SEASON_WINDOW: usize = 11;

/// Label of a ski season, identified by the year it starts in.
///
/// Ordering follows the start year, so sorting labels is chronological
/// regardless of how the text form would sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SeasonLabel {
    start_year: i32,
}

impl SeasonLabel {
    /// Create the label for the season starting in `start_year`
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    /// Year in which the season starts
    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Year in which the season ends
    pub fn end_year(&self) -> i32 {
        self.start_year + 1
    }
}

impl fmt::Display for SeasonLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year())
    }
}

impl FromStr for SeasonLabel {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MathError::InvalidInput(format!("Invalid season label: '{}'", s));

        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start: i32 = start.parse().map_err(|_| invalid())?;
        let end: i32 = end.parse().map_err(|_| invalid())?;
        if end != start + 1 {
            return Err(invalid());
        }

        Ok(Self::new(start))
    }
}

impl From<SeasonLabel> for String {
    fn from(label: SeasonLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for SeasonLabel {
    type Error = MathError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Assigns dates to ski seasons and orders months within a season
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonCalendar {
    start_month: u32,
}

impl Default for SeasonCalendar {
    fn default() -> Self {
        Self {
            start_month: DEFAULT_SEASON_START_MONTH,
        }
    }
}

impl SeasonCalendar {
    /// Create a calendar whose seasons begin in `start_month`
    pub fn new(start_month: u32) -> Result<Self> {
        Ok(Self {
            start_month: validate_month(start_month)?,
        })
    }

    /// Month in which each season begins
    pub fn start_month(&self) -> u32 {
        self.start_month
    }

    /// Season containing `date`.
    ///
    /// Months at or after the start month belong to the season starting that
    /// year; earlier months belong to the season that started the year before.
    pub fn season_of(&self, date: NaiveDate) -> SeasonLabel {
        if date.month() >= self.start_month {
            SeasonLabel::new(date.year())
        } else {
            SeasonLabel::new(date.year() - 1)
        }
    }

    /// Zero-based position of a month within the season
    pub fn position_in_season(&self, month: u32) -> u32 {
        (month + MONTHS_PER_YEAR - self.start_month) % MONTHS_PER_YEAR
    }

    /// Distinct months ordered as they occur in a season.
    ///
    /// With the default calendar `[1, 12, 11]` becomes `[11, 12, 1]`;
    /// numeric order would put January first.
    pub fn order_months(&self, months: &[u32]) -> Result<Vec<u32>> {
        let mut distinct = BTreeSet::new();
        for &month in months {
            distinct.insert(validate_month(month)?);
        }

        let mut ordered: Vec<u32> = distinct.into_iter().collect();
        ordered.sort_by_key(|&m| self.position_in_season(m));
        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_season_of_default_calendar() {
        let calendar = SeasonCalendar::default();
        assert_eq!(calendar.season_of(ymd(2024, 11, 15)).to_string(), "2024-2025");
        assert_eq!(calendar.season_of(ymd(2024, 12, 1)).to_string(), "2024-2025");
        assert_eq!(calendar.season_of(ymd(2025, 3, 1)).to_string(), "2024-2025");
        assert_eq!(calendar.season_of(ymd(2025, 10, 1)).to_string(), "2024-2025");
    }

    #[test]
    fn test_labels_sort_chronologically() {
        let mut labels = vec![SeasonLabel::new(2020), SeasonLabel::new(999), SeasonLabel::new(2015)];
        labels.sort();
        assert_eq!(labels, vec![SeasonLabel::new(999), SeasonLabel::new(2015), SeasonLabel::new(2020)]);
    }

    #[test]
    fn test_label_parse() {
        let label: SeasonLabel = "2015-2016".parse().unwrap();
        assert_eq!(label.start_year(), 2015);
        assert!("2015-2017".parse::<SeasonLabel>().is_err());
        assert!("winter".parse::<SeasonLabel>().is_err());
    }

    #[test]
    fn test_order_months() {
        let calendar = SeasonCalendar::default();
        assert_eq!(
            calendar.order_months(&[1, 2, 3, 4, 11, 12]).unwrap(),
            vec![11, 12, 1, 2, 3, 4]
        );
        assert_eq!(calendar.order_months(&[4, 11, 4]).unwrap(), vec![11, 4]);
        assert!(calendar.order_months(&[0]).is_err());
    }

    #[test]
    fn test_invalid_start_month() {
        assert!(SeasonCalendar::new(13).is_err());
    }
}
