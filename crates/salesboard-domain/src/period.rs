//! Week keys, date ranges, presets, and resolved period slices.

use std::{fmt, str::FromStr};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Identifies one weekly bucket: the reporting year that owns it and its 0-based index.
pub struct WeekKey {
    pub year: i32,
    pub index: usize,
}

impl WeekKey {
    pub fn new(year: i32, index: usize) -> Self {
        Self { year, index }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.index + 1)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Inclusive calendar date range.
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if end < start {
            return Err(DateRangeError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every calendar day in the range, ascending.
    pub fn days(&self) -> Vec<NaiveDate> {
        (0..self.day_count())
            .map(|offset| self.start + Duration::days(offset))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when constructing [`DateRange`] values.
pub enum DateRangeError {
    InvalidRange,
}

impl fmt::Display for DateRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRangeError::InvalidRange => f.write_str("date range end must not precede start"),
        }
    }
}

impl std::error::Error for DateRangeError {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Named period shortcuts offered by the detail view.
pub enum Preset {
    Q1,
    Q2,
    Q3,
    Q4,
    Summer,
    Ytd,
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Preset::Q1 => "q1",
            Preset::Q2 => "q2",
            Preset::Q3 => "q3",
            Preset::Q4 => "q4",
            Preset::Summer => "summer",
            Preset::Ytd => "ytd",
        };
        f.write_str(label)
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "q1" => Ok(Preset::Q1),
            "q2" => Ok(Preset::Q2),
            "q3" => Ok(Preset::Q3),
            "q4" => Ok(Preset::Q4),
            "summer" => Ok(Preset::Summer),
            "ytd" => Ok(Preset::Ytd),
            other => Err(format!("unknown preset `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
/// What the caller asked for before resolution.
pub enum PeriodRequest {
    /// The granularity's default window.
    #[default]
    Default,
    Preset(Preset),
    Indices { start: usize, end: usize },
    Dates(DateRange),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A concrete slice of an aggregate.
pub enum ResolvedPeriod {
    /// Inclusive bucket indices into a weekly or monthly array.
    Indices { start: usize, end: usize },
    /// Every calendar day of the requested daily window.
    Days(Vec<NaiveDate>),
    /// The two adjacent years compared in the yearly view.
    Years { prior: i32, current: i32 },
}

impl ResolvedPeriod {
    pub fn len(&self) -> usize {
        match self {
            ResolvedPeriod::Indices { start, end } => end - start + 1,
            ResolvedPeriod::Days(days) => days.len(),
            ResolvedPeriod::Years { .. } => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_range_enumerates_inclusive_days() {
        let range = DateRange::new(date(2025, 12, 29), date(2026, 1, 4)).expect("valid range");
        let days = range.days();
        assert_eq!(days.len(), 7);
        assert_eq!(days.first(), Some(&date(2025, 12, 29)));
        assert_eq!(days.last(), Some(&date(2026, 1, 4)));
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        assert_eq!(
            DateRange::new(date(2025, 2, 1), date(2025, 1, 1)),
            Err(DateRangeError::InvalidRange)
        );
    }

    #[test]
    fn presets_parse_case_insensitively() {
        assert_eq!("Q3".parse::<Preset>(), Ok(Preset::Q3));
        assert_eq!("ytd".parse::<Preset>(), Ok(Preset::Ytd));
        assert!("winter".parse::<Preset>().is_err());
    }
}
