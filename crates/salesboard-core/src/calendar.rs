//! Week and month bucketing rules.
//!
//! Weeks are Monday-start and numbered by the Thursday of the week. The seven days from
//! Dec 29 through Jan 4 always form the last weekly bucket of the year in which Dec 29 falls,
//! so no day is ever counted in two years' weekly views.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use salesboard_config::{EngineConfig, YearWindow};
use salesboard_domain::{DateRange, WeekKey, CROSSOVER_WEEK_INDEX, WEEKS_PER_YEAR};

use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct CalendarModel {
    supported: YearWindow,
    week_month_map: [usize; WEEKS_PER_YEAR],
}

impl CalendarModel {
    /// Builds the model from a validated configuration.
    pub fn new(config: &EngineConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let mut week_month_map = [0usize; WEEKS_PER_YEAR];
        week_month_map.copy_from_slice(&config.week_month_map);
        Ok(Self {
            supported: config.supported_years,
            week_month_map,
        })
    }

    pub fn supported_years(&self) -> YearWindow {
        self.supported
    }

    pub fn week_month_map(&self) -> &[usize; WEEKS_PER_YEAR] {
        &self.week_month_map
    }

    /// Month a weekly bucket is attributed to when distributing monthly budgets.
    pub fn month_of_week(&self, index: usize) -> Option<usize> {
        self.week_month_map.get(index).copied()
    }

    pub fn ensure_supported(&self, date: NaiveDate) -> Result<NaiveDate, CoreError> {
        if self.supported.contains(date.year()) {
            Ok(date)
        } else {
            Err(CoreError::InvalidDate(format!(
                "{date} lies outside the supported years {}-{}",
                self.supported.first, self.supported.last
            )))
        }
    }

    /// Zero-based ISO week index, ignoring the year-boundary override.
    pub fn iso_week_index(date: NaiveDate) -> usize {
        let thursday = thursday_of(date);
        let year_start = NaiveDate::from_ymd_opt(thursday.year(), 1, 1).unwrap_or(thursday);
        let days = (thursday - year_start).num_days().max(0) as usize;
        days / 7
    }

    /// Weekly bucket a date belongs to, with the Dec 29 - Jan 4 override applied.
    pub fn week_of(&self, date: NaiveDate) -> Result<WeekKey, CoreError> {
        self.ensure_supported(date)?;
        if is_crossover_tail(date) {
            return Ok(WeekKey::new(date.year(), CROSSOVER_WEEK_INDEX));
        }
        if is_crossover_head(date) {
            return Ok(WeekKey::new(date.year() - 1, CROSSOVER_WEEK_INDEX));
        }
        let index = Self::iso_week_index(date).min(CROSSOVER_WEEK_INDEX);
        Ok(WeekKey::new(date.year(), index))
    }

    /// Week index of `date` within `year`'s weekly view, or `None` if it belongs to another year.
    pub fn week_index_in(&self, date: NaiveDate, year: i32) -> Result<Option<usize>, CoreError> {
        let key = self.week_of(date)?;
        Ok((key.year == year).then_some(key.index))
    }

    /// Calendar month index of `date` within `year`, or `None` for other years.
    pub fn month_index_in(&self, date: NaiveDate, year: i32) -> Result<Option<usize>, CoreError> {
        self.ensure_supported(date)?;
        Ok((date.year() == year).then(|| date.month0() as usize))
    }

    /// First and last day attributed to a weekly bucket. `None` when no day maps to it.
    pub fn week_bounds(&self, year: i32, index: usize) -> Option<DateRange> {
        if index >= WEEKS_PER_YEAR {
            return None;
        }
        let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let last = NaiveDate::from_ymd_opt(year + 1, 1, 4)?;
        let target = WeekKey::new(year, index);

        let mut start = None;
        let mut end = None;
        for day in first.iter_days().take_while(|day| *day <= last) {
            if self.week_of(day).ok() == Some(target) {
                start.get_or_insert(day);
                end = Some(day);
            }
        }
        DateRange::new(start?, end?).ok()
    }

    /// `dd/mm-dd/mm` label for a weekly bucket.
    pub fn week_label(&self, year: i32, index: usize) -> String {
        match self.week_bounds(year, index) {
            Some(range) => format!(
                "{}-{}",
                range.start.format("%d/%m"),
                range.end.format("%d/%m")
            ),
            None => format!("W{:02}", index + 1),
        }
    }

    pub fn week_labels(&self, year: i32) -> Vec<String> {
        (0..WEEKS_PER_YEAR)
            .map(|index| self.week_label(year, index))
            .collect()
    }

    /// Days that make up the year-boundary bucket of `year`: Dec 29 through Jan 4.
    pub fn crossover_window(&self, year: i32) -> Result<DateRange, CoreError> {
        let start = NaiveDate::from_ymd_opt(year, 12, 29)
            .ok_or_else(|| CoreError::InvalidDate(format!("{year}-12-29")))?;
        let end = NaiveDate::from_ymd_opt(year + 1, 1, 4)
            .ok_or_else(|| CoreError::InvalidDate(format!("{}-01-04", year + 1)))?;
        Ok(DateRange::new(start, end)?)
    }

    /// The most recent Monday-Sunday week that ended before `today`.
    pub fn last_completed_week(today: NaiveDate) -> DateRange {
        let monday_this_week = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let start = monday_this_week - Duration::days(7);
        let end = monday_this_week - Duration::days(1);
        DateRange { start, end }
    }

    /// Parses `YYYY-MM-DD` (optionally followed by a time part) or `DD/MM/YYYY`.
    pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
        let trimmed = raw.trim();
        let head = trimmed
            .split(|c| c == 'T' || c == ' ')
            .next()
            .unwrap_or(trimmed);

        NaiveDate::parse_from_str(head, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(head, "%d/%m/%Y"))
            .map_err(|_| CoreError::InvalidDate(raw.to_string()))
    }
}

fn thursday_of(date: NaiveDate) -> NaiveDate {
    let offset = Weekday::Thu.num_days_from_monday() as i64
        - date.weekday().num_days_from_monday() as i64;
    date + Duration::days(offset)
}

fn is_crossover_tail(date: NaiveDate) -> bool {
    date.month() == 12 && date.day() >= 29
}

fn is_crossover_head(date: NaiveDate) -> bool {
    date.month() == 1 && date.day() <= 4
}
