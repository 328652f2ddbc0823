//! Period resolution: defaults, named presets, and explicit ranges.

use salesboard_domain::{
    DateRange, Granularity, PeriodRequest, Preset, ResolvedPeriod, CROSSOVER_WEEK_INDEX,
    MONTHS_PER_YEAR, WEEKS_PER_YEAR,
};

use crate::calendar::CalendarModel;
use crate::error::CoreError;
use crate::time::Clock;

const MONTHLY_PRESETS: [(Preset, usize, usize); 6] = [
    (Preset::Q1, 0, 2),
    (Preset::Q2, 3, 5),
    (Preset::Q3, 6, 8),
    (Preset::Q4, 9, 11),
    (Preset::Summer, 3, 9),
    (Preset::Ytd, 0, 10),
];

const WEEKLY_PRESETS: [(Preset, usize, usize); 4] = [
    (Preset::Q1, 0, 12),
    (Preset::Q2, 13, 25),
    (Preset::Q3, 26, 38),
    (Preset::Q4, 39, 52),
];

/// Inclusive bucket range of a preset, or `None` where the granularity has no such preset.
pub fn preset_range(granularity: Granularity, preset: Preset) -> Option<(usize, usize)> {
    let table: &[(Preset, usize, usize)] = match granularity {
        Granularity::Monthly => &MONTHLY_PRESETS,
        Granularity::Weekly => &WEEKLY_PRESETS,
        Granularity::Daily | Granularity::Yearly => &[],
    };
    table
        .iter()
        .find(|(candidate, _, _)| *candidate == preset)
        .map(|(_, start, end)| (*start, *end))
}

pub struct PeriodSelector<'a> {
    calendar: &'a CalendarModel,
    clock: &'a dyn Clock,
}

impl<'a> PeriodSelector<'a> {
    pub fn new(calendar: &'a CalendarModel, clock: &'a dyn Clock) -> Self {
        Self { calendar, clock }
    }

    pub fn resolve(
        &self,
        granularity: Granularity,
        year: i32,
        request: &PeriodRequest,
    ) -> Result<ResolvedPeriod, CoreError> {
        match request {
            PeriodRequest::Default => self.default_for(granularity, year),
            PeriodRequest::Preset(preset) => match preset_range(granularity, *preset) {
                Some((start, end)) => Ok(ResolvedPeriod::Indices { start, end }),
                None => Err(CoreError::UnsupportedPreset {
                    preset: preset.to_string(),
                    granularity: granularity.to_string(),
                }),
            },
            PeriodRequest::Indices { start, end } => {
                let count = match granularity {
                    Granularity::Weekly => WEEKS_PER_YEAR,
                    Granularity::Monthly => MONTHS_PER_YEAR,
                    other => {
                        return Err(CoreError::InvalidRange(format!(
                            "index ranges do not apply to the {other} view"
                        )))
                    }
                };
                if start > end || *end >= count {
                    return Err(CoreError::InvalidRange(format!(
                        "{start}..={end} is not within 0..{count}"
                    )));
                }
                Ok(ResolvedPeriod::Indices {
                    start: *start,
                    end: *end,
                })
            }
            PeriodRequest::Dates(range) => {
                if granularity != Granularity::Daily {
                    return Err(CoreError::InvalidRange(format!(
                        "date ranges apply only to the daily view, not {granularity}"
                    )));
                }
                let range = DateRange::new(range.start, range.end)?;
                self.calendar.ensure_supported(range.start)?;
                self.calendar.ensure_supported(range.end)?;
                Ok(ResolvedPeriod::Days(range.days()))
            }
        }
    }

    pub fn default_for(&self, granularity: Granularity, year: i32) -> Result<ResolvedPeriod, CoreError> {
        match granularity {
            Granularity::Monthly => Ok(ResolvedPeriod::Indices {
                start: 0,
                end: MONTHS_PER_YEAR - 1,
            }),
            Granularity::Weekly => {
                let index = self.default_week_index(year);
                Ok(ResolvedPeriod::Indices {
                    start: index,
                    end: index,
                })
            }
            Granularity::Yearly => Ok(ResolvedPeriod::Years {
                prior: year - 1,
                current: year,
            }),
            Granularity::Daily => Ok(ResolvedPeriod::Days(
                self.calendar.crossover_window(year)?.days(),
            )),
        }
    }

    /// Index of the last completed Monday-Sunday week if it falls in `year`, else the final bucket.
    fn default_week_index(&self, year: i32) -> usize {
        let last_week = CalendarModel::last_completed_week(self.clock.today());
        match self.calendar.week_of(last_week.start) {
            Ok(key) if key.year == year => key.index,
            _ => CROSSOVER_WEEK_INDEX,
        }
    }
}
