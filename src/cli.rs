//! Argument handling for the `salesboard_report` binary.

use std::{io::Write, path::PathBuf};

use chrono::{Datelike, NaiveDate};
use salesboard_config::ConfigManager;
use salesboard_core::{CalendarModel, Clock, DetailQuery, SystemClock};
use salesboard_domain::{
    DateRange, Granularity, Metric, PeriodRequest, Preset, UnitSelection, VatMode,
};
use salesboard_storage_json::{JsonSalesStore, StoragePaths};

use crate::{dashboard::Dashboard, errors::AppError, utils::build_info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Detail,
    Summary,
    Export,
    Version,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportArgs {
    pub data_dir: Option<PathBuf>,
    pub year: Option<i32>,
    pub granularity: Granularity,
    pub metric: Metric,
    pub selections: Vec<UnitSelection>,
    pub period: PeriodRequest,
    pub vat: VatMode,
    pub prior_year: bool,
    pub budget: bool,
    pub mode: ReportMode,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            data_dir: None,
            year: None,
            granularity: Granularity::Monthly,
            metric: Metric::Sales,
            selections: Vec::new(),
            period: PeriodRequest::Default,
            vat: VatMode::Gross,
            prior_year: false,
            budget: false,
            mode: ReportMode::Detail,
        }
    }
}

impl ReportArgs {
    /// Detail query for the given year. No explicit unit means All Groups.
    pub fn query(&self, year: i32) -> DetailQuery {
        let selections = if self.selections.is_empty() {
            vec![UnitSelection::AllGroups]
        } else {
            self.selections.clone()
        };
        let mut query = DetailQuery::new(year, self.granularity, self.metric)
            .with_selections(selections)
            .with_period(self.period.clone())
            .with_vat(self.vat);
        query.compare_prior_year = self.prior_year;
        query.compare_budget = self.budget;
        query
    }
}

pub const USAGE: &str = "usage: salesboard_report [--data DIR] [--year YYYY] \
[--granularity daily|weekly|monthly|yearly] [--metric sales|transactions|spend] \
[--unit NAME|all]... [--preset q1|q2|q3|q4|summer|ytd] [--range START:END] \
[--from DATE --to DATE] [--net] [--prior] [--budget] [--summary|--export|--version]";

fn value(flag: &str, next: Option<String>) -> Result<String, AppError> {
    next.ok_or_else(|| AppError::InvalidArgument(format!("{flag} needs a value")))
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    Ok(CalendarModel::parse_date(raw)?)
}

pub fn parse_args<I>(args: I) -> Result<ReportArgs, AppError>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = ReportArgs::default();
    let mut from = None;
    let mut to = None;
    let mut args = args.into_iter();

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--data" => parsed.data_dir = Some(PathBuf::from(value(&flag, args.next())?)),
            "--year" => {
                let raw = value(&flag, args.next())?;
                parsed.year = Some(raw.parse().map_err(|_| {
                    AppError::InvalidArgument(format!("`{raw}` is not a year"))
                })?);
            }
            "--granularity" => {
                parsed.granularity = value(&flag, args.next())?
                    .parse()
                    .map_err(AppError::InvalidArgument)?;
            }
            "--metric" => {
                parsed.metric = value(&flag, args.next())?
                    .parse()
                    .map_err(AppError::InvalidArgument)?;
            }
            "--unit" => {
                let name = value(&flag, args.next())?;
                parsed.selections.push(if name.eq_ignore_ascii_case("all") {
                    UnitSelection::AllGroups
                } else {
                    UnitSelection::unit(name)
                });
            }
            "--preset" => {
                let preset: Preset = value(&flag, args.next())?
                    .parse()
                    .map_err(AppError::InvalidArgument)?;
                parsed.period = PeriodRequest::Preset(preset);
            }
            "--range" => {
                let raw = value(&flag, args.next())?;
                let (start, end) = raw
                    .split_once(':')
                    .and_then(|(s, e)| Some((s.parse().ok()?, e.parse().ok()?)))
                    .ok_or_else(|| {
                        AppError::InvalidArgument(format!("`{raw}` is not START:END"))
                    })?;
                parsed.period = PeriodRequest::Indices { start, end };
            }
            "--from" => from = Some(parse_date(&value(&flag, args.next())?)?),
            "--to" => to = Some(parse_date(&value(&flag, args.next())?)?),
            "--net" => parsed.vat = VatMode::Net,
            "--prior" => parsed.prior_year = true,
            "--budget" => parsed.budget = true,
            "--summary" => parsed.mode = ReportMode::Summary,
            "--export" => parsed.mode = ReportMode::Export,
            "--version" => parsed.mode = ReportMode::Version,
            other => {
                return Err(AppError::InvalidArgument(format!(
                    "unknown flag `{other}`\n{USAGE}"
                )))
            }
        }
    }

    match (from, to) {
        (Some(start), Some(end)) => {
            let range = DateRange::new(start, end)
                .map_err(|err| AppError::InvalidArgument(err.to_string()))?;
            parsed.period = PeriodRequest::Dates(range);
            parsed.granularity = Granularity::Daily;
        }
        (None, None) => {}
        _ => {
            return Err(AppError::InvalidArgument(
                "--from and --to must be given together".into(),
            ))
        }
    }
    Ok(parsed)
}

/// Current calendar year when configured, otherwise the latest fiscal year.
pub fn default_year(fiscal_years: &[i32], clock: &dyn Clock) -> Option<i32> {
    let today = clock.today().year();
    if fiscal_years.contains(&today) {
        Some(today)
    } else {
        fiscal_years.iter().copied().max()
    }
}

fn open_dashboard(args: &ReportArgs) -> Result<Dashboard, AppError> {
    match &args.data_dir {
        Some(base) => {
            let config = ConfigManager::with_base_dir(base.clone())?.load()?;
            let store = JsonSalesStore::open(StoragePaths::under(base))?;
            let mut dashboard = Dashboard::new(config, Box::new(store))?;
            dashboard.refresh_units()?;
            Ok(dashboard)
        }
        None => Dashboard::open_default(),
    }
}

pub fn run_cli() -> Result<(), AppError> {
    let args = parse_args(std::env::args().skip(1))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.mode == ReportMode::Version {
        serde_json::to_writer_pretty(&mut out, &build_info::current())?;
        writeln!(out)?;
        return Ok(());
    }

    let dashboard = open_dashboard(&args)?;
    let year = match args.year {
        Some(year) => year,
        None => default_year(dashboard.fiscal_years(), &SystemClock)
            .ok_or_else(|| AppError::InvalidArgument("no fiscal years configured".into()))?,
    };

    match args.mode {
        ReportMode::Summary => {
            let selection = args
                .selections
                .first()
                .cloned()
                .unwrap_or(UnitSelection::AllGroups);
            let summary = dashboard.year_summary(year, &selection, args.vat)?;
            serde_json::to_writer_pretty(&mut out, &summary)?;
        }
        ReportMode::Export => {
            let table = dashboard.export(&args.query(year))?;
            serde_json::to_writer_pretty(&mut out, &table)?;
        }
        ReportMode::Detail | ReportMode::Version => {
            let view = dashboard.detail_view(&args.query(year))?;
            serde_json::to_writer_pretty(&mut out, &view)?;
        }
    }
    writeln!(out)?;
    Ok(())
}
