//! Fetch-and-derive workflows on top of a [`SalesStore`].

use chrono::NaiveDate;
use salesboard_domain::{
    DateRange, DetailView, Granularity, ResolvedPeriod, TransactionRecord, UnitSelection, VatMode,
    YearSummary,
};
use tracing::info_span;

use crate::aggregation::{Aggregation, AggregationEngine};
use crate::budget::BudgetPlan;
use crate::detail::{build_detail_view, DetailInputs, DetailQuery};
use crate::error::CoreError;
use crate::ingest::{ingest_budget_rows, ingest_sales_rows, IngestOutcome};
use crate::selector::PeriodSelector;
use crate::storage::{PagedReader, SalesStore};
use crate::summary::SummaryService;
use crate::time::Clock;

pub struct ReportService<'a, S: SalesStore + ?Sized> {
    engine: &'a AggregationEngine,
    store: &'a S,
    reader: PagedReader,
    clock: &'a dyn Clock,
}

impl<'a, S: SalesStore + ?Sized> ReportService<'a, S> {
    pub fn new(
        engine: &'a AggregationEngine,
        store: &'a S,
        reader: PagedReader,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            engine,
            store,
            reader,
            clock,
        }
    }

    /// Every day that can land in `year`'s weekly, monthly or yearly view.
    pub fn year_fetch_range(year: i32) -> Result<DateRange, CoreError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| CoreError::InvalidDate(format!("{year}-01-01")))?;
        let end = NaiveDate::from_ymd_opt(year + 1, 1, 4)
            .ok_or_else(|| CoreError::InvalidDate(format!("{}-01-04", year + 1)))?;
        Ok(DateRange::new(start, end)?)
    }

    pub fn load_records(&self, range: DateRange) -> Result<IngestOutcome<TransactionRecord>, CoreError> {
        let rows = self.reader.read_all(self.store, range)?;
        Ok(ingest_sales_rows(&rows))
    }

    pub fn aggregate_year(
        &self,
        year: i32,
        granularity: Granularity,
        vat: VatMode,
    ) -> Result<Aggregation, CoreError> {
        let outcome = self.load_records(Self::year_fetch_range(year)?)?;
        let mut aggregation = self
            .engine
            .aggregate(&outcome.records, granularity, year, vat)?;
        aggregation.diagnostics.absorb_invalid(outcome.invalid_dates);
        Ok(aggregation)
    }

    pub fn aggregate_range(&self, range: DateRange, vat: VatMode) -> Result<Aggregation, CoreError> {
        let outcome = self.load_records(range)?;
        let mut aggregation = self
            .engine
            .aggregate_daily_range(&outcome.records, range, vat)?;
        aggregation.diagnostics.absorb_invalid(outcome.invalid_dates);
        Ok(aggregation)
    }

    pub fn budget_plan(&self, year: i32, vat: VatMode) -> Result<BudgetPlan, CoreError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| CoreError::InvalidDate(format!("{year}-01-01")))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| CoreError::InvalidDate(format!("{year}-12-31")))?;
        let rows = self.store.fetch_budget_targets(DateRange::new(start, end)?)?;
        let outcome = ingest_budget_rows(&rows);
        Ok(BudgetPlan::build(
            self.engine.units(),
            &outcome.records,
            year,
            vat,
        ))
    }

    pub fn resolve_period(&self, query: &DetailQuery) -> Result<ResolvedPeriod, CoreError> {
        PeriodSelector::new(self.engine.calendar(), self.clock).resolve(
            query.granularity,
            query.year,
            &query.period,
        )
    }

    pub fn detail_view(&self, query: &DetailQuery) -> Result<DetailView, CoreError> {
        let span = info_span!("detail_view", year = query.year, granularity = %query.granularity);
        let _guard = span.enter();

        let period = self.resolve_period(query)?;
        let current = match &period {
            ResolvedPeriod::Days(days) => {
                let (Some(first), Some(last)) = (days.first(), days.last()) else {
                    return Err(CoreError::InvalidRange("empty daily window".into()));
                };
                self.aggregate_range(DateRange::new(*first, *last)?, query.vat)?
            }
            _ => self.aggregate_year(query.year, query.granularity, query.vat)?,
        };
        let prior = if query.needs_prior_year() {
            Some(self.aggregate_year(query.year - 1, query.granularity, query.vat)?)
        } else {
            None
        };
        let budget = if query.needs_budget() {
            Some(self.budget_plan(query.year, query.vat)?)
        } else {
            None
        };

        build_detail_view(
            self.engine.calendar(),
            query,
            &period,
            DetailInputs {
                current: &current,
                prior: prior.as_ref(),
                budget: budget.as_ref(),
            },
        )
    }

    pub fn year_summary(
        &self,
        year: i32,
        selection: &UnitSelection,
        vat: VatMode,
    ) -> Result<YearSummary, CoreError> {
        let aggregation = self.aggregate_year(year, Granularity::Monthly, vat)?;
        SummaryService::year_summary(&aggregation, selection)
    }
}
