//! Per-unit time-bucketed aggregation of transaction records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use salesboard_config::EngineConfig;
use salesboard_domain::{
    derive_spend, round_half_up, AggregateResult, DateRange, Granularity, Metric, MonthlyBuckets,
    TransactionRecord, VatMode, WeeklyBuckets,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::calendar::CalendarModel;
use crate::error::CoreError;
use crate::units::UnitRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BucketKey {
    Day(NaiveDate),
    Index(usize),
    Year,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
/// Counts of records that did not reach a bucket.
pub struct AggregationDiagnostics {
    pub run_id: Option<Uuid>,
    pub accepted: usize,
    /// Valid records that belong to another year or range.
    pub out_of_scope: usize,
    pub invalid_dates: usize,
    /// Records dropped because their unit is not configured, keyed by raw name.
    pub unknown_units: BTreeMap<String, usize>,
}

impl AggregationDiagnostics {
    pub fn dropped_unknown(&self) -> usize {
        self.unknown_units.values().sum()
    }

    /// Folds in counts from an earlier stage, such as row ingest.
    pub fn absorb_invalid(&mut self, invalid_dates: usize) {
        self.invalid_dates += invalid_dates;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Sales and transaction aggregates of one unit.
pub struct UnitAggregate {
    pub unit: String,
    pub sales: AggregateResult,
    pub transactions: AggregateResult,
}

impl UnitAggregate {
    fn empty(unit: &str, granularity: Granularity) -> Self {
        Self {
            unit: unit.to_string(),
            sales: empty_result(granularity),
            transactions: empty_result(granularity),
        }
    }

    pub fn metric(&self, metric: Metric) -> AggregateResult {
        match metric {
            Metric::Sales => self.sales.clone(),
            Metric::Transactions => self.transactions.clone(),
            Metric::Spend => spend_of(&self.sales, &self.transactions),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Output of one aggregation run: one entry per configured unit, in configuration order.
pub struct Aggregation {
    pub granularity: Granularity,
    /// Selected year; `None` for arbitrary daily ranges.
    pub year: Option<i32>,
    pub vat: VatMode,
    pub units: Vec<UnitAggregate>,
    pub diagnostics: AggregationDiagnostics,
}

impl Aggregation {
    pub fn unit(&self, name: &str) -> Option<&UnitAggregate> {
        self.units.iter().find(|entry| entry.unit == name)
    }

    /// Mapping from unit to aggregate for the given metric.
    pub fn by_unit(&self, metric: Metric) -> BTreeMap<String, AggregateResult> {
        self.units
            .iter()
            .map(|entry| (entry.unit.clone(), entry.metric(metric)))
            .collect()
    }

    /// Combined figure across every unit. Sales and transactions are summed after per-unit
    /// VAT conversion; spend is re-derived from the combined totals.
    pub fn all_groups(&self, metric: Metric) -> AggregateResult {
        match metric {
            Metric::Sales => self.sum(|entry| &entry.sales),
            Metric::Transactions => self.sum(|entry| &entry.transactions),
            Metric::Spend => spend_of(
                &self.sum(|entry| &entry.sales),
                &self.sum(|entry| &entry.transactions),
            ),
        }
    }

    fn sum(&self, pick: impl Fn(&UnitAggregate) -> &AggregateResult) -> AggregateResult {
        self.units
            .iter()
            .fold(empty_result(self.granularity), |acc, entry| {
                add_results(&acc, pick(entry))
            })
    }
}

fn empty_result(granularity: Granularity) -> AggregateResult {
    match granularity {
        Granularity::Daily => AggregateResult::Daily(BTreeMap::new()),
        Granularity::Weekly => AggregateResult::Weekly(WeeklyBuckets::zeroed()),
        Granularity::Monthly => AggregateResult::Monthly(MonthlyBuckets::zeroed()),
        Granularity::Yearly => AggregateResult::Yearly(0.0),
    }
}

fn add_results(left: &AggregateResult, right: &AggregateResult) -> AggregateResult {
    match (left, right) {
        (AggregateResult::Daily(a), AggregateResult::Daily(b)) => {
            let mut merged = a.clone();
            for (date, value) in b {
                *merged.entry(*date).or_insert(0.0) += value;
            }
            AggregateResult::Daily(merged)
        }
        (AggregateResult::Weekly(a), AggregateResult::Weekly(b)) => AggregateResult::Weekly(a.plus(b)),
        (AggregateResult::Monthly(a), AggregateResult::Monthly(b)) => {
            AggregateResult::Monthly(a.plus(b))
        }
        (AggregateResult::Yearly(a), AggregateResult::Yearly(b)) => AggregateResult::Yearly(a + b),
        _ => left.clone(),
    }
}

/// Per-bucket spend: rounded sales over transactions, zero where there are no transactions.
pub fn spend_of(sales: &AggregateResult, transactions: &AggregateResult) -> AggregateResult {
    match (sales, transactions) {
        (AggregateResult::Daily(s), AggregateResult::Daily(t)) => AggregateResult::Daily(
            s.iter()
                .map(|(date, value)| {
                    (*date, derive_spend(*value, t.get(date).copied().unwrap_or(0.0)))
                })
                .collect(),
        ),
        (AggregateResult::Weekly(s), AggregateResult::Weekly(t)) => {
            AggregateResult::Weekly(WeeklyBuckets::spend(s, t))
        }
        (AggregateResult::Monthly(s), AggregateResult::Monthly(t)) => {
            AggregateResult::Monthly(MonthlyBuckets::spend(s, t))
        }
        (AggregateResult::Yearly(s), AggregateResult::Yearly(t)) => {
            AggregateResult::Yearly(derive_spend(*s, *t))
        }
        _ => empty_result(Granularity::Yearly),
    }
}

fn add_to(result: &mut AggregateResult, key: BucketKey, amount: f64) {
    match (result, key) {
        (AggregateResult::Daily(map), BucketKey::Day(date)) => {
            *map.entry(date).or_insert(0.0) += amount;
        }
        (AggregateResult::Weekly(buckets), BucketKey::Index(index)) => {
            buckets.add(index, amount);
        }
        (AggregateResult::Monthly(buckets), BucketKey::Index(index)) => {
            buckets.add(index, amount);
        }
        (AggregateResult::Yearly(total), BucketKey::Year) => *total += amount,
        _ => {}
    }
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    Year(i32),
    Range(DateRange),
}

/// Buckets records per unit for a granularity, year and VAT mode.
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    calendar: CalendarModel,
    units: UnitRegistry,
}

impl AggregationEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, CoreError> {
        Ok(Self {
            calendar: CalendarModel::new(config)?,
            units: UnitRegistry::new(config),
        })
    }

    pub fn calendar(&self) -> &CalendarModel {
        &self.calendar
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut UnitRegistry {
        &mut self.units
    }

    /// Aggregates a selected year. Daily granularity covers the whole calendar year.
    pub fn aggregate(
        &self,
        records: &[TransactionRecord],
        granularity: Granularity,
        year: i32,
        vat: VatMode,
    ) -> Result<Aggregation, CoreError> {
        if !self.calendar.supported_years().contains(year) {
            return Err(CoreError::Validation(format!(
                "year {year} is outside the supported window"
            )));
        }
        self.run(records, granularity, Scope::Year(year), vat)
    }

    /// Daily totals over an arbitrary inclusive range, which may span a year boundary.
    pub fn aggregate_daily_range(
        &self,
        records: &[TransactionRecord],
        range: DateRange,
        vat: VatMode,
    ) -> Result<Aggregation, CoreError> {
        self.calendar.ensure_supported(range.start)?;
        self.calendar.ensure_supported(range.end)?;
        self.run(records, Granularity::Daily, Scope::Range(range), vat)
    }

    fn run(
        &self,
        records: &[TransactionRecord],
        granularity: Granularity,
        scope: Scope,
        vat: VatMode,
    ) -> Result<Aggregation, CoreError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("aggregate", %run_id, %granularity, %vat);
        let _guard = span.enter();

        let mut units: Vec<UnitAggregate> = self
            .units
            .names()
            .map(|name| UnitAggregate::empty(name, granularity))
            .collect();
        let mut diagnostics = AggregationDiagnostics {
            run_id: Some(run_id),
            ..AggregationDiagnostics::default()
        };

        for record in records {
            let Some(unit) = self.units.resolve(&record.business_unit) else {
                *diagnostics
                    .unknown_units
                    .entry(record.business_unit.clone())
                    .or_insert(0) += 1;
                continue;
            };
            let key = match self.bucket_key(record.date, granularity, scope) {
                Ok(Some(key)) => key,
                Ok(None) => {
                    diagnostics.out_of_scope += 1;
                    continue;
                }
                Err(err) => {
                    debug!(%err, "record skipped");
                    diagnostics.invalid_dates += 1;
                    continue;
                }
            };

            let position = units
                .iter()
                .position(|entry| entry.unit == unit.name)
                .ok_or_else(|| CoreError::UnknownBusinessUnit(unit.name.clone()))?;
            let entry = &mut units[position];
            add_to(
                &mut entry.sales,
                key,
                UnitRegistry::apply_vat(unit, record.revenue, vat),
            );
            add_to(&mut entry.transactions, key, record.transactions as f64);
            diagnostics.accepted += 1;
        }

        if !diagnostics.unknown_units.is_empty() {
            warn!(
                dropped = diagnostics.dropped_unknown(),
                units = ?diagnostics.unknown_units.keys().collect::<Vec<_>>(),
                "records for unconfigured units were dropped"
            );
        }
        info!(
            accepted = diagnostics.accepted,
            out_of_scope = diagnostics.out_of_scope,
            invalid_dates = diagnostics.invalid_dates,
            "aggregation complete"
        );

        let year = match scope {
            Scope::Year(year) => Some(year),
            Scope::Range(_) => None,
        };
        Ok(Aggregation {
            granularity,
            year,
            vat,
            units,
            diagnostics,
        })
    }

    fn bucket_key(
        &self,
        date: NaiveDate,
        granularity: Granularity,
        scope: Scope,
    ) -> Result<Option<BucketKey>, CoreError> {
        match scope {
            Scope::Range(range) => {
                self.calendar.ensure_supported(date)?;
                Ok(range.contains(date).then_some(BucketKey::Day(date)))
            }
            Scope::Year(year) => match granularity {
                Granularity::Weekly => Ok(self
                    .calendar
                    .week_index_in(date, year)?
                    .map(BucketKey::Index)),
                Granularity::Monthly => Ok(self
                    .calendar
                    .month_index_in(date, year)?
                    .map(BucketKey::Index)),
                Granularity::Yearly => Ok(self
                    .calendar
                    .month_index_in(date, year)?
                    .map(|_| BucketKey::Year)),
                Granularity::Daily => Ok(self
                    .calendar
                    .month_index_in(date, year)?
                    .map(|_| BucketKey::Day(date))),
            },
        }
    }
}

/// Rounds every value of a result half-up, for display.
pub fn rounded(result: &AggregateResult) -> AggregateResult {
    match result {
        AggregateResult::Daily(map) => {
            AggregateResult::Daily(map.iter().map(|(d, v)| (*d, round_half_up(*v))).collect())
        }
        AggregateResult::Weekly(b) => AggregateResult::Weekly(b.map(round_half_up)),
        AggregateResult::Monthly(b) => AggregateResult::Monthly(b.map(round_half_up)),
        AggregateResult::Yearly(v) => AggregateResult::Yearly(round_half_up(*v)),
    }
}
