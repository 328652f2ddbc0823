//! Headline KPIs for a year.

use salesboard_domain::{
    AggregateResult, Granularity, Metric, MonthStat, MonthlyBuckets, SpendPolicy, UnitSelection,
    UnitShare, YearSummary, MONTHS_PER_YEAR, MONTH_NAMES,
};

use crate::aggregation::Aggregation;
use crate::error::CoreError;

pub struct SummaryService;

impl SummaryService {
    /// Builds the year summary from a monthly aggregation.
    ///
    /// The combined selection reports pooled spend (total sales over total transactions);
    /// a single unit reports the mean of its twelve monthly spend figures.
    pub fn year_summary(
        aggregation: &Aggregation,
        selection: &UnitSelection,
    ) -> Result<YearSummary, CoreError> {
        if aggregation.granularity != Granularity::Monthly {
            return Err(CoreError::Validation(format!(
                "year summary needs a monthly aggregation, got {}",
                aggregation.granularity
            )));
        }
        let year = aggregation
            .year
            .ok_or_else(|| CoreError::Validation("aggregation has no selected year".into()))?;

        let (sales, transactions, spend) = match selection {
            UnitSelection::AllGroups => (
                aggregation.all_groups(Metric::Sales),
                aggregation.all_groups(Metric::Transactions),
                aggregation.all_groups(Metric::Spend),
            ),
            UnitSelection::Unit(name) => {
                let unit = aggregation
                    .unit(name)
                    .ok_or_else(|| CoreError::UnknownBusinessUnit(name.clone()))?;
                (
                    unit.metric(Metric::Sales),
                    unit.metric(Metric::Transactions),
                    unit.metric(Metric::Spend),
                )
            }
        };
        let sales = monthly(&sales)?;
        let transactions = monthly(&transactions)?;
        let spend = monthly(&spend)?;

        let total_sales = sales.total();
        let total_transactions = transactions.total();
        let (avg_spend, spend_policy) = match selection {
            UnitSelection::AllGroups => (
                if total_transactions > 0.0 {
                    total_sales / total_transactions
                } else {
                    0.0
                },
                SpendPolicy::PooledTotals,
            ),
            UnitSelection::Unit(_) => (
                spend.total() / MONTHS_PER_YEAR as f64,
                SpendPolicy::MeanOfMonthly,
            ),
        };

        let unit_shares = aggregation
            .units
            .iter()
            .map(|entry| UnitShare {
                unit: entry.unit.clone(),
                total_sales: entry.sales.total(),
            })
            .collect();

        Ok(YearSummary {
            year,
            selection: selection.clone(),
            vat: aggregation.vat,
            total_sales,
            avg_monthly_sales: total_sales / MONTHS_PER_YEAR as f64,
            best_month: best_month(&sales),
            worst_month: worst_month(&sales),
            total_transactions,
            avg_spend,
            spend_policy,
            unit_shares,
        })
    }
}

fn monthly(result: &AggregateResult) -> Result<MonthlyBuckets, CoreError> {
    match result {
        AggregateResult::Monthly(buckets) => Ok(*buckets),
        _ => Err(CoreError::Validation("expected monthly buckets".into())),
    }
}

fn stat(month: usize, value: f64) -> MonthStat {
    MonthStat {
        month,
        name: MONTH_NAMES[month].to_string(),
        value,
    }
}

/// Highest month; the earliest wins ties. `None` for a year with no sales.
fn best_month(sales: &MonthlyBuckets) -> Option<MonthStat> {
    let mut best: Option<(usize, f64)> = None;
    for (month, value) in sales.as_slice().iter().enumerate() {
        if *value > 0.0 && best.map_or(true, |(_, top)| *value > top) {
            best = Some((month, *value));
        }
    }
    best.map(|(month, value)| stat(month, value))
}

/// Lowest non-zero month.
fn worst_month(sales: &MonthlyBuckets) -> Option<MonthStat> {
    let mut worst: Option<(usize, f64)> = None;
    for (month, value) in sales.as_slice().iter().enumerate() {
        if *value > 0.0 && worst.map_or(true, |(_, low)| *value < low) {
            worst = Some((month, *value));
        }
    }
    worst.map(|(month, value)| stat(month, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::AggregationEngine;
    use chrono::NaiveDate;
    use salesboard_config::{EngineConfig, UnitConfig};
    use salesboard_domain::{TransactionRecord, VatMode};

    fn record(m: u32, unit: &str, revenue: f64, trans: u64) -> TransactionRecord {
        TransactionRecord::new(NaiveDate::from_ymd_opt(2025, m, 10).unwrap(), unit, revenue, trans)
    }

    fn aggregation() -> Aggregation {
        let mut config = EngineConfig::default();
        config.business_units = vec![UnitConfig::new("A", 0.1), UnitConfig::new("B", 0.1)];
        let engine = AggregationEngine::new(&config).unwrap();
        let records = vec![
            record(1, "A", 1000.0, 10),
            record(2, "A", 300.0, 10),
            record(1, "B", 200.0, 100),
        ];
        engine
            .aggregate(&records, Granularity::Monthly, 2025, VatMode::Gross)
            .unwrap()
    }

    #[test]
    fn all_groups_spend_is_pooled() {
        let summary = SummaryService::year_summary(&aggregation(), &UnitSelection::AllGroups).unwrap();
        assert_eq!(summary.total_sales, 1500.0);
        assert_eq!(summary.total_transactions, 120.0);
        assert!((summary.avg_spend - 12.5).abs() < 1e-9);
        assert_eq!(summary.spend_policy, SpendPolicy::PooledTotals);
        assert_eq!(summary.best_month.unwrap().name, "January");
        assert_eq!(summary.worst_month.unwrap().month, 1);
        assert_eq!(summary.avg_monthly_sales, 125.0);
        assert_eq!(summary.unit_shares.len(), 2);
    }

    #[test]
    fn single_unit_spend_is_mean_of_months() {
        let summary =
            SummaryService::year_summary(&aggregation(), &UnitSelection::unit("A")).unwrap();
        // months: 100 and 30, ten empty months
        assert!((summary.avg_spend - 130.0 / 12.0).abs() < 1e-9);
        assert_eq!(summary.spend_policy, SpendPolicy::MeanOfMonthly);
    }

    #[test]
    fn unknown_unit_is_an_error() {
        let err = SummaryService::year_summary(&aggregation(), &UnitSelection::unit("Z")).unwrap_err();
        assert!(matches!(err, CoreError::UnknownBusinessUnit(_)));
    }
}
