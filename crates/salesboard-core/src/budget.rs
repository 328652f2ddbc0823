//! Monthly budget targets and their weekly distribution.

use chrono::Datelike;
use salesboard_domain::{
    round_half_up, BudgetTarget, Metric, MonthlyBuckets, VatMode, WeeklyBuckets, WEEKS_PER_YEAR,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::units::UnitRegistry;

/// Weekly budget = monthly target of the week's month divided by four, rounded half-up.
pub fn weekly_from_monthly(
    monthly: &MonthlyBuckets,
    week_month_map: &[usize; WEEKS_PER_YEAR],
) -> WeeklyBuckets {
    let mut weekly = WeeklyBuckets::zeroed();
    for (week, month) in week_month_map.iter().enumerate() {
        let target = monthly.get(*month).unwrap_or(0.0);
        weekly[week] = round_half_up(target / 4.0);
    }
    weekly
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitBudget {
    pub unit: String,
    pub monthly: MonthlyBuckets,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Twelve monthly targets per configured unit for one year.
pub struct BudgetPlan {
    pub year: i32,
    pub vat: VatMode,
    pub units: Vec<UnitBudget>,
    pub unknown_units: usize,
}

impl BudgetPlan {
    /// Groups targets into months of `year`, converting to net amounts when requested.
    pub fn build(registry: &UnitRegistry, targets: &[BudgetTarget], year: i32, vat: VatMode) -> Self {
        let mut units: Vec<UnitBudget> = registry
            .names()
            .map(|name| UnitBudget {
                unit: name.to_string(),
                monthly: MonthlyBuckets::zeroed(),
            })
            .collect();
        let mut unknown_units = 0;

        for target in targets.iter().filter(|t| t.month_start.year() == year) {
            let Some(unit) = registry.resolve(&target.business_unit) else {
                unknown_units += 1;
                continue;
            };
            if let Some(entry) = units.iter_mut().find(|entry| entry.unit == unit.name) {
                entry.monthly.add(
                    target.month_start.month0() as usize,
                    UnitRegistry::apply_vat(unit, target.target_amount, vat),
                );
            }
        }
        if unknown_units > 0 {
            warn!(year, unknown_units, "budget targets for unconfigured units ignored");
        }

        Self {
            year,
            vat,
            units,
            unknown_units,
        }
    }

    pub fn monthly(&self, unit: &str) -> Option<&MonthlyBuckets> {
        self.units
            .iter()
            .find(|entry| entry.unit == unit)
            .map(|entry| &entry.monthly)
    }

    pub fn weekly(&self, unit: &str, week_month_map: &[usize; WEEKS_PER_YEAR]) -> Option<WeeklyBuckets> {
        self.monthly(unit)
            .map(|monthly| weekly_from_monthly(monthly, week_month_map))
    }

    pub fn all_groups_monthly(&self) -> MonthlyBuckets {
        self.units
            .iter()
            .fold(MonthlyBuckets::zeroed(), |acc, entry| acc.plus(&entry.monthly))
    }

    /// Sum of each unit's rounded weekly budget.
    pub fn all_groups_weekly(&self, week_month_map: &[usize; WEEKS_PER_YEAR]) -> WeeklyBuckets {
        self.units.iter().fold(WeeklyBuckets::zeroed(), |acc, entry| {
            acc.plus(&weekly_from_monthly(&entry.monthly, week_month_map))
        })
    }

    /// Budgets exist only for sales.
    pub fn applies_to(metric: Metric) -> bool {
        metric.supports_budget()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use salesboard_config::{EngineConfig, UnitConfig, DEFAULT_WEEK_MONTH_MAP};

    fn registry() -> UnitRegistry {
        let mut config = EngineConfig::default();
        config.business_units = vec![
            UnitConfig::new("Picadeli", 0.10),
            UnitConfig::new("Activities", 0.21),
        ];
        UnitRegistry::new(&config)
    }

    fn target(y: i32, m: u32, unit: &str, amount: f64) -> BudgetTarget {
        BudgetTarget {
            month_start: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
            business_unit: unit.into(),
            target_amount: amount,
        }
    }

    #[test]
    fn weekly_budget_is_a_quarter_of_the_month() {
        let mut monthly = MonthlyBuckets::zeroed();
        monthly[11] = 4700.0;
        let weekly = weekly_from_monthly(&monthly, &DEFAULT_WEEK_MONTH_MAP);
        for week in 48..53 {
            assert_eq!(weekly[week], 1175.0);
        }
        assert_eq!(weekly[0], 0.0);
    }

    #[test]
    fn quarter_rounds_half_up() {
        let mut monthly = MonthlyBuckets::zeroed();
        monthly[0] = 1002.0;
        let weekly = weekly_from_monthly(&monthly, &DEFAULT_WEEK_MONTH_MAP);
        assert_eq!(weekly[0], 251.0);
    }

    #[test]
    fn plan_groups_by_month_and_skips_other_years() {
        let targets = vec![
            target(2025, 3, "Picadeli", 1000.0),
            target(2025, 3, "Picadeli", 500.0),
            target(2024, 3, "Picadeli", 9.0),
            target(2025, 4, "Nobody", 9.0),
        ];
        let plan = BudgetPlan::build(&registry(), &targets, 2025, VatMode::Gross);
        assert_eq!(plan.monthly("Picadeli").unwrap()[2], 1500.0);
        assert_eq!(plan.all_groups_monthly().total(), 1500.0);
        assert_eq!(plan.unknown_units, 1);
    }

    #[test]
    fn net_budgets_use_unit_vat() {
        let targets = vec![target(2025, 1, "Activities", 1210.0)];
        let plan = BudgetPlan::build(&registry(), &targets, 2025, VatMode::Net);
        assert!((plan.monthly("Activities").unwrap()[0] - 1000.0).abs() < 1e-9);
        assert_eq!(plan.weekly("Activities", &DEFAULT_WEEK_MONTH_MAP).unwrap()[0], 250.0);
    }

    #[test]
    fn only_sales_carry_budgets() {
        assert!(BudgetPlan::applies_to(Metric::Sales));
        assert!(!BudgetPlan::applies_to(Metric::Spend));
        assert!(!BudgetPlan::applies_to(Metric::Transactions));
    }
}
