//! Shared enums and constants for bucketing and metrics.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Number of weekly buckets in a reporting year; the last one absorbs the cross-year tail.
pub const WEEKS_PER_YEAR: usize = 53;

/// Number of monthly buckets in a reporting year.
pub const MONTHS_PER_YEAR: usize = 12;

/// Index of the weekly bucket that absorbs Dec 29 .. Jan 4.
pub const CROSSOVER_WEEK_INDEX: usize = WEEKS_PER_YEAR - 1;

pub const MONTH_NAMES: [&str; MONTHS_PER_YEAR] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
/// Enumerates the period sizes an aggregate can be bucketed by.
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Granularity {
    /// Returns the dense bucket count for fixed-length granularities.
    pub fn bucket_count(self) -> Option<usize> {
        match self {
            Granularity::Daily => None,
            Granularity::Weekly => Some(WEEKS_PER_YEAR),
            Granularity::Monthly => Some(MONTHS_PER_YEAR),
            Granularity::Yearly => Some(1),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        };
        f.write_str(label)
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Granularity::Daily),
            "weekly" | "week" => Ok(Granularity::Weekly),
            "monthly" | "month" => Ok(Granularity::Monthly),
            "yearly" | "year" => Ok(Granularity::Yearly),
            other => Err(format!("unknown granularity `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Measures reported per bucket. `Spend` is derived from the other two.
pub enum Metric {
    Sales,
    Transactions,
    Spend,
}

impl Metric {
    /// Monetary metrics are affected by VAT exclusion; counts never are.
    pub fn is_monetary(self) -> bool {
        !matches!(self, Metric::Transactions)
    }

    /// Budgets only exist for sales.
    pub fn supports_budget(self) -> bool {
        matches!(self, Metric::Sales)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Metric::Sales => "sales",
            Metric::Transactions => "transactions",
            Metric::Spend => "spend",
        };
        f.write_str(label)
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sales" => Ok(Metric::Sales),
            "transactions" | "volume" => Ok(Metric::Transactions),
            "spend" => Ok(Metric::Spend),
            other => Err(format!("unknown metric `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
/// Whether monetary figures are reported with VAT included or removed.
pub enum VatMode {
    #[default]
    Gross,
    Net,
}

impl fmt::Display for VatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VatMode::Gross => f.write_str("gross"),
            VatMode::Net => f.write_str("net"),
        }
    }
}

/// Rounds half-way cases towards positive infinity, matching dashboard rounding.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Derives average spend from summed totals. Zero transactions yield zero.
pub fn derive_spend(sales: f64, transactions: f64) -> f64 {
    if transactions > 0.0 {
        round_half_up(sales / transactions)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_guards_zero_transactions() {
        assert_eq!(derive_spend(1500.0, 0.0), 0.0);
        assert_eq!(derive_spend(15851.0, 884.0), 18.0);
    }

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
    }

    #[test]
    fn only_sales_supports_budget() {
        assert!(Metric::Sales.supports_budget());
        assert!(!Metric::Transactions.supports_budget());
        assert!(!Metric::Spend.supports_budget());
    }

    #[test]
    fn parses_granularity_and_metric_names() {
        assert_eq!("Weekly".parse::<Granularity>(), Ok(Granularity::Weekly));
        assert_eq!("volume".parse::<Metric>(), Ok(Metric::Transactions));
        assert!("hourly".parse::<Granularity>().is_err());
    }
}
