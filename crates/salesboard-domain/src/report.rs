//! Report-shaped outputs handed to rendering and export consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    common::{Granularity, Metric, VatMode},
    unit::UnitSelection,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Role a series plays within a detail view.
pub enum SeriesKind {
    Current,
    PriorYear,
    Budget,
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SeriesKind::Current => "Current",
            SeriesKind::PriorYear => "Prior Year",
            SeriesKind::Budget => "Budget",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A labelled value sequence aligned with the view's period labels.
pub struct Series {
    pub label: String,
    pub selection: UnitSelection,
    pub kind: SeriesKind,
    pub values: Vec<f64>,
}

impl Series {
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// One aligned pair of values and their rounded percentage change.
pub struct ComparisonPoint {
    pub current: f64,
    pub reference: f64,
    /// Omitted when the reference is zero.
    pub delta_percent: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Per-index deltas of a current series against its prior-year and budget references.
pub struct SeriesDeltas {
    pub selection: UnitSelection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vs_prior_year: Option<Vec<ComparisonPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vs_budget: Option<Vec<ComparisonPoint>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Fully derived detail view: labels, series, and comparison deltas.
pub struct DetailView {
    pub year: i32,
    pub granularity: Granularity,
    pub metric: Metric,
    pub vat: VatMode,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub deltas: Vec<SeriesDeltas>,
}

impl DetailView {
    pub fn series_for(&self, selection: &UnitSelection, kind: SeriesKind) -> Option<&Series> {
        self.series
            .iter()
            .find(|series| &series.selection == selection && series.kind == kind)
    }

    pub fn deltas_for(&self, selection: &UnitSelection) -> Option<&SeriesDeltas> {
        self.deltas.iter().find(|entry| &entry.selection == selection)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// How a yearly average spend figure is computed.
pub enum SpendPolicy {
    /// Total sales divided by total transactions.
    PooledTotals,
    /// Arithmetic mean of the twelve monthly spend figures, zero months included.
    MeanOfMonthly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthStat {
    pub month: usize,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A unit's contribution to yearly sales.
pub struct UnitShare {
    pub unit: String,
    pub total_sales: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Headline KPIs for one year and selection.
pub struct YearSummary {
    pub year: i32,
    pub selection: UnitSelection,
    pub vat: VatMode,
    pub total_sales: f64,
    pub avg_monthly_sales: f64,
    pub best_month: Option<MonthStat>,
    /// Lowest non-zero month.
    pub worst_month: Option<MonthStat>,
    pub total_transactions: f64,
    pub avg_spend: f64,
    pub spend_policy: SpendPolicy,
    pub unit_shares: Vec<UnitShare>,
}
