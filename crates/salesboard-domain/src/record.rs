//! Transaction records, budget targets, and the raw rows they are parsed from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One dated revenue entry for a business unit.
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub business_unit: String,
    pub revenue: f64,
    pub transactions: u64,
}

impl TransactionRecord {
    pub fn new(
        date: NaiveDate,
        business_unit: impl Into<String>,
        revenue: f64,
        transactions: u64,
    ) -> Self {
        Self {
            date,
            business_unit: business_unit.into(),
            revenue,
            transactions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Monthly revenue target for a business unit.
pub struct BudgetTarget {
    pub month_start: NaiveDate,
    pub business_unit: String,
    pub target_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
/// Numeric column that may arrive either as a number or as formatted text.
pub enum AmountField {
    Number(f64),
    Text(String),
}

impl AmountField {
    /// Parses the value, stripping thousands separators. Unparseable text yields zero.
    pub fn value(&self) -> f64 {
        match self {
            AmountField::Number(value) if value.is_finite() => *value,
            AmountField::Number(_) => 0.0,
            AmountField::Text(raw) => raw
                .trim()
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .unwrap_or(0.0),
        }
    }
}

impl From<f64> for AmountField {
    fn from(value: f64) -> Self {
        AmountField::Number(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
/// Sales row as returned by the storage collaborator.
pub struct SalesRow {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub business_unit: Option<String>,
    #[serde(default)]
    pub revenue: Option<AmountField>,
    #[serde(default, alias = "VOLUME")]
    pub volume: Option<AmountField>,
}

impl SalesRow {
    pub fn new(date: &str, business_unit: &str, revenue: f64, volume: u64) -> Self {
        Self {
            date: Some(date.to_string()),
            business_unit: Some(business_unit.to_string()),
            revenue: Some(AmountField::Number(revenue)),
            volume: Some(AmountField::Number(volume as f64)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Business-unit reference row.
pub struct UnitRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Budget target row as returned by the storage collaborator.
pub struct BudgetRow {
    pub month_start: String,
    pub business_unit: String,
    pub target_amount: AmountField,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_field_strips_thousands_separators() {
        assert_eq!(AmountField::Text("1,234.56".into()).value(), 1234.56);
        assert_eq!(AmountField::Text("garbage".into()).value(), 0.0);
        assert_eq!(AmountField::Number(f64::NAN).value(), 0.0);
    }

    #[test]
    fn sales_row_accepts_uppercase_volume_column() {
        let row: SalesRow = serde_json::from_str(
            r#"{"date":"2025-03-01","business_unit":"Picadeli","revenue":"1,000","VOLUME":40}"#,
        )
        .expect("row parses");
        assert_eq!(row.volume.map(|v| v.value()), Some(40.0));
        assert_eq!(row.revenue.map(|v| v.value()), Some(1000.0));
    }
}
