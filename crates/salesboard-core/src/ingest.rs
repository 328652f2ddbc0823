//! Conversion of raw storage rows into typed records.

use salesboard_domain::{BudgetRow, BudgetTarget, SalesRow, TransactionRecord};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calendar::CalendarModel;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
/// Typed records plus counts of rows that could not be used.
pub struct IngestOutcome<T> {
    pub records: Vec<T>,
    /// Rows whose date could not be parsed.
    pub invalid_dates: usize,
    /// Rows missing a date or a unit name.
    pub incomplete_rows: usize,
}

impl<T> IngestOutcome<T> {
    pub fn skipped(&self) -> usize {
        self.invalid_dates + self.incomplete_rows
    }
}

pub fn ingest_sales_rows(rows: &[SalesRow]) -> IngestOutcome<TransactionRecord> {
    let mut outcome = IngestOutcome {
        records: Vec::with_capacity(rows.len()),
        invalid_dates: 0,
        incomplete_rows: 0,
    };

    for row in rows {
        let (Some(raw_date), Some(unit)) = (row.date.as_deref(), row.business_unit.as_deref())
        else {
            outcome.incomplete_rows += 1;
            continue;
        };
        let date = match CalendarModel::parse_date(raw_date) {
            Ok(date) => date,
            Err(err) => {
                warn!(%err, unit, "skipping sales row");
                outcome.invalid_dates += 1;
                continue;
            }
        };
        let revenue = row.revenue.as_ref().map(|field| field.value()).unwrap_or(0.0);
        let transactions = row
            .volume
            .as_ref()
            .map(|field| field.value().round().max(0.0) as u64)
            .unwrap_or(0);
        outcome
            .records
            .push(TransactionRecord::new(date, unit, revenue, transactions));
    }

    if outcome.skipped() > 0 {
        warn!(
            invalid_dates = outcome.invalid_dates,
            incomplete = outcome.incomplete_rows,
            "sales rows skipped during ingest"
        );
    }
    outcome
}

pub fn ingest_budget_rows(rows: &[BudgetRow]) -> IngestOutcome<BudgetTarget> {
    let mut outcome = IngestOutcome {
        records: Vec::with_capacity(rows.len()),
        invalid_dates: 0,
        incomplete_rows: 0,
    };

    for row in rows {
        if row.business_unit.trim().is_empty() {
            outcome.incomplete_rows += 1;
            continue;
        }
        match CalendarModel::parse_date(&row.month_start) {
            Ok(month_start) => outcome.records.push(BudgetTarget {
                month_start,
                business_unit: row.business_unit.clone(),
                target_amount: row.target_amount.value(),
            }),
            Err(err) => {
                warn!(%err, unit = %row.business_unit, "skipping budget row");
                outcome.invalid_dates += 1;
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use salesboard_domain::AmountField;

    #[test]
    fn parses_formatted_amounts_and_both_date_layouts() {
        let rows = vec![
            SalesRow {
                date: Some("02/12/2024".into()),
                business_unit: Some("Picadeli".into()),
                revenue: Some(AmountField::Text("1,234.50".into())),
                volume: Some(AmountField::Text("12".into())),
            },
            SalesRow::new("2024-12-03", "Picadeli", 10.0, 1),
        ];
        let outcome = ingest_sales_rows(&rows);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(
            outcome.records[0].date,
            NaiveDate::from_ymd_opt(2024, 12, 2).unwrap()
        );
        assert_eq!(outcome.records[0].revenue, 1234.5);
        assert_eq!(outcome.records[0].transactions, 12);
    }

    #[test]
    fn counts_unusable_rows() {
        let rows = vec![
            SalesRow::new("not a date", "Picadeli", 10.0, 1),
            SalesRow {
                date: Some("2024-12-03".into()),
                ..SalesRow::default()
            },
            SalesRow::new("2024-12-03", "Picadeli", 10.0, 1),
        ];
        let outcome = ingest_sales_rows(&rows);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.invalid_dates, 1);
        assert_eq!(outcome.incomplete_rows, 1);
    }

    #[test]
    fn budget_rows_keep_month_start() {
        let rows = vec![BudgetRow {
            month_start: "2025-03-01".into(),
            business_unit: "Picadeli".into(),
            target_amount: AmountField::Number(4700.0),
        }];
        let outcome = ingest_budget_rows(&rows);
        assert_eq!(outcome.records[0].target_amount, 4700.0);
        assert_eq!(outcome.records[0].month_start.format("%m").to_string(), "03");
    }
}
