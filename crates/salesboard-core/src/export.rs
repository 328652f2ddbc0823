//! Flattening of detail views into tabular rows. Serialising the rows to a file format is
//! left to the caller.

use salesboard_domain::DetailView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRow {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportTable {
    pub header: Vec<String>,
    pub rows: Vec<ExportRow>,
}

impl ExportTable {
    /// One row per period label, one column per series.
    pub fn from_view(view: &DetailView) -> Self {
        let mut header = vec!["Label".to_string()];
        header.extend(view.series.iter().map(|series| series.label.clone()));

        let rows = view
            .labels
            .iter()
            .enumerate()
            .map(|(index, label)| ExportRow {
                label: label.clone(),
                values: view
                    .series
                    .iter()
                    .map(|series| series.values.get(index).copied().unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        Self { header, rows }
    }

    /// One row per series with a trailing total column.
    pub fn breakdown(view: &DetailView) -> Self {
        let mut header = vec!["Label".to_string()];
        header.extend(view.labels.iter().cloned());
        header.push("Total".to_string());

        let rows = view
            .series
            .iter()
            .map(|series| {
                let mut values: Vec<f64> = (0..view.labels.len())
                    .map(|index| series.values.get(index).copied().unwrap_or(0.0))
                    .collect();
                values.push(values.iter().sum());
                ExportRow {
                    label: series.label.clone(),
                    values,
                }
            })
            .collect();

        Self { header, rows }
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesboard_domain::{Granularity, Metric, Series, SeriesKind, UnitSelection, VatMode};

    fn view() -> DetailView {
        DetailView {
            year: 2025,
            granularity: Granularity::Monthly,
            metric: Metric::Sales,
            vat: VatMode::Gross,
            labels: vec!["January".into(), "February".into()],
            series: vec![
                Series {
                    label: "All Groups '25".into(),
                    selection: UnitSelection::AllGroups,
                    kind: SeriesKind::Current,
                    values: vec![10.0, 20.0],
                },
                Series {
                    label: "All Groups Budget".into(),
                    selection: UnitSelection::AllGroups,
                    kind: SeriesKind::Budget,
                    values: vec![5.0],
                },
            ],
            deltas: Vec::new(),
        }
    }

    #[test]
    fn rows_follow_period_labels() {
        let table = ExportTable::from_view(&view());
        assert_eq!(table.header, vec!["Label", "All Groups '25", "All Groups Budget"]);
        assert_eq!(table.rows[1].label, "February");
        assert_eq!(table.rows[1].values, vec![20.0, 0.0]);
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn breakdown_appends_totals() {
        let table = ExportTable::breakdown(&view());
        assert_eq!(table.header.last().map(String::as_str), Some("Total"));
        assert_eq!(table.rows[0].values, vec![10.0, 20.0, 30.0]);
        assert_eq!(table.rows[1].values, vec![5.0, 0.0, 5.0]);
    }
}
