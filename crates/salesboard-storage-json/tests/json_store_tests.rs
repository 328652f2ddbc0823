use chrono::NaiveDate;
use salesboard_core::{
    AggregationEngine, FixedClock, PagedReader, ReportService, SalesStore,
};
use salesboard_config::EngineConfig;
use salesboard_domain::{
    AmountField, BudgetRow, DateRange, Granularity, Metric, SalesRow, UnitRow, UnitSelection,
    VatMode,
};
use salesboard_storage_json::{JsonSalesStore, StoragePaths};
use std::fs;
use tempfile::tempdir;

fn year_2025() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2025, 1, 1).expect("date"),
        NaiveDate::from_ymd_opt(2025, 12, 31).expect("date"),
    )
    .expect("range")
}

#[test]
fn missing_documents_open_as_empty() {
    let dir = tempdir().expect("tempdir");
    let store = JsonSalesStore::open(StoragePaths::under(dir.path())).expect("open");
    assert_eq!(store.sales_len(), 0);
    assert!(store.fetch_business_units().expect("units").is_empty());
}

#[test]
fn pages_are_sorted_by_date_and_filtered_by_range() {
    let dir = tempdir().expect("tempdir");
    let mut store = JsonSalesStore::open(StoragePaths::under(dir.path())).expect("open");
    store
        .save_sales(vec![
            SalesRow::new("2025-03-05", "Picadeli", 3.0, 1),
            SalesRow::new("01/03/2025", "Picadeli", 1.0, 1),
            SalesRow::new("2024-12-31", "Picadeli", 9.0, 1),
            SalesRow::new("2025-03-02", "Picadeli", 2.0, 1),
        ])
        .expect("save");

    let first = store.fetch_sales_page(year_2025(), 0, 2).expect("page");
    let second = store.fetch_sales_page(year_2025(), 2, 2).expect("page");
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].date.as_deref(), Some("01/03/2025"));
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].date.as_deref(), Some("2025-03-05"));
}

#[test]
fn documents_survive_reopen() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path());
    {
        let mut store = JsonSalesStore::open(paths.clone()).expect("open");
        store
            .save_units(vec![UnitRow {
                id: 3,
                name: "Picadeli".into(),
            }])
            .expect("units");
        store
            .save_budgets(vec![BudgetRow {
                month_start: "2025-02-01".into(),
                business_unit: "Picadeli".into(),
                target_amount: AmountField::Text("4,700".into()),
            }])
            .expect("budgets");
    }
    let reopened = JsonSalesStore::open(paths).expect("reopen");
    assert_eq!(reopened.fetch_business_units().expect("units")[0].id, 3);
    let budgets = reopened.fetch_budget_targets(year_2025()).expect("budgets");
    assert_eq!(budgets[0].target_amount.value(), 4700.0);
}

#[test]
fn overwrites_leave_a_backup() {
    let dir = tempdir().expect("tempdir");
    let mut store = JsonSalesStore::open(StoragePaths::under(dir.path())).expect("open");
    store
        .save_sales(vec![SalesRow::new("2025-03-05", "Picadeli", 3.0, 1)])
        .expect("first save");
    assert!(store.list_backups("sales_daily.json").expect("list").is_empty());
    store
        .append_sales(vec![SalesRow::new("2025-03-06", "Picadeli", 4.0, 1)])
        .expect("append");
    let backups = store.list_backups("sales_daily.json").expect("list");
    assert_eq!(backups.len(), 1);
    assert_eq!(store.sales_len(), 2);
}

#[test]
fn corrections_rewrite_matching_rows() {
    let dir = tempdir().expect("tempdir");
    let mut store = JsonSalesStore::open(StoragePaths::under(dir.path())).expect("open");
    store
        .save_sales(vec![
            SalesRow::new("2025-03-05", "Picadeli", 3.0, 1),
            SalesRow::new("2025-03-05", "Activities", 8.0, 1),
        ])
        .expect("save");
    let changed = store
        .correct_sales("05/03/2025", "Picadeli", 30.0, 2)
        .expect("correct");
    assert_eq!(changed, 1);
    let rows = store.fetch_sales_page(year_2025(), 0, 10).expect("page");
    let picadeli = rows
        .iter()
        .find(|row| row.business_unit.as_deref() == Some("Picadeli"))
        .expect("row");
    assert_eq!(picadeli.revenue.as_ref().map(AmountField::value), Some(30.0));
}

#[test]
fn non_array_document_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path());
    fs::create_dir_all(&paths.data_root).expect("mkdir");
    fs::write(paths.data_root.join("sales_daily.json"), "{\"rows\": []}").expect("write");
    assert!(JsonSalesStore::open(paths).is_err());
}

#[test]
fn report_service_reads_from_json_store() {
    let dir = tempdir().expect("tempdir");
    let mut store = JsonSalesStore::open(StoragePaths::under(dir.path())).expect("open");
    store
        .save_sales(vec![
            SalesRow::new("2025-01-10", "Picadeli", 110.0, 2),
            SalesRow::new("2025-02-10", "Picadeli", 220.0, 4),
            SalesRow::new("2025-02-11", "Unknown stall", 1.0, 1),
        ])
        .expect("save");

    let engine = AggregationEngine::new(&EngineConfig::default()).expect("engine");
    let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 6, 1).expect("date"));
    let service = ReportService::new(&engine, &store, PagedReader::new(2, 1), &clock);
    let aggregation = service
        .aggregate_year(2025, Granularity::Monthly, VatMode::Net)
        .expect("aggregate");
    let total = aggregation.all_groups(Metric::Sales).total();
    assert!((total - 300.0).abs() < 1e-9);
    assert_eq!(aggregation.diagnostics.dropped_unknown(), 1);

    let summary = service
        .year_summary(2025, &UnitSelection::unit("Picadeli"), VatMode::Gross)
        .expect("summary");
    assert_eq!(summary.total_sales, 330.0);
}
