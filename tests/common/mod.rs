use std::sync::Mutex;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use salesboard::Dashboard;
use salesboard_config::{ConfigManager, EngineConfig};
use salesboard_core::FixedClock;
use salesboard_domain::{AmountField, BudgetRow, SalesRow, UnitRow};
use salesboard_storage_json::{JsonSalesStore, StoragePaths};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Two Decembers of Picadeli trading plus one boundary-week sale and a budget row.
pub fn seed_rows() -> (Vec<SalesRow>, Vec<BudgetRow>, Vec<UnitRow>) {
    let sales = vec![
        SalesRow::new("2024-12-02", "Picadeli", 15851.0, 880),
        SalesRow::new("2024-12-09", "Picadeli", 14802.0, 822),
        SalesRow::new("2023-12-04", "Picadeli", 13000.0, 800),
        SalesRow::new("2024-12-30", "Juntos house", 500.0, 20),
        SalesRow::new("not-a-date", "Picadeli", 1.0, 1),
        SalesRow::new("2024-06-12", "Ghost kitchen", 75.0, 3),
    ];
    let budgets = vec![BudgetRow {
        month_start: "2024-12-01".into(),
        business_unit: "Picadeli".into(),
        target_amount: AmountField::Number(4700.0),
    }];
    let units = vec![UnitRow {
        id: 11,
        name: "Picadeli".into(),
    }];
    (sales, budgets, units)
}

/// Creates an isolated data root seeded with [`seed_rows`] and a dashboard over it.
pub fn setup_dashboard() -> (Dashboard, ConfigManager) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    let config = EngineConfig::default();
    config_manager.save(&config).expect("save config");

    let (sales, budgets, units) = seed_rows();
    let mut store = JsonSalesStore::open(StoragePaths::under(&base)).expect("open store");
    store.save_sales(sales).expect("seed sales");
    store.save_budgets(budgets).expect("seed budgets");
    store.save_units(units).expect("seed units");

    let mut dashboard = Dashboard::new(config, Box::new(store))
        .expect("dashboard")
        .with_clock(Box::new(FixedClock(date(2024, 12, 11))));
    dashboard.refresh_units().expect("refresh units");
    (dashboard, config_manager)
}
