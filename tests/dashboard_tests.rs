mod common;

use common::setup_dashboard;
use salesboard::AppError;
use salesboard_core::{CoreError, DetailQuery};
use salesboard_domain::{
    Granularity, Metric, PeriodRequest, Preset, SeriesKind, UnitSelection, VatMode,
};

#[test]
fn weekly_picadeli_view_with_budget() {
    let (dashboard, _) = setup_dashboard();
    let picadeli = UnitSelection::unit("Picadeli");
    let query = DetailQuery::new(2024, Granularity::Weekly, Metric::Sales)
        .with_selections(vec![picadeli.clone()])
        .with_period(PeriodRequest::Indices { start: 48, end: 49 })
        .with_budget();

    let view = dashboard.detail_view(&query).expect("detail view");
    let current = view.series_for(&picadeli, SeriesKind::Current).expect("current");
    assert_eq!(current.values, vec![15851.0, 14802.0]);
    let budget = view.series_for(&picadeli, SeriesKind::Budget).expect("budget");
    assert_eq!(budget.values, vec![1175.0, 1175.0]);
    assert_eq!(
        dashboard
            .engine()
            .units()
            .resolve("Picadeli")
            .and_then(|unit| unit.id),
        Some(11)
    );
}

#[test]
fn boundary_sale_lands_in_crossover_week() {
    let (dashboard, _) = setup_dashboard();
    let query = DetailQuery::new(2024, Granularity::Weekly, Metric::Sales)
        .with_selections(vec![UnitSelection::unit("Juntos house")])
        .with_period(PeriodRequest::Preset(Preset::Q4));
    let view = dashboard.detail_view(&query).expect("detail view");
    assert_eq!(view.labels.last().map(String::as_str), Some("29/12-04/01"));
    assert_eq!(view.series[0].values.last().copied(), Some(500.0));
}

#[test]
fn diagnostics_count_dropped_rows() {
    let (dashboard, _) = setup_dashboard();
    let aggregation = dashboard
        .aggregate(2024, Granularity::Monthly, VatMode::Gross)
        .expect("aggregate");
    assert_eq!(aggregation.diagnostics.dropped_unknown(), 1);
    assert_eq!(aggregation.diagnostics.invalid_dates, 1);
}

#[test]
fn prior_year_comparison_for_december() {
    let (dashboard, _) = setup_dashboard();
    let query = DetailQuery::new(2024, Granularity::Monthly, Metric::Sales)
        .with_selections(vec![UnitSelection::unit("Picadeli")])
        .with_period(PeriodRequest::Indices { start: 11, end: 11 })
        .with_prior_year();
    let view = dashboard.detail_view(&query).expect("detail view");
    let deltas = view
        .deltas_for(&UnitSelection::unit("Picadeli"))
        .and_then(|entry| entry.vs_prior_year.clone())
        .expect("deltas");
    // (30653 - 13000) / 13000 = 135.79%
    assert_eq!(deltas[0].delta_percent, Some(136));
}

#[test]
fn export_flattens_the_view() {
    let (dashboard, _) = setup_dashboard();
    let query = DetailQuery::new(2024, Granularity::Monthly, Metric::Transactions)
        .with_period(PeriodRequest::Preset(Preset::Q4));
    let table = dashboard.export(&query).expect("export");
    assert_eq!(table.header, vec!["Label", "All Groups '24"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[2].label, "December");
    assert_eq!(table.rows[2].values, vec![880.0 + 822.0 + 20.0]);
}

#[test]
fn summary_and_fiscal_year_guard() {
    let (dashboard, _) = setup_dashboard();
    let summary = dashboard
        .year_summary(2024, &UnitSelection::unit("Picadeli"), VatMode::Gross)
        .expect("summary");
    assert_eq!(summary.total_sales, 15851.0 + 14802.0);
    assert_eq!(summary.best_month.expect("best").name, "December");

    let err = dashboard
        .year_summary(2019, &UnitSelection::AllGroups, VatMode::Gross)
        .expect_err("not a fiscal year");
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[test]
fn unsupported_weekly_preset_is_reported() {
    let (dashboard, _) = setup_dashboard();
    let query = DetailQuery::new(2024, Granularity::Weekly, Metric::Sales)
        .with_period(PeriodRequest::Preset(Preset::Summer));
    let err = dashboard.detail_view(&query).expect_err("summer is monthly only");
    assert!(matches!(
        err,
        AppError::Core(CoreError::UnsupportedPreset { .. })
    ));
}

#[test]
fn config_round_trips_next_to_the_data() {
    let (dashboard, config_manager) = setup_dashboard();
    let loaded = config_manager.load().expect("load config");
    assert_eq!(&loaded, dashboard.config());
}
