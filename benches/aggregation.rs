use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use salesboard_config::EngineConfig;
use salesboard_core::{AggregationEngine, MemorySalesStore, PagedReader};
use salesboard_domain::{DateRange, Granularity, Metric, SalesRow, TransactionRecord, VatMode};

const UNITS: [&str; 4] = ["Picadeli", "Juntos house", "Activities", "Tasting place"];

fn build_sample_records(count: usize) -> Vec<TransactionRecord> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    (0..count)
        .map(|idx| {
            TransactionRecord::new(
                start + Duration::days((idx % 369) as i64),
                UNITS[idx % UNITS.len()],
                50.0 + (idx % 100) as f64,
                1 + (idx % 7) as u64,
            )
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let engine = AggregationEngine::new(&EngineConfig::default()).expect("engine");
    let records = build_sample_records(black_box(50_000));

    for granularity in [Granularity::Weekly, Granularity::Monthly] {
        c.bench_function(&format!("aggregate_{granularity}_50k"), |b| {
            b.iter(|| {
                let out = engine
                    .aggregate(&records, granularity, 2025, VatMode::Net)
                    .expect("aggregate");
                black_box(out.all_groups(Metric::Spend));
            })
        });
    }
}

fn bench_paged_read(c: &mut Criterion) {
    let rows: Vec<SalesRow> = build_sample_records(20_000)
        .into_iter()
        .map(|record| {
            SalesRow::new(
                &record.date.format("%Y-%m-%d").to_string(),
                &record.business_unit,
                record.revenue,
                record.transactions,
            )
        })
        .collect();
    let store = MemorySalesStore::new(rows);
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 1, 4).unwrap(),
    )
    .unwrap();

    c.bench_function("paged_read_20k", |b| {
        b.iter_batched(
            || PagedReader::new(1000, 0),
            |reader| black_box(reader.read_all(&store, range).expect("read")),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_aggregation, bench_paged_read);
criterion_main!(benches);
