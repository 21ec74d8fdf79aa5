//! Criterion benchmarks for the analysis hot paths.
//!
//! Benchmarks:
//! 1. Table construction from raw records
//! 2. Clean (dedupe, date coercion, key filtering)
//! 3. Feature extraction (margins, growth, trailing windows, calendar fields)
//! 4. Trend aggregation

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use codal_core::analysis::{analyze_trends, extract_features};
use codal_core::data::{clean, records_to_frame, RawRecord, SyntheticGenerator};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_records(symbols: usize, per_symbol: usize) -> Vec<RawRecord> {
    let generator = SyntheticGenerator::new(Some(42));
    let today = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    (0..symbols)
        .flat_map(|s| generator.generate_reports_as_of(&format!("SYM{s}"), per_symbol, today))
        .map(|r| r.to_raw())
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_pipeline_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");

    for &(symbols, per_symbol) in &[(5, 5), (50, 52), (200, 260)] {
        let rows = symbols * per_symbol;
        let records = make_records(symbols, per_symbol);
        let table = records_to_frame(&records).unwrap();
        let cleaned = clean(Some(&table)).unwrap().unwrap();

        group.bench_with_input(BenchmarkId::new("records_to_frame", rows), &records, |b, r| {
            b.iter(|| records_to_frame(black_box(r)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("clean", rows), &table, |b, t| {
            b.iter(|| clean(Some(black_box(t))).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("extract_features", rows), &cleaned, |b, t| {
            b.iter(|| extract_features(Some(black_box(t))).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("analyze_trends", rows), &cleaned, |b, t| {
            b.iter(|| analyze_trends(Some(black_box(t))).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline_stages);
criterion_main!(benches);
