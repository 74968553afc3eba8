//! Link-Budget Benchmarks
//!
//! Single-record estimation cost, and sequential vs parallel dataset runs.
//!
//! Run with: cargo bench -p nfcpath-core --bench link_budget_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use nfcpath_core::aggregate::{self, ExecutionMode};
use nfcpath_core::prelude::*;

fn synthetic_dataset(n: usize) -> Vec<AntennaPlacement> {
    (0..n)
        .map(|i| {
            let x0 = (i % 40) as f64 / 100.0;
            let y0 = (i % 80) as f64 / 100.0;
            AntennaPlacement::new(
                format!("device-{i}"),
                NormalizedBox::new(x0, y0, x0 + 0.3, y0 + 0.15),
            )
        })
        .collect()
}

/// Benchmark one record through the calculator
fn bench_single_record(c: &mut Criterion) {
    let calc = LinkBudgetCalculator::new(
        LinkBudgetReferences::default(),
        DeviceGeometryConstants::default(),
    )
    .unwrap();
    let bbox = NormalizedBox::new(0.3, 0.0, 0.7, 0.1);

    c.bench_function("compute_single", |b| {
        b.iter(|| calc.compute(black_box(&bbox)))
    });
}

/// Benchmark dataset annotation: sequential vs parallel
fn bench_dataset_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset_run");
    group.measurement_time(Duration::from_secs(5));

    let refs = LinkBudgetReferences::default();
    let constants = DeviceGeometryConstants::default();

    for size in [100, 1_000, 10_000, 100_000].iter() {
        let records = synthetic_dataset(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("sequential", size), &records, |b, records| {
            b.iter(|| {
                aggregate::run(
                    black_box(records.clone()),
                    &refs,
                    &constants,
                    ExecutionMode::Sequential,
                )
            })
        });

        group.bench_with_input(BenchmarkId::new("parallel", size), &records, |b, records| {
            b.iter(|| {
                aggregate::run(
                    black_box(records.clone()),
                    &refs,
                    &constants,
                    ExecutionMode::Parallel { threads: 0 },
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_record, bench_dataset_run);
criterion_main!(benches);
