//! Criterion benchmarks for `mc-math`.
//!
//! Focus on the kernels that run once per reported metric.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mc_math::math::quantile::student_t_critical;
use mc_math::math::summary::{percentile_interval, t_confidence_interval};

fn bench_t_critical(c: &mut Criterion) {
    let mut group = c.benchmark_group("student_t");

    for df in [1.0, 9.0, 199.0, 1999.0] {
        group.bench_with_input(BenchmarkId::new("critical", df as u64), &df, |b, &df| {
            b.iter(|| black_box(student_t_critical(black_box(0.05), black_box(df))));
        });
    }

    group.finish();
}

fn bench_intervals(c: &mut Criterion) {
    let mut group = c.benchmark_group("intervals");

    // Cohort-sized samples of survival times.
    for n in [200usize, 2_000, 20_000] {
        let values: Vec<f64> = (0..n).map(|i| (i % 50) as f64 + 0.5).collect();
        group.bench_with_input(BenchmarkId::new("t_ci", n), &values, |b, v| {
            b.iter(|| black_box(t_confidence_interval(black_box(v), 0.05)));
        });
        group.bench_with_input(BenchmarkId::new("percentile", n), &values, |b, v| {
            b.iter(|| black_box(percentile_interval(black_box(v), 0.05)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_t_critical, bench_intervals);
criterion_main!(benches);
