//! Criterion benchmarks for cohort simulation.
//!
//! Covers the per-patient sampling loop and the sequential vs rayon paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mc_common::{CohortId, Therapy};
use mc_config::ModelConfig;
use mc_core::{seeded_rng, Cohort, Empirical};

fn bench_empirical_sample(c: &mut Criterion) {
    let dist = Empirical::new(&[0.75, 0.15, 0.0, 0.1]).expect("valid row");
    let mut rng = seeded_rng(7);
    c.bench_function("empirical_sample", |b| {
        b.iter(|| black_box(dist.sample(&mut rng)));
    });
}

fn bench_cohort(c: &mut Criterion) {
    let mut group = c.benchmark_group("cohort");
    group.sample_size(20);

    for n in [200usize, 2_000] {
        for parallel in [false, true] {
            let mut config = ModelConfig::default();
            config.simulation.population_size = n;
            config.simulation.parallel = parallel;
            let label = if parallel { "parallel" } else { "sequential" };

            group.bench_with_input(BenchmarkId::new(label, n), &config, |b, config| {
                b.iter(|| {
                    let cohort = Cohort::new(CohortId(0), Therapy::Anticoagulation, config)
                        .expect("cohort builds");
                    black_box(cohort.simulate().expect("cohort simulates"))
                });
            });
        }
    }

    let mut psa = ModelConfig::default();
    psa.simulation.population_size = 2_000;
    psa.psa.enabled = true;
    group.bench_function("psa/2000", |b| {
        b.iter(|| {
            let cohort =
                Cohort::new(CohortId(0), Therapy::Anticoagulation, &psa).expect("cohort builds");
            black_box(cohort.simulate().expect("cohort simulates"))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_empirical_sample, bench_cohort);
criterion_main!(benches);
