//! Property-based tests for sampling and matrix transformations.

use mc_common::HealthState;
use mc_core::parameters::{add_background_mortality, apply_relative_risk};
use mc_core::{seeded_rng, Empirical};
use proptest::prelude::*;

/// Random probability row of length `n` built from positive weights.
fn prob_row(n: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0..10.0f64, n).prop_filter_map("all-zero row", |w| {
        let sum: f64 = w.iter().sum();
        (sum > 1e-6).then(|| w.iter().map(|x| x / sum).collect())
    })
}

fn live_matrix() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (prob_row(4), prob_row(4)).prop_map(|(well, post)| {
        vec![
            well,
            post,
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
        ]
    })
}

fn row_sums_to_one(row: &[f64]) -> bool {
    (row.iter().sum::<f64>() - 1.0).abs() < 1e-9
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Sampled indices are in range and never hit zero-weight categories.
    #[test]
    fn sample_in_support(row in prob_row(6), seed in any::<u64>()) {
        let dist = Empirical::new(&row).unwrap();
        let mut rng = seeded_rng(seed);
        for _ in 0..200 {
            let i = dist.sample(&mut rng);
            prop_assert!(i < row.len());
            prop_assert!(row[i] > 0.0);
        }
    }

    /// Same seed, same draws.
    #[test]
    fn sampling_is_deterministic(row in prob_row(4), seed in any::<u64>()) {
        let dist = Empirical::new(&row).unwrap();
        let mut a = seeded_rng(seed);
        let mut b = seeded_rng(seed);
        let xs: Vec<usize> = (0..50).map(|_| dist.sample(&mut a)).collect();
        let ys: Vec<usize> = (0..50).map(|_| dist.sample(&mut b)).collect();
        prop_assert_eq!(xs, ys);
    }

    /// Rows far from summing to one are rejected.
    #[test]
    fn bad_sums_rejected(row in prob_row(4), scale in 0.5..0.99f64) {
        let scaled: Vec<f64> = row.iter().map(|p| p * scale).collect();
        prop_assert!(Empirical::new(&scaled).is_err());
    }

    /// Relative risk keeps rows stochastic and never raises stroke entries when rr <= 1.
    #[test]
    fn relative_risk_keeps_rows_stochastic(m in live_matrix(), rr in 0.0..3.0f64) {
        let out = apply_relative_risk(&m, rr).unwrap();
        for (i, row) in out.iter().enumerate() {
            prop_assert!(row_sums_to_one(row));
            prop_assert!(row.iter().all(|p| *p >= 0.0));
            if rr <= 1.0 {
                for j in [HealthState::PostStroke.index(), HealthState::Stroke.index()] {
                    if j != i {
                        prop_assert!(row[j] <= m[i][j] + 1e-15);
                    }
                }
            }
        }
        prop_assert_eq!(&out[2], &m[2]);
        prop_assert_eq!(&out[3], &m[3]);
    }

    /// Background mortality never lowers the death probability of a live row.
    #[test]
    fn background_mortality_raises_death(m in live_matrix(), p in 0.0..1.0f64) {
        let out = add_background_mortality(&m, p).unwrap();
        let dead = HealthState::Dead.index();
        for i in 0..2 {
            prop_assert!(row_sums_to_one(&out[i]));
            prop_assert!(out[i][dead] + 1e-15 >= m[i][dead]);
        }
    }
}
