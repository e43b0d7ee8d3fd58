//! Seeded random streams and empirical-distribution sampling.
//!
//! Every patient (and every PSA draw) owns a private ChaCha8 stream seeded
//! from its id, so outcomes do not depend on thread scheduling.

use mc_common::{Error, Result, PROB_SUM_TOLERANCE};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random stream type used for patients and parameter draws.
pub type PatientRng = ChaCha8Rng;

/// Create a reproducible random stream from a seed.
pub fn seeded_rng(seed: u64) -> PatientRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Categorical distribution over `0..weights.len()` sampled by inverse CDF.
#[derive(Debug, Clone, PartialEq)]
pub struct Empirical {
    weights: Vec<f64>,
    cumulative: Vec<f64>,
}

impl Empirical {
    /// Build a validated distribution from a probability row.
    pub fn new(weights: &[f64]) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::InvalidDistribution("empty probability row".to_string()));
        }
        if let Some((i, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(Error::InvalidDistribution(format!(
                "weight {} at index {} is negative or non-finite",
                w, i
            )));
        }

        let mut cumulative = Vec::with_capacity(weights.len());
        let mut running = 0.0;
        for w in weights {
            running += w;
            cumulative.push(running);
        }

        if (running - 1.0).abs() > PROB_SUM_TOLERANCE {
            return Err(Error::InvalidDistribution(format!(
                "row sums to {}",
                running
            )));
        }

        Ok(Self {
            weights: weights.to_vec(),
            cumulative,
        })
    }

    /// Probability of each category.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Draw one category index.
    ///
    /// Consumes exactly one uniform variate from `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let u: f64 = rng.random();
        self.locate(u)
    }

    /// First category whose cumulative weight exceeds `u`, skipping
    /// zero-weight categories. Rounding slack past the last boundary falls to
    /// the last category with positive weight.
    fn locate(&self, u: f64) -> usize {
        let idx = self.cumulative.partition_point(|&c| c <= u);
        if idx < self.weights.len() && self.weights[idx] > 0.0 {
            return idx;
        }
        self.weights
            .iter()
            .rposition(|&w| w > 0.0)
            .unwrap_or(self.weights.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = seeded_rng(7);
        let mut b = seeded_rng(7);
        let xs: Vec<f64> = (0..16).map(|_| a.random()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.random()).collect();
        assert_eq!(xs, ys);

        let mut c = seeded_rng(8);
        let zs: Vec<f64> = (0..16).map(|_| c.random()).collect();
        assert_ne!(xs, zs);
    }

    #[test]
    fn tolerance_accepts_tiny_drift() {
        assert!(Empirical::new(&[0.5, 0.5 + 1e-9]).is_ok());
        assert!(Empirical::new(&[0.5, 0.5 - 1e-9]).is_ok());
    }

    #[test]
    fn rejects_short_sum() {
        let err = Empirical::new(&[0.5, 0.4]).unwrap_err();
        assert!(matches!(err, Error::InvalidDistribution(_)));
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert!(Empirical::new(&[1.2, -0.2]).is_err());
        assert!(Empirical::new(&[f64::NAN, 1.0]).is_err());
        assert!(Empirical::new(&[]).is_err());
    }

    #[test]
    fn locate_partitions_unit_interval() {
        let dist = Empirical::new(&[0.75, 0.15, 0.0, 0.1]).unwrap();
        assert_eq!(dist.locate(0.0), 0);
        assert_eq!(dist.locate(0.7499), 0);
        assert_eq!(dist.locate(0.75), 1);
        assert_eq!(dist.locate(0.8999), 1);
        // Zero-weight category 2 is skipped.
        assert_eq!(dist.locate(0.9), 3);
        assert_eq!(dist.locate(0.9999999), 3);
    }

    #[test]
    fn rounding_slack_falls_to_last_positive_category() {
        let dist = Empirical::new(&[0.3, 0.7 - 1e-9, 0.0]).unwrap();
        assert_eq!(dist.locate(0.99999999999), 1);
    }

    #[test]
    fn degenerate_row_always_returns_its_category() {
        let dist = Empirical::new(&[0.0, 0.0, 1.0, 0.0]).unwrap();
        let mut rng = seeded_rng(3);
        for _ in 0..1000 {
            assert_eq!(dist.sample(&mut rng), 2);
        }
    }

    #[test]
    fn frequencies_converge_to_weights() {
        let weights = [0.75, 0.15, 0.0, 0.1];
        let dist = Empirical::new(&weights).unwrap();
        let mut rng = seeded_rng(2024);
        let n = 200_000;
        let mut counts = [0usize; 4];
        for _ in 0..n {
            counts[dist.sample(&mut rng)] += 1;
        }
        for (count, w) in counts.iter().zip(weights) {
            let freq = *count as f64 / n as f64;
            assert!((freq - w).abs() < 0.005, "freq {} vs {}", freq, w);
        }
        assert_eq!(counts[2], 0);
    }
}
