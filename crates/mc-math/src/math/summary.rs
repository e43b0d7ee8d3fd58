//! Sample moments, percentiles, and interval estimators.
//!
//! Functions return NaN (or `None` for intervals) when the sample is too small
//! for the statistic to be defined; callers decide how to surface that.

use serde::{Deserialize, Serialize};

use super::quantile::student_t_critical;

/// Closed interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, x: f64) -> bool {
        self.lower <= x && x <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Arithmetic mean. NaN for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (n - 1 denominator). NaN for fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    ss / (n - 1) as f64
}

/// Sample standard deviation.
pub fn sample_stdev(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Smallest value, NaN if empty.
pub fn min_value(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
}

/// Largest value, NaN if empty.
pub fn max_value(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is a fraction in [0, 1]. The input does not need to be sorted.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() || q.is_nan() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, q)
}

fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Two-sided (1 - alpha) Student-t confidence interval for the mean.
///
/// `None` for fewer than two observations or an invalid alpha.
pub fn t_confidence_interval(values: &[f64], alpha: f64) -> Option<Interval> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let t = student_t_critical(alpha, (n - 1) as f64)?;
    let m = mean(values);
    let half_width = t * sample_stdev(values) / (n as f64).sqrt();
    Some(Interval::new(m - half_width, m + half_width))
}

/// Central (1 - alpha) percentile interval of the sample itself.
pub fn percentile_interval(values: &[f64], alpha: f64) -> Option<Interval> {
    if values.is_empty() || alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(Interval::new(
        percentile_sorted(&sorted, alpha / 2.0),
        percentile_sorted(&sorted, 1.0 - alpha / 2.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn moments_closed_form() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx_eq(mean(&v), 5.0, 1e-12));
        // sum of squares about the mean = 32
        assert!(approx_eq(sample_variance(&v), 32.0 / 7.0, 1e-12));
        assert!(approx_eq(min_value(&v), 2.0, 0.0));
        assert!(approx_eq(max_value(&v), 9.0, 0.0));
    }

    #[test]
    fn empty_and_singleton_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(sample_variance(&[3.0]).is_nan());
        assert!(min_value(&[]).is_nan());
        assert!(percentile(&[], 0.5).is_nan());
    }

    #[test]
    fn percentile_interpolates() {
        let v = [4.0, 1.0, 3.0, 2.0];
        assert!(approx_eq(percentile(&v, 0.0), 1.0, 1e-12));
        assert!(approx_eq(percentile(&v, 1.0), 4.0, 1e-12));
        assert!(approx_eq(percentile(&v, 0.5), 2.5, 1e-12));
        assert!(approx_eq(percentile(&v, 0.25), 1.75, 1e-12));
    }

    #[test]
    fn t_interval_matches_hand_computation() {
        // n = 4, mean = 2.5, s = sqrt(5/3), t_{0.975,3} = 3.182446305
        let v = [1.0, 2.0, 3.0, 4.0];
        let ci = t_confidence_interval(&v, 0.05).expect("interval");
        let half = 3.182_446_305 * (5.0f64 / 3.0).sqrt() / 2.0;
        assert!(approx_eq(ci.lower, 2.5 - half, 1e-5));
        assert!(approx_eq(ci.upper, 2.5 + half, 1e-5));
        assert!(ci.contains(2.5));
    }

    #[test]
    fn t_interval_needs_two_points() {
        assert!(t_confidence_interval(&[], 0.05).is_none());
        assert!(t_confidence_interval(&[1.0], 0.05).is_none());
        assert!(t_confidence_interval(&[1.0, 2.0], 0.0).is_none());
    }

    #[test]
    fn constant_sample_has_zero_width_interval() {
        let ci = t_confidence_interval(&[3.5, 3.5, 3.5], 0.05).expect("interval");
        assert!(approx_eq(ci.width(), 0.0, 1e-12));
    }

    #[test]
    fn percentile_interval_bounds() {
        let v: Vec<f64> = (0..=100).map(f64::from).collect();
        let pi = percentile_interval(&v, 0.05).expect("interval");
        assert!(approx_eq(pi.lower, 2.5, 1e-12));
        assert!(approx_eq(pi.upper, 97.5, 1e-12));
        assert!(percentile_interval(&[], 0.05).is_none());
    }
}
