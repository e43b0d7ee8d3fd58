//! Distribution quantiles for interval estimates, backed by `statrs`.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Upper `1 - alpha/2` quantile of Student's t with `df` degrees of freedom.
///
/// `None` when `alpha` is outside (0, 1) or `df` is not a valid degree count.
pub fn student_t_critical(alpha: f64, df: f64) -> Option<f64> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return None;
    }
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let t = dist.inverse_cdf(1.0 - alpha / 2.0);
    t.is_finite().then_some(t)
}

/// Standard normal quantile at probability `p`, for `p` in (0, 1).
pub fn normal_quantile(p: f64) -> Option<f64> {
    if !(p > 0.0 && p < 1.0) {
        return None;
    }
    let z = Normal::new(0.0, 1.0).ok()?.inverse_cdf(p);
    z.is_finite().then_some(z)
}
