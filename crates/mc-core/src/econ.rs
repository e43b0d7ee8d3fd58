//! Discounting and two-arm cost-effectiveness comparison.

use serde::Serialize;

use crate::outputs::CohortOutputs;

/// Present value of `amount` received after `periods` periods at `rate` per period.
///
/// The state monitor calls this with the half-cycle rate `r·Δt/2` and
/// `2k + 1` periods, which discounts a cycle's accrual to its midpoint.
pub fn present_value(amount: f64, rate: f64, periods: u64) -> f64 {
    if rate == 0.0 {
        return amount;
    }
    amount / (1.0 + rate).powf(periods as f64)
}

/// Dominance classification of the alternative arm against the base arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dominance {
    /// Cheaper and at least as effective.
    Dominant,
    /// More expensive and no more effective.
    Dominated,
    /// Trade-off: the ICER decides.
    TradeOff,
    /// One of the arms has no observations.
    Undetermined,
}

/// Incremental comparison of two simulated therapy arms.
#[derive(Debug, Clone, Serialize)]
pub struct CostEffectiveness {
    pub base_label: String,
    pub alternative_label: String,
    pub base_mean_cost: Option<f64>,
    pub alternative_mean_cost: Option<f64>,
    pub base_mean_utility: Option<f64>,
    pub alternative_mean_utility: Option<f64>,
    pub incremental_cost: Option<f64>,
    pub incremental_utility: Option<f64>,
    /// Incremental cost per unit of utility gained; `None` when undefined.
    pub icer: Option<f64>,
    pub dominance: Dominance,
}

impl CostEffectiveness {
    /// Compare `alternative` against `base`.
    pub fn compare(
        base_label: &str,
        base: &CohortOutputs,
        alternative_label: &str,
        alternative: &CohortOutputs,
    ) -> Self {
        let base_cost = base.cost_stat().estimate().ok().map(|e| e.mean);
        let alt_cost = alternative.cost_stat().estimate().ok().map(|e| e.mean);
        let base_utility = base.utility_stat().estimate().ok().map(|e| e.mean);
        let alt_utility = alternative.utility_stat().estimate().ok().map(|e| e.mean);

        let incremental_cost = base_cost.zip(alt_cost).map(|(b, a)| a - b);
        let incremental_utility = base_utility.zip(alt_utility).map(|(b, a)| a - b);

        let icer = match (incremental_cost, incremental_utility) {
            (Some(dc), Some(du)) if du != 0.0 => Some(dc / du),
            _ => None,
        };

        let dominance = match (incremental_cost, incremental_utility) {
            (Some(dc), Some(du)) if dc <= 0.0 && du >= 0.0 => Dominance::Dominant,
            (Some(dc), Some(du)) if dc > 0.0 && du <= 0.0 => Dominance::Dominated,
            (Some(_), Some(_)) => Dominance::TradeOff,
            _ => Dominance::Undetermined,
        };

        Self {
            base_label: base_label.to_string(),
            alternative_label: alternative_label.to_string(),
            base_mean_cost: base_cost,
            alternative_mean_cost: alt_cost,
            base_mean_utility: base_utility,
            alternative_mean_utility: alt_utility,
            incremental_cost,
            incremental_utility,
            icer,
            dominance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_is_identity() {
        assert_eq!(present_value(1234.5, 0.0, 7), 1234.5);
    }

    #[test]
    fn positive_rate_discounts() {
        let pv = present_value(100.0, 0.015, 1);
        assert!((pv - 100.0 / 1.015).abs() < 1e-12);
        assert!(present_value(100.0, 0.015, 5) < pv);
    }

    #[test]
    fn huge_period_count_discounts_to_zero() {
        let pv = present_value(100.0, 0.015, u64::MAX);
        assert_eq!(pv, 0.0);
        assert_eq!(present_value(100.0, 0.0, u64::MAX), 100.0);
    }
}
