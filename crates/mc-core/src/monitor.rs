//! Per-patient state machine and outcome accumulation.

use std::sync::Arc;

use mc_common::HealthState;

use crate::econ::present_value;
use crate::parameters::Parameters;

/// Tracks one patient's state and derived outcomes during simulation.
///
/// Times are half-cycle corrected: a transition sampled in cycle `k` is
/// recorded at `(k + 0.5)·Δt`.
#[derive(Debug, Clone)]
pub struct PatientStateMonitor {
    params: Arc<Parameters>,
    current: HealthState,
    delta_t: f64,
    survival_time: Option<f64>,
    time_to_event: Option<f64>,
    ever_developed_event: bool,
    total_discounted_cost: f64,
    total_discounted_utility: f64,
    path: Vec<HealthState>,
}

impl PatientStateMonitor {
    pub fn new(params: Arc<Parameters>) -> Self {
        let initial = params.initial_health_state();
        let delta_t = params.delta_t();
        Self {
            params,
            current: initial,
            delta_t,
            survival_time: None,
            time_to_event: None,
            ever_developed_event: false,
            total_discounted_cost: 0.0,
            total_discounted_utility: 0.0,
            path: vec![initial],
        }
    }

    /// Record the transition sampled in cycle `k`.
    ///
    /// No-op once the patient is in an absorbing state.
    pub fn update(&mut self, k: u64, next: HealthState) {
        if self.is_terminal() {
            return;
        }

        self.accumulate(k, next);

        let t = (k as f64 + 0.5) * self.delta_t;
        if next.is_absorbing() && self.survival_time.is_none() {
            self.survival_time = Some(t);
        }
        if !self.current.is_event() && next.is_event() && !self.ever_developed_event {
            self.ever_developed_event = true;
            self.time_to_event = Some(t);
        }

        self.current = next;
        self.path.push(next);
    }

    /// Add the cycle's cost and utility, averaged over both ends of the
    /// transition and discounted to the cycle midpoint.
    fn accumulate(&mut self, k: u64, next: HealthState) {
        let params = &self.params;
        let dt = self.delta_t;
        let cost = 0.5 * (params.annual_cost(self.current) + params.annual_cost(next)) * dt;
        let utility = 0.5
            * (params.annual_state_utility(self.current) + params.annual_state_utility(next))
            * dt;

        let rate = params.discount_rate() * dt / 2.0;
        let periods = k.saturating_mul(2).saturating_add(1);
        self.total_discounted_cost += present_value(cost, rate, periods);
        self.total_discounted_utility += present_value(utility, rate, periods);
    }

    pub fn current_state(&self) -> HealthState {
        self.current
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_absorbing()
    }

    pub fn is_alive(&self) -> bool {
        !self.is_terminal()
    }

    /// Time of entry into an absorbing state; `None` while alive.
    pub fn survival_time(&self) -> Option<f64> {
        self.survival_time
    }

    /// Time of first entry into the event state; `None` if never reached.
    pub fn time_to_event(&self) -> Option<f64> {
        self.time_to_event
    }

    pub fn ever_developed_event(&self) -> bool {
        self.ever_developed_event
    }

    pub fn total_discounted_cost(&self) -> f64 {
        self.total_discounted_cost
    }

    pub fn total_discounted_utility(&self) -> f64 {
        self.total_discounted_utility
    }

    /// States visited, starting with the initial state.
    pub fn path(&self) -> &[HealthState] {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_common::Therapy;
    use mc_config::ModelConfig;

    fn params() -> Arc<Parameters> {
        Arc::new(Parameters::fixed(&ModelConfig::default(), Therapy::None).unwrap())
    }

    #[test]
    fn starts_in_initial_state_with_no_outcomes() {
        let p = params();
        let m = PatientStateMonitor::new(p);
        assert_eq!(m.current_state(), HealthState::Well);
        assert!(m.is_alive());
        assert_eq!(m.survival_time(), None);
        assert_eq!(m.time_to_event(), None);
        assert_eq!(m.path(), &[HealthState::Well]);
    }

    #[test]
    fn half_cycle_correction_on_death() {
        let p = params();
        let mut m = PatientStateMonitor::new(p);
        for k in 0..3 {
            m.update(k, HealthState::Well);
        }
        m.update(3, HealthState::Dead);
        assert_eq!(m.survival_time(), Some(3.5));
        assert!(!m.is_alive());
    }

    #[test]
    fn half_cycle_scales_with_delta_t() {
        let mut config = ModelConfig::default();
        config.simulation.delta_t = 0.25;
        let p = Arc::new(Parameters::fixed(&config, Therapy::None).unwrap());
        let mut m = PatientStateMonitor::new(p);
        m.update(0, HealthState::Well);
        m.update(1, HealthState::PostStroke);
        assert_eq!(m.time_to_event(), Some(0.375));
    }

    #[test]
    fn event_recorded_once() {
        let p = params();
        let mut m = PatientStateMonitor::new(p);
        m.update(0, HealthState::PostStroke);
        m.update(1, HealthState::PostStroke);
        assert_eq!(m.time_to_event(), Some(0.5));
        assert!(m.ever_developed_event());
        m.update(2, HealthState::Stroke);
        assert_eq!(m.time_to_event(), Some(0.5));
        assert_eq!(m.survival_time(), Some(2.5));
    }

    #[test]
    fn updates_after_death_are_ignored() {
        let p = params();
        let mut m = PatientStateMonitor::new(p);
        m.update(0, HealthState::Well);
        m.update(1, HealthState::Dead);
        let cost = m.total_discounted_cost();
        let utility = m.total_discounted_utility();

        m.update(2, HealthState::Well);
        m.update(3, HealthState::PostStroke);

        assert_eq!(m.current_state(), HealthState::Dead);
        assert_eq!(m.survival_time(), Some(1.5));
        assert_eq!(m.time_to_event(), None);
        assert_eq!(m.total_discounted_cost(), cost);
        assert_eq!(m.total_discounted_utility(), utility);
        assert_eq!(m.path().len(), 3);
    }

    #[test]
    fn extreme_cycle_index_stays_finite() {
        let mut config = ModelConfig::default();
        config.simulation.discount_rate = 0.03;
        let p = Arc::new(Parameters::fixed(&config, Therapy::None).unwrap());
        let mut m = PatientStateMonitor::new(p);
        m.update(u64::MAX, HealthState::PostStroke);
        assert!(m.total_discounted_cost().is_finite());
        assert!(m.total_discounted_utility().is_finite());
        assert!(m.time_to_event().is_some_and(f64::is_finite));
    }

    #[test]
    fn undiscounted_cycle_accrual_averages_both_ends() {
        let p = params();
        let mut m = PatientStateMonitor::new(p);
        m.update(0, HealthState::PostStroke);
        assert!((m.total_discounted_cost() - 0.5 * (2756.0 + 3025.0)).abs() < 1e-9);
        assert!((m.total_discounted_utility() - 0.5 * (0.75 + 0.5)).abs() < 1e-12);
    }

    #[test]
    fn discounting_reduces_totals() {
        let plain = params();
        let mut config = ModelConfig::default();
        config.simulation.discount_rate = 0.03;
        let discounted = Arc::new(Parameters::fixed(&config, Therapy::None).unwrap());

        let mut a = PatientStateMonitor::new(plain);
        let mut b = PatientStateMonitor::new(discounted);
        for k in 0..5 {
            a.update(k, HealthState::Well);
            b.update(k, HealthState::Well);
        }
        assert!(b.total_discounted_cost() < a.total_discounted_cost());
        assert!(b.total_discounted_utility() < a.total_discounted_utility());
        assert!((a.total_discounted_cost() - 5.0 * 2756.0).abs() < 1e-9);
    }

    #[test]
    fn drug_cost_stops_at_absorption() {
        let p = Arc::new(Parameters::fixed(&ModelConfig::default(), Therapy::Anticoagulation).unwrap());
        let mut m = PatientStateMonitor::new(p);
        m.update(0, HealthState::Dead);
        let expected = 0.5 * ((2756.0 + 5000.0) + 0.0);
        assert!((m.total_discounted_cost() - expected).abs() < 1e-9);
    }
}
