//! A single simulated patient.

use std::sync::Arc;

use mc_common::{Error, HealthState, PatientId, Result};
use tracing::trace;

use crate::monitor::PatientStateMonitor;
use crate::parameters::Parameters;
use crate::rng::seeded_rng;

/// Upper bound on the number of cycles a single patient may run.
pub const MAX_CYCLES: u64 = 1 << 32;

/// Reject horizons that are not finite and non-negative, or that would
/// need more than [`MAX_CYCLES`] cycles of length `delta_t`.
pub fn check_horizon(horizon: f64, delta_t: f64) -> Result<()> {
    if !horizon.is_finite() || horizon < 0.0 {
        return Err(Error::Config(format!(
            "horizon must be finite and non-negative, got {}",
            horizon
        )));
    }
    let cycles = (horizon / delta_t).ceil();
    if !(cycles <= MAX_CYCLES as f64) {
        return Err(Error::Config(format!(
            "horizon {} with delta_t {} needs {} cycles, more than {}",
            horizon, delta_t, cycles, MAX_CYCLES
        )));
    }
    Ok(())
}

/// One patient: parameters, a private random stream, and a state monitor.
#[derive(Debug, Clone)]
pub struct Patient {
    id: PatientId,
    params: Arc<Parameters>,
    monitor: PatientStateMonitor,
    simulated: bool,
}

impl Patient {
    pub fn new(id: PatientId, params: Arc<Parameters>) -> Self {
        let monitor = PatientStateMonitor::new(Arc::clone(&params));
        Self {
            id,
            params,
            monitor,
            simulated: false,
        }
    }

    /// Run the patient until an absorbing state or the horizon.
    ///
    /// The random stream is seeded from the patient id, so the trajectory
    /// depends only on the id and the parameters. A patient can be
    /// simulated once.
    pub fn simulate(&mut self, horizon: f64) -> Result<()> {
        if self.simulated {
            return Err(Error::AlreadySimulated { patient: self.id });
        }
        let delta_t = self.params.delta_t();
        check_horizon(horizon, delta_t)?;
        self.simulated = true;

        let mut rng = seeded_rng(self.id.seed());

        let mut k: u64 = 0;
        while self.monitor.is_alive() && (k as f64) * delta_t < horizon {
            let dist = self.params.transition_dist(self.monitor.current_state())?;
            let next = HealthState::from_index(dist.sample(&mut rng))?;
            self.monitor.update(k, next);
            k += 1;
        }

        trace!(
            patient_id = %self.id,
            cycles = k,
            final_state = %self.monitor.current_state(),
            survival_time = ?self.monitor.survival_time(),
            time_to_event = ?self.monitor.time_to_event(),
            "patient simulated"
        );
        Ok(())
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated
    }

    pub fn monitor(&self) -> &PatientStateMonitor {
        &self.monitor
    }

    pub fn survival_time(&self) -> Option<f64> {
        self.monitor.survival_time()
    }

    pub fn time_to_event(&self) -> Option<f64> {
        self.monitor.time_to_event()
    }

    pub fn total_discounted_cost(&self) -> f64 {
        self.monitor.total_discounted_cost()
    }

    pub fn total_discounted_utility(&self) -> f64 {
        self.monitor.total_discounted_utility()
    }
}
