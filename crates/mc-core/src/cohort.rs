//! Cohort construction and simulation.

use std::sync::Arc;
use std::time::Instant;

use mc_common::{CohortId, PatientId, Result, Therapy};
use mc_config::ModelConfig;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::logging::event_names;
use crate::outputs::CohortOutputs;
use crate::parameters::Parameters;
use crate::patient::{check_horizon, Patient};

/// A population of patients simulated under one therapy.
#[derive(Debug)]
pub struct Cohort {
    id: CohortId,
    therapy: Therapy,
    patients: Vec<Patient>,
    horizon: f64,
    alpha: f64,
    parallel: bool,
}

impl Cohort {
    /// Build the cohort's patients.
    ///
    /// Fails with `Error::Config` when the settings cannot produce a
    /// terminating simulation (non-positive `delta_t`, an absorbing initial
    /// state, or an unbounded horizon).
    ///
    /// Patient `i` gets id `id·population_size + i`. Without PSA every
    /// patient shares one parameter set; with PSA patient `i` reads the
    /// parameters of draw `i`.
    pub fn new(id: CohortId, therapy: Therapy, config: &ModelConfig) -> Result<Self> {
        let sim = &config.simulation;
        let population_size = sim.population_size;

        let patients = if config.psa.enabled {
            (0..population_size)
                .map(|i| {
                    let params = Parameters::probabilistic(config, therapy, i as u64)?;
                    Ok(Patient::new(
                        PatientId::for_cohort(id, population_size, i),
                        Arc::new(params),
                    ))
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            let params = Arc::new(Parameters::fixed(config, therapy)?);
            (0..population_size)
                .map(|i| {
                    Patient::new(
                        PatientId::for_cohort(id, population_size, i),
                        Arc::clone(&params),
                    )
                })
                .collect()
        };

        check_horizon(sim.horizon, sim.delta_t)?;

        debug!(
            event = event_names::COHORT_BUILT,
            cohort_id = %id,
            therapy = %therapy,
            population_size,
            psa = config.psa.enabled,
            "cohort built"
        );

        Ok(Self {
            id,
            therapy,
            patients,
            horizon: sim.horizon,
            alpha: sim.alpha,
            parallel: sim.parallel,
        })
    }

    pub fn id(&self) -> CohortId {
        self.id
    }

    pub fn therapy(&self) -> Therapy {
        self.therapy
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn population_size(&self) -> usize {
        self.patients.len()
    }

    /// Override the parallel flag from the configuration.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Simulate every patient to the horizon and reduce the results.
    pub fn simulate(mut self) -> Result<CohortOutputs> {
        let started = Instant::now();
        let horizon = self.horizon;

        if self.parallel {
            self.patients
                .par_iter_mut()
                .try_for_each(|p| p.simulate(horizon))?;
        } else {
            self.patients
                .iter_mut()
                .try_for_each(|p| p.simulate(horizon))?;
        }

        let outputs =
            CohortOutputs::from_patients(self.id, self.therapy, horizon, self.alpha, &self.patients);

        info!(
            event = event_names::COHORT_SIMULATED,
            cohort_id = %self.id,
            therapy = %self.therapy,
            population_size = self.patients.len(),
            deaths = outputs.survival_times().len(),
            events = outputs.times_to_event().len(),
            parallel = self.parallel,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cohort simulated"
        );

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(n: usize) -> ModelConfig {
        let mut config = ModelConfig::default();
        config.simulation.population_size = n;
        config
    }

    #[test]
    fn population_size_matches_config() {
        let cohort = Cohort::new(CohortId(0), Therapy::None, &small_config(37)).unwrap();
        assert_eq!(cohort.patients().len(), 37);
        assert_eq!(cohort.patients()[5].id(), PatientId(5));

        let cohort = Cohort::new(CohortId(2), Therapy::None, &small_config(10)).unwrap();
        assert_eq!(cohort.patients()[3].id(), PatientId(23));
    }

    #[test]
    fn parallel_equals_sequential() {
        let config = small_config(300);
        let par = Cohort::new(CohortId(1), Therapy::None, &config)
            .unwrap()
            .with_parallel(true)
            .simulate()
            .unwrap();
        let seq = Cohort::new(CohortId(1), Therapy::None, &config)
            .unwrap()
            .with_parallel(false)
            .simulate()
            .unwrap();
        assert_eq!(par.survival_times(), seq.survival_times());
        assert_eq!(par.times_to_event(), seq.times_to_event());
        assert_eq!(par.costs(), seq.costs());
        assert_eq!(par.survival_curve(), seq.survival_curve());
    }

    #[test]
    fn psa_cohort_builds_one_parameter_set_per_patient() {
        let mut config = small_config(20);
        config.psa.enabled = true;
        let cohort = Cohort::new(CohortId(0), Therapy::Anticoagulation, &config).unwrap();
        let a = cohort.patients()[0].parameters().transition_matrix().to_vec();
        let b = cohort.patients()[1].parameters().transition_matrix().to_vec();
        assert_ne!(a, b);
    }

    #[test]
    fn absorbing_initial_state_fails_at_construction() {
        let mut config = small_config(5);
        config.simulation.initial_state = mc_common::HealthState::Dead;
        let err = Cohort::new(CohortId(0), Therapy::None, &config).unwrap_err();
        assert!(matches!(err, mc_common::Error::Config(_)));
    }

    #[test]
    fn degenerate_time_settings_fail_at_construction() {
        let mut config = small_config(5);
        config.simulation.delta_t = 0.0;
        assert!(Cohort::new(CohortId(0), Therapy::None, &config).is_err());

        let mut config = small_config(5);
        config.simulation.horizon = f64::INFINITY;
        let err = Cohort::new(CohortId(0), Therapy::None, &config).unwrap_err();
        assert!(matches!(err, mc_common::Error::Config(_)));
    }

    #[test]
    fn invalid_matrix_fails_at_construction() {
        let mut config = small_config(5);
        config.transition_matrix[1] = vec![0.0, 0.25, 0.5, 0.2];
        assert!(Cohort::new(CohortId(0), Therapy::None, &config).is_err());
    }
}
