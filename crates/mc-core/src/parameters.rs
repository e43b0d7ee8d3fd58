//! Model parameters shared by the patients of a cohort.
//!
//! A [`Parameters`] value is immutable once built. The fixed variant is
//! shared by every patient through an `Arc`; the probabilistic variant is
//! re-derived per PSA draw from a sampled treatment relative risk.

use mc_common::{Error, HealthState, Result, Therapy};
use mc_config::ModelConfig;
use mc_math::normal_quantile;
use rand_distr::{Distribution, LogNormal};
use serde::Serialize;
use tracing::debug;

use crate::rng::{seeded_rng, Empirical};

/// Added to a draw index before seeding, keeping PSA streams apart from
/// patient streams (which are seeded by patient id).
const PSA_STREAM_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// How the transition matrix was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterKind {
    /// Base matrix (with the point-estimate relative risk under therapy).
    Fixed,
    /// Matrix derived from one sampled relative risk.
    Probabilistic { draw_index: u64, relative_risk: f64 },
}

/// Immutable parameter bundle read by patients and their state monitors.
#[derive(Debug, Clone)]
pub struct Parameters {
    kind: ParameterKind,
    therapy: Therapy,
    initial_state: HealthState,
    delta_t: f64,
    discount_rate: f64,
    transition_matrix: Vec<Vec<f64>>,
    distributions: Vec<Empirical>,
    annual_state_cost: Vec<f64>,
    annual_state_utility: Vec<f64>,
    annual_drug_cost: f64,
}

impl Parameters {
    /// Parameters with the base matrix.
    ///
    /// Under anticoagulation the point-estimate relative risk is applied.
    pub fn fixed(config: &ModelConfig, therapy: Therapy) -> Result<Self> {
        let rr = match therapy {
            Therapy::None => None,
            Therapy::Anticoagulation => Some(config.treatment.relative_risk),
        };
        Self::build(config, therapy, ParameterKind::Fixed, rr)
    }

    /// Parameters for one PSA draw.
    ///
    /// The relative risk is drawn from a log-normal matched to the configured
    /// 95% interval, using a stream seeded from `draw_index`. The draw is
    /// recorded for both therapies but only perturbs the matrix under
    /// anticoagulation.
    pub fn probabilistic(config: &ModelConfig, therapy: Therapy, draw_index: u64) -> Result<Self> {
        let relative_risk = sample_relative_risk(config, draw_index)?;
        let kind = ParameterKind::Probabilistic {
            draw_index,
            relative_risk,
        };
        let rr = match therapy {
            Therapy::None => None,
            Therapy::Anticoagulation => Some(relative_risk),
        };
        Self::build(config, therapy, kind, rr)
    }

    fn build(
        config: &ModelConfig,
        therapy: Therapy,
        kind: ParameterKind,
        relative_risk: Option<f64>,
    ) -> Result<Self> {
        let delta_t = config.simulation.delta_t;
        if !delta_t.is_finite() || delta_t <= 0.0 {
            return Err(Error::Config(format!(
                "delta_t must be finite and positive, got {}",
                delta_t
            )));
        }
        let initial_state = config.simulation.initial_state;
        if initial_state.is_absorbing() {
            return Err(Error::Config(format!(
                "initial_state '{}' is absorbing; patients would start dead",
                initial_state
            )));
        }
        check_state_table("annual_state_cost", &config.annual_state_cost)?;
        check_state_table("annual_state_utility", &config.annual_state_utility)?;

        let mut matrix = config.transition_matrix.clone();
        if let Some(rr) = relative_risk {
            matrix = apply_relative_risk(&matrix, rr)?;
        }
        if config.background_mortality.enabled {
            let p = config.background_mortality.step_probability(delta_t);
            matrix = add_background_mortality(&matrix, p)?;
        }

        let distributions = build_distributions(&matrix)?;
        let annual_drug_cost = match therapy {
            Therapy::None => 0.0,
            Therapy::Anticoagulation => config.treatment.annual_drug_cost,
        };

        Ok(Self {
            kind,
            therapy,
            initial_state,
            delta_t,
            discount_rate: config.simulation.discount_rate,
            transition_matrix: matrix,
            distributions,
            annual_state_cost: config.annual_state_cost.clone(),
            annual_state_utility: config.annual_state_utility.clone(),
            annual_drug_cost,
        })
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Transition probability row of `state`.
    pub fn transition_prob(&self, state: HealthState) -> Result<&[f64]> {
        self.transition_matrix
            .get(state.index())
            .map(Vec::as_slice)
            .ok_or(Error::InvalidState {
                index: state.index(),
                count: self.transition_matrix.len(),
            })
    }

    /// Validated sampler for the transition row of `state`.
    pub fn transition_dist(&self, state: HealthState) -> Result<&Empirical> {
        self.distributions
            .get(state.index())
            .ok_or(Error::InvalidState {
                index: state.index(),
                count: self.distributions.len(),
            })
    }

    pub fn transition_matrix(&self) -> &[Vec<f64>] {
        &self.transition_matrix
    }

    pub fn initial_health_state(&self) -> HealthState {
        self.initial_state
    }

    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    pub fn therapy(&self) -> Therapy {
        self.therapy
    }

    /// Annual drug cost of the therapy (zero without therapy).
    pub fn annual_drug_cost(&self) -> f64 {
        self.annual_drug_cost
    }

    pub fn annual_state_cost(&self, state: HealthState) -> f64 {
        self.annual_state_cost[state.index()]
    }

    pub fn annual_state_utility(&self, state: HealthState) -> f64 {
        self.annual_state_utility[state.index()]
    }

    /// Annual cost while occupying `state`, including the drug cost for
    /// patients still on therapy (any non-absorbing state).
    pub fn annual_cost(&self, state: HealthState) -> f64 {
        let drug = if state.is_absorbing() {
            0.0
        } else {
            self.annual_drug_cost
        };
        self.annual_state_cost(state) + drug
    }
}

fn check_state_table(name: &str, values: &[f64]) -> Result<()> {
    if values.len() != HealthState::COUNT {
        return Err(Error::Config(format!(
            "{} has {} entries, expected {}",
            name,
            values.len(),
            HealthState::COUNT
        )));
    }
    Ok(())
}

fn build_distributions(matrix: &[Vec<f64>]) -> Result<Vec<Empirical>> {
    if matrix.len() != HealthState::COUNT {
        return Err(Error::InvalidState {
            index: matrix.len().min(HealthState::COUNT),
            count: HealthState::COUNT,
        });
    }
    matrix
        .iter()
        .zip(HealthState::ALL)
        .map(|(row, state)| {
            if row.len() != HealthState::COUNT {
                return Err(Error::InvalidDistribution(format!(
                    "row '{}' has {} columns, expected {}",
                    state,
                    row.len(),
                    HealthState::COUNT
                )));
            }
            Empirical::new(row).map_err(|e| match e {
                Error::InvalidDistribution(msg) => {
                    Error::InvalidDistribution(format!("row '{}': {}", state, msg))
                }
                other => other,
            })
        })
        .collect()
}

/// Log-normal parameters `(mu, sigma)` matched to a point estimate and its 95% interval.
pub fn lognormal_params(point: f64, ci: [f64; 2]) -> Result<(f64, f64)> {
    let z = normal_quantile(0.975)
        .ok_or_else(|| Error::InvalidDistribution("standard normal quantile undefined".into()))?;
    let mu = point.ln();
    let sigma = (ci[1].ln() - ci[0].ln()) / (2.0 * z);
    Ok((mu, sigma))
}

/// Draw the treatment relative risk for PSA draw `draw_index`.
pub fn sample_relative_risk(config: &ModelConfig, draw_index: u64) -> Result<f64> {
    let (mu, sigma) = lognormal_params(
        config.treatment.relative_risk,
        config.treatment.relative_risk_ci,
    )?;
    let dist = LogNormal::new(mu, sigma).map_err(|e| {
        Error::InvalidDistribution(format!(
            "relative risk log-normal(mu={}, sigma={}): {}",
            mu, sigma, e
        ))
    })?;
    let mut rng = seeded_rng(draw_index.wrapping_add(PSA_STREAM_SALT));
    Ok(dist.sample(&mut rng))
}

/// Scale stroke transitions of every live row by `rr`.
///
/// Off-diagonal entries into stroke-class states are multiplied by `rr` and
/// the difference is moved onto the diagonal. When the diagonal cannot absorb
/// it (rr > 1 with a small self-transition) the scaled row is renormalized
/// instead.
pub fn apply_relative_risk(matrix: &[Vec<f64>], rr: f64) -> Result<Vec<Vec<f64>>> {
    if !rr.is_finite() || rr < 0.0 {
        return Err(Error::InvalidDistribution(format!(
            "relative risk must be finite and non-negative, got {}",
            rr
        )));
    }

    let mut out = matrix.to_vec();
    for (i, row) in out.iter_mut().enumerate() {
        let state = HealthState::from_index(i)?;
        if state.is_absorbing() || i >= row.len() {
            continue;
        }

        let mut freed = 0.0;
        for (j, p) in row.iter_mut().enumerate() {
            if j == i || !HealthState::from_index(j)?.is_stroke_class() {
                continue;
            }
            let scaled = *p * rr;
            freed += *p - scaled;
            *p = scaled;
        }

        let diagonal = row[i] + freed;
        if diagonal >= 0.0 {
            row[i] = diagonal;
        } else {
            let sum: f64 = row.iter().sum();
            if sum <= 0.0 {
                return Err(Error::InvalidDistribution(format!(
                    "row '{}' has no mass left after relative risk {}",
                    state, rr
                )));
            }
            debug!(state = %state, rr, sum, "diagonal exhausted, renormalizing row");
            for p in row.iter_mut() {
                *p /= sum;
            }
        }
    }

    Ok(out)
}

/// Mix a per-step background death probability into every live row.
pub fn add_background_mortality(matrix: &[Vec<f64>], p: f64) -> Result<Vec<Vec<f64>>> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::InvalidDistribution(format!(
            "background mortality probability {} outside [0, 1]",
            p
        )));
    }

    let dead = HealthState::Dead.index();
    let mut out = matrix.to_vec();
    for (i, row) in out.iter_mut().enumerate() {
        if HealthState::from_index(i)?.is_absorbing() || dead >= row.len() {
            continue;
        }
        for q in row.iter_mut() {
            *q *= 1.0 - p;
        }
        row[dead] += p;
    }
    Ok(out)
}
