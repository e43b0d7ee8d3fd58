//! Model configuration types.
//!
//! Every section has a default equal to the reference inputs, so a partial
//! model.json only needs to name what it overrides.

use mc_common::HealthState;
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Complete model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub simulation: SimulationSettings,

    #[serde(default)]
    pub psa: PsaSettings,

    #[serde(default)]
    pub background_mortality: BackgroundMortality,

    /// Per-step transition probabilities, rows and columns in `HealthState` order.
    #[serde(default = "default_transition_matrix")]
    pub transition_matrix: Vec<Vec<f64>>,

    /// Annual cost of occupying each state.
    #[serde(default = "default_state_cost")]
    pub annual_state_cost: Vec<f64>,

    /// Annual utility (QALY weight) of each state.
    #[serde(default = "default_state_utility")]
    pub annual_state_utility: Vec<f64>,

    #[serde(default)]
    pub treatment: TreatmentParams,
}

/// Population, clock, and reporting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub population_size: usize,

    /// Simulation horizon in years.
    pub horizon: f64,

    /// Length of one cycle in years.
    pub delta_t: f64,

    /// Significance level for confidence intervals.
    pub alpha: f64,

    /// Annual discount rate for costs and utilities.
    pub discount_rate: f64,

    pub initial_state: HealthState,

    /// Simulate patients on the rayon pool.
    pub parallel: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            population_size: 2000,
            horizon: 50.0,
            delta_t: 1.0,
            alpha: 0.05,
            discount_rate: 0.0,
            initial_state: HealthState::Well,
            parallel: true,
        }
    }
}

/// Probabilistic sensitivity analysis switch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsaSettings {
    /// Draw one transition matrix per patient instead of sharing one.
    pub enabled: bool,
}

/// Background (all-cause) mortality mixed into the live states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundMortality {
    pub enabled: bool,

    /// Deaths per year per 1,000 population.
    pub annual_rate_per_1000: f64,
}

impl Default for BackgroundMortality {
    fn default() -> Self {
        Self {
            enabled: false,
            annual_rate_per_1000: 8.15,
        }
    }
}

impl BackgroundMortality {
    /// Annual probability of background death.
    pub fn annual_probability(&self) -> f64 {
        self.annual_rate_per_1000 / 1000.0
    }

    /// Probability of background death within one cycle of length `delta_t`.
    pub fn step_probability(&self, delta_t: f64) -> f64 {
        1.0 - (1.0 - self.annual_probability()).powf(delta_t)
    }
}

/// Anticoagulation therapy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentParams {
    pub annual_drug_cost: f64,

    /// Relative risk of stroke transitions under therapy.
    pub relative_risk: f64,

    /// 95% confidence bounds of the relative risk: [lower, upper].
    pub relative_risk_ci: [f64; 2],
}

impl Default for TreatmentParams {
    fn default() -> Self {
        Self {
            annual_drug_cost: 5000.0,
            relative_risk: 0.509,
            relative_risk_ci: [0.365, 0.71],
        }
    }
}

fn default_transition_matrix() -> Vec<Vec<f64>> {
    vec![
        vec![0.75, 0.15, 0.0, 0.1], // well
        vec![0.0, 0.25, 0.55, 0.2], // post-stroke
        vec![0.0, 0.0, 1.0, 0.0],   // stroke
        vec![0.0, 0.0, 0.0, 1.0],   // dead
    ]
}

fn default_state_cost() -> Vec<f64> {
    vec![2756.0, 3025.0, 9007.0, 0.0]
}

fn default_state_utility() -> Vec<f64> {
    vec![0.75, 0.50, 0.25, 0.0]
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: Some("Atrial fibrillation stroke model (reference inputs)".to_string()),
            simulation: SimulationSettings::default(),
            psa: PsaSettings::default(),
            background_mortality: BackgroundMortality::default(),
            transition_matrix: default_transition_matrix(),
            annual_state_cost: default_state_cost(),
            annual_state_utility: default_state_utility(),
            treatment: TreatmentParams::default(),
        }
    }
}

impl ModelConfig {
    /// Load a model from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Parse a model from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Pretty JSON rendering (used by `config show`).
    pub fn to_json_pretty(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ValidationError::ParseError(format!("Cannot serialize model: {}", e)))
    }
}
