//! Configuration validation errors and semantic validation.

use mc_common::{HealthState, PROB_SUM_TOLERANCE};
use thiserror::Error;

use crate::model::ModelConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

impl From<ValidationError> for mc_common::Error {
    fn from(err: ValidationError) -> Self {
        mc_common::Error::Config(err.to_string())
    }
}

/// Validate a model configuration semantically.
pub fn validate_model(model: &ModelConfig) -> ValidationResult<()> {
    if model.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: model.schema_version.clone(),
        });
    }

    validate_simulation(model)?;
    validate_transition_matrix(&model.transition_matrix)?;
    validate_state_table("annual_state_cost", &model.annual_state_cost, true)?;
    validate_state_table("annual_state_utility", &model.annual_state_utility, false)?;
    validate_background_mortality(model)?;
    validate_treatment(model)?;

    Ok(())
}

fn validate_simulation(model: &ModelConfig) -> ValidationResult<()> {
    let sim = &model.simulation;

    if sim.population_size == 0 {
        return Err(invalid("simulation.population_size", "Must be at least 1".to_string()));
    }
    positive_finite("simulation.horizon", sim.horizon)?;
    positive_finite("simulation.delta_t", sim.delta_t)?;

    if !(sim.alpha > 0.0 && sim.alpha < 1.0) {
        return Err(invalid(
            "simulation.alpha",
            format!("Must be in (0, 1), got {}", sim.alpha),
        ));
    }
    if !sim.discount_rate.is_finite() || sim.discount_rate < 0.0 {
        return Err(invalid(
            "simulation.discount_rate",
            format!("Must be non-negative, got {}", sim.discount_rate),
        ));
    }
    if sim.initial_state.is_absorbing() {
        return Err(invalid(
            "simulation.initial_state",
            format!("Cannot start in absorbing state {}", sim.initial_state),
        ));
    }

    Ok(())
}

/// Validate the shape and probability rows of a transition matrix.
pub fn validate_transition_matrix(matrix: &[Vec<f64>]) -> ValidationResult<()> {
    if matrix.len() != HealthState::COUNT {
        return Err(ValidationError::SemanticError(format!(
            "transition_matrix must have {} rows, got {}",
            HealthState::COUNT,
            matrix.len()
        )));
    }

    for (state, row) in HealthState::ALL.iter().zip(matrix) {
        if row.len() != HealthState::COUNT {
            return Err(ValidationError::SemanticError(format!(
                "transition_matrix row '{}' must have {} columns, got {}",
                state,
                HealthState::COUNT,
                row.len()
            )));
        }
        if let Some(bad) = row.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(invalid(
                &format!("transition_matrix.{}", state),
                format!("Probabilities must be finite and non-negative, got {}", bad),
            ));
        }
        let sum: f64 = row.iter().sum();
        if (sum - 1.0).abs() > PROB_SUM_TOLERANCE {
            return Err(ValidationError::SemanticError(format!(
                "transition_matrix row '{}' must sum to 1.0, got {}",
                state, sum
            )));
        }
    }

    Ok(())
}

fn validate_state_table(field: &str, values: &[f64], non_negative: bool) -> ValidationResult<()> {
    if values.len() != HealthState::COUNT {
        return Err(invalid(
            field,
            format!(
                "Must have one entry per health state ({}), got {}",
                HealthState::COUNT,
                values.len()
            ),
        ));
    }
    for (state, value) in HealthState::ALL.iter().zip(values) {
        if !value.is_finite() || (non_negative && *value < 0.0) {
            return Err(invalid(
                &format!("{}.{}", field, state),
                format!("Invalid entry {}", value),
            ));
        }
    }
    Ok(())
}

fn validate_background_mortality(model: &ModelConfig) -> ValidationResult<()> {
    let rate = model.background_mortality.annual_rate_per_1000;
    if !rate.is_finite() || !(0.0..1000.0).contains(&rate) {
        return Err(invalid(
            "background_mortality.annual_rate_per_1000",
            format!("Must be in [0, 1000), got {}", rate),
        ));
    }
    Ok(())
}

fn validate_treatment(model: &ModelConfig) -> ValidationResult<()> {
    let t = &model.treatment;
    if !t.annual_drug_cost.is_finite() || t.annual_drug_cost < 0.0 {
        return Err(invalid(
            "treatment.annual_drug_cost",
            format!("Must be non-negative, got {}", t.annual_drug_cost),
        ));
    }
    positive_finite("treatment.relative_risk", t.relative_risk)?;

    let [lower, upper] = t.relative_risk_ci;
    positive_finite("treatment.relative_risk_ci[0]", lower)?;
    positive_finite("treatment.relative_risk_ci[1]", upper)?;
    if !(lower <= t.relative_risk && t.relative_risk <= upper) {
        return Err(ValidationError::SemanticError(format!(
            "relative_risk {} must lie within its confidence interval [{}, {}]",
            t.relative_risk, lower, upper
        )));
    }

    Ok(())
}

fn positive_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, format!("Must be positive, got {}", value)));
    }
    Ok(())
}

fn invalid(field: &str, message: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message,
    }
}
