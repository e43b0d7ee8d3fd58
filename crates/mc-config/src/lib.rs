//! Markov cohort model configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for model.json
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation (probability rows, positive parameters)

pub mod model;
pub mod resolve;
pub mod validate;

pub use model::{
    BackgroundMortality, ModelConfig, PsaSettings, SimulationSettings, TreatmentParams,
};
pub use resolve::{load_model_config, resolve_model_path, ConfigSource, LoadedConfig};
pub use validate::{validate_model, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
