//! Markov Cohort Core Library
//!
//! This library provides the simulation core:
//! - Seeded random streams and empirical sampling
//! - Fixed and probabilistic model parameters
//! - Patient state monitoring with half-cycle correction
//! - Cohort simulation (sequential or rayon-parallel) and outputs
//! - Discounting and cost-effectiveness comparison
//! - Exit codes and logging for the CLI
//!
//! The binary entry point is in `main.rs`.

pub mod cohort;
pub mod econ;
pub mod exit_codes;
pub mod logging;
pub mod monitor;
pub mod outputs;
pub mod parameters;
pub mod patient;
pub mod rng;

pub use cohort::Cohort;
pub use econ::{present_value, CostEffectiveness, Dominance};
pub use monitor::PatientStateMonitor;
pub use outputs::{
    CohortOutputs, CohortReport, CurvePoint, Estimate, MetricReport, SummaryStat, SurvivalCurve,
};
pub use parameters::{ParameterKind, Parameters};
pub use patient::Patient;
pub use rng::{seeded_rng, Empirical, PatientRng};
