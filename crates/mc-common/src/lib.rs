//! Markov cohort common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - The closed set of health states and therapies
//! - Patient and cohort identity types
//! - The unified error type with stable codes
//! - Output formats for command payloads

pub mod error;
pub mod id;
pub mod output;
pub mod state;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use id::{CohortId, PatientId};
pub use output::OutputFormat;
pub use state::{HealthState, Therapy};

/// Schema version for serialized reports.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Allowed deviation of a probability row sum from 1.
pub const PROB_SUM_TOLERANCE: f64 = 1e-6;
