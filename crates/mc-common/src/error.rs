//! Error types for the Markov cohort simulator.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints (an empty sample is a legitimate outcome, a broken
//!   transition row is not)
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 30,
//!   "category": "model",
//!   "message": "invalid probability distribution: row sums to 0.9",
//!   "recoverable": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::id::PatientId;

/// Result type alias for simulator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors.
    Config,
    /// Transition model errors (distributions, state indices).
    Model,
    /// Simulation lifecycle errors.
    Simulation,
    /// Summary statistics over the simulated cohort.
    Statistics,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Model => write!(f, "model"),
            ErrorCategory::Simulation => write!(f, "simulation"),
            ErrorCategory::Statistics => write!(f, "statistics"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for the simulator.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    // Model errors (30-39)
    #[error("invalid probability distribution: {0}")]
    InvalidDistribution(String),

    #[error("invalid health state index {index} (model has {count} states)")]
    InvalidState { index: usize, count: usize },

    // Simulation errors (40-49)
    #[error("patient {patient} has already been simulated")]
    AlreadySimulated { patient: PatientId },

    // Statistics errors (50-59)
    #[error("no observations for {metric}")]
    EmptySample { metric: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 30-39: Model errors
    /// - 40-49: Simulation errors
    /// - 50-59: Statistics errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidDistribution(_) => 30,
            Error::InvalidState { .. } => 31,
            Error::AlreadySimulated { .. } => 40,
            Error::EmptySample { .. } => 50,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) => ErrorCategory::Config,
            Error::InvalidDistribution(_) | Error::InvalidState { .. } => ErrorCategory::Model,
            Error::AlreadySimulated { .. } => ErrorCategory::Simulation,
            Error::EmptySample { .. } => ErrorCategory::Statistics,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Zero-event cohorts are a legitimate outcome, so `EmptySample` is the
    /// one model-level error callers are expected to absorb.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidDistribution(_) => false,
            Error::InvalidState { .. } => false,
            Error::AlreadySimulated { .. } => false,
            Error::EmptySample { .. } => true,
            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidDistribution(_) => "Invalid Transition Distribution",
            Error::InvalidState { .. } => "Invalid Health State",
            Error::AlreadySimulated { .. } => "Patient Already Simulated",
            Error::EmptySample { .. } => "No Observations",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'markov-cohort check' to validate the model file, or remove it to use built-in defaults."
            }
            Error::InvalidDistribution(_) => {
                "Every transition matrix row must be non-negative and sum to 1."
            }
            Error::InvalidState { .. } => {
                "The transition matrix must have exactly one row and column per health state."
            }
            Error::AlreadySimulated { .. } => {
                "Build a fresh cohort for every simulation run."
            }
            Error::EmptySample { .. } => {
                "No patient reached this outcome within the horizon; extend the horizon or population."
            }
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Check the JSON syntax of the model file.",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., patient id, state index).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidState { index, count } => {
                context.insert("index".to_string(), serde_json::json!(index));
                context.insert("state_count".to_string(), serde_json::json!(count));
            }
            Error::AlreadySimulated { patient } => {
                context.insert("patient_id".to_string(), serde_json::json!(patient));
            }
            Error::EmptySample { metric } => {
                context.insert("metric".to_string(), serde_json::json!(metric));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_category_ranges() {
        assert_eq!(Error::Config("x".into()).code(), 10);
        assert_eq!(Error::InvalidDistribution("x".into()).code(), 30);
        assert_eq!(Error::InvalidState { index: 9, count: 4 }.code(), 31);
        assert_eq!(
            Error::AlreadySimulated {
                patient: PatientId(3)
            }
            .code(),
            40
        );
        assert_eq!(
            Error::EmptySample {
                metric: "time to event".into()
            }
            .code(),
            50
        );
    }

    #[test]
    fn empty_sample_is_recoverable_bad_rows_are_not() {
        let empty = Error::EmptySample {
            metric: "survival time".into(),
        };
        assert!(empty.is_recoverable());
        assert_eq!(empty.category(), ErrorCategory::Statistics);

        let bad = Error::InvalidDistribution("sums to 0.9".into());
        assert!(!bad.is_recoverable());
        assert_eq!(bad.category(), ErrorCategory::Model);
    }

    #[test]
    fn structured_error_carries_context() {
        let err = Error::InvalidState { index: 7, count: 4 };
        let structured = StructuredError::from(&err);
        assert_eq!(structured.code, 31);
        assert_eq!(structured.context["index"], serde_json::json!(7));
        let json = structured.to_json();
        assert!(json.contains("\"category\":\"model\""));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert_eq!(err.category(), ErrorCategory::Io);
        assert!(err.to_string().contains("missing"));
    }
}
