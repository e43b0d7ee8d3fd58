//! Exit codes for the markov-cohort CLI.
//!
//! Exit code ranges:
//! - 0-1: Success outcomes
//! - 10-19: User/configuration errors (recoverable by fixing the model file)
//! - 20-29: Internal errors (bugs, should be reported)

use mc_common::{Error, ErrorCategory};

/// Exit codes for CLI operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Clean = 0,

    /// Simulation finished but a reported metric has no observations.
    NoData = 1,

    /// Invalid arguments.
    ArgsError = 10,

    /// Model file missing, unparseable, or semantically invalid.
    ConfigError = 11,

    /// Transition model rejected while building parameters.
    ModelError = 12,

    /// Internal error (bug - please report).
    InternalError = 20,

    /// I/O error.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::NoData)
    }

    /// User/configuration error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Code name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::NoData => "OK_NO_DATA",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::ModelError => "ERR_MODEL",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a library error.
    pub fn from_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Model => ExitCode::ModelError,
            ErrorCategory::Statistics => ExitCode::NoData,
            ErrorCategory::Simulation => ExitCode::InternalError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_common::PatientId;

    #[test]
    fn ranges() {
        assert!(ExitCode::Clean.is_success());
        assert!(ExitCode::ConfigError.is_user_error());
        assert!(!ExitCode::ConfigError.is_internal_error());
        assert!(ExitCode::IoError.is_internal_error());
    }

    #[test]
    fn errors_map_by_category() {
        assert_eq!(
            ExitCode::from_error(&Error::Config("x".into())),
            ExitCode::ConfigError
        );
        assert_eq!(
            ExitCode::from_error(&Error::InvalidDistribution("x".into())),
            ExitCode::ModelError
        );
        assert_eq!(
            ExitCode::from_error(&Error::AlreadySimulated {
                patient: PatientId(0)
            }),
            ExitCode::InternalError
        );
        assert_eq!(ExitCode::ConfigError.to_string(), "ERR_CONFIG (11)");
    }
}
