//! Stable event names and pipeline stages attached to log records.

use serde::Serialize;

/// Stages of a CLI run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Cohort construction and patient simulation.
    Simulate,
    /// Cost-effectiveness comparison.
    Compare,
    /// Report rendering.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Simulate => "simulate",
            Stage::Compare => "compare",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const COHORT_BUILT: &str = "cohort.built";
    pub const COHORT_SIMULATED: &str = "cohort.simulated";

    pub const COMPARE_FINISHED: &str = "compare.finished";

    pub const INTERNAL_ERROR: &str = "internal_error";
}
