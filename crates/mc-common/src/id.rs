//! Patient and cohort identity types.
//!
//! A patient id doubles as the seed of that patient's random stream, so ids
//! must never collide across cohort replications that share a population size.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cohort identifier (replication index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CohortId(pub u64);

impl fmt::Display for CohortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CohortId {
    fn from(id: u64) -> Self {
        CohortId(id)
    }
}

/// Globally unique patient identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub u64);

impl PatientId {
    /// Id of the `local_index`-th patient of cohort `cohort`.
    ///
    /// `cohort * population_size + local_index`, which keeps the ranges of
    /// distinct cohorts disjoint as long as `local_index < population_size`.
    pub fn for_cohort(cohort: CohortId, population_size: usize, local_index: usize) -> Self {
        PatientId(
            cohort
                .0
                .wrapping_mul(population_size as u64)
                .wrapping_add(local_index as u64),
        )
    }

    /// Seed for this patient's private random stream.
    pub fn seed(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PatientId {
    fn from(id: u64) -> Self {
        PatientId(id)
    }
}
