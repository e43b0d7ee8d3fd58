//! Markov cohort math utilities.
//!
//! Summary statistics and interval estimators over simulated samples.
//! Distribution quantiles come from `statrs`.

pub mod math;

pub use math::quantile::*;
pub use math::summary::*;
