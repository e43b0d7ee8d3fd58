//! Core math modules.

pub mod quantile;
pub mod summary;
