//! Health states and therapies.
//!
//! The state set is closed and ordered: the discriminant is the row/column of
//! the transition matrix and the index into the cost and utility tables.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Health state of a simulated patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// No history of stroke.
    Well = 0,
    /// Survived a first stroke.
    PostStroke = 1,
    /// Severe recurrent stroke; absorbing.
    Stroke = 2,
    /// Death from any cause; absorbing.
    Dead = 3,
}

impl HealthState {
    /// Number of states (rows of the transition matrix).
    pub const COUNT: usize = 4;

    /// All states in matrix order.
    pub const ALL: [HealthState; HealthState::COUNT] = [
        HealthState::Well,
        HealthState::PostStroke,
        HealthState::Stroke,
        HealthState::Dead,
    ];

    /// The milestone whose first entry is reported as time-to-event.
    pub const EVENT: HealthState = HealthState::PostStroke;

    /// Row/column index in the transition matrix.
    pub fn index(self) -> usize {
        self as usize
    }

    /// State for a sampled matrix column.
    pub fn from_index(index: usize) -> Result<Self, Error> {
        Self::ALL.get(index).copied().ok_or(Error::InvalidState {
            index,
            count: Self::COUNT,
        })
    }

    /// Absorbing states end the simulation of a patient.
    pub fn is_absorbing(self) -> bool {
        matches!(self, HealthState::Stroke | HealthState::Dead)
    }

    /// True for the designated event state.
    pub fn is_event(self) -> bool {
        self == Self::EVENT
    }

    /// States a stroke-preventing therapy acts on.
    pub fn is_stroke_class(self) -> bool {
        matches!(self, HealthState::PostStroke | HealthState::Stroke)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Well => "well",
            HealthState::PostStroke => "post_stroke",
            HealthState::Stroke => "stroke",
            HealthState::Dead => "dead",
        }
    }
}

impl TryFrom<usize> for HealthState {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        HealthState::from_index(index)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "well" => Ok(HealthState::Well),
            "post_stroke" | "poststroke" => Ok(HealthState::PostStroke),
            "stroke" => Ok(HealthState::Stroke),
            "dead" | "death" => Ok(HealthState::Dead),
            _ => Err(format!("unknown health state: {}", s)),
        }
    }
}

/// Therapy arm a cohort is simulated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Therapy {
    /// Standard care, no drug cost, base transition matrix.
    #[default]
    None,
    /// Anticoagulation: stroke transitions scaled by the treatment relative risk.
    Anticoagulation,
}

impl fmt::Display for Therapy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Therapy::None => write!(f, "none"),
            Therapy::Anticoagulation => write!(f, "anticoagulation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip_over_all_states() {
        for state in HealthState::ALL {
            assert_eq!(HealthState::from_index(state.index()).unwrap(), state);
        }
    }

    #[test]
    fn out_of_range_index_is_invalid_state() {
        let err = HealthState::from_index(4).unwrap_err();
        assert!(matches!(err, Error::InvalidState { index: 4, count: 4 }));
        assert!(HealthState::try_from(99usize).is_err());
    }

    #[test]
    fn at_least_two_absorbing_states() {
        let absorbing = HealthState::ALL.iter().filter(|s| s.is_absorbing()).count();
        assert!(absorbing >= 2);
        assert!(!HealthState::EVENT.is_absorbing());
    }

    #[test]
    fn parse_names() {
        assert_eq!("well".parse::<HealthState>().unwrap(), HealthState::Well);
        assert_eq!(
            "post-stroke".parse::<HealthState>().unwrap(),
            HealthState::PostStroke
        );
        assert_eq!("Death".parse::<HealthState>().unwrap(), HealthState::Dead);
        assert!("zombie".parse::<HealthState>().is_err());
    }

    #[test]
    fn serde_snake_case() {
        let json = serde_json::to_string(&HealthState::PostStroke).unwrap();
        assert_eq!(json, "\"post_stroke\"");
        let therapy: Therapy = serde_json::from_str("\"anticoagulation\"").unwrap();
        assert_eq!(therapy, Therapy::Anticoagulation);
    }
}
