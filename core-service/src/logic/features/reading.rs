//! Pollutant Reading - one complete sample of the seven concentrations
//!
//! Missing pollutants are filled with zero and reported with a warning.
//! A reading is never rejected for being incomplete.

use serde::{Deserialize, Serialize};

use super::layout::{Pollutant, POLLUTANT_COUNT};

/// Concentrations in µg/m³, indexed by `Pollutant::index()`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PollutantReading {
    values: [f64; POLLUTANT_COUNT],
}

impl PollutantReading {
    /// Reading from a complete array in feature order
    pub fn new(values: [f64; POLLUTANT_COUNT]) -> Self {
        Self { values }
    }

    /// Lenient fill: absent entries become 0.0 (one warning each)
    ///
    /// Returns the reading plus the pollutants that were filled.
    pub fn from_partial(partial: [Option<f64>; POLLUTANT_COUNT]) -> (Self, Vec<Pollutant>) {
        let mut values = [0.0; POLLUTANT_COUNT];
        let mut missing = Vec::new();

        for pollutant in Pollutant::ALL {
            match partial[pollutant.index()] {
                Some(value) => values[pollutant.index()] = value,
                None => {
                    log::warn!("Missing pollutant {}. Setting to 0.", pollutant);
                    missing.push(pollutant);
                }
            }
        }

        (Self { values }, missing)
    }

    /// Build from `(pollutant, value)` pairs; unlisted pollutants are zero-filled
    pub fn from_pairs(pairs: &[(Pollutant, f64)]) -> Self {
        let mut partial = [None; POLLUTANT_COUNT];
        for &(pollutant, value) in pairs {
            partial[pollutant.index()] = Some(value);
        }
        Self::from_partial(partial).0
    }

    pub fn get(&self, pollutant: Pollutant) -> f64 {
        self.values[pollutant.index()]
    }

    pub fn values(&self) -> &[f64; POLLUTANT_COUNT] {
        &self.values
    }

    /// Iterate `(pollutant, value)` in feature order
    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        Pollutant::ALL.into_iter().map(|p| (p, self.values[p.index()]))
    }
}
