//! Feature Vector - Core data structure for model input
//!
//! **Versioned feature vector built from a reading**
//!
//! Raw concentrations in `Pollutant::ALL` order. Standardization happens in
//! the scorer, which owns the scaler parameters.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::layout::{Pollutant, FEATURE_VERSION, POLLUTANT_COUNT};
use super::reading::PollutantReading;

/// Versioned feature vector with layout metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u32,
    /// Feature values in order defined by `Pollutant::ALL`
    pub values: [f64; POLLUTANT_COUNT],
}

impl FeatureVector {
    pub fn from_reading(reading: &PollutantReading) -> Self {
        Self {
            version: FEATURE_VERSION,
            values: *reading.values(),
        }
    }

    /// Get feature by pollutant
    pub fn get(&self, pollutant: Pollutant) -> f64 {
        self.values[pollutant.index()]
    }

    /// Owned 1-D array for the ndarray math in the scorer
    pub fn to_array(&self) -> Array1<f64> {
        Array1::from_iter(self.values.iter().copied())
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "named_values": Pollutant::ALL.iter()
                .map(|p| (p.as_str().to_string(), serde_json::json!(self.get(*p))))
                .collect::<serde_json::Map<_, _>>(),
        })
    }
}

impl From<&PollutantReading> for FeatureVector {
    fn from(reading: &PollutantReading) -> Self {
        Self::from_reading(reading)
    }
}
