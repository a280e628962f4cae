//! Test fixtures: a small hand-tuned ensemble
//!
//! Weights are nonnegative (0.9 on relevant pollutants, 0.05 elsewhere) so a
//! dirtier reading never lowers a raw score. Asthma carries a large bias and
//! is the only disease that clears the streaming threshold on a clean-ish day.

use std::sync::Arc;

use super::artifact::{DiseaseEntry, ModelArtifact, ScalerEntry};
use super::context::ModelContext;
use super::disease::Disease;
use crate::logic::features::{layout::layout_names, Pollutant, FEATURE_VERSION};

pub const RELEVANT_WEIGHT: f64 = 0.9;
pub const OTHER_WEIGHT: f64 = 0.05;
pub const ASTHMA_BIAS: f64 = 3.0;
pub const DEFAULT_BIAS: f64 = -0.5;

pub const MEAN: [f64; 7] = [100.0, 200.0, 150.0, 400.0, 5000.0, 150.0, 700.0];
pub const SCALE: [f64; 7] = [90.0, 150.0, 110.0, 350.0, 4000.0, 100.0, 500.0];

/// All Fair, nothing Poor/Severe
pub const SCENARIO_A: [f64; 7] = [58.0, 98.0, 78.0, 40.3, 1950.0, 85.5, 300.0];

/// PM2.5 Severe, PM10/NO2/CO Poor
pub const SCENARIO_B: [f64; 7] = [120.5, 180.0, 90.2, 40.3, 2500.0, 85.5, 300.0];

pub fn artifact() -> ModelArtifact {
    let diseases = Disease::ALL
        .iter()
        .map(|disease| {
            let relevant = disease.default_relevant_pollutants();
            let weights = Pollutant::ALL
                .iter()
                .map(|p| if relevant.contains(p) { RELEVANT_WEIGHT } else { OTHER_WEIGHT })
                .collect();
            DiseaseEntry {
                name: disease.as_str().to_string(),
                weights,
                bias: if *disease == Disease::Asthma { ASTHMA_BIAS } else { DEFAULT_BIAS },
                relevant_pollutants: Some(relevant.iter().map(|p| p.as_str().to_string()).collect()),
            }
        })
        .collect();

    ModelArtifact {
        format_version: FEATURE_VERSION,
        pollutants: layout_names().into_iter().map(String::from).collect(),
        diseases,
        scaler: ScalerEntry {
            mean: MEAN.to_vec(),
            scale: SCALE.to_vec(),
        },
        pollutant_categories: None,
    }
}

pub fn context() -> Arc<ModelContext> {
    Arc::new(artifact().into_context().expect("fixture artifact is valid"))
}
