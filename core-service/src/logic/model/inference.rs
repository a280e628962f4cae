//! Inference Engine - Ensemble of per-disease linear risk models
//!
//! One binary model per disease, all from the same linear family:
//! `raw = dot(weights, z) + bias`, then a steepened logistic.
//! The whole ensemble is evaluated as one 13x7 matrix-vector product.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::disease::{Disease, DISEASE_COUNT};
use crate::logic::features::{FeatureVector, Pollutant, PollutantReading, POLLUTANT_COUNT};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Logistic steepening factor. Must stay exactly 1.2 for output parity.
pub const LOGISTIC_STEEPNESS: f64 = 1.2;

/// `1 / (1 + exp(-1.2 * raw))`
pub fn steep_sigmoid(raw: f64) -> f64 {
    1.0 / (1.0 + (-LOGISTIC_STEEPNESS * raw).exp())
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("{disease}: expected {expected} weights, got {got}")]
    WeightLength { disease: Disease, expected: usize, got: usize },

    #[error("{0}: weights and bias must be finite")]
    NonFiniteWeights(Disease),

    #[error("{0}: relevant pollutant list is empty")]
    EmptyRelevantPollutants(Disease),

    #[error("scaler: expected {expected} {field} values, got {got}")]
    ScalerLength { field: &'static str, expected: usize, got: usize },

    #[error("scaler: {pollutant} mean {mean} is not finite")]
    InvalidMean { pollutant: Pollutant, mean: f64 },

    #[error("scaler: {pollutant} scale {scale} must be finite and non-zero")]
    InvalidScale { pollutant: Pollutant, scale: f64 },

    #[error("ensemble has no model for {0}")]
    MissingModel(Disease),

    #[error("ensemble expects models in catalog order: slot {index} holds {found}")]
    ModelOrder { index: usize, found: Disease },
}

// ============================================================================
// STANDARDIZATION
// ============================================================================

/// Per-pollutant mean and scale learned offline: `z = (x - mean) / scale`
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizationParams {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardizationParams {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, InferenceError> {
        if mean.len() != POLLUTANT_COUNT {
            return Err(InferenceError::ScalerLength {
                field: "mean",
                expected: POLLUTANT_COUNT,
                got: mean.len(),
            });
        }
        if scale.len() != POLLUTANT_COUNT {
            return Err(InferenceError::ScalerLength {
                field: "scale",
                expected: POLLUTANT_COUNT,
                got: scale.len(),
            });
        }
        for pollutant in Pollutant::ALL {
            let m = mean[pollutant.index()];
            let s = scale[pollutant.index()];
            if !m.is_finite() {
                return Err(InferenceError::InvalidMean { pollutant, mean: m });
            }
            if !s.is_finite() || s == 0.0 {
                return Err(InferenceError::InvalidScale { pollutant, scale: s });
            }
        }

        Ok(Self {
            mean: Array1::from(mean),
            scale: Array1::from(scale),
        })
    }

    /// Identity transform (mean 0, scale 1)
    pub fn identity() -> Self {
        Self {
            mean: Array1::zeros(POLLUTANT_COUNT),
            scale: Array1::ones(POLLUTANT_COUNT),
        }
    }

    pub fn standardize(&self, features: &FeatureVector) -> Array1<f64> {
        (features.to_array() - &self.mean) / &self.scale
    }
}

// ============================================================================
// DISEASE MODEL
// ============================================================================

/// Linear model parameters for one disease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseModel {
    pub disease: Disease,
    pub weights: [f64; POLLUTANT_COUNT],
    pub bias: f64,
    /// Pollutants the adjuster looks at; not used by the base score
    pub relevant_pollutants: Vec<Pollutant>,
}

impl DiseaseModel {
    pub fn new(
        disease: Disease,
        weights: Vec<f64>,
        bias: f64,
        relevant_pollutants: Vec<Pollutant>,
    ) -> Result<Self, InferenceError> {
        let weights: [f64; POLLUTANT_COUNT] = weights.try_into().map_err(|w: Vec<f64>| {
            InferenceError::WeightLength {
                disease,
                expected: POLLUTANT_COUNT,
                got: w.len(),
            }
        })?;
        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(InferenceError::NonFiniteWeights(disease));
        }
        if relevant_pollutants.is_empty() {
            return Err(InferenceError::EmptyRelevantPollutants(disease));
        }

        Ok(Self { disease, weights, bias, relevant_pollutants })
    }
}

// ============================================================================
// SCORES
// ============================================================================

/// One probability per disease, indexed by `Disease::index()`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiseaseScores {
    values: [f64; DISEASE_COUNT],
}

impl DiseaseScores {
    pub fn new(values: [f64; DISEASE_COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, disease: Disease) -> f64 {
        self.values[disease.index()]
    }

    pub fn values(&self) -> &[f64; DISEASE_COUNT] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Disease, f64)> + '_ {
        Disease::ALL.into_iter().map(|d| (d, self.values[d.index()]))
    }
}

// ============================================================================
// RISK MODEL TRAIT
// ============================================================================

/// Anything that maps a reading to per-disease probabilities
pub trait RiskModel {
    fn score(&self, reading: &PollutantReading) -> DiseaseScores;
}

// ============================================================================
// ENSEMBLE SCORER
// ============================================================================

/// 13 linear models stacked into one weight matrix
#[derive(Debug, Clone)]
pub struct EnsembleScorer {
    /// Rows = diseases (catalog order), columns = pollutants (feature order)
    weights: Array2<f64>,
    bias: Array1<f64>,
    scaler: StandardizationParams,
}

impl EnsembleScorer {
    /// `models` must be in `Disease::ALL` order
    pub fn new(models: &[DiseaseModel], scaler: StandardizationParams) -> Result<Self, InferenceError> {
        for (index, disease) in Disease::ALL.iter().enumerate() {
            match models.get(index) {
                Some(m) if m.disease == *disease => {}
                Some(m) => return Err(InferenceError::ModelOrder { index, found: m.disease }),
                None => return Err(InferenceError::MissingModel(*disease)),
            }
        }

        let weights = Array2::from_shape_fn((DISEASE_COUNT, POLLUTANT_COUNT), |(i, j)| {
            models[i].weights[j]
        });
        let bias = Array1::from_iter(models.iter().take(DISEASE_COUNT).map(|m| m.bias));

        Ok(Self { weights, bias, scaler })
    }

    /// Linear outputs before the logistic, one per disease
    pub fn raw_scores(&self, reading: &PollutantReading) -> Array1<f64> {
        let z = self.scaler.standardize(&FeatureVector::from_reading(reading));
        self.weights.dot(&z) + &self.bias
    }

    pub fn scaler(&self) -> &StandardizationParams {
        &self.scaler
    }
}

impl RiskModel for EnsembleScorer {
    fn score(&self, reading: &PollutantReading) -> DiseaseScores {
        let raw = self.raw_scores(reading);
        let mut values = [0.0; DISEASE_COUNT];
        for (slot, r) in values.iter_mut().zip(raw.iter()) {
            *slot = steep_sigmoid(*r);
        }
        DiseaseScores::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_models(weight: f64, bias: f64) -> Vec<DiseaseModel> {
        Disease::ALL
            .iter()
            .map(|d| {
                DiseaseModel::new(
                    *d,
                    vec![weight; POLLUTANT_COUNT],
                    bias,
                    d.default_relevant_pollutants().to_vec(),
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_steep_sigmoid() {
        assert_eq!(steep_sigmoid(0.0), 0.5);
        let expected = 1.0 / (1.0 + (-1.2f64).exp());
        assert_eq!(steep_sigmoid(1.0), expected);
        assert!(steep_sigmoid(1.0) > 1.0 / (1.0 + (-1.0f64).exp()));
    }

    #[test]
    fn test_zero_weights_give_sigmoid_of_bias() {
        let scorer = EnsembleScorer::new(&uniform_models(0.0, 0.5), StandardizationParams::identity()).unwrap();
        let scores = scorer.score(&PollutantReading::new([10.0; POLLUTANT_COUNT]));
        for (_, p) in scores.iter() {
            assert_eq!(p, steep_sigmoid(0.5));
        }
    }

    #[test]
    fn test_standardization_is_applied() {
        let scaler = StandardizationParams::new(vec![10.0; 7], vec![2.0; 7]).unwrap();
        let fv = FeatureVector::from_reading(&PollutantReading::new([14.0; POLLUTANT_COUNT]));
        assert_eq!(scaler.standardize(&fv).to_vec(), vec![2.0; 7]);
    }

    #[test]
    fn test_raw_score_is_dot_plus_bias() {
        let scaler = StandardizationParams::new(vec![0.0; 7], vec![1.0; 7]).unwrap();
        let scorer = EnsembleScorer::new(&uniform_models(0.1, -0.2), scaler).unwrap();
        let raw = scorer.raw_scores(&PollutantReading::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]));
        for r in raw.iter() {
            assert!((r - (0.1 * 28.0 - 0.2)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scaler = StandardizationParams::new(vec![50.0; 7], vec![30.0; 7]).unwrap();
        let scorer = EnsembleScorer::new(&uniform_models(0.37, 0.11), scaler).unwrap();
        let reading = PollutantReading::new([58.0, 98.0, 78.0, 40.3, 1950.0, 85.5, 300.0]);

        let a = scorer.score(&reading);
        let b = scorer.score(&reading);
        for disease in Disease::ALL {
            assert_eq!(a.get(disease).to_bits(), b.get(disease).to_bits());
        }
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert_eq!(
            StandardizationParams::new(vec![0.0; 7], vec![1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0]),
            Err(InferenceError::InvalidScale { pollutant: Pollutant::No2, scale: 0.0 })
        );
        assert!(matches!(
            DiseaseModel::new(Disease::Asthma, vec![0.0; 6], 0.0, vec![Pollutant::Pm25]),
            Err(InferenceError::WeightLength { got: 6, .. })
        ));
        assert_eq!(
            DiseaseModel::new(Disease::Asthma, vec![0.0; 7], 0.0, vec![]),
            Err(InferenceError::EmptyRelevantPollutants(Disease::Asthma))
        );
    }

    #[test]
    fn test_rejects_out_of_order_models() {
        let mut models = uniform_models(0.0, 0.0);
        models.swap(0, 1);
        assert!(matches!(
            EnsembleScorer::new(&models, StandardizationParams::identity()),
            Err(InferenceError::ModelOrder { index: 0, found: Disease::Copd })
        ));
    }
}
