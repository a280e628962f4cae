//! Model Module - Disease risk ensemble
//!
//! Structure:
//! - `disease.rs` - The 13-disease catalog and default relevance lists
//! - `inference.rs` - Standardization + per-disease linear models (ensemble)
//! - `adjust.rs` - Global sensitivity and proximity boosts
//! - `threshold.rs` - Ranking, selection threshold and reporting bands
//! - `artifact.rs` - On-disk artifact loading and validation
//! - `context.rs` - Immutable model context shared by workers

pub mod disease;
pub mod inference;
pub mod adjust;
pub mod threshold;
pub mod artifact;
pub mod context;

#[cfg(test)]
pub(crate) mod fixtures;


// Re-export common types
pub use disease::{catalog, Disease, DISEASE_COUNT};
pub use inference::{DiseaseModel, DiseaseScores, EnsembleScorer, InferenceError, RiskModel, StandardizationParams};
pub use adjust::{AdjustedRisk, RiskAdjuster};
pub use threshold::{RankedDisease, RiskBand, RiskThreshold};
pub use artifact::{load_artifact, ArtifactError, ModelArtifact};
pub use context::{ModelContext, ModelMetadata};
