//! Model Context - immutable model state shared by every worker
//!
//! Built once at startup (from the artifact or directly in tests) and handed
//! around behind an `Arc`. Nothing in here is mutated after construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::adjust::RiskAdjuster;
use super::disease::DISEASE_COUNT;
use super::inference::{DiseaseModel, EnsembleScorer, InferenceError, StandardizationParams};
use crate::logic::category::PollutantCategoryTable;
use crate::logic::features::FEATURE_VERSION;

/// Where the model came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub source: String,
    pub format_version: u32,
    pub sha256: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

impl ModelMetadata {
    pub fn in_memory() -> Self {
        Self {
            source: "<memory>".to_string(),
            format_version: FEATURE_VERSION,
            sha256: None,
            loaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelContext {
    /// Catalog order
    models: Vec<DiseaseModel>,
    scorer: EnsembleScorer,
    table: PollutantCategoryTable,
    metadata: ModelMetadata,
}

impl ModelContext {
    /// Models may arrive in any order; the ensemble needs exactly one per disease
    pub fn new(
        mut models: Vec<DiseaseModel>,
        scaler: StandardizationParams,
        table: PollutantCategoryTable,
    ) -> Result<Self, InferenceError> {
        models.sort_by_key(|m| m.disease.index());
        let scorer = EnsembleScorer::new(&models, scaler)?;
        if let Some(extra) = models.get(DISEASE_COUNT) {
            // sorted + validated prefix means the extra entry is a duplicate
            return Err(InferenceError::ModelOrder {
                index: DISEASE_COUNT,
                found: extra.disease,
            });
        }

        Ok(Self {
            models,
            scorer,
            table,
            metadata: ModelMetadata::in_memory(),
        })
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn scorer(&self) -> &EnsembleScorer {
        &self.scorer
    }

    pub fn table(&self) -> &PollutantCategoryTable {
        &self.table
    }

    pub fn models(&self) -> &[DiseaseModel] {
        &self.models
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn adjuster(&self) -> RiskAdjuster<'_> {
        RiskAdjuster::new(&self.table, &self.models)
    }
}
