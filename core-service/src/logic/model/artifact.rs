//! Model Artifact - offline-trained parameters on disk
//!
//! JSON document holding the scaler, one linear model per disease and
//! (optionally) the relevance lists and category table. Validated once at
//! startup and turned into an immutable `ModelContext`.
//!
//! If `<artifact>.sha256` exists next to the file, its first token must match
//! the digest of the artifact bytes (`sha256sum` output works as-is).

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::context::{ModelContext, ModelMetadata};
use super::disease::Disease;
use super::inference::{DiseaseModel, InferenceError, StandardizationParams};
use crate::logic::category::{PollutantCategoryTable, TableError};
use crate::logic::features::{layout::layout_names, Pollutant, FEATURE_VERSION};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("model artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode model artifact: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("checksum mismatch: sidecar says {expected}, artifact is {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("pollutant order {found:?} does not match the feature layout {expected:?}")]
    PollutantOrder { found: Vec<String>, expected: Vec<String> },

    #[error("unknown disease '{0}'")]
    UnknownDisease(String),

    #[error("disease '{0}' appears more than once")]
    DuplicateDisease(String),

    #[error("artifact has no model for {0}")]
    MissingDisease(Disease),

    #[error("{disease}: unknown relevant pollutant '{name}'")]
    UnknownPollutant { disease: Disease, name: String },

    #[error(transparent)]
    Model(#[from] InferenceError),

    #[error(transparent)]
    CategoryTable(#[from] TableError),
}

// ============================================================================
// ON-DISK FORMAT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseEntry {
    pub name: String,
    pub weights: Vec<f64>,
    pub bias: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant_pollutants: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerEntry {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Must equal the feature layout, in order
    pub pollutants: Vec<String>,
    pub diseases: Vec<DiseaseEntry>,
    pub scaler: ScalerEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pollutant_categories: Option<BTreeMap<String, BTreeMap<String, [f64; 2]>>>,
}

impl ModelArtifact {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArtifactError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Validate everything and build the runtime context
    pub fn into_context(self) -> Result<ModelContext, ArtifactError> {
        if self.format_version != FEATURE_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.format_version,
                expected: FEATURE_VERSION,
            });
        }

        let expected = layout_names();
        if self.pollutants.len() != expected.len()
            || self.pollutants.iter().zip(&expected).any(|(found, want)| {
                Pollutant::from_name(found).map(|p| p.as_str()) != Some(*want)
            })
        {
            return Err(ArtifactError::PollutantOrder {
                found: self.pollutants,
                expected: expected.into_iter().map(String::from).collect(),
            });
        }

        let mut seen = HashSet::new();
        let mut models = Vec::with_capacity(self.diseases.len());
        for entry in self.diseases {
            let disease = Disease::from_name(&entry.name)
                .ok_or_else(|| ArtifactError::UnknownDisease(entry.name.clone()))?;
            if !seen.insert(disease) {
                return Err(ArtifactError::DuplicateDisease(entry.name));
            }

            let relevant = match entry.relevant_pollutants {
                Some(names) => names
                    .iter()
                    .map(|name| {
                        Pollutant::from_name(name).ok_or_else(|| ArtifactError::UnknownPollutant {
                            disease,
                            name: name.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                None => disease.default_relevant_pollutants().to_vec(),
            };

            models.push(DiseaseModel::new(disease, entry.weights, entry.bias, relevant)?);
        }

        if let Some(missing) = Disease::ALL.into_iter().find(|d| !seen.contains(d)) {
            return Err(ArtifactError::MissingDisease(missing));
        }

        let scaler = StandardizationParams::new(self.scaler.mean, self.scaler.scale)?;
        let table = match self.pollutant_categories {
            Some(named) => PollutantCategoryTable::from_named(&named)?,
            None => PollutantCategoryTable::indian_standard(),
        };

        Ok(ModelContext::new(models, scaler, table)?)
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Read, verify and validate the artifact at `path`
pub fn load_artifact(path: &Path) -> Result<ModelContext, ArtifactError> {
    log::info!("Loading model artifact from {}", path.display());

    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let digest = sha256_hex(&bytes);
    verify_sidecar(path, &digest)?;

    let artifact = ModelArtifact::from_slice(&bytes)?;
    let format_version = artifact.format_version;
    let context = artifact.into_context()?.with_metadata(ModelMetadata {
        source: path.display().to_string(),
        format_version,
        sha256: Some(digest.clone()),
        loaded_at: Utc::now(),
    });

    log::info!(
        "Model artifact loaded: {} disease models, format v{}, sha256 {}",
        context.models().len(),
        format_version,
        digest
    );
    Ok(context)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".sha256");
    PathBuf::from(name)
}

fn verify_sidecar(path: &Path, digest: &str) -> Result<(), ArtifactError> {
    let sidecar = sidecar_path(path);
    if !sidecar.exists() {
        log::debug!("No checksum sidecar at {}", sidecar.display());
        return Ok(());
    }

    let content = fs::read_to_string(&sidecar).map_err(|source| ArtifactError::Io {
        path: sidecar.clone(),
        source,
    })?;
    let expected = content
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if expected != digest {
        return Err(ArtifactError::ChecksumMismatch {
            expected,
            actual: digest.to_string(),
        });
    }
    log::debug!("Checksum verified against {}", sidecar.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::fixtures;

    fn write_artifact(dir: &Path, artifact: &ModelArtifact) -> PathBuf {
        let path = dir.join("model.json");
        fs::write(&path, serde_json::to_vec_pretty(artifact).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_load_valid_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path(), &fixtures::artifact());

        let ctx = load_artifact(&path).unwrap();
        assert_eq!(ctx.models().len(), 13);
        assert_eq!(ctx.metadata().format_version, FEATURE_VERSION);
        assert_eq!(ctx.metadata().sha256.as_deref(), Some(sha256_hex(&fs::read(&path).unwrap()).as_str()));
        assert_eq!(ctx.table(), &PollutantCategoryTable::indian_standard());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_artifact(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(load_artifact(&path), Err(ArtifactError::Decode(_))));
    }

    #[test]
    fn test_checksum_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path(), &fixtures::artifact());
        let digest = sha256_hex(&fs::read(&path).unwrap());

        fs::write(sidecar_path(&path), format!("{}  model.json\n", digest.to_uppercase())).unwrap();
        assert!(load_artifact(&path).is_ok());

        fs::write(sidecar_path(&path), "00ff\n").unwrap();
        assert!(matches!(load_artifact(&path), Err(ArtifactError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut artifact = fixtures::artifact();
        artifact.format_version = FEATURE_VERSION + 1;
        assert!(matches!(artifact.into_context(), Err(ArtifactError::UnsupportedVersion { .. })));
    }

    #[test]
    fn test_rejects_reordered_pollutants() {
        let mut artifact = fixtures::artifact();
        artifact.pollutants.swap(0, 1);
        assert!(matches!(artifact.into_context(), Err(ArtifactError::PollutantOrder { .. })));
    }

    #[test]
    fn test_accepts_wire_keys_for_pollutants() {
        let mut artifact = fixtures::artifact();
        artifact.pollutants = Pollutant::ALL.iter().map(|p| p.wire_key().to_string()).collect();
        assert!(artifact.into_context().is_ok());
    }

    #[test]
    fn test_rejects_bad_disease_entries() {
        let mut unknown = fixtures::artifact();
        unknown.diseases[0].name = "Flu".to_string();
        assert!(matches!(unknown.into_context(), Err(ArtifactError::UnknownDisease(name)) if name == "Flu"));

        let mut duplicate = fixtures::artifact();
        duplicate.diseases[1].name = "Asthma".to_string();
        assert!(matches!(duplicate.into_context(), Err(ArtifactError::DuplicateDisease(_))));

        let mut missing = fixtures::artifact();
        missing.diseases.retain(|d| d.name != "Tuberculosis");
        assert!(matches!(missing.into_context(), Err(ArtifactError::MissingDisease(Disease::Tuberculosis))));

        let mut short = fixtures::artifact();
        short.diseases[2].weights.pop();
        assert!(matches!(short.into_context(), Err(ArtifactError::Model(InferenceError::WeightLength { .. }))));

        let mut pollutant = fixtures::artifact();
        pollutant.diseases[3].relevant_pollutants = Some(vec!["PM1".to_string()]);
        assert!(matches!(pollutant.into_context(), Err(ArtifactError::UnknownPollutant { .. })));
    }

    #[test]
    fn test_custom_category_table_is_used() {
        let mut named = PollutantCategoryTable::indian_standard().to_named();
        named.get_mut("PM2.5").unwrap().insert("Good".to_string(), [0.0, 25.0]);
        named.get_mut("PM2.5").unwrap().insert("Fair".to_string(), [25.0, 60.0]);

        let mut artifact = fixtures::artifact();
        artifact.pollutant_categories = Some(named);
        let ctx = artifact.into_context().unwrap();
        assert_eq!(ctx.table().range(Pollutant::Pm25, crate::logic::category::Category::Good).max, 25.0);

        let mut broken = PollutantCategoryTable::indian_standard().to_named();
        broken.get_mut("NO2").unwrap().insert("Poor".to_string(), [90.0, 280.0]);
        let mut artifact = fixtures::artifact();
        artifact.pollutant_categories = Some(broken);
        assert!(matches!(artifact.into_context(), Err(ArtifactError::CategoryTable(_))));
    }
}
