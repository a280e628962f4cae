//! Risk Threshold & Ranking
//!
//! Orders diseases by adjusted probability and selects those above the risk
//! threshold. The threshold is always explicit: the streaming path and the
//! batch path use different values (0.65 vs 0.4) and neither is authoritative.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::disease::Disease;
use super::inference::DiseaseScores;

// ============================================================================
// THRESHOLD
// ============================================================================

/// Output cutoff: a disease is selected when `probability > threshold`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64")]
pub struct RiskThreshold(f64);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("risk threshold must be within [0, 1], got {0}")]
pub struct InvalidThreshold(pub f64);

impl RiskThreshold {
    /// Streaming service cutoff (high-risk only)
    pub const STREAMING: RiskThreshold = RiskThreshold(0.65);

    /// Standalone batch predictor cutoff (moderate-inclusive)
    pub const BATCH: RiskThreshold = RiskThreshold(0.4);

    pub fn new(value: f64) -> Result<Self, InvalidThreshold> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidThreshold(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn admits(&self, probability: f64) -> bool {
        probability > self.0
    }
}

impl TryFrom<f64> for RiskThreshold {
    type Error = InvalidThreshold;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for RiskThreshold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|e| format!("invalid risk threshold '{}': {}", s, e))?;
        Self::new(value).map_err(|e| e.to_string())
    }
}

impl std::fmt::Display for RiskThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// RISK BAND (reporting only)
// ============================================================================

/// Number of ranked diseases that get a band in reports
pub const REPORT_TOP_N: usize = 5;

pub const HIGH_RISK_MIN: f64 = 0.75;
pub const MODERATE_RISK_MIN: f64 = 0.4;

/// Reporting band; never affects selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    High,
    Moderate,
    Low,
}

impl RiskBand {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_MIN {
            RiskBand::High
        } else if probability >= MODERATE_RISK_MIN {
            RiskBand::Moderate
        } else {
            RiskBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::High => "HIGH RISK",
            RiskBand::Moderate => "MODERATE RISK",
            RiskBand::Low => "LOW RISK",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RANKING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedDisease {
    pub disease: Disease,
    pub probability: f64,
}

impl RankedDisease {
    pub fn band(&self) -> RiskBand {
        RiskBand::from_probability(self.probability)
    }
}

/// Probability descending; ties broken by name descending (reverse pair order)
pub fn rank(scores: &DiseaseScores) -> Vec<RankedDisease> {
    let mut ranked: Vec<RankedDisease> = scores
        .iter()
        .map(|(disease, probability)| RankedDisease { disease, probability })
        .collect();

    ranked.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.disease.as_str().cmp(a.disease.as_str()))
    });
    ranked
}

/// Ranked diseases admitted by the threshold, order preserved
pub fn select(ranked: &[RankedDisease], threshold: RiskThreshold) -> Vec<Disease> {
    ranked
        .iter()
        .filter(|r| threshold.admits(r.probability))
        .map(|r| r.disease)
        .collect()
}

pub fn rank_and_select(scores: &DiseaseScores, threshold: RiskThreshold) -> Vec<Disease> {
    select(&rank(scores), threshold)
}
