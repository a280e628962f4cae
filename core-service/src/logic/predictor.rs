//! Risk Predictor - one reading in, ranked diseases out
//!
//! Pipeline: categorize → score (ensemble) → adjust (boosts) → rank → select.
//! Shared by the streaming worker and the batch CLI; only the threshold differs.

use std::fmt::Write as _;

use serde::Serialize;

use crate::logic::category::ReadingCategories;
use crate::logic::features::PollutantReading;
use crate::logic::model::threshold::{rank, select, REPORT_TOP_N};
use crate::logic::model::{
    AdjustedRisk, Disease, DiseaseScores, ModelContext, RankedDisease, RiskModel, RiskThreshold,
};

/// Everything computed for one reading
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub reading: PollutantReading,
    pub categories: ReadingCategories,
    pub raw: DiseaseScores,
    pub adjusted: AdjustedRisk,
    /// All 13 diseases, probability descending
    pub ranked: Vec<RankedDisease>,
    /// Subset of `ranked` above the threshold, same order
    pub selected: Vec<Disease>,
    pub threshold: RiskThreshold,
}

pub fn assess(ctx: &ModelContext, reading: &PollutantReading, threshold: RiskThreshold) -> RiskAssessment {
    // 1. Band every pollutant
    let categories = ctx.table().categorize_reading(reading);

    // 2. Base probabilities
    let raw = ctx.scorer().score(reading);

    // 3. Global + proximity boosts
    let adjusted = ctx.adjuster().adjust(&raw, reading, &categories);

    // 4. Rank and select
    let ranked = rank(&adjusted.probabilities);
    let selected = select(&ranked, threshold);

    RiskAssessment {
        reading: *reading,
        categories,
        raw,
        adjusted,
        ranked,
        selected,
        threshold,
    }
}

impl RiskAssessment {
    pub fn top(&self) -> &[RankedDisease] {
        &self.ranked[..REPORT_TOP_N.min(self.ranked.len())]
    }

    pub fn selected_names(&self) -> Vec<String> {
        self.selected.iter().map(|d| d.as_str().to_string()).collect()
    }

    /// Top diseases with their band at info level
    pub fn log_top(&self) {
        log::info!("Top {} potential diseases:", REPORT_TOP_N);
        for entry in self.top() {
            log::info!(
                "  {}: {:.2}% ({})",
                entry.disease,
                entry.probability * 100.0,
                entry.band()
            );
        }
        log::debug!(
            "Global boost {:.2}, threshold {}, selected {:?}",
            self.adjusted.global_boost,
            self.threshold,
            self.selected_names()
        );
    }

    /// Human-readable report for the batch CLI
    pub fn report(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Input air quality parameters:");
        for (pollutant, value) in self.reading.iter() {
            let _ = writeln!(
                out,
                "  {}: {:.1} µg/m³ ({})",
                pollutant,
                value,
                self.categories.get(pollutant)
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Top {} potential diseases:", REPORT_TOP_N);
        for entry in self.top() {
            let _ = writeln!(
                out,
                "  {}: {:.2}% ({})",
                entry.disease,
                entry.probability * 100.0,
                entry.band()
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Predicted diseases (probability > {}): {:?}",
            self.threshold,
            self.selected_names()
        );
        out
    }
}
