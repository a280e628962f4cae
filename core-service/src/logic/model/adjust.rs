//! Risk Adjuster
//!
//! Two heuristic corrections on top of the raw ensemble probabilities:
//! - global sensitivity boost: broad degradation raises every disease
//! - per-disease proximity boost: relevant pollutants climbing toward the
//!   next band while still Good/Fair
//!
//! Order is fixed: `p1 = min(raw + boost, 1)`, then `p2 = min(p1 + avg, 1)`.

use serde::Serialize;

use super::disease::{Disease, DISEASE_COUNT};
use super::inference::{DiseaseModel, DiseaseScores};
use crate::logic::category::{Category, PollutantCategoryTable, ReadingCategories};
use crate::logic::features::{Pollutant, PollutantReading};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Boost per pollutant in Poor or Severe
pub const GLOBAL_BOOST_PER_POLLUTANT: f64 = 0.03;

/// Ceiling of the global boost
pub const GLOBAL_BOOST_CAP: f64 = 0.15;

/// Scale applied to a pollutant's position inside its band
pub const PROXIMITY_SCALE: f64 = 0.1;

// ============================================================================
// BOOSTS
// ============================================================================

/// `min(0.15, count(Poor|Severe) * 0.03)`
pub fn global_sensitivity_boost(categories: &ReadingCategories) -> f64 {
    (categories.concerning_count() as f64 * GLOBAL_BOOST_PER_POLLUTANT).min(GLOBAL_BOOST_CAP)
}

/// Average of `position * 0.1` over relevant pollutants still in Good/Fair.
/// Zero when none qualify.
pub fn proximity_boost(
    relevant: &[Pollutant],
    reading: &PollutantReading,
    categories: &ReadingCategories,
    table: &PollutantCategoryTable,
) -> f64 {
    let mut factor = 0.0;
    let mut considered = 0usize;

    for &pollutant in relevant {
        let category = categories.get(pollutant);
        if !matches!(category, Category::Good | Category::Fair) {
            continue;
        }
        considered += 1;
        let position = table.range(pollutant, category).position(reading.get(pollutant));
        factor += position * PROXIMITY_SCALE;
    }

    if considered > 0 {
        factor / considered as f64
    } else {
        0.0
    }
}

// ============================================================================
// ADJUSTED RISK
// ============================================================================

/// Adjusted probabilities plus the terms that produced them
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdjustedRisk {
    pub probabilities: DiseaseScores,
    pub global_boost: f64,
    pub proximity: [f64; DISEASE_COUNT],
}

impl AdjustedRisk {
    pub fn get(&self, disease: Disease) -> f64 {
        self.probabilities.get(disease)
    }

    pub fn proximity_for(&self, disease: Disease) -> f64 {
        self.proximity[disease.index()]
    }
}

// ============================================================================
// ADJUSTER
// ============================================================================

/// Applies both boosts using the loaded category table and relevance lists
#[derive(Debug, Clone, Copy)]
pub struct RiskAdjuster<'a> {
    table: &'a PollutantCategoryTable,
    models: &'a [DiseaseModel],
}

impl<'a> RiskAdjuster<'a> {
    /// `models` in `Disease::ALL` order
    pub fn new(table: &'a PollutantCategoryTable, models: &'a [DiseaseModel]) -> Self {
        Self { table, models }
    }

    pub fn adjust(
        &self,
        raw: &DiseaseScores,
        reading: &PollutantReading,
        categories: &ReadingCategories,
    ) -> AdjustedRisk {
        let global_boost = global_sensitivity_boost(categories);
        let mut values = [0.0; DISEASE_COUNT];
        let mut proximity = [0.0; DISEASE_COUNT];

        for disease in Disease::ALL {
            let i = disease.index();
            let relevant = self
                .models
                .get(i)
                .map(|m| m.relevant_pollutants.as_slice())
                .unwrap_or_else(|| disease.default_relevant_pollutants());

            let base = raw.get(disease);
            let boosted = (base + global_boost).min(1.0);
            proximity[i] = proximity_boost(relevant, reading, categories, self.table);
            values[i] = (boosted + proximity[i]).min(1.0);
        }

        AdjustedRisk {
            probabilities: DiseaseScores::new(values),
            global_boost,
            proximity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PollutantCategoryTable {
        PollutantCategoryTable::indian_standard()
    }

    fn categories(values: [f64; 7]) -> (PollutantReading, ReadingCategories) {
        let reading = PollutantReading::new(values);
        let categories = table().categorize_reading(&reading);
        (reading, categories)
    }

    #[test]
    fn test_global_boost_zero_when_all_fair() {
        let (_, c) = categories([58.0, 98.0, 78.0, 40.3, 1950.0, 85.5, 300.0]);
        assert_eq!(c.concerning_count(), 0);
        assert_eq!(global_sensitivity_boost(&c), 0.0);
    }

    #[test]
    fn test_global_boost_is_monotonic_and_capped() {
        // Push pollutants into Poor one at a time
        let poor = [100.0, 200.0, 200.0, 400.0, 5000.0, 150.0, 800.0];
        let mut values = [10.0; 7];
        let mut previous = 0.0;
        for i in 0..7 {
            values[i] = poor[i];
            let (_, c) = categories(values);
            let boost = global_sensitivity_boost(&c);
            assert!(boost >= previous);
            assert!(boost <= GLOBAL_BOOST_CAP);
            previous = boost;
        }

        let (_, all_severe) = categories([300.0, 500.0, 350.0, 1000.0, 12000.0, 300.0, 1500.0]);
        assert_eq!(all_severe.concerning_count(), 7);
        assert_eq!(global_sensitivity_boost(&all_severe), GLOBAL_BOOST_CAP);
    }

    #[test]
    fn test_proximity_zero_when_no_relevant_pollutant_is_good_or_fair() {
        let (reading, c) = categories([200.0, 200.0, 100.0, 10.0, 10.0, 10.0, 10.0]);
        let boost = proximity_boost(&[Pollutant::Pm25, Pollutant::No2], &reading, &c, &table());
        assert_eq!(boost, 0.0);
    }

    #[test]
    fn test_proximity_positive_when_position_above_zero() {
        let (reading, c) = categories([58.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let boost = proximity_boost(&[Pollutant::Pm25], &reading, &c, &table());
        // PM2.5 58 in Fair [30, 60]
        let expected = (58.0 - 30.0) / 30.0 * PROXIMITY_SCALE;
        assert!((boost - expected).abs() < 1e-12);
        assert!(boost > 0.0);
    }

    #[test]
    fn test_proximity_averages_over_considered_only() {
        // PM2.5 Severe (skipped), NO2 = 20 in Good [0, 40] → position 0.5
        let (reading, c) = categories([200.0, 0.0, 20.0, 0.0, 0.0, 0.0, 0.0]);
        let boost = proximity_boost(&[Pollutant::Pm25, Pollutant::No2], &reading, &c, &table());
        assert!((boost - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_adjusted_never_exceeds_one_or_drops_below_raw() {
        let models: Vec<DiseaseModel> = Vec::new();
        let t = table();
        let adjuster = RiskAdjuster::new(&t, &models);

        let readings = [
            [58.0, 98.0, 78.0, 40.3, 1950.0, 85.5, 300.0],
            [120.5, 180.0, 90.2, 40.3, 2500.0, 85.5, 300.0],
            [-5.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [1e9, 1e9, 1e9, 1e9, 1e9, 1e9, 1e9],
            [29.9, 49.9, 39.9, 39.9, 999.0, 49.9, 199.0],
        ];
        for raw_p in [0.0, 0.3, 0.9, 0.99, 1.0] {
            let raw = DiseaseScores::new([raw_p; DISEASE_COUNT]);
            for values in readings {
                let (reading, c) = categories(values);
                let adjusted = adjuster.adjust(&raw, &reading, &c);
                for (disease, p) in adjusted.probabilities.iter() {
                    assert!(p <= 1.0, "{disease} exceeded 1.0");
                    assert!(p >= raw.get(disease), "{disease} dropped below raw");
                }
            }
        }
    }

    #[test]
    fn test_global_boost_clamped_before_proximity() {
        let models: Vec<DiseaseModel> = Vec::new();
        let t = table();
        let adjuster = RiskAdjuster::new(&t, &models);

        let (reading, c) = categories([58.0, 200.0, 100.0, 100.0, 5000.0, 150.0, 300.0]);
        let raw = DiseaseScores::new([0.5; DISEASE_COUNT]);
        let adjusted = adjuster.adjust(&raw, &reading, &c);

        assert!((adjusted.global_boost - 0.15).abs() < 1e-12);
        // Lung cancer: PM2.5 Fair, PM10 Poor → one pollutant considered
        let lung = adjusted.proximity_for(Disease::LungCancer);
        let expected = (58.0 - 30.0) / 30.0 * PROXIMITY_SCALE;
        assert!((lung - expected).abs() < 1e-12);
        assert!((adjusted.get(Disease::LungCancer) - (0.65 + expected)).abs() < 1e-12);
    }
}
