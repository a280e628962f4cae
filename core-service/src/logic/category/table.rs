//! Pollutant Category Table
//!
//! Static range table per pollutant and the total `categorize` lookup.
//! Values outside every configured range fall back to Severe.

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{Category, CategoryRange};
use crate::logic::features::{Pollutant, PollutantReading, POLLUTANT_COUNT};

// ============================================================================
// BUILT-IN TABLE (Indian standards, µg/m³)
// ============================================================================

/// Good / Fair / Poor / Severe bands per pollutant, in `Pollutant::ALL` order.
/// Bands touch: the shared boundary belongs to the lower band.
const INDIAN_STANDARD_BANDS: [[(f64, f64); 4]; POLLUTANT_COUNT] = [
    [(0.0, 30.0), (30.0, 60.0), (60.0, 120.0), (120.0, 350.0)],         // PM2.5
    [(0.0, 50.0), (50.0, 100.0), (100.0, 350.0), (350.0, 550.0)],       // PM10
    [(0.0, 40.0), (40.0, 80.0), (80.0, 280.0), (280.0, 400.0)],         // NO2
    [(0.0, 40.0), (40.0, 80.0), (80.0, 800.0), (800.0, 1200.0)],        // SO2
    [(0.0, 1000.0), (1000.0, 2000.0), (2000.0, 10000.0), (10000.0, 15000.0)], // CO
    [(0.0, 50.0), (50.0, 100.0), (100.0, 200.0), (200.0, 400.0)],       // O3
    [(0.0, 200.0), (200.0, 400.0), (400.0, 1200.0), (1200.0, 1800.0)],  // NH3
];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("unknown pollutant '{0}' in category table")]
    UnknownPollutant(String),

    #[error("{pollutant}: unknown category '{name}'")]
    UnknownCategory { pollutant: Pollutant, name: String },

    #[error("category table has no entry for {0}")]
    MissingPollutant(Pollutant),

    #[error("{pollutant}: missing {category} range")]
    MissingCategory { pollutant: Pollutant, category: Category },

    #[error("{pollutant}: {category} range bounds must be finite")]
    NonFinite { pollutant: Pollutant, category: Category },

    #[error("{pollutant}: {category} range has min {min} > max {max}")]
    InvertedRange { pollutant: Pollutant, category: Category, min: f64, max: f64 },

    #[error("{pollutant}: {category} starts at {min} but the previous band ends at {previous_max}")]
    NotContiguous { pollutant: Pollutant, category: Category, min: f64, previous_max: f64 },
}

// ============================================================================
// TABLE
// ============================================================================

/// Range table for all seven pollutants
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantCategoryTable {
    bands: [[CategoryRange; 4]; POLLUTANT_COUNT],
}

impl PollutantCategoryTable {
    /// Build and validate a table from raw bands in feature order
    pub fn new(bands: [[CategoryRange; 4]; POLLUTANT_COUNT]) -> Result<Self, TableError> {
        let table = Self { bands };
        table.validate()?;
        Ok(table)
    }

    /// Built-in Indian-standard table
    pub fn indian_standard() -> Self {
        let bands = INDIAN_STANDARD_BANDS
            .map(|row| row.map(|(min, max)| CategoryRange::new(min, max)));
        Self { bands }
    }

    /// Decode the artifact form: `{"PM2.5": {"Good": [0, 30], ...}, ...}`
    pub fn from_named(named: &BTreeMap<String, BTreeMap<String, [f64; 2]>>) -> Result<Self, TableError> {
        let mut rows: [Option<[Option<CategoryRange>; 4]>; POLLUTANT_COUNT] = [None; POLLUTANT_COUNT];

        for (pollutant_name, categories) in named {
            let pollutant = Pollutant::from_name(pollutant_name)
                .ok_or_else(|| TableError::UnknownPollutant(pollutant_name.clone()))?;

            let mut row = [None; 4];
            for (category_name, [min, max]) in categories {
                let category = Category::from_name(category_name).ok_or_else(|| {
                    TableError::UnknownCategory { pollutant, name: category_name.clone() }
                })?;
                row[category.index()] = Some(CategoryRange::new(*min, *max));
            }
            rows[pollutant.index()] = Some(row);
        }

        let mut bands = [[CategoryRange::new(0.0, 0.0); 4]; POLLUTANT_COUNT];
        for pollutant in Pollutant::ALL {
            let row = rows[pollutant.index()].ok_or(TableError::MissingPollutant(pollutant))?;
            for category in Category::ALL {
                bands[pollutant.index()][category.index()] = row[category.index()]
                    .ok_or(TableError::MissingCategory { pollutant, category })?;
            }
        }

        Self::new(bands)
    }

    /// Inverse of `from_named`
    pub fn to_named(&self) -> BTreeMap<String, BTreeMap<String, [f64; 2]>> {
        Pollutant::ALL
            .iter()
            .map(|pollutant| {
                let row: BTreeMap<String, [f64; 2]> = Category::ALL
                    .iter()
                    .map(|category| {
                        let r = self.range(*pollutant, *category);
                        (category.as_str().to_string(), [r.min, r.max])
                    })
                    .collect();
                (pollutant.as_str().to_string(), row)
            })
            .collect()
    }

    /// Every pollutant has 4 finite, ordered, contiguous ranges
    pub fn validate(&self) -> Result<(), TableError> {
        for pollutant in Pollutant::ALL {
            let row = &self.bands[pollutant.index()];
            for category in Category::ALL {
                let range = row[category.index()];
                if !range.min.is_finite() || !range.max.is_finite() {
                    return Err(TableError::NonFinite { pollutant, category });
                }
                if range.min > range.max {
                    return Err(TableError::InvertedRange {
                        pollutant,
                        category,
                        min: range.min,
                        max: range.max,
                    });
                }
                if category.index() > 0 {
                    let previous_max = row[category.index() - 1].max;
                    if range.min != previous_max {
                        return Err(TableError::NotContiguous {
                            pollutant,
                            category,
                            min: range.min,
                            previous_max,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Range for one pollutant/category pair
    pub fn range(&self, pollutant: Pollutant, category: Category) -> CategoryRange {
        self.bands[pollutant.index()][category.index()]
    }

    /// First category whose inclusive range contains `value`; Severe otherwise
    pub fn categorize(&self, pollutant: Pollutant, value: f64) -> Category {
        let row = &self.bands[pollutant.index()];
        Category::ALL
            .into_iter()
            .find(|c| row[c.index()].contains(value))
            .unwrap_or(Category::Severe)
    }

    /// Categorize every pollutant of a reading
    pub fn categorize_reading(&self, reading: &PollutantReading) -> ReadingCategories {
        let mut categories = [Category::Good; POLLUTANT_COUNT];
        for (pollutant, value) in reading.iter() {
            categories[pollutant.index()] = self.categorize(pollutant, value);
        }
        ReadingCategories { categories }
    }
}

impl Default for PollutantCategoryTable {
    fn default() -> Self {
        Self::indian_standard()
    }
}

// ============================================================================
// READING CATEGORIES
// ============================================================================

/// Category of each pollutant in one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadingCategories {
    categories: [Category; POLLUTANT_COUNT],
}

impl ReadingCategories {
    pub fn get(&self, pollutant: Pollutant) -> Category {
        self.categories[pollutant.index()]
    }

    /// Number of pollutants in Poor or Severe
    pub fn concerning_count(&self) -> usize {
        self.categories.iter().filter(|c| c.is_concerning()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, Category)> + '_ {
        Pollutant::ALL.into_iter().map(|p| (p, self.categories[p.index()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PollutantCategoryTable {
        PollutantCategoryTable::indian_standard()
    }

    #[test]
    fn test_builtin_table_is_valid() {
        assert_eq!(table().validate(), Ok(()));
    }

    #[test]
    fn test_boundaries_are_inclusive_on_max() {
        let t = table();
        assert_eq!(t.categorize(Pollutant::Pm25, 30.0), Category::Good);
        assert_eq!(t.categorize(Pollutant::Pm25, 30.5), Category::Fair);
        assert_eq!(t.categorize(Pollutant::Pm25, 60.0), Category::Fair);
        assert_eq!(t.categorize(Pollutant::Pm25, 120.0), Category::Poor);
        assert_eq!(t.categorize(Pollutant::Pm25, 350.0), Category::Severe);
        assert_eq!(t.categorize(Pollutant::Co, 0.0), Category::Good);
    }

    #[test]
    fn test_out_of_range_falls_back_to_severe() {
        let t = table();
        for pollutant in Pollutant::ALL {
            assert_eq!(t.categorize(pollutant, -0.1), Category::Severe);
            assert_eq!(t.categorize(pollutant, -1e9), Category::Severe);
            assert_eq!(t.categorize(pollutant, 1e12), Category::Severe);
            assert_eq!(t.categorize(pollutant, f64::INFINITY), Category::Severe);
            assert_eq!(t.categorize(pollutant, f64::NAN), Category::Severe);
        }
    }

    #[test]
    fn test_categorize_is_total_over_a_sweep() {
        let t = table();
        for pollutant in Pollutant::ALL {
            let mut value = -50.0;
            while value < 20_000.0 {
                let category = t.categorize(pollutant, value);
                assert!(Category::ALL.contains(&category));
                assert_eq!(category, t.categorize(pollutant, value));
                value += 7.25;
            }
        }
    }

    #[test]
    fn test_reading_categories_count() {
        let reading = PollutantReading::new([120.5, 180.0, 90.2, 40.3, 2500.0, 85.5, 300.0]);
        let categories = table().categorize_reading(&reading);

        assert_eq!(categories.get(Pollutant::Pm25), Category::Severe);
        assert_eq!(categories.get(Pollutant::Pm10), Category::Poor);
        assert_eq!(categories.get(Pollutant::So2), Category::Fair);
        assert_eq!(categories.concerning_count(), 4);
    }

    #[test]
    fn test_from_named_round_trips_builtin() {
        let named = table().to_named();
        assert_eq!(named["PM2.5"]["Fair"], [30.0, 60.0]);
        assert_eq!(PollutantCategoryTable::from_named(&named), Ok(table()));
    }

    #[test]
    fn test_from_named_rejects_gaps() {
        let mut named = BTreeMap::new();
        for pollutant in Pollutant::ALL {
            let mut row = BTreeMap::new();
            row.insert("Good".to_string(), [0.0, 30.0]);
            row.insert("Fair".to_string(), [31.0, 60.0]);
            row.insert("Poor".to_string(), [60.0, 120.0]);
            row.insert("Severe".to_string(), [120.0, 350.0]);
            named.insert(pollutant.as_str().to_string(), row);
        }
        let err = PollutantCategoryTable::from_named(&named).unwrap_err();
        assert!(matches!(err, TableError::NotContiguous { category: Category::Fair, .. }));
    }

    #[test]
    fn test_from_named_requires_every_pollutant() {
        let named = BTreeMap::new();
        assert_eq!(
            PollutantCategoryTable::from_named(&named),
            Err(TableError::MissingPollutant(Pollutant::Pm25))
        );
    }
}
