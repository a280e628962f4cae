//! Category Types
//!
//! Qualitative bands for a pollutant concentration.
//! No lookup logic here - only data structures.

use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORY
// ============================================================================

/// Pollutant category, best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Good,
    Fair,
    Poor,
    Severe,
}

impl Category {
    /// Table order (Good → Severe)
    pub const ALL: [Category; 4] = [
        Category::Good,
        Category::Fair,
        Category::Poor,
        Category::Severe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Fair => "Fair",
            Category::Poor => "Poor",
            Category::Severe => "Severe",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Poor or Severe: counts toward the global sensitivity boost
    pub fn is_concerning(&self) -> bool {
        matches!(self, Category::Poor | Category::Severe)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CATEGORY RANGE
// ============================================================================

/// Inclusive `[min, max]` concentration range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryRange {
    pub min: f64,
    pub max: f64,
}

impl CategoryRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Normalized position of `value` inside the range (0.5 for a zero-width range)
    pub fn position(&self, value: f64) -> f64 {
        let width = self.width();
        if width > 0.0 {
            (value - self.min) / width
        } else {
            0.5
        }
    }
}
