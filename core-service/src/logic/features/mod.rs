//! Features Module - Pollutant readings and the model input vector
//!
//! Keeps the pollutant layout separate from scoring so the feature schema
//! has a single owner.

pub mod layout;
pub mod reading;
pub mod vector;

// Re-export common types
pub use layout::{Pollutant, FEATURE_VERSION, POLLUTANT_COUNT};
pub use reading::PollutantReading;
pub use vector::FeatureVector;
