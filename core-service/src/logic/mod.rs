//! Logic Module - Prediction pipeline & streaming worker
//!
//! - `features/` - Pollutant layout and readings
//! - `category/` - Good/Fair/Poor/Severe banding
//! - `model/` - Disease ensemble, boosts, thresholds, artifact
//! - `predictor.rs` - One reading → ranked assessment
//! - `message.rs` - Inbound/outbound wire messages
//! - `analysis_loop.rs` - Streaming worker and stop signal

// Pipeline
pub mod features;
pub mod category;
pub mod model;
pub mod predictor;

// Streaming
pub mod message;
pub mod analysis_loop;
