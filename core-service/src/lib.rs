//! AirAware Disease Predictor
//!
//! Scores air-quality readings against a 13-disease linear ensemble and
//! streams the high-risk diseases back out.

pub mod config;
pub mod constants;
pub mod logic;
pub mod transport;

pub use config::{Config, ConfigError, TransportKind};
pub use logic::analysis_loop::{stop_channel, LoopSummary, MessageOutcome, StopHandle, StopSignal, StreamWorker};
pub use logic::features::{Pollutant, PollutantReading};
pub use logic::message::{PredictionInput, PredictionOutput};
pub use logic::model::{catalog, load_artifact, Disease, ModelContext, RiskThreshold};
pub use logic::predictor::{assess, RiskAssessment};
