//! Runtime configuration for the streaming service
//!
//! Defaults live in `constants.rs`; `.env` is loaded by the binary before
//! `Config::from_env` runs. CLI flags override individual fields.

use std::path::PathBuf;
use std::str::FromStr;

use crate::constants;
use crate::logic::model::RiskThreshold;
use crate::transport::KafkaSettings;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name} '{value}': {reason}")]
    InvalidThreshold { name: &'static str, value: String, reason: String },

    #[error("unknown transport '{0}' (expected 'stdio' or 'kafka')")]
    UnknownTransport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TransportKind {
    /// JSON lines on stdin/stdout
    Stdio,
    /// Kafka topics (requires the `kafka` feature)
    Kafka,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(TransportKind::Stdio),
            "kafka" => Ok(TransportKind::Kafka),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Stdio => write!(f, "stdio"),
            TransportKind::Kafka => write!(f, "kafka"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub artifact_path: PathBuf,
    pub threshold: RiskThreshold,
    pub transport: TransportKind,
    pub kafka: KafkaSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            artifact_path: PathBuf::from(constants::get_model_artifact_path()),
            threshold: parse_threshold(constants::get_risk_threshold().as_deref())?,
            transport: constants::get_transport().parse()?,
            kafka: KafkaSettings {
                bootstrap_servers: constants::get_kafka_bootstrap_servers(),
                group_id: constants::get_kafka_group_id(),
                input_topic: constants::get_air_quality_topic(),
                output_topic: constants::get_disease_prediction_topic(),
            },
        })
    }
}

/// Unset means the streaming default (0.65)
pub fn parse_threshold(raw: Option<&str>) -> Result<RiskThreshold, ConfigError> {
    match raw {
        None => Ok(RiskThreshold::STREAMING),
        Some(value) => value.parse().map_err(|reason| ConfigError::InvalidThreshold {
            name: constants::ENV_RISK_THRESHOLD,
            value: value.to_string(),
            reason,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults_to_streaming() {
        assert_eq!(parse_threshold(None), Ok(RiskThreshold::STREAMING));
        assert_eq!(parse_threshold(Some("0.4")), Ok(RiskThreshold::BATCH));
    }

    #[test]
    fn test_bad_threshold_is_an_error() {
        assert!(matches!(parse_threshold(Some("high")), Err(ConfigError::InvalidThreshold { .. })));
        assert!(matches!(parse_threshold(Some("1.2")), Err(ConfigError::InvalidThreshold { .. })));
    }

    #[test]
    fn test_transport_kind_parsing() {
        assert_eq!("stdio".parse::<TransportKind>(), Ok(TransportKind::Stdio));
        assert_eq!(" Kafka ".parse::<TransportKind>(), Ok(TransportKind::Kafka));
        assert_eq!(
            "carrier-pigeon".parse::<TransportKind>(),
            Err(ConfigError::UnknownTransport("carrier-pigeon".to_string()))
        );
        assert_eq!(TransportKind::Kafka.to_string(), "kafka");
    }
}
