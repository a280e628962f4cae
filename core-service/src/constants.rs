//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden through the environment (or `.env`).

/// Default Kafka bootstrap servers
pub const DEFAULT_KAFKA_BOOTSTRAP_SERVERS: &str = "localhost:9092";

/// Topic carrying raw air-quality readings
pub const DEFAULT_AIR_QUALITY_TOPIC: &str = "air-quality-data";

/// Topic receiving disease predictions
pub const DEFAULT_DISEASE_PREDICTION_TOPIC: &str = "disease-predictions";

/// Default consumer group
pub const DEFAULT_KAFKA_GROUP_ID: &str = "disease-predictor";

/// Default model artifact location (relative to the working directory)
pub const DEFAULT_MODEL_ARTIFACT_PATH: &str = "air_pollution_disease_model.json";

/// Default transport for the streaming service
pub const DEFAULT_TRANSPORT: &str = "stdio";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "AirAware Disease Predictor";

// ============================================
// Environment variable names
// ============================================

pub const ENV_KAFKA_BOOTSTRAP_SERVERS: &str = "KAFKA_BOOTSTRAP_SERVERS";
pub const ENV_AIR_QUALITY_TOPIC: &str = "KAFKA_AIR_QUALITY_TOPIC";
pub const ENV_DISEASE_PREDICTION_TOPIC: &str = "KAFKA_DISEASE_PREDICTION_TOPIC";
pub const ENV_KAFKA_GROUP_ID: &str = "KAFKA_GROUP_ID";
pub const ENV_MODEL_ARTIFACT_PATH: &str = "MODEL_ARTIFACT_PATH";
pub const ENV_RISK_THRESHOLD: &str = "RISK_THRESHOLD";
pub const ENV_TRANSPORT: &str = "PREDICTOR_TRANSPORT";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Get Kafka bootstrap servers from environment or use default
pub fn get_kafka_bootstrap_servers() -> String {
    env_or(ENV_KAFKA_BOOTSTRAP_SERVERS, DEFAULT_KAFKA_BOOTSTRAP_SERVERS)
}

/// Get inbound topic from environment or use default
pub fn get_air_quality_topic() -> String {
    env_or(ENV_AIR_QUALITY_TOPIC, DEFAULT_AIR_QUALITY_TOPIC)
}

/// Get outbound topic from environment or use default
pub fn get_disease_prediction_topic() -> String {
    env_or(ENV_DISEASE_PREDICTION_TOPIC, DEFAULT_DISEASE_PREDICTION_TOPIC)
}

/// Get consumer group from environment or use default
pub fn get_kafka_group_id() -> String {
    env_or(ENV_KAFKA_GROUP_ID, DEFAULT_KAFKA_GROUP_ID)
}

/// Get artifact path from environment or use default
pub fn get_model_artifact_path() -> String {
    env_or(ENV_MODEL_ARTIFACT_PATH, DEFAULT_MODEL_ARTIFACT_PATH)
}

/// Raw `RISK_THRESHOLD`, if set (validated by `Config`)
pub fn get_risk_threshold() -> Option<String> {
    std::env::var(ENV_RISK_THRESHOLD)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Get transport name from environment or use default
pub fn get_transport() -> String {
    env_or(ENV_TRANSPORT, DEFAULT_TRANSPORT)
}
