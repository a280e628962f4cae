//! Wire Messages - inbound air-quality records and outbound predictions
//!
//! Inbound: `{"city", "state", "pm2_5", "pm10", "no2", "so2", "co", "o3", "nh3", "timestamp"?}`.
//! Pollutants may be numbers or numeric strings; missing/null ones are zero-filled.
//! Outbound: `{"city", "state", "diseases": [...], "timestamp": <passthrough or null>}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::logic::features::{Pollutant, PollutantReading, POLLUTANT_COUNT};

/// Max bytes of a bad payload echoed into the log
const PREVIEW_LEN: usize = 200;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("missing or empty field '{0}'")]
    MissingField(&'static str),

    #[error("field '{0}' must be a string")]
    NotAString(&'static str),

    #[error("{pollutant}: '{value}' is not a finite number")]
    InvalidPollutant { pollutant: Pollutant, value: String },
}

// ============================================================================
// MESSAGES
// ============================================================================

/// A decoded inbound record
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInput {
    pub city: String,
    pub state: String,
    pub reading: PollutantReading,
    /// Pollutants that were absent and zero-filled
    pub missing: Vec<Pollutant>,
    /// Forwarded opaquely
    pub timestamp: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub city: String,
    pub state: String,
    pub diseases: Vec<String>,
    pub timestamp: Option<Value>,
}

impl PredictionInput {
    pub fn into_output(self, diseases: Vec<String>) -> PredictionOutput {
        PredictionOutput {
            city: self.city,
            state: self.state,
            diseases,
            timestamp: self.timestamp,
        }
    }
}

impl PredictionOutput {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

// ============================================================================
// PARSING
// ============================================================================

pub fn parse_inbound(payload: &[u8]) -> Result<PredictionInput, MessageError> {
    let value: Value = serde_json::from_slice(payload)?;
    let object = value.as_object().ok_or(MessageError::NotAnObject)?;

    let city = required_string(object, "city")?;
    let state = required_string(object, "state")?;
    let (reading, missing) = parse_reading(object)?;
    let timestamp = object.get("timestamp").filter(|v| !v.is_null()).cloned();

    Ok(PredictionInput {
        city,
        state,
        reading,
        missing,
        timestamp,
    })
}

/// Reading from an object keyed by wire keys (`pm2_5`) or display names (`PM2.5`)
pub fn parse_reading(object: &Map<String, Value>) -> Result<(PollutantReading, Vec<Pollutant>), MessageError> {
    let mut partial = [None; POLLUTANT_COUNT];

    for pollutant in Pollutant::ALL {
        let raw = object
            .get(pollutant.wire_key())
            .or_else(|| object.get(pollutant.as_str()));
        partial[pollutant.index()] = match raw {
            None | Some(Value::Null) => None,
            Some(v) => Some(coerce_number(pollutant, v)?),
        };
    }

    Ok(PollutantReading::from_partial(partial))
}

/// Same as `parse_reading` for a raw JSON value (batch CLI input)
pub fn parse_reading_value(value: &Value) -> Result<(PollutantReading, Vec<Pollutant>), MessageError> {
    let object = value.as_object().ok_or(MessageError::NotAnObject)?;
    parse_reading(object)
}

fn coerce_number(pollutant: Pollutant, value: &Value) -> Result<f64, MessageError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(MessageError::InvalidPollutant {
            pollutant,
            value: value.to_string(),
        }),
    }
}

fn required_string(object: &Map<String, Value>, field: &'static str) -> Result<String, MessageError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(MessageError::MissingField(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(MessageError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(MessageError::NotAString(field)),
    }
}

/// Lossy, truncated view of a payload for log lines
pub fn payload_preview(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    if text.chars().count() <= PREVIEW_LEN {
        text.into_owned()
    } else {
        let head: String = text.chars().take(PREVIEW_LEN).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_parse_full_message() {
        let input = parse_inbound(&payload(json!({
            "city": "Delhi",
            "state": "Delhi",
            "pm2_5": 58.0, "pm10": 98.0, "no2": 78.0, "so2": 40.3,
            "co": 1950.0, "o3": 85.5, "nh3": 300.0,
            "timestamp": "2024-03-01T10:00:00Z"
        })))
        .unwrap();

        assert_eq!(input.city, "Delhi");
        assert_eq!(input.reading.get(Pollutant::So2), 40.3);
        assert_eq!(input.reading.get(Pollutant::Nh3), 300.0);
        assert!(input.missing.is_empty());
        assert_eq!(input.timestamp, Some(json!("2024-03-01T10:00:00Z")));
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let input = parse_inbound(&payload(json!({
            "city": "Pune", "state": "Maharashtra",
            "pm2_5": "120.5", "pm10": " 180 ", "no2": 90.2, "so2": "40.3",
            "co": 2500, "o3": "85.5", "nh3": "300"
        })))
        .unwrap();

        assert_eq!(input.reading.values(), &[120.5, 180.0, 90.2, 40.3, 2500.0, 85.5, 300.0]);
    }

    #[test]
    fn test_missing_and_null_pollutants_are_zero_filled() {
        let input = parse_inbound(&payload(json!({
            "city": "Agra", "state": "UP",
            "pm2_5": 10.0, "no2": null
        })))
        .unwrap();

        assert_eq!(input.reading.get(Pollutant::Pm25), 10.0);
        assert_eq!(input.reading.get(Pollutant::No2), 0.0);
        assert_eq!(input.missing.len(), 6);
        assert!(input.missing.contains(&Pollutant::No2));
    }

    #[test]
    fn test_missing_city_is_malformed() {
        let err = parse_inbound(&payload(json!({"state": "Delhi", "pm2_5": 10.0}))).unwrap_err();
        assert!(matches!(err, MessageError::MissingField("city")));

        let err = parse_inbound(&payload(json!({"city": "  ", "state": "Delhi"}))).unwrap_err();
        assert!(matches!(err, MessageError::MissingField("city")));

        let err = parse_inbound(&payload(json!({"city": 7, "state": "Delhi"}))).unwrap_err();
        assert!(matches!(err, MessageError::NotAString("city")));
    }

    #[test]
    fn test_bad_payloads_are_malformed() {
        assert!(matches!(parse_inbound(b"{not json"), Err(MessageError::Json(_))));
        assert!(matches!(parse_inbound(b"[1, 2]"), Err(MessageError::NotAnObject)));

        for bad in [json!("high"), json!("NaN"), json!(true), json!([1])] {
            let err = parse_inbound(&payload(json!({"city": "A", "state": "B", "co": bad}))).unwrap_err();
            assert!(matches!(err, MessageError::InvalidPollutant { pollutant: Pollutant::Co, .. }));
        }
    }

    #[test]
    fn test_display_names_accepted_for_batch_input() {
        let (reading, missing) = parse_reading_value(&json!({"PM2.5": 58.0, "NH3": "300"})).unwrap();
        assert_eq!(reading.get(Pollutant::Pm25), 58.0);
        assert_eq!(reading.get(Pollutant::Nh3), 300.0);
        assert_eq!(missing.len(), 5);
    }

    #[test]
    fn test_output_shape_and_timestamp_passthrough() {
        let input = parse_inbound(&payload(json!({
            "city": "Delhi", "state": "Delhi", "timestamp": {"epoch": 1709287200}
        })))
        .unwrap();
        let output = input.into_output(vec!["Asthma".to_string()]);
        let value: Value = serde_json::from_slice(&output.to_bytes().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({"city": "Delhi", "state": "Delhi", "diseases": ["Asthma"], "timestamp": {"epoch": 1709287200}})
        );

        let no_ts = parse_inbound(&payload(json!({"city": "A", "state": "B"}))).unwrap();
        let value = serde_json::to_value(no_ts.into_output(vec![])).unwrap();
        assert_eq!(value["timestamp"], Value::Null);
        assert_eq!(value["diseases"], json!([]));
    }

    #[test]
    fn test_payload_preview_truncates() {
        let long = vec![b'x'; 500];
        let preview = payload_preview(&long);
        assert_eq!(preview.len(), PREVIEW_LEN + 3);
        assert_eq!(payload_preview(b"short"), "short");
    }
}
