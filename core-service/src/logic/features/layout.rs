//! Pollutant Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema the risk models were trained on.**
//!
//! ## Rules:
//! 1. The order of `Pollutant::ALL` is the column order of every weight vector
//! 2. Change order → increment FEATURE_VERSION (old artifacts become invalid)
//! 3. Display names must match the artifact's `pollutants` list exactly

use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version, checked against the artifact's `format_version`
pub const FEATURE_VERSION: u32 = 1;

/// Total number of pollutant features
pub const POLLUTANT_COUNT: usize = 7;

// ============================================================================
// POLLUTANT
// ============================================================================

/// The seven monitored pollutants, in feature order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "CO")]
    Co,
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "NH3")]
    Nh3,
}

impl Pollutant {
    /// Authoritative feature order
    pub const ALL: [Pollutant; POLLUTANT_COUNT] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::O3,
        Pollutant::Nh3,
    ];

    /// Column index inside a feature vector
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name used by the artifact and in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::No2 => "NO2",
            Pollutant::So2 => "SO2",
            Pollutant::Co => "CO",
            Pollutant::O3 => "O3",
            Pollutant::Nh3 => "NH3",
        }
    }

    /// Field name on the inbound air-quality message
    pub fn wire_key(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::No2 => "no2",
            Pollutant::So2 => "so2",
            Pollutant::Co => "co",
            Pollutant::O3 => "o3",
            Pollutant::Nh3 => "nh3",
        }
    }

    /// Resolve a display name (`"PM2.5"`) or a wire key (`"pm2_5"`)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == name || p.wire_key() == name)
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display names in feature order
pub fn layout_names() -> Vec<&'static str> {
    Pollutant::ALL.iter().map(|p| p.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_order_matches_index() {
        for (i, p) in Pollutant::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
        assert_eq!(layout_names(), vec!["PM2.5", "PM10", "NO2", "SO2", "CO", "O3", "NH3"]);
    }

    #[test]
    fn test_from_name_accepts_both_spellings() {
        assert_eq!(Pollutant::from_name("PM2.5"), Some(Pollutant::Pm25));
        assert_eq!(Pollutant::from_name("pm2_5"), Some(Pollutant::Pm25));
        assert_eq!(Pollutant::from_name("nh3"), Some(Pollutant::Nh3));
        assert_eq!(Pollutant::from_name("pm1"), None);
    }

    #[test]
    fn test_serde_uses_display_name() {
        let json = serde_json::to_string(&Pollutant::Pm25).unwrap();
        assert_eq!(json, "\"PM2.5\"");
    }
}
