//! Disease Catalog
//!
//! The 13 diseases the ensemble scores. Display names are part of the public
//! contract: the query API serves exactly these strings.

use serde::{Deserialize, Serialize};

use crate::logic::features::Pollutant;

/// Number of diseases (one binary model each)
pub const DISEASE_COUNT: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Disease {
    #[serde(rename = "Asthma")]
    Asthma,
    #[serde(rename = "COPD")]
    Copd,
    #[serde(rename = "Bronchitis")]
    Bronchitis,
    #[serde(rename = "Emphysema")]
    Emphysema,
    #[serde(rename = "Pneumonia")]
    Pneumonia,
    #[serde(rename = "Lung cancer")]
    LungCancer,
    #[serde(rename = "Allergic rhinitis")]
    AllergicRhinitis,
    #[serde(rename = "Sinusitis")]
    Sinusitis,
    #[serde(rename = "Respiratory tract infection")]
    RespiratoryTractInfection,
    #[serde(rename = "Cough and throat irritation")]
    CoughAndThroatIrritation,
    #[serde(rename = "Pulmonary fibrosis")]
    PulmonaryFibrosis,
    #[serde(rename = "Tuberculosis")]
    Tuberculosis,
    #[serde(rename = "Obstructive sleep apnea")]
    ObstructiveSleepApnea,
}

impl Disease {
    /// Catalog order (also the row order of the weight matrix)
    pub const ALL: [Disease; DISEASE_COUNT] = [
        Disease::Asthma,
        Disease::Copd,
        Disease::Bronchitis,
        Disease::Emphysema,
        Disease::Pneumonia,
        Disease::LungCancer,
        Disease::AllergicRhinitis,
        Disease::Sinusitis,
        Disease::RespiratoryTractInfection,
        Disease::CoughAndThroatIrritation,
        Disease::PulmonaryFibrosis,
        Disease::Tuberculosis,
        Disease::ObstructiveSleepApnea,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Disease::Asthma => "Asthma",
            Disease::Copd => "COPD",
            Disease::Bronchitis => "Bronchitis",
            Disease::Emphysema => "Emphysema",
            Disease::Pneumonia => "Pneumonia",
            Disease::LungCancer => "Lung cancer",
            Disease::AllergicRhinitis => "Allergic rhinitis",
            Disease::Sinusitis => "Sinusitis",
            Disease::RespiratoryTractInfection => "Respiratory tract infection",
            Disease::CoughAndThroatIrritation => "Cough and throat irritation",
            Disease::PulmonaryFibrosis => "Pulmonary fibrosis",
            Disease::Tuberculosis => "Tuberculosis",
            Disease::ObstructiveSleepApnea => "Obstructive sleep apnea",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == name)
    }

    /// Pollutants linked to this disease (used by the proximity boost)
    pub fn default_relevant_pollutants(&self) -> &'static [Pollutant] {
        use Pollutant::*;
        match self {
            Disease::Asthma => &[Pm25, O3, No2],
            Disease::Copd => &[Pm25, Co, O3, No2],
            Disease::Bronchitis => &[Pm25, Pm10, No2, So2],
            Disease::Emphysema => &[Pm25, Pm10, O3, No2],
            Disease::Pneumonia => &[Pm25, No2, So2],
            Disease::LungCancer => &[Pm25, Pm10],
            Disease::AllergicRhinitis => &[Pm25, Pm10, No2, Nh3],
            Disease::Sinusitis => &[Pm25, Pm10, No2, Nh3],
            Disease::RespiratoryTractInfection => &[Pm25, Pm10, No2, So2],
            Disease::CoughAndThroatIrritation => &[O3, Pm25, So2],
            Disease::PulmonaryFibrosis => &[Pm25, Pm10, O3],
            Disease::Tuberculosis => &[Pm25, No2],
            Disease::ObstructiveSleepApnea => &[Pm25, No2],
        }
    }
}

impl std::fmt::Display for Disease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalog names in order, as served by the query API
pub fn catalog() -> Vec<&'static str> {
    Disease::ALL.iter().map(|d| d.as_str()).collect()
}
