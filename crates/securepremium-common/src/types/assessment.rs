//! Risk assessment value object

use crate::util::serde_round4;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current assessment format version
pub const ASSESSMENT_VERSION: &str = "1.0";

/// Container for device risk assessment results.
///
/// Immutable after creation; one instance is produced per risk calculation
/// and owned by the caller. Scores serialize rounded to 4 decimal places.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(serialize_with = "serde_round4")]
    pub overall_risk_score: f64,
    #[serde(serialize_with = "serde_round4")]
    pub behavioral_risk: f64,
    #[serde(serialize_with = "serde_round4")]
    pub hardware_risk: f64,
    #[serde(serialize_with = "serde_round4")]
    pub network_risk: f64,
    #[serde(serialize_with = "serde_round4")]
    pub anomaly_score: f64,
    pub threat_indicators: Vec<String>,
    #[serde(serialize_with = "serde_round4")]
    pub confidence_level: f64,
    pub assessment_version: String,
}
