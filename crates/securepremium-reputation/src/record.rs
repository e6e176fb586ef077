//! Ledger records and threat reports

use chrono::{DateTime, Utc};
use securepremium_common::util::serde_round4;
use securepremium_common::{Severity, NEUTRAL_REPUTATION};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Verification level of a reputation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationLevel {
    Unverified,
    Verified,
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerificationLevel::Unverified => "unverified",
            VerificationLevel::Verified => "verified",
        })
    }
}

/// Threat intelligence report submitted by a network participant.
///
/// Immutable once created, except for the verification flag which is set
/// through the network's explicit verification call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatIntelligenceReport {
    pub report_id: String,
    pub reporter_id: String,
    pub device_id: String,
    pub threat_type: String,
    pub severity: Severity,
    pub description: String,
    pub evidence_hash: String,
    pub timestamp: DateTime<Utc>,
    pub verified: bool,
}

/// Reputation record for a single device, keyed by device id.
///
/// Created lazily on the first threat report; the score is always clamped
/// to [0, 1], with 0 the worst.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub device_id: String,
    pub reputation_score: f64,
    pub reports_count: u64,
    pub last_updated: DateTime<Utc>,
    pub contributors: HashSet<String>,
    pub threat_history: Vec<String>,
    pub verification_level: VerificationLevel,
}

impl ReputationRecord {
    /// New record at the neutral starting score
    pub fn new_neutral(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            reputation_score: NEUTRAL_REPUTATION,
            reports_count: 0,
            last_updated: Utc::now(),
            contributors: HashSet::new(),
            threat_history: Vec::new(),
            verification_level: VerificationLevel::Unverified,
        }
    }

    /// Display form: contributor count and threat history truncated to the
    /// last 10 entries.
    pub fn view(&self) -> ReputationView {
        let history_start = self.threat_history.len().saturating_sub(10);
        ReputationView {
            device_id: self.device_id.clone(),
            reputation_score: self.reputation_score,
            reports_count: self.reports_count,
            last_updated: self.last_updated,
            contributor_count: self.contributors.len(),
            threat_history: self.threat_history[history_start..].to_vec(),
            verification_level: self.verification_level,
        }
    }
}

/// Serializable display form of a reputation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationView {
    pub device_id: String,
    #[serde(serialize_with = "serde_round4")]
    pub reputation_score: f64,
    pub reports_count: u64,
    pub last_updated: DateTime<Utc>,
    pub contributor_count: usize,
    pub threat_history: Vec<String>,
    pub verification_level: VerificationLevel,
}
