//! Reputation network ledger
//!
//! Tracks threat reports across participants and derives per-device
//! reputation with time-based decay toward 1.0 absent new reports.

use crate::record::{
    ReputationRecord, ReputationView, ThreatIntelligenceReport, VerificationLevel,
};
use chrono::{DateTime, Utc};
use securepremium_common::util::serde_round4;
use securepremium_common::{ReputationError, Result, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{info, instrument, warn};

/// Network configuration
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Identifier for this network instance
    pub network_id: String,
    /// Daily reputation decay rate
    pub decay_rate: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_id: "default".to_string(),
            decay_rate: 0.95,
        }
    }
}

/// Risk level derived from a device's reputation score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReputationRiskLevel {
    Unrated,
    Trustworthy,
    Neutral,
    Suspicious,
    Dangerous,
}

impl ReputationRiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReputationRiskLevel::Unrated => "unrated",
            ReputationRiskLevel::Trustworthy => "trustworthy",
            ReputationRiskLevel::Neutral => "neutral",
            ReputationRiskLevel::Suspicious => "suspicious",
            ReputationRiskLevel::Dangerous => "dangerous",
        }
    }
}

impl fmt::Display for ReputationRiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report counts per severity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

/// Aggregate network statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStatistics {
    pub network_id: String,
    pub total_participants: usize,
    pub tracked_devices: usize,
    pub total_reports: usize,
    #[serde(serialize_with = "serde_round4")]
    pub average_reputation_score: f64,
    pub severity_breakdown: SeverityBreakdown,
    /// Top 5 threat types by report count, ties in first-seen order
    pub top_threat_types: Vec<(String, u64)>,
}

/// Threat intelligence summary for a single device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatIntelligenceSummary {
    pub device_id: String,
    pub total_reports: usize,
    pub recent_reports_90_days: usize,
    pub reputation: Option<ReputationView>,
    pub threat_types: HashMap<String, u64>,
    pub latest_report_timestamp: DateTime<Utc>,
    pub verified_reports: u64,
    pub distinct_reporters: usize,
}

/// Decentralized reputation network for sharing device threat intelligence
pub struct ReputationNetwork {
    config: NetworkConfig,
    reputation_ledger: HashMap<String, ReputationRecord>,
    threat_reports: HashMap<String, Vec<ThreatIntelligenceReport>>,
    participants: HashSet<String>,
    report_history: Vec<ThreatIntelligenceReport>,
}

impl ReputationNetwork {
    pub fn new(network_id: impl Into<String>) -> Self {
        Self::with_config(NetworkConfig {
            network_id: network_id.into(),
            ..Default::default()
        })
    }

    pub fn with_config(config: NetworkConfig) -> Self {
        Self {
            config,
            reputation_ledger: HashMap::new(),
            threat_reports: HashMap::new(),
            participants: HashSet::new(),
            report_history: Vec::new(),
        }
    }

    pub fn network_id(&self) -> &str {
        &self.config.network_id
    }

    /// Register an organization as a network participant.
    ///
    /// Idempotent; returns false if already registered.
    pub fn register_participant(&mut self, participant_id: &str) -> bool {
        if !self.participants.insert(participant_id.to_string()) {
            warn!(participant_id, "Participant already registered");
            return false;
        }

        info!(
            participant_id,
            network_id = %self.config.network_id,
            "Participant registered"
        );
        true
    }

    /// Whether an organization participates in this network
    pub fn is_participant(&self, participant_id: &str) -> bool {
        self.participants.contains(participant_id)
    }

    /// Submit a threat intelligence report about a device.
    ///
    /// The reporter must be a registered participant. Submission appends to
    /// the per-device index and the global history, then lowers the device's
    /// reputation by the severity impact.
    #[instrument(skip(self, description, evidence_hash))]
    pub fn submit_threat_report(
        &mut self,
        reporter_id: &str,
        device_id: &str,
        threat_type: &str,
        severity: Severity,
        description: &str,
        evidence_hash: &str,
    ) -> Result<ThreatIntelligenceReport> {
        if !self.participants.contains(reporter_id) {
            return Err(ReputationError::UnregisteredParticipant(reporter_id.to_string()).into());
        }

        let report = ThreatIntelligenceReport {
            report_id: Self::generate_report_id(device_id, reporter_id),
            reporter_id: reporter_id.to_string(),
            device_id: device_id.to_string(),
            threat_type: threat_type.to_string(),
            severity,
            description: description.to_string(),
            evidence_hash: evidence_hash.to_string(),
            timestamp: Utc::now(),
            verified: false,
        };

        self.threat_reports
            .entry(device_id.to_string())
            .or_default()
            .push(report.clone());
        self.report_history.push(report.clone());

        self.update_reputation_from_report(device_id, &report);

        info!(device_id, reporter_id, threat_type, "Threat report submitted");
        Ok(report)
    }

    /// Query reputation data for a device, applying pending decay.
    ///
    /// Returns None for untracked devices. Decay is committed back into the
    /// ledger; repeated same-day queries are idempotent.
    pub fn query_device_reputation(&mut self, device_id: &str) -> Option<ReputationRecord> {
        let decay_rate = self.config.decay_rate;
        let record = self.reputation_ledger.get_mut(device_id)?;

        Self::apply_reputation_decay(record, decay_rate);

        Some(record.clone())
    }

    /// Human-readable risk level based on reputation
    pub fn get_device_risk_level(&mut self, device_id: &str) -> ReputationRiskLevel {
        let Some(record) = self.query_device_reputation(device_id) else {
            return ReputationRiskLevel::Unrated;
        };

        let score = record.reputation_score;
        if score >= 0.85 {
            ReputationRiskLevel::Trustworthy
        } else if score >= 0.60 {
            ReputationRiskLevel::Neutral
        } else if score >= 0.35 {
            ReputationRiskLevel::Suspicious
        } else {
            ReputationRiskLevel::Dangerous
        }
    }

    /// Mark a report as verified.
    ///
    /// The verification threshold is accepted for interface compatibility
    /// but not yet enforced: the first call verifies unconditionally.
    /// Returns false when no report matches.
    pub fn verify_report(&mut self, report_id: &str, _required_verifications: u32) -> bool {
        for reports in self.threat_reports.values_mut() {
            for report in reports.iter_mut() {
                if report.report_id == report_id {
                    report.verified = true;
                    info!(report_id, "Report marked as verified");
                    return true;
                }
            }
        }

        false
    }

    /// Aggregate network statistics
    pub fn get_network_statistics(&self) -> NetworkStatistics {
        let mut severity_breakdown = SeverityBreakdown::default();
        for report in &self.report_history {
            match report.severity {
                Severity::Critical => severity_breakdown.critical += 1,
                Severity::High => severity_breakdown.high += 1,
                Severity::Medium => severity_breakdown.medium += 1,
                Severity::Low => severity_breakdown.low += 1,
            }
        }

        let tracked_devices = self.reputation_ledger.len();
        let average_reputation_score = if tracked_devices > 0 {
            self.reputation_ledger
                .values()
                .map(|record| record.reputation_score)
                .sum::<f64>()
                / tracked_devices as f64
        } else {
            0.0
        };

        // First-seen order keeps ties stable under the sort below
        let mut threat_types: Vec<(String, u64)> = Vec::new();
        for report in &self.report_history {
            match threat_types
                .iter_mut()
                .find(|(threat_type, _)| threat_type == &report.threat_type)
            {
                Some((_, count)) => *count += 1,
                None => threat_types.push((report.threat_type.clone(), 1)),
            }
        }
        threat_types.sort_by(|a, b| b.1.cmp(&a.1));
        threat_types.truncate(5);

        NetworkStatistics {
            network_id: self.config.network_id.clone(),
            total_participants: self.participants.len(),
            tracked_devices,
            total_reports: self.report_history.len(),
            average_reputation_score,
            severity_breakdown,
            top_threat_types: threat_types,
        }
    }

    /// Comprehensive threat intelligence summary for a device, or None when
    /// the device has no reports.
    pub fn get_threat_intelligence_summary(
        &mut self,
        device_id: &str,
    ) -> Option<ThreatIntelligenceSummary> {
        let reports = self.threat_reports.get(device_id)?;
        if reports.is_empty() {
            return None;
        }

        let now = Utc::now();
        let total_reports = reports.len();
        let recent_reports_90_days = reports
            .iter()
            .filter(|report| (now - report.timestamp).num_days() < 90)
            .count();

        let mut threat_types: HashMap<String, u64> = HashMap::new();
        for report in reports {
            *threat_types.entry(report.threat_type.clone()).or_insert(0) += 1;
        }

        let latest_report_timestamp = reports.iter().map(|report| report.timestamp).max()?;
        let verified_reports = reports.iter().filter(|report| report.verified).count() as u64;
        let distinct_reporters = reports
            .iter()
            .map(|report| report.reporter_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let reputation = self
            .query_device_reputation(device_id)
            .map(|record| record.view());

        Some(ThreatIntelligenceSummary {
            device_id: device_id.to_string(),
            total_reports,
            recent_reports_90_days,
            reputation,
            threat_types,
            latest_report_timestamp,
            verified_reports,
            distinct_reporters,
        })
    }

    /// Lower a device's reputation from a new report, creating the record
    /// lazily at the neutral score.
    fn update_reputation_from_report(&mut self, device_id: &str, report: &ThreatIntelligenceReport) {
        let record = self
            .reputation_ledger
            .entry(device_id.to_string())
            .or_insert_with(|| ReputationRecord::new_neutral(device_id));

        let impact = match report.severity {
            Severity::Critical => 0.40,
            Severity::High => 0.25,
            Severity::Medium => 0.12,
            Severity::Low => 0.05,
        };

        record.reputation_score = (record.reputation_score - impact).max(0.0);
        record.reports_count += 1;
        record.last_updated = Utc::now();
        record.contributors.insert(report.reporter_id.clone());
        record.threat_history.push(report.threat_type.clone());

        if report.verified {
            record.verification_level = VerificationLevel::Verified;
        }
    }

    /// Exponential recovery toward 1.0 since the record's last update.
    ///
    /// `last_updated` is deliberately left untouched so each query commits
    /// its own decay step against the time of the last report.
    fn apply_reputation_decay(record: &mut ReputationRecord, decay_rate: f64) {
        let days_since_update = (Utc::now() - record.last_updated).num_days();

        if days_since_update > 0 {
            let decay_factor = decay_rate.powi(days_since_update as i32);
            let old_score = record.reputation_score;
            record.reputation_score = old_score + (1.0 - old_score) * (1.0 - decay_factor);
        }
    }

    /// Report id: truncated hash of device, reporter, and submission time.
    ///
    /// Not globally unique under extreme submission rates within the same
    /// timestamp resolution; acceptable at ledger scale.
    fn generate_report_id(device_id: &str, reporter_id: &str) -> String {
        let content = format!("{}:{}:{}", device_id, reporter_id, Utc::now().to_rfc3339());
        let digest = blake3::hash(content.as_bytes()).to_hex();
        digest.as_str()[..16].to_string()
    }
}

impl Default for ReputationNetwork {
    fn default() -> Self {
        Self::with_config(NetworkConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use securepremium_common::SecurePremiumError;

    fn network_with_participant() -> ReputationNetwork {
        let mut network = ReputationNetwork::new("test-net");
        assert!(network.register_participant("org_a"));
        network
    }

    #[test]
    fn test_duplicate_participant_returns_false() {
        let mut network = network_with_participant();
        assert!(!network.register_participant("org_a"));
        assert!(network.is_participant("org_a"));
    }

    #[test]
    fn test_unregistered_reporter_rejected() {
        let mut network = ReputationNetwork::new("test-net");
        let result = network.submit_threat_report(
            "org_unknown",
            "device_x",
            "malware",
            Severity::High,
            "observed C2 traffic",
            "deadbeef",
        );

        assert!(matches!(
            result,
            Err(SecurePremiumError::Reputation(
                ReputationError::UnregisteredParticipant(_)
            ))
        ));
    }

    #[test]
    fn test_critical_report_drops_score_to_dangerous() {
        let mut network = network_with_participant();
        network
            .submit_threat_report(
                "org_a",
                "device_x",
                "ransomware",
                Severity::Critical,
                "encrypted file shares",
                "deadbeef",
            )
            .unwrap();

        let record = network.query_device_reputation("device_x").unwrap();
        assert!((record.reputation_score - 0.10).abs() < 1e-9);
        assert_eq!(record.reports_count, 1);
        assert_eq!(
            network.get_device_risk_level("device_x"),
            ReputationRiskLevel::Dangerous
        );
    }

    #[test]
    fn test_score_floors_at_zero() {
        let mut network = network_with_participant();
        for _ in 0..3 {
            network
                .submit_threat_report(
                    "org_a",
                    "device_x",
                    "ransomware",
                    Severity::Critical,
                    "repeat offender",
                    "deadbeef",
                )
                .unwrap();
        }

        let record = network.query_device_reputation("device_x").unwrap();
        assert_eq!(record.reputation_score, 0.0);
        assert_eq!(record.reports_count, 3);
    }

    #[test]
    fn test_untracked_device_is_unrated() {
        let mut network = ReputationNetwork::new("test-net");
        assert!(network.query_device_reputation("device_x").is_none());
        assert_eq!(
            network.get_device_risk_level("device_x"),
            ReputationRiskLevel::Unrated
        );
    }

    #[test]
    fn test_same_day_queries_are_idempotent() {
        let mut network = network_with_participant();
        network
            .submit_threat_report(
                "org_a",
                "device_x",
                "phishing",
                Severity::Medium,
                "credential harvest page",
                "deadbeef",
            )
            .unwrap();

        let first = network.query_device_reputation("device_x").unwrap();
        let second = network.query_device_reputation("device_x").unwrap();
        assert_eq!(first.reputation_score, second.reputation_score);
    }

    #[test]
    fn test_decay_recovers_score_across_days() {
        let mut network = network_with_participant();
        network
            .submit_threat_report(
                "org_a",
                "device_x",
                "malware",
                Severity::High,
                "trojan dropper",
                "deadbeef",
            )
            .unwrap();

        let before = network.query_device_reputation("device_x").unwrap();

        // Age the record by five days
        if let Some(record) = network.reputation_ledger.get_mut("device_x") {
            record.last_updated = Utc::now() - Duration::days(5);
        }

        let after = network.query_device_reputation("device_x").unwrap();
        assert!(after.reputation_score > before.reputation_score);
        assert!(after.reputation_score < 1.0);

        // Expected: s + (1 - s) * (1 - 0.95^5)
        let expected = 0.25 + (1.0 - 0.25) * (1.0 - 0.95f64.powi(5));
        assert!((after.reputation_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_report_id_shape() {
        let mut network = network_with_participant();
        let report = network
            .submit_threat_report(
                "org_a",
                "device_x",
                "malware",
                Severity::Low,
                "adware bundle",
                "deadbeef",
            )
            .unwrap();

        assert_eq!(report.report_id.len(), 16);
        assert!(report.report_id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!report.verified);
    }

    #[test]
    fn test_verify_report_marks_first_match() {
        let mut network = network_with_participant();
        let report = network
            .submit_threat_report(
                "org_a",
                "device_x",
                "malware",
                Severity::Medium,
                "keylogger",
                "deadbeef",
            )
            .unwrap();

        assert!(network.verify_report(&report.report_id, 2));
        assert!(!network.verify_report("0000000000000000", 2));

        let summary = network.get_threat_intelligence_summary("device_x").unwrap();
        assert_eq!(summary.verified_reports, 1);
    }

    #[test]
    fn test_network_statistics() {
        let mut network = network_with_participant();
        network.register_participant("org_b");

        network
            .submit_threat_report("org_a", "device_x", "malware", Severity::Critical, "", "aa")
            .unwrap();
        network
            .submit_threat_report("org_b", "device_x", "phishing", Severity::Medium, "", "bb")
            .unwrap();
        network
            .submit_threat_report("org_a", "device_y", "malware", Severity::Low, "", "cc")
            .unwrap();
        network
            .submit_threat_report("org_a", "device_y", "ransomware", Severity::Low, "", "dd")
            .unwrap();

        let stats = network.get_network_statistics();
        assert_eq!(stats.network_id, "test-net");
        assert_eq!(stats.total_participants, 2);
        assert_eq!(stats.tracked_devices, 2);
        assert_eq!(stats.total_reports, 4);
        assert_eq!(stats.severity_breakdown.critical, 1);
        assert_eq!(stats.severity_breakdown.medium, 1);
        assert_eq!(stats.severity_breakdown.low, 2);

        // malware leads; phishing precedes ransomware by first occurrence
        assert_eq!(stats.top_threat_types[0], ("malware".to_string(), 2));
        assert_eq!(stats.top_threat_types[1], ("phishing".to_string(), 1));
        assert_eq!(stats.top_threat_types[2], ("ransomware".to_string(), 1));
    }

    #[test]
    fn test_threat_intelligence_summary() {
        let mut network = network_with_participant();
        network.register_participant("org_b");

        network
            .submit_threat_report("org_a", "device_x", "malware", Severity::High, "", "aa")
            .unwrap();
        network
            .submit_threat_report("org_b", "device_x", "malware", Severity::Low, "", "bb")
            .unwrap();

        let summary = network.get_threat_intelligence_summary("device_x").unwrap();
        assert_eq!(summary.total_reports, 2);
        assert_eq!(summary.recent_reports_90_days, 2);
        assert_eq!(summary.distinct_reporters, 2);
        assert_eq!(summary.threat_types.get("malware"), Some(&2));
        assert_eq!(summary.verified_reports, 0);
        assert!(summary.reputation.is_some());

        assert!(network.get_threat_intelligence_summary("device_z").is_none());
    }
}
