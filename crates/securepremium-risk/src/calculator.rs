//! Risk calculation engine
//!
//! Produces a [`RiskAssessment`] from raw telemetry across four weighted
//! dimensions. Missing metrics contribute zero risk; every component score
//! and the aggregate are capped at 1.0.

use chrono::Utc;
use securepremium_common::types::assessment::{RiskAssessment, ASSESSMENT_VERSION};
use securepremium_common::types::telemetry::{
    DeviceMetrics, HistoricalBaseline, NetworkReputationSignal, TpmStatus,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument};

/// Aggregation weight for behavioral risk
pub const BEHAVIORAL_WEIGHT: f64 = 0.25;

/// Aggregation weight for hardware risk
pub const HARDWARE_WEIGHT: f64 = 0.35;

/// Aggregation weight for network risk
pub const NETWORK_WEIGHT: f64 = 0.20;

/// Aggregation weight for the anomaly score
pub const ANOMALY_WEIGHT: f64 = 0.20;

/// Risk category derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Critical,
    High,
    Medium,
    Low,
    Minimal,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Critical => "critical",
            RiskCategory::High => "high",
            RiskCategory::Medium => "medium",
            RiskCategory::Low => "low",
            RiskCategory::Minimal => "minimal",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category thresholds, inclusive at the lower bound of each bucket
#[derive(Debug, Clone)]
pub struct RiskThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: 0.85,
            high: 0.70,
            medium: 0.50,
            low: 0.30,
        }
    }
}

/// Comprehensive risk calculation engine evaluating device compromise
/// likelihood.
#[derive(Debug, Clone, Default)]
pub struct RiskCalculator {
    thresholds: RiskThresholds,
}

impl RiskCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom category thresholds
    pub fn with_thresholds(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    /// Calculate a comprehensive risk score for a device.
    ///
    /// `historical_data` enables statistical deviation scoring against the
    /// device's baseline; `network_reputation` folds in blacklist, peer, and
    /// VPN signals. Both are optional and omit their contribution when
    /// absent.
    #[instrument(skip(self, metrics, historical_data, network_reputation))]
    pub fn calculate_risk(
        &self,
        device_id: &str,
        metrics: &DeviceMetrics,
        historical_data: Option<&HistoricalBaseline>,
        network_reputation: Option<&NetworkReputationSignal>,
    ) -> RiskAssessment {
        let timestamp = Utc::now();

        let behavioral_risk = Self::behavioral_risk(metrics, historical_data);
        let hardware_risk = Self::hardware_risk(metrics);
        let network_risk = Self::network_risk(metrics, network_reputation);
        let anomaly_score = Self::anomaly_score(metrics);

        let threat_indicators =
            Self::threat_indicators(behavioral_risk, hardware_risk, network_risk, anomaly_score);

        let overall_risk_score =
            Self::aggregate(behavioral_risk, hardware_risk, network_risk, anomaly_score);

        let confidence_level = Self::confidence(metrics);

        info!(
            device_id,
            score = format!("{overall_risk_score:.4}"),
            "Risk assessment completed"
        );

        RiskAssessment {
            device_id: device_id.to_string(),
            timestamp,
            overall_risk_score,
            behavioral_risk,
            hardware_risk,
            network_risk,
            anomaly_score,
            threat_indicators,
            confidence_level,
            assessment_version: ASSESSMENT_VERSION.to_string(),
        }
    }

    /// Categorize a risk score into a human-readable category
    pub fn get_risk_category(&self, risk_score: f64) -> RiskCategory {
        if risk_score >= self.thresholds.critical {
            RiskCategory::Critical
        } else if risk_score >= self.thresholds.high {
            RiskCategory::High
        } else if risk_score >= self.thresholds.medium {
            RiskCategory::Medium
        } else if risk_score >= self.thresholds.low {
            RiskCategory::Low
        } else {
            RiskCategory::Minimal
        }
    }

    /// Behavioral risk: login failures, usage spikes, odd access hours, and
    /// deviation from the historical baseline.
    fn behavioral_risk(metrics: &DeviceMetrics, historical: Option<&HistoricalBaseline>) -> f64 {
        let mut score = 0.0;

        if let Some(failures) = metrics.login_failures {
            let attempts = metrics.total_login_attempts.unwrap_or(1).max(1);
            let failure_rate = f64::from(failures) / f64::from(attempts);
            score += (failure_rate * 0.3).min(0.3);
        }

        if metrics.resource_usage_spike {
            score += 0.15;
        }

        if metrics.unusual_access_time {
            score += 0.10;
        }

        if let Some(baseline) = historical {
            let deviation = Self::statistical_deviation(metrics, baseline);
            score += (deviation * 0.45).min(0.45);
        }

        score.min(1.0)
    }

    /// Hardware integrity risk: component changes, TPM state, firmware, and
    /// disk encryption.
    fn hardware_risk(metrics: &DeviceMetrics) -> f64 {
        let mut score: f64 = 0.0;

        if metrics.component_mismatch {
            score += 0.40;
        }

        match metrics.tpm_status {
            Some(TpmStatus::Compromised) => score += 0.35,
            Some(TpmStatus::Unavailable) => score += 0.15,
            _ => {}
        }

        if metrics.firmware_anomaly {
            score += 0.25;
        }

        if metrics.disk_encryption_disabled {
            score += 0.20;
        }

        score.min(1.0)
    }

    /// Network risk: blacklist status, peer reputation, VPN detection, and
    /// geographic inconsistency.
    fn network_risk(metrics: &DeviceMetrics, reputation: Option<&NetworkReputationSignal>) -> f64 {
        let mut score = 0.0;

        if let Some(reputation) = reputation {
            if reputation.is_blacklisted {
                score += 0.40;
            }

            score += reputation.peer_average_risk * 0.30;

            if reputation.is_vpn_detected {
                score += 0.10;
            }
        }

        if metrics.geographic_inconsistency {
            score += 0.20;
        }

        score.min(1.0)
    }

    /// Anomaly score: an externally supplied score is used verbatim,
    /// otherwise each raised anomaly flag contributes 0.15.
    fn anomaly_score(metrics: &DeviceMetrics) -> f64 {
        if let Some(score) = metrics.ml_anomaly_score {
            return score;
        }

        (metrics.anomaly_flags.len() as f64 * 0.15).min(1.0)
    }

    /// Normalized deviation of current metrics from the historical baseline.
    ///
    /// Per-metric z-score divided by 3 and capped at 1, averaged over the
    /// metrics present on both sides.
    fn statistical_deviation(metrics: &DeviceMetrics, baseline: &HistoricalBaseline) -> f64 {
        let pairs = [
            (metrics.cpu_usage, baseline.cpu_usage),
            (metrics.memory_usage, baseline.memory_usage),
            (metrics.network_activity, baseline.network_activity),
            (metrics.disk_activity, baseline.disk_activity),
        ];

        let mut deviation_total = 0.0;
        let mut compared = 0u32;

        for (current, base) in pairs {
            if let (Some(current), Some(base)) = (current, base) {
                if base.stddev > 0.0 {
                    let z_score = ((current - base.mean) / base.stddev).abs();
                    deviation_total += (z_score / 3.0).min(1.0);
                    compared += 1;
                }
            }
        }

        if compared > 0 {
            deviation_total / f64::from(compared)
        } else {
            0.0
        }
    }

    /// Textual threat indicators for components crossing fixed thresholds.
    /// The five checks are independent, not mutually exclusive.
    fn threat_indicators(
        behavioral_risk: f64,
        hardware_risk: f64,
        network_risk: f64,
        anomaly_score: f64,
    ) -> Vec<String> {
        let mut indicators = Vec::new();

        if behavioral_risk > 0.5 {
            indicators.push("Abnormal behavioral patterns detected".to_string());
        }

        if hardware_risk > 0.5 {
            indicators.push("Hardware integrity concerns".to_string());
        }

        if network_risk > 0.5 {
            indicators.push("Network-based threat indicators".to_string());
        }

        if anomaly_score > 0.6 {
            indicators.push("ML-detected system anomalies".to_string());
        }

        if behavioral_risk > 0.7 {
            indicators.push("Severe behavioral deviation from baseline".to_string());
        }

        indicators
    }

    /// Weighted aggregate with emphasis on hardware integrity
    fn aggregate(
        behavioral_risk: f64,
        hardware_risk: f64,
        network_risk: f64,
        anomaly_score: f64,
    ) -> f64 {
        let weighted = behavioral_risk * BEHAVIORAL_WEIGHT
            + hardware_risk * HARDWARE_WEIGHT
            + network_risk * NETWORK_WEIGHT
            + anomaly_score * ANOMALY_WEIGHT;

        weighted.min(1.0)
    }

    /// Confidence based on telemetry completeness and recency.
    ///
    /// Completeness counts the five expected fields; a stale collection
    /// timestamp down-weights the result.
    fn confidence(metrics: &DeviceMetrics) -> f64 {
        let expected_present = [
            metrics.cpu_usage.is_some(),
            metrics.memory_usage.is_some(),
            metrics.tpm_status.is_some(),
            metrics.login_failures.is_some(),
            metrics.timestamp.is_some(),
        ];

        let completeness = expected_present.iter().filter(|p| **p).count() as f64
            / expected_present.len() as f64;

        let mut confidence = completeness;

        if let Some(collected_at) = metrics.timestamp {
            let age_seconds = (Utc::now() - collected_at).num_seconds();
            let recency = if age_seconds < 3600 {
                1.0
            } else if age_seconds < 86_400 {
                0.8
            } else {
                0.5
            };
            debug!(age_seconds, recency, "Applied recency factor to confidence");
            confidence *= recency;
        }

        confidence.min(1.0)
    }
}
