//! Raw device telemetry consumed by the risk calculator
//!
//! Every field is optional or defaulted: a missing metric contributes zero
//! risk rather than failing the assessment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// TPM integrity status reported by device telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TpmStatus {
    Healthy,
    Unavailable,
    Compromised,
}

/// Current device metrics and telemetry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceMetrics {
    /// CPU usage percentage
    pub cpu_usage: Option<f64>,

    /// Memory usage percentage
    pub memory_usage: Option<f64>,

    /// Network activity level
    pub network_activity: Option<f64>,

    /// Disk activity level
    pub disk_activity: Option<f64>,

    /// Failed login attempts in the reporting window
    pub login_failures: Option<u32>,

    /// Total login attempts in the reporting window
    pub total_login_attempts: Option<u32>,

    /// Resource usage spiked beyond normal bounds
    pub resource_usage_spike: bool,

    /// Access outside the device's usual hours
    pub unusual_access_time: bool,

    /// Hardware component inventory no longer matches the registered set
    pub component_mismatch: bool,

    /// TPM integrity status
    pub tpm_status: Option<TpmStatus>,

    /// Firmware measurement anomaly detected
    pub firmware_anomaly: bool,

    /// Full-disk encryption is disabled
    pub disk_encryption_disabled: bool,

    /// Location observations inconsistent with travel history
    pub geographic_inconsistency: bool,

    /// Externally supplied anomaly score, used verbatim when present
    pub ml_anomaly_score: Option<f64>,

    /// Named anomaly flags raised by collection agents
    pub anomaly_flags: Vec<String>,

    /// Device fingerprint hash, when the collector had one available
    pub fingerprint_hash: Option<String>,

    /// Collection timestamp, used for confidence recency weighting
    pub timestamp: Option<DateTime<Utc>>,
}

impl DeviceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set login counters
    pub fn with_logins(mut self, failures: u32, total_attempts: u32) -> Self {
        self.login_failures = Some(failures);
        self.total_login_attempts = Some(total_attempts);
        self
    }

    /// Set TPM status
    pub fn with_tpm_status(mut self, status: TpmStatus) -> Self {
        self.tpm_status = Some(status);
        self
    }

    /// Set CPU and memory usage
    pub fn with_usage(mut self, cpu: f64, memory: f64) -> Self {
        self.cpu_usage = Some(cpu);
        self.memory_usage = Some(memory);
        self
    }

    /// Set collection timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Add a named anomaly flag
    pub fn with_anomaly_flag(mut self, flag: impl Into<String>) -> Self {
        self.anomaly_flags.push(flag.into());
        self
    }
}

/// Historical mean/stddev for a single numeric metric
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricBaseline {
    pub mean: f64,
    pub stddev: f64,
}

/// Historical behavior baseline used for statistical deviation scoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalBaseline {
    pub cpu_usage: Option<MetricBaseline>,
    pub memory_usage: Option<MetricBaseline>,
    pub network_activity: Option<MetricBaseline>,
    pub disk_activity: Option<MetricBaseline>,
}

/// Reputation signals supplied by the network for risk calculation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkReputationSignal {
    /// Device appears on a network blacklist
    pub is_blacklisted: bool,

    /// Average risk of observed peers, in [0, 1]
    pub peer_average_risk: f64,

    /// Connection through a detected VPN endpoint
    pub is_vpn_detected: bool,
}
