//! Device profile state

use chrono::{DateTime, Utc};
use securepremium_common::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A recorded security event against a device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub event_type: String,
    pub severity: Severity,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// A geographic observation of device activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl GeoLocation {
    pub fn new(city: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            city: Some(city.into()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            timestamp: Utc::now(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Complete device profile for scoring.
///
/// One profile per device, created on first registration and updated on
/// every subsequent registration; never deleted by the scorer. Invariant:
/// `last_seen >= first_seen` and `interaction_count` never decreases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub device_id: String,
    pub fingerprint_hash: String,
    pub hardware_info: HashMap<String, String>,
    pub system_info: HashMap<String, String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub interaction_count: u64,
    pub security_events: Vec<SecurityEvent>,
    pub geographic_locations: Vec<GeoLocation>,
    /// Extension point: recorded baseline for behavioral comparison
    pub behavioral_baseline: Option<HashMap<String, f64>>,
}

impl DeviceProfile {
    /// Device age in whole days since first seen
    pub fn age_days(&self) -> i64 {
        (Utc::now() - self.first_seen).num_days()
    }

    /// Whole hours since last activity
    pub fn last_activity_hours(&self) -> i64 {
        (Utc::now() - self.last_seen).num_hours()
    }
}
