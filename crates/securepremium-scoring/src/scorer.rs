//! Device trust scorer
//!
//! Maintains per-device profiles and computes a weighted trustworthiness
//! score from five sub-scores. The weights sum to 1.0.

use crate::geo;
use crate::profile::{DeviceProfile, GeoLocation, SecurityEvent};
use chrono::Utc;
use securepremium_common::{FingerprintService, Result, ScoringError, Severity};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, instrument};

/// Component weights for the overall trust score. Invariant: sums to 1.0.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub fingerprint_stability: f64,
    pub behavioral_consistency: f64,
    pub security_incidents: f64,
    pub longevity: f64,
    pub geographic_patterns: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            fingerprint_stability: 0.20,
            behavioral_consistency: 0.25,
            security_incidents: 0.25,
            longevity: 0.15,
            geographic_patterns: 0.15,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.fingerprint_stability
            + self.behavioral_consistency
            + self.security_incidents
            + self.longevity
            + self.geographic_patterns
    }
}

/// Per-component breakdown returned alongside the overall score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub fingerprint_stability: f64,
    pub behavioral_consistency: f64,
    pub security_incidents: f64,
    pub longevity: f64,
    pub geographic_patterns: f64,
}

/// Trust category derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustCategory {
    Trusted,
    Normal,
    Suspect,
    Untrusted,
}

impl TrustCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustCategory::Trusted => "trusted",
            TrustCategory::Normal => "normal",
            TrustCategory::Suspect => "suspect",
            TrustCategory::Untrusted => "untrusted",
        }
    }
}

impl fmt::Display for TrustCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device scoring system evaluating trustworthiness from fingerprinting
/// data, historical behavior, and security indicators.
#[derive(Default)]
pub struct DeviceScorer {
    profiles: HashMap<String, DeviceProfile>,
    weights: ScoringWeights,
    fingerprint_service: Option<FingerprintService>,
}

impl DeviceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a fingerprint service used when registrations carry no hash
    pub fn with_fingerprint_service(mut self, service: FingerprintService) -> Self {
        self.fingerprint_service = Some(service);
        self
    }

    /// Register a new device or update an existing registration.
    ///
    /// Resolution order for the fingerprint: explicit hash, then the
    /// attached service. With neither available the registration fails.
    #[instrument(skip(self, hardware_info, system_info))]
    pub fn register_device(
        &mut self,
        device_id: &str,
        fingerprint_hash: Option<&str>,
        hardware_info: HashMap<String, String>,
        system_info: HashMap<String, String>,
    ) -> Result<&DeviceProfile> {
        let resolved_hash = match fingerprint_hash {
            Some(hash) if !hash.is_empty() => hash.to_string(),
            _ => match &self.fingerprint_service {
                Some(service) => service.get_fingerprint_hash(),
                None => return Err(ScoringError::MissingFingerprint.into()),
            },
        };

        let now = Utc::now();

        let profile = match self.profiles.entry(device_id.to_string()) {
            Entry::Occupied(entry) => {
                let profile = entry.into_mut();
                profile.last_seen = now;
                profile.interaction_count += 1;
                profile
            }
            Entry::Vacant(entry) => entry.insert(DeviceProfile {
                device_id: device_id.to_string(),
                fingerprint_hash: resolved_hash,
                hardware_info,
                system_info,
                first_seen: now,
                last_seen: now,
                interaction_count: 1,
                security_events: Vec::new(),
                geographic_locations: Vec::new(),
                behavioral_baseline: None,
            }),
        };

        info!(device_id, "Device registered in scoring system");
        Ok(profile)
    }

    /// Calculate the trustworthiness score and component breakdown for a
    /// registered device.
    pub fn calculate_device_score(&self, device_id: &str) -> Result<(f64, ScoreBreakdown)> {
        let profile = self
            .profiles
            .get(device_id)
            .ok_or_else(|| ScoringError::DeviceNotFound(device_id.to_string()))?;

        let breakdown = ScoreBreakdown {
            fingerprint_stability: Self::fingerprint_stability_score(profile),
            behavioral_consistency: Self::behavioral_consistency_score(profile),
            security_incidents: Self::security_score(profile),
            longevity: Self::longevity_score(profile),
            geographic_patterns: Self::geographic_pattern_score(profile),
        };

        let overall = breakdown.fingerprint_stability * self.weights.fingerprint_stability
            + breakdown.behavioral_consistency * self.weights.behavioral_consistency
            + breakdown.security_incidents * self.weights.security_incidents
            + breakdown.longevity * self.weights.longevity
            + breakdown.geographic_patterns * self.weights.geographic_patterns;

        Ok((overall, breakdown))
    }

    /// Record a security event for a registered device
    #[instrument(skip(self, description))]
    pub fn add_security_event(
        &mut self,
        device_id: &str,
        event_type: &str,
        severity: Severity,
        description: &str,
    ) -> Result<()> {
        let profile = self
            .profiles
            .get_mut(device_id)
            .ok_or_else(|| ScoringError::DeviceNotFound(device_id.to_string()))?;

        profile.security_events.push(SecurityEvent {
            event_type: event_type.to_string(),
            severity,
            description: description.to_string(),
            timestamp: Utc::now(),
        });

        info!(device_id, event_type, "Security event recorded");
        Ok(())
    }

    /// Append a geographic observation for a registered device
    pub fn record_location(&mut self, device_id: &str, location: GeoLocation) -> Result<()> {
        let profile = self
            .profiles
            .get_mut(device_id)
            .ok_or_else(|| ScoringError::DeviceNotFound(device_id.to_string()))?;

        profile.geographic_locations.push(location);
        Ok(())
    }

    /// Record a behavioral baseline for a registered device.
    ///
    /// Baseline comparison is not implemented yet; presence of a baseline
    /// only switches the behavioral consistency placeholder.
    pub fn set_behavioral_baseline(
        &mut self,
        device_id: &str,
        baseline: HashMap<String, f64>,
    ) -> Result<()> {
        let profile = self
            .profiles
            .get_mut(device_id)
            .ok_or_else(|| ScoringError::DeviceNotFound(device_id.to_string()))?;

        profile.behavioral_baseline = Some(baseline);
        Ok(())
    }

    /// Look up a registered profile
    pub fn get_profile(&self, device_id: &str) -> Option<&DeviceProfile> {
        self.profiles.get(device_id)
    }

    /// Number of registered devices
    pub fn device_count(&self) -> usize {
        self.profiles.len()
    }

    /// Categorize a device score into a human-readable category
    pub fn get_device_score_category(&self, score: f64) -> TrustCategory {
        if score >= 0.85 {
            TrustCategory::Trusted
        } else if score >= 0.65 {
            TrustCategory::Normal
        } else if score >= 0.40 {
            TrustCategory::Suspect
        } else {
            TrustCategory::Untrusted
        }
    }

    /// Fingerprint consistency score.
    ///
    /// Devices with few interactions score a flat 0.5. Fingerprint rotation
    /// detection is not wired in, so the change count is pinned to zero and
    /// the stored hash is treated as stable.
    fn fingerprint_stability_score(profile: &DeviceProfile) -> f64 {
        if profile.interaction_count < 3 {
            return 0.5;
        }

        let fingerprint_changes = 0u64;
        let recent_interactions = profile.interaction_count.min(20);

        let stability_ratio =
            1.0 - fingerprint_changes as f64 / recent_interactions.max(1) as f64;
        stability_ratio.clamp(0.0, 1.0)
    }

    /// Behavioral consistency score.
    ///
    /// Placeholder heuristic: 0.6 without a recorded baseline, 0.7 with
    /// one. Real baseline comparison is an extension point on
    /// `DeviceProfile::behavioral_baseline`.
    fn behavioral_consistency_score(profile: &DeviceProfile) -> f64 {
        if profile.behavioral_baseline.is_none() {
            return 0.6;
        }

        0.7f64.min(1.0)
    }

    /// Security incident score: worst severity dominates, softened by time
    /// since the most recent event.
    fn security_score(profile: &DeviceProfile) -> f64 {
        if profile.security_events.is_empty() {
            return 1.0;
        }

        let max_severity_impact = profile
            .security_events
            .iter()
            .map(|event| match event.severity {
                Severity::Critical => 0.9,
                Severity::High => 0.7,
                Severity::Medium => 0.5,
                Severity::Low => 0.2,
            })
            .fold(0.0, f64::max);

        let recency_factor = match profile.security_events.last() {
            Some(last_event) => {
                let days_since = (Utc::now() - last_event.timestamp).num_days();
                (days_since as f64 / 90.0).min(1.0)
            }
            None => 1.0,
        };

        let security_score = (1.0 - max_severity_impact) * (0.5 + recency_factor * 0.5);
        security_score.clamp(0.0, 1.0)
    }

    /// Longevity score from device age, recency of activity, and
    /// interaction volume.
    fn longevity_score(profile: &DeviceProfile) -> f64 {
        let age_days = profile.age_days();
        let age_score = if age_days < 7 {
            0.2
        } else if age_days < 30 {
            0.5
        } else if age_days < 90 {
            0.7
        } else if age_days < 365 {
            0.85
        } else {
            0.95
        };

        let activity_hours = profile.last_activity_hours();
        let activity_score = if activity_hours < 24 {
            1.0
        } else if activity_hours < 168 {
            0.8
        } else if activity_hours < 720 {
            0.5
        } else {
            0.2
        };

        let consistency_score = (profile.interaction_count as f64 / 100.0).min(1.0);

        let longevity = age_score * 0.5 + activity_score * 0.3 + consistency_score * 0.2;
        longevity.min(1.0)
    }

    /// Geographic pattern score over the last 10 observations: low city
    /// diversity scores high, high diversity triggers the impossible-travel
    /// check.
    fn geographic_pattern_score(profile: &DeviceProfile) -> f64 {
        if profile.geographic_locations.is_empty() {
            return 0.5;
        }

        if profile.geographic_locations.len() == 1 {
            return 0.9;
        }

        let window_start = profile.geographic_locations.len().saturating_sub(10);
        let window = &profile.geographic_locations[window_start..];

        let unique_cities = window
            .iter()
            .filter_map(|loc| loc.city.as_deref())
            .collect::<std::collections::HashSet<_>>()
            .len();

        let score: f64 = if unique_cities == 1 {
            0.95
        } else if unique_cities <= 3 {
            0.75
        } else if geo::detect_impossible_travel(window) {
            0.3
        } else {
            0.6
        };

        score.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use securepremium_common::SecurePremiumError;

    fn register(scorer: &mut DeviceScorer, device_id: &str) {
        scorer
            .register_device(
                device_id,
                Some(&"ab".repeat(32)),
                HashMap::from([("cpu".to_string(), "Xeon".to_string())]),
                HashMap::from([("os".to_string(), "Linux".to_string())]),
            )
            .unwrap();
    }

    #[test]
    fn test_first_registration_creates_profile() {
        let mut scorer = DeviceScorer::new();
        register(&mut scorer, "device_0001");

        let profile = scorer.get_profile("device_0001").unwrap();
        assert_eq!(profile.interaction_count, 1);
        assert_eq!(profile.first_seen, profile.last_seen);
        assert_eq!(profile.hardware_info.get("cpu").unwrap(), "Xeon");
    }

    #[test]
    fn test_reregistration_increments_interactions() {
        let mut scorer = DeviceScorer::new();
        register(&mut scorer, "device_0001");
        register(&mut scorer, "device_0001");
        register(&mut scorer, "device_0001");

        let profile = scorer.get_profile("device_0001").unwrap();
        assert_eq!(profile.interaction_count, 3);
        assert!(profile.last_seen >= profile.first_seen);
        assert_eq!(scorer.device_count(), 1);
    }

    #[test]
    fn test_registration_requires_fingerprint_source() {
        let mut scorer = DeviceScorer::new();
        let result = scorer.register_device("device_0001", None, HashMap::new(), HashMap::new());

        assert!(matches!(
            result,
            Err(SecurePremiumError::Scoring(ScoringError::MissingFingerprint))
        ));
    }

    #[test]
    fn test_registration_falls_back_to_service() {
        let mut scorer =
            DeviceScorer::new().with_fingerprint_service(FingerprintService::fallback_only());

        let result = scorer.register_device("device_0001", None, HashMap::new(), HashMap::new());
        let profile = result.unwrap();

        assert!(profile.fingerprint_hash.len() >= 64);
    }

    #[test]
    fn test_score_unknown_device_fails() {
        let scorer = DeviceScorer::new();
        assert!(matches!(
            scorer.calculate_device_score("ghost_device"),
            Err(SecurePremiumError::Scoring(ScoringError::DeviceNotFound(_)))
        ));
    }

    #[test]
    fn test_fresh_device_score() {
        let mut scorer = DeviceScorer::new();
        register(&mut scorer, "device_0001");

        let (score, breakdown) = scorer.calculate_device_score("device_0001").unwrap();

        // Fresh device: 0.5 fingerprint, 0.6 behavioral, 1.0 security,
        // 0.402 longevity (0.2 age, 1.0 activity, 0.01 interactions), 0.5 geo
        assert!((breakdown.fingerprint_stability - 0.5).abs() < 1e-9);
        assert!((breakdown.behavioral_consistency - 0.6).abs() < 1e-9);
        assert!((breakdown.security_incidents - 1.0).abs() < 1e-9);
        assert!((breakdown.longevity - 0.402).abs() < 1e-9);
        assert!((breakdown.geographic_patterns - 0.5).abs() < 1e-9);
        assert!((score - 0.6353).abs() < 1e-6);
    }

    #[test]
    fn test_fingerprint_stability_needs_three_interactions() {
        let mut scorer = DeviceScorer::new();
        register(&mut scorer, "device_0001");
        register(&mut scorer, "device_0001");

        let (_, breakdown) = scorer.calculate_device_score("device_0001").unwrap();
        assert!((breakdown.fingerprint_stability - 0.5).abs() < 1e-9);

        register(&mut scorer, "device_0001");
        let (_, breakdown) = scorer.calculate_device_score("device_0001").unwrap();
        // No change detection wired in: stable hash scores 1.0
        assert!((breakdown.fingerprint_stability - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_baseline_switches_behavioral_placeholder() {
        let mut scorer = DeviceScorer::new();
        register(&mut scorer, "device_0001");

        scorer
            .set_behavioral_baseline(
                "device_0001",
                HashMap::from([("cpu_usage_mean".to_string(), 24.0)]),
            )
            .unwrap();

        let (_, breakdown) = scorer.calculate_device_score("device_0001").unwrap();
        assert!((breakdown.behavioral_consistency - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_security_event_lowers_score() {
        let mut scorer = DeviceScorer::new();
        register(&mut scorer, "device_0001");

        scorer
            .add_security_event(
                "device_0001",
                "malware_detected",
                Severity::Critical,
                "EDR flagged implant",
            )
            .unwrap();

        let (_, breakdown) = scorer.calculate_device_score("device_0001").unwrap();
        // (1 - 0.9) * (0.5 + 0 recency) = 0.05
        assert!((breakdown.security_incidents - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_security_event_on_unknown_device_fails() {
        let mut scorer = DeviceScorer::new();
        let result =
            scorer.add_security_event("ghost_device", "probe", Severity::Low, "port sweep");

        assert!(matches!(
            result,
            Err(SecurePremiumError::Scoring(ScoringError::DeviceNotFound(_)))
        ));
    }

    #[test]
    fn test_worst_severity_dominates() {
        let mut scorer = DeviceScorer::new();
        register(&mut scorer, "device_0001");

        scorer
            .add_security_event("device_0001", "probe", Severity::Low, "port sweep")
            .unwrap();
        scorer
            .add_security_event("device_0001", "lateral_move", Severity::High, "smb abuse")
            .unwrap();

        let (_, breakdown) = scorer.calculate_device_score("device_0001").unwrap();
        // (1 - 0.7) * 0.5
        assert!((breakdown.security_incidents - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_single_location_scores_high() {
        let mut scorer = DeviceScorer::new();
        register(&mut scorer, "device_0001");
        scorer
            .record_location("device_0001", GeoLocation::new("Berlin", 52.52, 13.405))
            .unwrap();

        let (_, breakdown) = scorer.calculate_device_score("device_0001").unwrap();
        assert!((breakdown.geographic_patterns - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_single_city_cluster_scores_high() {
        let mut scorer = DeviceScorer::new();
        register(&mut scorer, "device_0001");
        for _ in 0..4 {
            scorer
                .record_location("device_0001", GeoLocation::new("Berlin", 52.52, 13.405))
                .unwrap();
        }

        let (_, breakdown) = scorer.calculate_device_score("device_0001").unwrap();
        assert!((breakdown.geographic_patterns - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_impossible_travel_tanks_geo_score() {
        let mut scorer = DeviceScorer::new();
        register(&mut scorer, "device_0001");

        let now = Utc::now();
        let hops = [
            ("Sydney", -33.8688, 151.2093, 0),
            ("Tokyo", 35.6762, 139.6503, 1),
            ("London", 51.5074, -0.1278, 2),
            ("New York", 40.7128, -74.0060, 3),
        ];
        for (city, lat, lon, hours_ago) in hops {
            scorer
                .record_location(
                    "device_0001",
                    GeoLocation::new(city, lat, lon).at(now - Duration::hours(hours_ago)),
                )
                .unwrap();
        }

        let (_, breakdown) = scorer.calculate_device_score("device_0001").unwrap();
        assert!((breakdown.geographic_patterns - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_diverse_but_plausible_travel() {
        let mut scorer = DeviceScorer::new();
        register(&mut scorer, "device_0001");

        let now = Utc::now();
        let hops = [
            ("Sydney", -33.8688, 151.2093, 0i64),
            ("Tokyo", 35.6762, 139.6503, 400),
            ("London", 51.5074, -0.1278, 800),
            ("New York", 40.7128, -74.0060, 1200),
        ];
        for (city, lat, lon, hours_ago) in hops {
            scorer
                .record_location(
                    "device_0001",
                    GeoLocation::new(city, lat, lon).at(now - Duration::hours(hours_ago)),
                )
                .unwrap();
        }

        let (_, breakdown) = scorer.calculate_device_score("device_0001").unwrap();
        assert!((breakdown.geographic_patterns - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_category_boundaries() {
        let scorer = DeviceScorer::new();

        assert_eq!(scorer.get_device_score_category(0.85), TrustCategory::Trusted);
        assert_eq!(scorer.get_device_score_category(0.84), TrustCategory::Normal);
        assert_eq!(scorer.get_device_score_category(0.65), TrustCategory::Normal);
        assert_eq!(scorer.get_device_score_category(0.40), TrustCategory::Suspect);
        assert_eq!(scorer.get_device_score_category(0.39), TrustCategory::Untrusted);
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((ScoringWeights::default().total() - 1.0).abs() < 1e-12);
    }
}
