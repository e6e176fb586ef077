//! End-to-end pipeline tests: telemetry -> risk -> reputation -> premium

use securepremium_common::types::telemetry::{DeviceMetrics, TpmStatus};
use securepremium_common::Severity;
use securepremium_pricing::PremiumEngine;
use securepremium_reputation::{ReputationNetwork, ReputationRiskLevel};
use securepremium_risk::{RiskCalculator, RiskCategory};

#[test]
fn test_critical_report_flows_into_dangerous_rating() {
    let mut network = ReputationNetwork::new("partner-net");
    assert!(network.register_participant("org_alpha"));

    network
        .submit_threat_report(
            "org_alpha",
            "device_x01",
            "ransomware",
            Severity::Critical,
            "mass file encryption observed",
            "1f2e3d4c5b6a7988",
        )
        .unwrap();

    // Lazily-initialized 0.5 minus the 0.40 critical impact
    let record = network.query_device_reputation("device_x01").unwrap();
    assert!((record.reputation_score - 0.10).abs() < 1e-9);
    assert_eq!(
        network.get_device_risk_level("device_x01"),
        ReputationRiskLevel::Dangerous
    );
}

#[test]
fn test_assessment_to_quote_pipeline() {
    let calculator = RiskCalculator::new();
    let engine = PremiumEngine::new();
    let mut network = ReputationNetwork::new("partner-net");
    network.register_participant("org_alpha");

    let metrics = DeviceMetrics::new()
        .with_usage(35.0, 55.0)
        .with_logins(2, 300)
        .with_tpm_status(TpmStatus::Healthy)
        .with_timestamp(chrono::Utc::now());

    let assessment = calculator.calculate_risk("device_x01", &metrics, None, None);
    assert!(assessment.overall_risk_score <= 1.0);
    assert_eq!(
        calculator.get_risk_category(assessment.overall_risk_score),
        RiskCategory::Minimal
    );

    network
        .submit_threat_report(
            "org_alpha",
            "device_x01",
            "phishing",
            Severity::Low,
            "suspicious mail relay",
            "aabbccddeeff0011",
        )
        .unwrap();
    let reputation = network
        .query_device_reputation("device_x01")
        .map(|record| record.reputation_score);

    let quote = engine
        .generate_quote("device_x01", &assessment, reputation, "standard", 12)
        .unwrap();

    assert_eq!(quote.device_id, "device_x01");
    assert!(quote.annual_premium_usd > rust_decimal::Decimal::ZERO);
    assert_eq!(quote.terms.reputation_score, reputation.unwrap());
    assert!(quote.quote_valid_until > quote.quote_timestamp);
}

#[test]
fn test_reputation_strictly_lowers_premium() {
    let calculator = RiskCalculator::new();
    let engine = PremiumEngine::new();

    let metrics = DeviceMetrics::new()
        .with_usage(35.0, 55.0)
        .with_logins(30, 100)
        .with_tpm_status(TpmStatus::Unavailable)
        .with_timestamp(chrono::Utc::now());
    let assessment = calculator.calculate_risk("device_x01", &metrics, None, None);

    let poor = engine
        .generate_quote("device_x01", &assessment, Some(0.20), "standard", 12)
        .unwrap();
    let good = engine
        .generate_quote("device_x01", &assessment, Some(0.90), "standard", 12)
        .unwrap();

    assert!(good.annual_premium_usd < poor.annual_premium_usd);
}

#[test]
fn test_risk_strictly_raises_premium() {
    let calculator = RiskCalculator::new();
    let engine = PremiumEngine::new();

    let clean = DeviceMetrics::new()
        .with_usage(25.0, 40.0)
        .with_logins(0, 200)
        .with_tpm_status(TpmStatus::Healthy)
        .with_timestamp(chrono::Utc::now());
    let compromised = DeviceMetrics {
        component_mismatch: true,
        tpm_status: Some(TpmStatus::Compromised),
        firmware_anomaly: true,
        disk_encryption_disabled: true,
        resource_usage_spike: true,
        unusual_access_time: true,
        ..clean.clone()
    };

    let low = calculator.calculate_risk("device_x01", &clean, None, None);
    let high = calculator.calculate_risk("device_x01", &compromised, None, None);
    assert!(high.overall_risk_score > low.overall_risk_score);

    let low_quote = engine
        .generate_quote("device_x01", &low, Some(0.5), "standard", 12)
        .unwrap();
    let high_quote = engine
        .generate_quote("device_x01", &high, Some(0.5), "standard", 12)
        .unwrap();

    assert!(high_quote.annual_premium_usd > low_quote.annual_premium_usd);
}

#[test]
fn test_decayed_reputation_feeds_cheaper_quote() {
    let engine = PremiumEngine::new();
    let calculator = RiskCalculator::new();
    let mut network = ReputationNetwork::new("partner-net");
    network.register_participant("org_alpha");

    network
        .submit_threat_report(
            "org_alpha",
            "device_x01",
            "malware",
            Severity::High,
            "trojan beaconing",
            "99aa88bb77cc66dd",
        )
        .unwrap();

    let metrics = DeviceMetrics::new().with_timestamp(chrono::Utc::now());
    let assessment = calculator.calculate_risk("device_x01", &metrics, None, None);

    let fresh_reputation = network
        .query_device_reputation("device_x01")
        .unwrap()
        .reputation_score;
    let fresh_quote = engine
        .generate_quote("device_x01", &assessment, Some(fresh_reputation), "basic", 12)
        .unwrap();

    // A reputation that has recovered toward 1.0 must price lower
    let recovered_quote = engine
        .generate_quote("device_x01", &assessment, Some(0.95), "basic", 12)
        .unwrap();

    assert!(recovered_quote.annual_premium_usd < fresh_quote.annual_premium_usd);
}
