//! Error types for the SecurePremium system
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

/// Result type alias using SecurePremiumError
pub type Result<T> = std::result::Result<T, SecurePremiumError>;

/// Unified error type for SecurePremium operations
#[derive(Debug, Error)]
pub enum SecurePremiumError {
    // Device scoring errors
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    // Reputation network errors
    #[error("Reputation error: {0}")]
    Reputation(#[from] ReputationError),

    // Premium pricing errors
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    // Fingerprinting adapter errors
    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),

    // Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Device scoring errors
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("No fingerprint hash supplied and no fingerprinting service configured")]
    MissingFingerprint,
}

/// Reputation network errors
#[derive(Debug, Error)]
pub enum ReputationError {
    #[error("Reporter {0} not registered as participant")]
    UnregisteredParticipant(String),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Device not tracked by network: {0}")]
    DeviceNotTracked(String),
}

/// Premium pricing errors
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Unknown coverage tier: {0}")]
    UnknownCoverageTier(String),

    #[error("Coverage distribution must sum to 1.0, got {total}")]
    InvalidDistribution { total: f64 },

    #[error("Device count must be positive")]
    InvalidDeviceCount,

    #[error("Policy duration must be at least one month")]
    InvalidPolicyDuration,
}

/// Fingerprinting adapter errors
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("Fingerprint provider failed: {0}")]
    ProviderFailure(String),
}

// Implement From for common external error types
impl From<serde_json::Error> for SecurePremiumError {
    fn from(err: serde_json::Error) -> Self {
        SecurePremiumError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for SecurePremiumError {
    fn from(err: std::io::Error) -> Self {
        SecurePremiumError::Storage(err.to_string())
    }
}
