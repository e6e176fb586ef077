//! # SecurePremium Common
//!
//! Shared types, errors, and the fingerprinting adapter for the SecurePremium
//! device-insurance platform.
//!
//! ## Core Types
//!
//! - [`RiskAssessment`]: per-device compromise risk breakdown
//! - [`DeviceMetrics`]: raw telemetry consumed by the risk calculator
//! - [`PremiumQuote`]: priced insurance quote with terms
//! - [`Severity`]: shared severity scale for security events and threat reports
//!
//! ## Integration
//!
//! - [`fingerprint::FingerprintService`]: hardware-fingerprint adapter with a
//!   local fallback digest when no external provider is configured

pub mod error;
pub mod fingerprint;
pub mod types;
pub mod util;

// Re-export commonly used types at crate root
pub use error::{
    FingerprintError, PricingError, ReputationError, Result, ScoringError, SecurePremiumError,
};
pub use fingerprint::{FingerprintProvider, FingerprintService};
pub use types::{
    assessment::{RiskAssessment, ASSESSMENT_VERSION},
    quote::{CoverageTier, PremiumQuote, QuoteTerms},
    severity::Severity,
    telemetry::{
        DeviceMetrics, HistoricalBaseline, MetricBaseline, NetworkReputationSignal, TpmStatus,
    },
};

/// SecurePremium version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Quote validity window in days
pub const QUOTE_VALIDITY_DAYS: i64 = 30;

/// Neutral reputation assumed when a device has no network record
pub const NEUTRAL_REPUTATION: f64 = 0.5;

/// Minimum accepted fingerprint digest length (hex characters)
pub const MIN_FINGERPRINT_HEX_LEN: usize = 64;
