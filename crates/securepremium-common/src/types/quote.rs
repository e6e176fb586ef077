//! Insurance premium quote value objects

use crate::error::PricingError;
use crate::util::{serde_money, serde_round4};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Coverage tier fixing the price multiplier and claim limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageTier {
    Basic,
    Standard,
    Premium,
}

impl CoverageTier {
    /// All tiers, cheapest first
    pub const ALL: [CoverageTier; 3] = [
        CoverageTier::Basic,
        CoverageTier::Standard,
        CoverageTier::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageTier::Basic => "basic",
            CoverageTier::Standard => "standard",
            CoverageTier::Premium => "premium",
        }
    }
}

impl fmt::Display for CoverageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverageTier {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(CoverageTier::Basic),
            "standard" => Ok(CoverageTier::Standard),
            "premium" => Ok(CoverageTier::Premium),
            other => Err(PricingError::UnknownCoverageTier(other.to_string())),
        }
    }
}

/// Policy terms echoed into a quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteTerms {
    pub policy_duration_months: u32,
    pub max_annual_claim: u32,
    #[serde(serialize_with = "serde_round4")]
    pub risk_score: f64,
    #[serde(serialize_with = "serde_round4")]
    pub confidence_level: f64,
    #[serde(serialize_with = "serde_round4")]
    pub reputation_score: f64,
    pub threat_indicators: Vec<String>,
    /// Set once a volume discount has been applied to the quote
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_discount: Option<f64>,
}

/// Container for an insurance premium quote.
///
/// Immutable value object created once per quote generation; currency
/// amounts serialize rounded to 2 decimal places.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumQuote {
    pub quote_id: Uuid,
    pub device_id: String,
    #[serde(serialize_with = "serde_money")]
    pub annual_premium_usd: Decimal,
    #[serde(serialize_with = "serde_money")]
    pub monthly_premium_usd: Decimal,
    #[serde(serialize_with = "serde_money")]
    pub base_premium: Decimal,
    #[serde(serialize_with = "serde_round4")]
    pub risk_adjustment: f64,
    #[serde(serialize_with = "serde_round4")]
    pub reputation_discount: f64,
    pub coverage_level: CoverageTier,
    pub quote_timestamp: DateTime<Utc>,
    pub quote_valid_until: DateTime<Utc>,
    pub terms: QuoteTerms,
}

impl PremiumQuote {
    /// Whether the quote is still within its validity window
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.quote_valid_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> PremiumQuote {
        PremiumQuote {
            quote_id: Uuid::new_v4(),
            device_id: "device_002".to_string(),
            annual_premium_usd: dec!(187.3333333),
            monthly_premium_usd: dec!(15.6111111),
            base_premium: dec!(120.00),
            risk_adjustment: 1.23456,
            reputation_discount: 0.05,
            coverage_level: CoverageTier::Standard,
            quote_timestamp: Utc::now(),
            quote_valid_until: Utc::now() + chrono::Duration::days(30),
            terms: QuoteTerms {
                policy_duration_months: 12,
                max_annual_claim: 25_000,
                risk_score: 0.45,
                confidence_level: 0.8,
                reputation_score: 0.5,
                threat_indicators: vec![],
                volume_discount: None,
            },
        }
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("standard".parse::<CoverageTier>().unwrap(), CoverageTier::Standard);
        assert_eq!("PREMIUM".parse::<CoverageTier>().unwrap(), CoverageTier::Premium);
        assert!(matches!(
            "platinum".parse::<CoverageTier>(),
            Err(PricingError::UnknownCoverageTier(_))
        ));
    }

    #[test]
    fn test_currency_serializes_to_two_places() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["annual_premium_usd"], "187.33");
        assert_eq!(json["monthly_premium_usd"], "15.61");
        assert_eq!(json["coverage_level"], "standard");
    }

    #[test]
    fn test_quote_round_trip() {
        let original = sample();
        let json = serde_json::to_string(&original).unwrap();
        let restored: PremiumQuote = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.device_id, original.device_id);
        assert_eq!(restored.coverage_level, original.coverage_level);
        assert_eq!(restored.terms.max_annual_claim, 25_000);
    }

    #[test]
    fn test_validity_window() {
        let quote = sample();
        assert!(quote.is_valid());
        assert!(quote.quote_valid_until > quote.quote_timestamp);
    }
}
