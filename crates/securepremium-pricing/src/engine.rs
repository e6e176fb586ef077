//! Quote generation engine
//!
//! Translates a risk assessment plus an optional reputation score into a
//! priced [`PremiumQuote`], and estimates fleet-wide annual costs.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use securepremium_common::types::assessment::RiskAssessment;
use securepremium_common::types::quote::{CoverageTier, PremiumQuote, QuoteTerms};
use securepremium_common::util::serde_money;
use securepremium_common::{PricingError, Result, NEUTRAL_REPUTATION, QUOTE_VALIDITY_DAYS};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base annual premium before any adjustment
    pub base_annual_premium: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_annual_premium: dec!(120.00),
        }
    }
}

/// Requested share of the fleet per coverage tier. Must sum to exactly 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoverageDistribution {
    pub basic: f64,
    pub standard: f64,
    pub premium: f64,
}

impl CoverageDistribution {
    pub fn total(&self) -> f64 {
        self.basic + self.standard + self.premium
    }
}

/// Per-tier slice of a fleet cost estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierCostBreakdown {
    pub coverage_tier: CoverageTier,
    pub device_count: u32,
    #[serde(serialize_with = "serde_money")]
    pub premium_per_device: Decimal,
    #[serde(serialize_with = "serde_money")]
    pub total_premium: Decimal,
}

/// Fleet-wide annual cost estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualCostEstimate {
    pub total_devices: u32,
    pub breakdown_by_coverage: Vec<TierCostBreakdown>,
    #[serde(serialize_with = "serde_money")]
    pub subtotal: Decimal,
    pub volume_discount_rate: f64,
    #[serde(serialize_with = "serde_money")]
    pub volume_discount_amount: Decimal,
    #[serde(serialize_with = "serde_money")]
    pub total_annual_cost: Decimal,
    #[serde(serialize_with = "serde_money")]
    pub cost_per_device_monthly: Decimal,
}

/// Calculates insurance premiums from device risk profile, reputation data,
/// and coverage requirements.
#[derive(Debug, Clone, Default)]
pub struct PremiumEngine {
    config: EngineConfig,
}

impl PremiumEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Generate an insurance premium quote for a device.
    ///
    /// `reputation_score` defaults to the neutral 0.5 when absent. Fails
    /// with an invalid-argument error on an unknown coverage level. For
    /// policy durations other than 12 months the annual figure is rescaled
    /// proportionally from the monthly rate.
    #[instrument(skip(self, risk_assessment))]
    pub fn generate_quote(
        &self,
        device_id: &str,
        risk_assessment: &RiskAssessment,
        reputation_score: Option<f64>,
        coverage_level: &str,
        policy_duration_months: u32,
    ) -> Result<PremiumQuote> {
        let tier: CoverageTier = coverage_level.parse()?;

        let quote_timestamp = Utc::now();
        let quote_valid_until = quote_timestamp + Duration::days(QUOTE_VALIDITY_DAYS);

        let risk_score = risk_assessment.overall_risk_score;
        let confidence = risk_assessment.confidence_level;

        let risk_multiplier = Self::risk_multiplier(risk_score, confidence);
        let reputation_score = reputation_score.unwrap_or(NEUTRAL_REPUTATION);
        let reputation_discount = Self::reputation_discount(reputation_score);
        let coverage_multiplier = Self::tier_multiplier(tier);

        let mut annual_premium = self.config.base_annual_premium
            * Decimal::try_from(risk_multiplier).unwrap_or(Decimal::ONE)
            * coverage_multiplier
            * Decimal::try_from(1.0 - reputation_discount).unwrap_or(Decimal::ONE);

        let monthly_premium = annual_premium / dec!(12);

        if policy_duration_months != 12 {
            annual_premium = monthly_premium * Decimal::from(policy_duration_months);
        }

        info!(
            device_id,
            annual = %annual_premium.round_dp(2),
            tier = %tier,
            "Premium quote generated"
        );

        Ok(PremiumQuote {
            quote_id: Uuid::new_v4(),
            device_id: device_id.to_string(),
            annual_premium_usd: annual_premium,
            monthly_premium_usd: monthly_premium,
            base_premium: self.config.base_annual_premium,
            risk_adjustment: risk_multiplier,
            reputation_discount,
            coverage_level: tier,
            quote_timestamp,
            quote_valid_until,
            terms: QuoteTerms {
                policy_duration_months,
                max_annual_claim: Self::tier_max_claim(tier),
                risk_score,
                confidence_level: confidence,
                reputation_score,
                threat_indicators: risk_assessment.threat_indicators.clone(),
                volume_discount: None,
            },
        })
    }

    /// Apply a volume discount for organizations with multiple devices.
    ///
    /// The discount rate is also added onto the quote's
    /// `reputation_discount` field as a running adjustment total; after this
    /// call that field is bookkeeping, not a pure reputation discount.
    pub fn apply_volume_discount(
        &self,
        base_quote: &PremiumQuote,
        device_count: u32,
    ) -> PremiumQuote {
        let discount_rate = Self::volume_discount_rate(device_count);

        let adjusted_annual = base_quote.annual_premium_usd
            * Decimal::try_from(1.0 - discount_rate).unwrap_or(Decimal::ONE);
        let adjusted_monthly = adjusted_annual / dec!(12);

        PremiumQuote {
            quote_id: base_quote.quote_id,
            device_id: base_quote.device_id.clone(),
            annual_premium_usd: adjusted_annual,
            monthly_premium_usd: adjusted_monthly,
            base_premium: base_quote.base_premium,
            risk_adjustment: base_quote.risk_adjustment,
            reputation_discount: base_quote.reputation_discount + discount_rate,
            coverage_level: base_quote.coverage_level,
            quote_timestamp: base_quote.quote_timestamp,
            quote_valid_until: base_quote.quote_valid_until,
            terms: QuoteTerms {
                volume_discount: Some(discount_rate),
                ..base_quote.terms.clone()
            },
        }
    }

    /// Estimate total annual insurance cost for an organization.
    ///
    /// The coverage distribution must sum to exactly 1.0. Per-tier device
    /// counts truncate, so they may undershoot `total_devices`; this is
    /// expected.
    #[instrument(skip(self))]
    pub fn estimate_annual_cost(
        &self,
        total_devices: u32,
        average_risk_score: f64,
        average_reputation: f64,
        coverage_distribution: &CoverageDistribution,
    ) -> Result<AnnualCostEstimate> {
        if coverage_distribution.total() != 1.0 {
            return Err(PricingError::InvalidDistribution {
                total: coverage_distribution.total(),
            }
            .into());
        }

        if total_devices == 0 {
            return Err(PricingError::InvalidDeviceCount.into());
        }

        let risk_multiplier = Self::risk_multiplier(average_risk_score, 0.8);
        let reputation_discount = Self::reputation_discount(average_reputation);

        let tiers = [
            (CoverageTier::Basic, coverage_distribution.basic),
            (CoverageTier::Standard, coverage_distribution.standard),
            (CoverageTier::Premium, coverage_distribution.premium),
        ];

        let mut breakdown_by_coverage = Vec::with_capacity(tiers.len());

        for (tier, percentage) in tiers {
            let device_count = (f64::from(total_devices) * percentage) as u32;

            let annual_premium = self.config.base_annual_premium
                * Decimal::try_from(risk_multiplier).unwrap_or(Decimal::ONE)
                * Self::tier_multiplier(tier)
                * Decimal::try_from(1.0 - reputation_discount).unwrap_or(Decimal::ONE);

            breakdown_by_coverage.push(TierCostBreakdown {
                coverage_tier: tier,
                device_count,
                premium_per_device: annual_premium,
                total_premium: annual_premium * Decimal::from(device_count),
            });
        }

        let subtotal: Decimal = breakdown_by_coverage
            .iter()
            .map(|tier| tier.total_premium)
            .sum();

        let volume_discount_rate = Self::volume_discount_rate(total_devices);
        let total_annual_cost =
            subtotal * Decimal::try_from(1.0 - volume_discount_rate).unwrap_or(Decimal::ONE);

        Ok(AnnualCostEstimate {
            total_devices,
            breakdown_by_coverage,
            subtotal,
            volume_discount_rate,
            volume_discount_amount: subtotal - total_annual_cost,
            total_annual_cost,
            cost_per_device_monthly: total_annual_cost / dec!(12) / Decimal::from(total_devices),
        })
    }

    /// Premium multiplier from risk score and assessment confidence.
    ///
    /// Piecewise-linear over [0, 0.3, 0.5, 0.7, 1.0] mapping onto the ranges
    /// [0.5, 0.8], [0.8, 1.2], [1.2, 2.0], [2.0, 4.0], scaled by a
    /// confidence factor and capped at 4.0.
    fn risk_multiplier(risk_score: f64, confidence: f64) -> f64 {
        let base_multiplier = if risk_score < 0.3 {
            0.5 + (risk_score / 0.3) * 0.3
        } else if risk_score < 0.5 {
            0.8 + ((risk_score - 0.3) / 0.2) * 0.4
        } else if risk_score < 0.7 {
            1.2 + ((risk_score - 0.5) / 0.2) * 0.8
        } else {
            2.0 + ((risk_score - 0.7) / 0.3) * 2.0
        };

        let confidence_factor = 0.5 + confidence * 0.5;
        (base_multiplier * confidence_factor).min(4.0)
    }

    /// Premium discount from reputation.
    ///
    /// Low-reputation devices pay a penalty (negative discount); high
    /// reputation earns up to 30% off.
    fn reputation_discount(reputation_score: f64) -> f64 {
        if reputation_score < 0.3 {
            -0.15
        } else if reputation_score < 0.5 {
            (reputation_score - 0.3) / 0.2 * -0.10
        } else if reputation_score < 0.7 {
            (reputation_score - 0.5) / 0.2 * 0.05
        } else {
            0.10 + (reputation_score - 0.7) / 0.3 * 0.20
        }
    }

    fn tier_multiplier(tier: CoverageTier) -> Decimal {
        match tier {
            CoverageTier::Basic => dec!(1.0),
            CoverageTier::Standard => dec!(1.5),
            CoverageTier::Premium => dec!(2.5),
        }
    }

    fn tier_max_claim(tier: CoverageTier) -> u32 {
        match tier {
            CoverageTier::Basic => 5_000,
            CoverageTier::Standard => 25_000,
            CoverageTier::Premium => 100_000,
        }
    }

    fn volume_discount_rate(device_count: u32) -> f64 {
        if device_count < 10 {
            0.0
        } else if device_count < 50 {
            0.05
        } else if device_count < 100 {
            0.10
        } else if device_count < 500 {
            0.15
        } else {
            0.20
        }
    }
}
