//! Premium pricing model
//!
//! The second pricing policy: used by CLI and reporting surfaces, with its
//! own multiplier breakpoints, tier configurations, and premium clamps.
//! Independently tunable from the quote engine; do not unify the two.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use securepremium_common::types::quote::CoverageTier;
use securepremium_common::util::serde_money;
use securepremium_common::{PricingError, Result};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Configuration for a pricing tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingTierConfig {
    pub tier_name: CoverageTier,
    pub base_multiplier: f64,
    pub max_annual_claim: u32,
    pub deductible: u32,
    pub coverage_items: Vec<String>,
}

impl PricingTierConfig {
    pub fn item_count(&self) -> usize {
        self.coverage_items.len()
    }
}

/// Adjustments applied to an annual policy cost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyAdjustments {
    pub term_discount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_discount: Option<f64>,
}

/// Annual policy cost breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyCostBreakdown {
    #[serde(serialize_with = "serde_money")]
    pub base_annual_cost: Decimal,
    pub policy_months: u32,
    pub adjustments: PolicyAdjustments,
    pub total_adjustments_rate: f64,
    #[serde(serialize_with = "serde_money")]
    pub final_annual_cost: Decimal,
    #[serde(serialize_with = "serde_money")]
    pub monthly_effective_rate: Decimal,
}

/// Pricing model for device insurance premiums.
///
/// Uses risk assessment, reputation data, and coverage configuration to
/// determine a premium within fixed floor/ceiling bounds.
#[derive(Debug, Clone)]
pub struct PremiumModel {
    base_premium: Decimal,
    min_premium: Decimal,
    max_premium: Decimal,
    tiers: Vec<PricingTierConfig>,
    volume_discount_brackets: Vec<(u32, f64)>,
}

impl Default for PremiumModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PremiumModel {
    pub fn new() -> Self {
        Self {
            base_premium: dec!(120.00),
            min_premium: dec!(30.00),
            max_premium: dec!(500.00),
            tiers: vec![
                PricingTierConfig {
                    tier_name: CoverageTier::Basic,
                    base_multiplier: 1.0,
                    max_annual_claim: 5_000,
                    deductible: 500,
                    coverage_items: vec![
                        "malware_removal".to_string(),
                        "data_recovery".to_string(),
                        "incident_support".to_string(),
                    ],
                },
                PricingTierConfig {
                    tier_name: CoverageTier::Standard,
                    base_multiplier: 1.5,
                    max_annual_claim: 25_000,
                    deductible: 250,
                    coverage_items: vec![
                        "malware_removal".to_string(),
                        "data_recovery".to_string(),
                        "incident_support".to_string(),
                        "forensic_analysis".to_string(),
                        "legal_consultation".to_string(),
                    ],
                },
                PricingTierConfig {
                    tier_name: CoverageTier::Premium,
                    base_multiplier: 2.5,
                    max_annual_claim: 100_000,
                    deductible: 0,
                    coverage_items: vec![
                        "malware_removal".to_string(),
                        "data_recovery".to_string(),
                        "incident_support".to_string(),
                        "forensic_analysis".to_string(),
                        "legal_consultation".to_string(),
                        "24_7_response".to_string(),
                        "credential_monitoring".to_string(),
                    ],
                },
            ],
            volume_discount_brackets: vec![(10, 0.05), (50, 0.10), (100, 0.15), (500, 0.20)],
        }
    }

    /// Calculate the base premium before policy-level adjustments, clamped
    /// into the model's floor/ceiling bounds.
    #[instrument(skip(self))]
    pub fn calculate_base_premium(
        &self,
        risk_score: f64,
        confidence: f64,
        coverage_tier: &str,
        reputation_score: Option<f64>,
    ) -> Result<Decimal> {
        let tier: CoverageTier = coverage_tier.parse()?;
        let tier_config = self.tier_config(tier)?;

        let risk_multiplier = Self::risk_to_multiplier(risk_score, confidence);

        let mut premium = self.base_premium
            * Decimal::try_from(risk_multiplier).unwrap_or(Decimal::ONE)
            * Decimal::try_from(tier_config.base_multiplier).unwrap_or(Decimal::ONE);

        if let Some(reputation_score) = reputation_score {
            let adjustment = Self::reputation_to_adjustment(reputation_score);
            premium *= Decimal::try_from(adjustment).unwrap_or(Decimal::ONE);
        }

        Ok(premium.clamp(self.min_premium, self.max_premium))
    }

    /// Volume discount on a premium: (discounted premium, discount rate)
    pub fn apply_volume_discount(&self, premium: Decimal, device_count: u32) -> (Decimal, f64) {
        let discount_rate = self
            .volume_discount_brackets
            .iter()
            .rev()
            .find(|(threshold, _)| device_count >= *threshold)
            .map(|(_, rate)| *rate)
            .unwrap_or(0.0);

        let discounted =
            premium * Decimal::try_from(1.0 - discount_rate).unwrap_or(Decimal::ONE);

        (discounted, discount_rate)
    }

    /// Total annual policy cost with term and optional bulk adjustments.
    ///
    /// Multi-year terms earn 5% (24 months) or 10% (36 months); a bulk
    /// count adds the volume bracket unless a discount was already applied
    /// upstream.
    pub fn calculate_annual_policy_cost(
        &self,
        monthly_premium: Decimal,
        policy_months: u32,
        includes_discount: bool,
        bulk_count: Option<u32>,
    ) -> Result<PolicyCostBreakdown> {
        if policy_months == 0 {
            return Err(PricingError::InvalidPolicyDuration.into());
        }

        let base_annual_cost = monthly_premium * Decimal::from(policy_months);

        let term_discount = match policy_months {
            24 => 0.05,
            36 => 0.10,
            _ => 0.0,
        };

        let mut adjustments = PolicyAdjustments {
            term_discount,
            bulk_discount: None,
        };
        let mut total_adjustments_rate = term_discount;

        if let Some(count) = bulk_count {
            if !includes_discount {
                let (_, bulk_rate) = self.apply_volume_discount(monthly_premium, count);
                adjustments.bulk_discount = Some(bulk_rate);
                total_adjustments_rate += bulk_rate;
            }
        }

        let final_annual_cost = base_annual_cost
            * Decimal::try_from(1.0 - total_adjustments_rate).unwrap_or(Decimal::ONE);

        Ok(PolicyCostBreakdown {
            base_annual_cost,
            policy_months,
            adjustments,
            total_adjustments_rate,
            final_annual_cost,
            monthly_effective_rate: final_annual_cost / Decimal::from(policy_months),
        })
    }

    /// Configuration for a single coverage tier
    pub fn get_tier_details(&self, tier_name: &str) -> Result<&PricingTierConfig> {
        let tier: CoverageTier = tier_name.parse()?;
        self.tier_config(tier)
    }

    /// All tier configurations, cheapest first
    pub fn get_all_tiers(&self) -> &[PricingTierConfig] {
        &self.tiers
    }

    fn tier_config(&self, tier: CoverageTier) -> Result<&PricingTierConfig> {
        self.tiers
            .iter()
            .find(|config| config.tier_name == tier)
            .ok_or_else(|| PricingError::UnknownCoverageTier(tier.to_string()).into())
    }

    /// Step multiplier from risk score, scaled by confidence.
    ///
    /// Breakpoints differ from the quote engine's piecewise-linear curve on
    /// purpose; the two policies are tuned independently.
    fn risk_to_multiplier(risk_score: f64, confidence: f64) -> f64 {
        let base = if risk_score < 0.2 {
            0.60
        } else if risk_score < 0.4 {
            0.80
        } else if risk_score < 0.6 {
            1.20
        } else if risk_score < 0.8 {
            1.80
        } else {
            2.50
        };

        let confidence_factor = 0.7 + confidence * 0.3;
        base * confidence_factor
    }

    /// Premium adjustment factor from reputation (0.80 to 1.25)
    fn reputation_to_adjustment(reputation_score: f64) -> f64 {
        if reputation_score < 0.3 {
            1.25
        } else if reputation_score < 0.5 {
            1.10
        } else if reputation_score < 0.7 {
            1.0
        } else if reputation_score < 0.85 {
            0.90
        } else {
            0.80
        }
    }
}
