//! # SecurePremium Pricing
//!
//! Premium calculation for device insurance.
//!
//! Two pricing paths live here deliberately:
//!
//! - [`PremiumEngine`]: quote generation from risk assessments, with
//!   reputation discounts and volume/term adjustments
//! - [`PremiumModel`]: an independently parameterized pricing policy used by
//!   reporting surfaces, with its own multiplier breakpoints and tier table
//!
//! The two multiplier functions are distinct, independently tunable business
//! rules and must not be unified.

pub mod engine;
pub mod model;

pub use engine::{
    AnnualCostEstimate, CoverageDistribution, EngineConfig, PremiumEngine, TierCostBreakdown,
};
pub use model::{PolicyCostBreakdown, PremiumModel, PricingTierConfig};
