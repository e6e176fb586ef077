//! # SecurePremium Risk
//!
//! Risk calculation engine evaluating device compromise likelihood.
//!
//! Combines behavioral analysis, hardware integrity checks, network
//! reputation signals, and anomaly detection into a weighted [0, 1] risk
//! score with per-component breakdown and threat indicators.

pub mod calculator;

pub use calculator::{RiskCalculator, RiskCategory, RiskThresholds};
