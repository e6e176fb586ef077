//! # SecurePremium Reputation
//!
//! Decentralized reputation network for sharing device threat intelligence.
//!
//! Enables organizations to:
//! - Report suspicious device activity
//! - Query device reputation with time-based decay
//! - Contribute to collective threat intelligence
//!
//! Each [`ReputationNetwork`] instance is a standalone in-memory ledger;
//! there is no replication or consensus between instances.

pub mod network;
pub mod record;

pub use network::{
    NetworkConfig, NetworkStatistics, ReputationNetwork, ReputationRiskLevel, SeverityBreakdown,
    ThreatIntelligenceSummary,
};
pub use record::{
    ReputationRecord, ReputationView, ThreatIntelligenceReport, VerificationLevel,
};
