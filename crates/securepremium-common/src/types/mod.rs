//! Shared value objects exchanged between the core components

pub mod assessment;
pub mod quote;
pub mod severity;
pub mod telemetry;
