//! Validation and rounding helpers shared across the workspace

use rust_decimal::Decimal;
use serde::Serializer;

/// Clamp a score into the unit interval [0, 1]
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Round a score to 4 decimal places (documented score precision)
#[inline]
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Serialize an `f64` score rounded to 4 decimal places
pub fn serde_round4<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(round4(*value))
}

/// Serialize a currency `Decimal` rounded to 2 decimal places
pub fn serde_money<S: Serializer>(
    value: &Decimal,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serde::Serialize::serialize(&value.round_dp(2), serializer)
}

/// Validate device identifier format (8-128 characters)
pub fn validate_device_id(device_id: &str) -> bool {
    (8..=128).contains(&device_id.len())
}

/// Validate a score lies in the unit interval
pub fn validate_unit_score(score: f64) -> bool {
    (0.0..=1.0).contains(&score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
        assert_eq!(clamp_unit(1.7), 1.0);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(0.1), 0.1);
    }

    #[test]
    fn test_validate_device_id() {
        assert!(validate_device_id("device_001"));
        assert!(!validate_device_id("short"));
        assert!(!validate_device_id(&"x".repeat(129)));
    }

    #[test]
    fn test_validate_unit_score() {
        assert!(validate_unit_score(0.0));
        assert!(validate_unit_score(1.0));
        assert!(!validate_unit_score(1.01));
        assert!(!validate_unit_score(-0.01));
    }
}
