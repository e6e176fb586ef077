//! Hardware fingerprinting adapter
//!
//! Wraps an external fingerprint provider behind a single-capability trait
//! and degrades to a locally-derived digest when no provider is available.
//! Adapter unavailability is never fatal: callers always receive a hex
//! digest of at least 64 characters.

use crate::error::Result;
use crate::MIN_FINGERPRINT_HEX_LEN;
use std::collections::HashMap;
use tracing::{info, warn};

/// Capability interface any concrete fingerprint provider implements
pub trait FingerprintProvider: Send + Sync {
    /// Produce raw fingerprint material. Output of any shape is accepted;
    /// the service normalizes it to a stable hex digest.
    fn generate_fingerprint(&self) -> Result<String>;

    /// Optional provider metadata
    fn metadata(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// Adapter to obtain device fingerprints in a robust way.
///
/// When a provider is configured, its output is normalized to a hex digest.
/// Provider failures are logged and the local fallback digest is used
/// instead.
pub struct FingerprintService {
    provider: Option<Box<dyn FingerprintProvider>>,
}

impl FingerprintService {
    /// Create a service backed by an external provider
    pub fn new(provider: Box<dyn FingerprintProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Create a service that only uses the local fallback digest
    pub fn fallback_only() -> Self {
        info!("No fingerprint provider configured, using local fallback");
        Self { provider: None }
    }

    /// Whether the service is running without an external provider
    pub fn is_fallback(&self) -> bool {
        self.provider.is_none()
    }

    /// Return a stable fingerprint hash string.
    ///
    /// Always succeeds: provider errors degrade to the fallback digest.
    pub fn get_fingerprint_hash(&self) -> String {
        if let Some(provider) = &self.provider {
            match provider.generate_fingerprint() {
                Ok(raw) => return Self::normalize_hash(&raw),
                Err(e) => {
                    warn!(error = %e, "Fingerprint provider failed, using fallback digest");
                }
            }
        }
        Self::local_fallback_digest()
    }

    /// Return provider metadata, or the fallback status when none is set
    pub fn get_metadata(&self) -> HashMap<String, String> {
        if let Some(provider) = &self.provider {
            let md = provider.metadata();
            if !md.is_empty() {
                return md;
            }
        }
        HashMap::from([("fallback".to_string(), self.is_fallback().to_string())])
    }

    /// Normalize provider output to a hex digest suitable for storage and
    /// comparisons. Values already shaped like a digest pass through.
    fn normalize_hash(value: &str) -> String {
        let s = value.trim().to_lowercase();
        if s.len() >= MIN_FINGERPRINT_HEX_LEN && s.chars().all(|c| c.is_ascii_hexdigit()) {
            return s;
        }
        blake3::hash(s.as_bytes()).to_hex().to_string()
    }

    /// Best-effort digest derived from local host characteristics
    fn local_fallback_digest() -> String {
        let host = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .unwrap_or_default();
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_default();

        let raw = format!(
            "{}|{}|{}|{}|{}",
            host,
            user,
            std::env::consts::OS,
            std::env::consts::ARCH,
            std::env::consts::FAMILY,
        );
        blake3::hash(raw.as_bytes()).to_hex().to_string()
    }
}
