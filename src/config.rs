use crate::error::{AccountError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Process-wide configuration, constructed once at startup and threaded
/// through component constructors. No implicit registration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    pub lock: LockConfig,
}

/// Lock acquisition and lease tuning.
///
/// The lease must exceed the worst-case critical-section duration so expiry
/// never fires during a healthy operation; explicit release remains the
/// primary path and expiry is only the crash fallback.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct LockConfig {
    /// Total time a caller may block waiting for the lock, in milliseconds.
    pub wait_timeout_ms: u64,
    /// Sleep between acquisition attempts, in milliseconds.
    pub poll_interval_ms: u64,
    /// Time-to-live of a held lock record, in milliseconds.
    pub lease_ttl_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: 10_000,
            poll_interval_ms: 1_000,
            lease_ttl_ms: 5_000,
        }
    }
}

impl LockConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn lease_ttl(&self) -> Duration {
        Duration::from_millis(self.lease_ttl_ms)
    }
}

impl EngineConfig {
    /// Loads configuration from a JSON file. Missing fields fall back to
    /// defaults; unknown fields are rejected.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AccountError::Storage(format!("read config: {e}")))?;
        serde_json::from_str(&raw)
            .map_err(|e| AccountError::Storage(format!("parse config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = EngineConfig::default();
        assert_eq!(config.lock.wait_timeout(), Duration::from_secs(10));
        assert_eq!(config.lock.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.lock.lease_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"lock": {"wait_timeout_ms": 250}}"#).unwrap();
        assert_eq!(config.lock.wait_timeout_ms, 250);
        assert_eq!(config.lock.poll_interval_ms, 1_000);
        assert_eq!(config.lock.lease_ttl_ms, 5_000);
    }

    #[test]
    fn unknown_fields_rejected() {
        let parsed: std::result::Result<EngineConfig, _> =
            serde_json::from_str(r#"{"lock": {"wat": 1}}"#);
        assert!(parsed.is_err());
    }
}
