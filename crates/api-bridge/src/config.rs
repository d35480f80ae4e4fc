//! Bridge configuration with validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration for the request-reply bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Deadline applied to calls that do not pass their own.
    pub default_call_timeout: Duration,
    /// Bound on how long a dispatcher waits for the readiness gate
    /// before failing with `NotReady`.
    pub readiness_wait: Duration,
    /// Interval between sweeps of expired pending calls.
    pub sweep_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_call_timeout: Duration::from_secs(10),
            readiness_wait: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(5),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

impl BridgeConfig {
    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any duration is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_call_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "default_call_timeout cannot be 0".into(),
            ));
        }
        if self.readiness_wait.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "readiness_wait cannot be 0".into(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "sweep_interval cannot be 0".into(),
            ));
        }
        Ok(())
    }
}
