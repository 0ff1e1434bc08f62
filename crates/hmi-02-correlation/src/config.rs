//! Correlation engine configuration.

use serde::{Deserialize, Serialize};
use shared_types::FunctionId;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default time to wait for an HMI reply.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default limit on concurrently pending calls.
pub const DEFAULT_MAX_PENDING_CALLS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Timeout for calls without a per-function override
    pub default_timeout_ms: u64,
    /// Per-function timeout overrides
    pub function_timeouts_ms: HashMap<FunctionId, u64>,
    /// Registrations beyond this many pending calls are refused
    pub max_pending_calls: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            function_timeouts_ms: HashMap::new(),
            max_pending_calls: DEFAULT_MAX_PENDING_CALLS,
        }
    }
}

impl CorrelationConfig {
    /// Short timeouts and a small registry, for tests.
    pub fn for_testing() -> Self {
        Self {
            default_timeout_ms: 1_000,
            function_timeouts_ms: HashMap::new(),
            max_pending_calls: 64,
        }
    }

    /// Defaults overridden by environment variables.
    ///
    /// - `HMI_DEFAULT_TIMEOUT_MS`
    /// - `HMI_MAX_PENDING_CALLS`
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = env::var("HMI_DEFAULT_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.default_timeout_ms = ms;
        }
        if let Some(max) = env::var("HMI_MAX_PENDING_CALLS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_pending_calls = max;
        }
        config
    }

    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "default timeout cannot be 0".into(),
            ));
        }

        if let Some((function_id, _)) = self.function_timeouts_ms.iter().find(|(_, ms)| **ms == 0) {
            return Err(ConfigError::InvalidTimeout(format!(
                "timeout for {function_id} cannot be 0"
            )));
        }

        if self.max_pending_calls == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_pending_calls cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Timeout for calls of `function_id`.
    pub fn timeout_for(&self, function_id: FunctionId) -> Duration {
        let ms = self
            .function_timeouts_ms
            .get(&function_id)
            .copied()
            .unwrap_or(self.default_timeout_ms);
        Duration::from_millis(ms)
    }

    /// Override the timeout for one function.
    #[must_use]
    pub fn with_function_timeout(mut self, function_id: FunctionId, timeout: Duration) -> Self {
        self.function_timeouts_ms
            .insert(function_id, timeout.as_millis() as u64);
        self
    }
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}
