//! # Runtime Configuration
//!
//! Everything needed to start an [`HmiSession`](crate::HmiSession).

use hmi_02_correlation::{ConfigError, CorrelationConfig};
use hmi_telemetry::TelemetryConfig;
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use shared_types::HmiInterface;
use std::env;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Timeouts and registry limits.
    pub correlation: CorrelationConfig,
    /// Logging setup for the binary.
    pub telemetry: TelemetryConfig,
    /// Interfaces probed when the HMI announces `BasicCommunication.OnReady`.
    pub handshake_interfaces: Vec<HmiInterface>,
    /// Capacity of the state-change bus.
    pub bus_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            correlation: CorrelationConfig::default(),
            telemetry: TelemetryConfig::default(),
            handshake_interfaces: HmiInterface::with_readiness_handshake().collect(),
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl RuntimeConfig {
    pub fn for_testing() -> Self {
        Self {
            correlation: CorrelationConfig::for_testing(),
            telemetry: TelemetryConfig::for_testing(),
            ..Self::default()
        }
    }

    /// Defaults overridden from the environment.
    ///
    /// `HMI_HANDSHAKE_INTERFACES` is a comma separated list such as
    /// `UI,VR,RC`. Unknown names are skipped with a warning.
    pub fn from_env() -> Self {
        let mut config = Self {
            correlation: CorrelationConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
            ..Self::default()
        };
        if let Ok(list) = env::var("HMI_HANDSHAKE_INTERFACES") {
            config.handshake_interfaces = parse_interfaces(&list);
        }
        config
    }

    pub fn validate(&self) -> Result<(), RuntimeConfigError> {
        self.correlation.validate()?;

        if let Some(interface) = self
            .handshake_interfaces
            .iter()
            .find(|interface| interface.is_ready_function().is_none())
        {
            return Err(RuntimeConfigError::NoReadinessProbe(*interface));
        }

        if self.bus_capacity == 0 {
            return Err(RuntimeConfigError::InvalidBusCapacity);
        }
        Ok(())
    }
}

fn parse_interfaces(list: &str) -> Vec<HmiInterface> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| match name.parse() {
            Ok(interface) => Some(interface),
            Err(e) => {
                warn!(error = %e, "Ignoring handshake interface");
                None
            }
        })
        .collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeConfigError {
    #[error(transparent)]
    Correlation(#[from] ConfigError),

    #[error("{0} has no readiness probe and cannot be handshaked")]
    NoReadinessProbe(HmiInterface),

    #[error("bus capacity cannot be 0")]
    InvalidBusCapacity,
}
