//! # HMI-02 Correlation
//!
//! Matches asynchronous HMI replies to the requests that caused them, arms a
//! timeout per outbound call and routes uncorrelated notifications to
//! registered listeners.
//!
//! **Subsystem ID:** 02
//! **Architecture:** Hexagonal (Domain + Ports/Adapters + Service)
//!
//! ## Guarantees
//!
//! | Guarantee | Enforced by |
//! |-----------|-------------|
//! | Exactly one of `on_event` / `on_timeout` per registered call | Registry map is the single claim point |
//! | A reply sent immediately still finds its entry | Register before send |
//! | A timer from an earlier call never expires a reused id | Expiries carry their [`TimerHandle`] |
//! | Inputs are processed one at a time, in arrival order | Single [`CorrelationEngine`] inbox |
//! | Follow-up commands run after the input that queued them | [`CommandContext::submit`] outbox |
//!
//! ## Module Structure
//!
//! ```text
//! hmi-02-correlation/
//! ├── config.rs   # Timeouts and registry limits
//! ├── domain/     # Command, PendingCallRegistry, EventRouter
//! ├── ports/      # TimerService, HmiTransport, HmiReceiver, CommandFactory
//! ├── adapters/   # Tokio and manual timers, channel and recording transports
//! ├── service/    # CorrelationEngine, InboundPump
//! └── testing.rs  # Probe commands and fixtures (feature `test-utils`)
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

/// Probe commands and engine fixtures.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::{ConfigError, CorrelationConfig};
pub use domain::{
    Command, CommandContext, CommandError, Dispatch, EventListener, EventRouter, ListenerId,
    MatchResult, PendingCallRegistry, PendingStatsSnapshot, RegistryError, RouteOutcome,
};
pub use ports::{CommandFactory, HmiReceiver, HmiTransport, TimerHandle, TimerService, TransportError};
pub use service::{CorrelationEngine, EngineDependencies, EngineError, EngineHandle, EngineInput, InboundPump};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
