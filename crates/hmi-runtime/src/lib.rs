//! # HMI Runtime Library
//!
//! Session wiring for the HMI correlation core. The `hmi-runtime` binary
//! runs one session against the in-process simulator.
//!
//! ## Session Layout
//!
//! ```text
//!  HMI ──► InboundPump ──► CorrelationEngine ──► EventRouter ──► PendingCallRegistry
//!   ▲                            │                    │
//!   │                            │                    └──► OnReadyListener ──► ReadinessHandshake
//!   └──────── HmiTransport ◄─────┘
//!                                │
//!                 InterfaceStateTable / HmiCapabilities ──► InMemoryEventBus
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod listener;
pub mod session;
pub mod simulator;

pub use config::{RuntimeConfig, RuntimeConfigError};
pub use listener::OnReadyListener;
pub use session::{simulated_session, HmiSession};
pub use simulator::{HmiSimulator, SimulatedReply};
