//! # HMI-01 Interface State
//!
//! Session-scoped state that readiness handshakes write and request gating
//! reads.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Components
//!
//! | Type | Role |
//! |------|------|
//! | [`InterfaceStateTable`] | `NOT_RESPONDED` / `AVAILABLE` / `NOT_AVAILABLE` per interface |
//! | [`CapabilityStore`] | Port for cooperating/supported flags and fetched capability payloads |
//! | [`HmiCapabilities`] | In-memory capability store |
//! | [`RecordingCapabilityStore`] | Capability store that records every write (feature `test-utils`) |
//!
//! Both the table and the in-memory store publish changes to the shared bus
//! when constructed with a publisher.
//!
//! ## Module Structure
//!
//! ```text
//! hmi-01-interface-state/
//! ├── domain/     # InterfaceStateTable, StateTransition
//! ├── ports/      # CapabilityStore trait
//! └── adapters/   # HmiCapabilities, RecordingCapabilityStore
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::HmiCapabilities;
#[cfg(any(test, feature = "test-utils"))]
pub use adapters::{CapabilityWrite, RecordingCapabilityStore};
pub use domain::{InterfaceStateTable, StateTransition};
pub use ports::CapabilityStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
