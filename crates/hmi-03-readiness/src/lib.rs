//! # HMI-03 Readiness
//!
//! The startup handshake that asks each HMI interface whether it is ready,
//! and the capability fetches that follow it.
//!
//! **Subsystem ID:** 03
//! **Architecture:** Commands over the HMI-02 correlation engine
//!
//! ## Components
//!
//! | Type | Role |
//! |------|------|
//! | [`ReadinessHandshake`] | `*.IsReady` probe; updates state and capability flags |
//! | [`CapabilityFetchRequest`] | Follow-up fetch; stores the returned capability set |
//! | [`HmiResponseCommand`] | Inbound response raised as a correlated event |
//! | [`HmiNotificationCommand`] | Inbound notification raised as a broadcast |
//! | [`DefaultCommandFactory`] | Inbound message to command mapping |
//!
//! ## Module Structure
//!
//! ```text
//! hmi-03-readiness/
//! ├── domain/     # ReadinessHandshake, ReadinessReply, CapabilityFetchRequest
//! ├── inbound/    # HmiResponseCommand, HmiNotificationCommand
//! └── factory.rs  # DefaultCommandFactory
//! ```

#![warn(clippy::all)]

pub mod domain;
pub mod factory;
pub mod inbound;

pub use domain::{
    CapabilityFetchRequest, HandshakeError, HandshakePhase, ReadinessHandshake, ReadinessReply,
    ReplyError,
};
pub use factory::DefaultCommandFactory;
pub use inbound::{HmiNotificationCommand, HmiResponseCommand};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
