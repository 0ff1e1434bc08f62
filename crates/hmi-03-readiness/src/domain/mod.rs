//! # Domain Module
//!
//! The readiness handshake, its reply parsing and the capability fetches it
//! issues.

pub mod capability_fetch;
pub mod errors;
pub mod handshake;
pub mod reply;

pub use capability_fetch::CapabilityFetchRequest;
pub use errors::{HandshakeError, ReplyError};
pub use handshake::{HandshakePhase, ReadinessHandshake};
pub use reply::ReadinessReply;
