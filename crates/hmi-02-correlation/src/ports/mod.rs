//! # Ports Module
//!
//! Collaborators the correlation core consumes: a timer service, a transport
//! to the HMI and a factory for commands built from inbound messages.

pub mod factory;
pub mod timer;
pub mod transport;

pub use factory::CommandFactory;
pub use timer::{TimerCallback, TimerError, TimerHandle, TimerService};
pub use transport::{HmiReceiver, HmiTransport, TransportError};
