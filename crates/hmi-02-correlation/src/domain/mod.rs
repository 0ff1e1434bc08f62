//! # Domain Module
//!
//! The command contract, the pending-call registry and the event router.

pub mod command;
pub mod errors;
pub mod registry;
pub mod router;

pub use command::{Command, CommandContext, Dispatch};
pub use errors::{CommandError, RegistryError};
pub use registry::{
    CorrelationEntry, MatchResult, PendingCallInfo, PendingCallRegistry, PendingStats,
    ExpiryNotifier, PendingStatsSnapshot,
};
pub use router::{EventListener, EventRouter, ListenerId, RouteOutcome};
