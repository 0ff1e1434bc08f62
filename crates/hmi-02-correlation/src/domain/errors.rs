//! Error types for the correlation domain.

use crate::ports::TimerError;
use shared_types::{CorrelationId, FunctionId};
use thiserror::Error;

/// Why a call could not be registered.
///
/// A failed registration never affects other pending calls.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("correlation id {0} is already pending")]
    DuplicateCorrelationId(CorrelationId),

    #[error("pending call registry at capacity ({limit} calls)")]
    CapacityExhausted { limit: usize },

    #[error("unable to arm timeout: {0}")]
    TimerUnavailable(#[from] TimerError),
}

/// Why a command could not run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("request for {0} awaits a reply but carries no correlation id")]
    MissingCorrelationId(FunctionId),

    #[error("command rejected: {0}")]
    Rejected(String),
}
