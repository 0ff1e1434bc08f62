//! Timer service port.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Identifies one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Invoked once when a timer fires, with the handle it was armed under.
pub type TimerCallback = Box<dyn FnOnce(TimerHandle) + Send + 'static>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("no async runtime available to arm timer")]
    RuntimeUnavailable,
    #[error("timer service shut down")]
    Shutdown,
}

/// Schedules one-shot callbacks.
///
/// A cancelled timer never invokes its callback unless it was already firing.
/// Callers that need exactly-once semantics must tolerate that late callback.
pub trait TimerService: Send + Sync {
    /// Arm a timer that calls `callback` after `after` has elapsed.
    fn schedule(&self, after: Duration, callback: TimerCallback) -> Result<TimerHandle, TimerError>;

    /// Disarm a timer. Returns false if it already fired or was cancelled.
    fn cancel(&self, handle: TimerHandle) -> bool;
}
