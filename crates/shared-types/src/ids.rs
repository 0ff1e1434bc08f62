//! Correlation identifiers for outbound HMI calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Identifier linking an outbound request to its asynchronous reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(u32);

impl CorrelationId {
    /// Create from a raw value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CorrelationId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<CorrelationId> for u32 {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

/// Allocates correlation ids for one session.
///
/// Ids increase monotonically and wrap back to 1; `0` is reserved.
#[derive(Debug)]
pub struct CorrelationIdGenerator {
    next: AtomicU32,
}

impl CorrelationIdGenerator {
    /// First id handed out by a fresh generator.
    pub const FIRST: u32 = 1;

    /// Create a generator starting at [`Self::FIRST`].
    pub fn new() -> Self {
        Self::starting_at(Self::FIRST)
    }

    /// Create a generator whose next id is `first` (clamped away from 0).
    pub fn starting_at(first: u32) -> Self {
        Self {
            next: AtomicU32::new(first.max(Self::FIRST)),
        }
    }

    /// Allocate the next id.
    pub fn next_id(&self) -> CorrelationId {
        let step = |current: u32| {
            Some(if current == u32::MAX {
                Self::FIRST
            } else {
                current + 1
            })
        };
        let allocated = match self.next.fetch_update(Ordering::Relaxed, Ordering::Relaxed, step) {
            Ok(previous) | Err(previous) => previous,
        };
        CorrelationId(allocated)
    }
}

impl Default for CorrelationIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
