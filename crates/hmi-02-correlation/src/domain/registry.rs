//! # Pending Call Registry
//!
//! Tracks in-flight outbound calls keyed by correlation id and owns their
//! timeouts. The entry map is the single claim point: whichever of
//! `resolve`, `expire`, `cancel` or `shutdown` removes an entry first owns
//! it, and every later attempt finds nothing.
//!
//! Flow:
//! 1. Engine runs a command that returns `Dispatch::AwaitReply`
//! 2. Engine calls `register()`, which arms the timeout
//! 3. Engine sends the request
//! 4. A reply arrives and the router calls `resolve()`, or the timer fires
//!    and the engine calls `expire_armed()`
//! 5. The claimed command gets exactly one `on_event` or `on_timeout`,
//!    then `cleanup`
//!
//! Callbacks always run after the map lock is released.

use crate::domain::command::{Command, CommandContext};
use crate::domain::errors::RegistryError;
use crate::ports::{TimerHandle, TimerService};
use parking_lot::Mutex;
use shared_types::{CorrelationId, Event, FunctionId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Called from the timer service when a call's timeout elapses.
///
/// The engine's notifier queues the expiry so it is processed on the engine
/// loop, in order with inbound events.
pub type ExpiryNotifier = Arc<dyn Fn(CorrelationId, TimerHandle) + Send + Sync>;

/// Result of delivering a correlated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// A live entry was claimed and its command received `on_event`.
    Matched,
    /// Stale, duplicate or foreign. Nothing was invoked.
    Unmatched,
}

/// One in-flight call. The boxed command is the call's continuation.
pub struct CorrelationEntry {
    pub correlation_id: CorrelationId,
    pub function_id: FunctionId,
    pub issued_at: Instant,
    pub timeout: Duration,
    pub timer: TimerHandle,
    command: Box<dyn Command>,
}

impl fmt::Debug for CorrelationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationEntry")
            .field("correlation_id", &self.correlation_id)
            .field("function_id", &self.function_id)
            .field("issued_at", &self.issued_at)
            .field("timeout", &self.timeout)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

/// Read-only view of a pending call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCallInfo {
    pub correlation_id: CorrelationId,
    pub function_id: FunctionId,
    pub timeout: Duration,
    pub timer: TimerHandle,
}

/// Statistics for the pending call registry
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total calls registered
    pub total_registered: AtomicU64,
    /// Total calls resolved by a reply
    pub total_matched: AtomicU64,
    /// Total calls resolved by timeout
    pub total_timeouts: AtomicU64,
    /// Total calls cancelled
    pub total_cancelled: AtomicU64,
    /// Total correlated events with no live entry
    pub total_unmatched: AtomicU64,
    /// Total calls dropped at shutdown
    pub total_dropped: AtomicU64,
}

/// Plain copy of [`PendingStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingStatsSnapshot {
    pub registered: u64,
    pub matched: u64,
    pub timeouts: u64,
    pub cancelled: u64,
    pub unmatched: u64,
    pub dropped: u64,
}

impl PendingStats {
    pub fn snapshot(&self) -> PendingStatsSnapshot {
        PendingStatsSnapshot {
            registered: self.total_registered.load(Ordering::Relaxed),
            matched: self.total_matched.load(Ordering::Relaxed),
            timeouts: self.total_timeouts.load(Ordering::Relaxed),
            cancelled: self.total_cancelled.load(Ordering::Relaxed),
            unmatched: self.total_unmatched.load(Ordering::Relaxed),
            dropped: self.total_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Registry of in-flight outbound calls.
pub struct PendingCallRegistry {
    entries: Mutex<HashMap<CorrelationId, CorrelationEntry>>,
    timers: Arc<dyn TimerService>,
    on_expiry: ExpiryNotifier,
    max_pending: usize,
    stats: PendingStats,
}

impl PendingCallRegistry {
    pub fn new(timers: Arc<dyn TimerService>, on_expiry: ExpiryNotifier, max_pending: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            timers,
            on_expiry,
            max_pending,
            stats: PendingStats::default(),
        }
    }

    /// Park `command` under `correlation_id` and arm its timeout.
    ///
    /// On failure the command is cleaned up and dropped; no callback fires.
    pub fn register(
        &self,
        correlation_id: CorrelationId,
        function_id: FunctionId,
        mut command: Box<dyn Command>,
        timeout: Duration,
    ) -> Result<(), RegistryError> {
        let mut entries = self.entries.lock();

        let rejection = if entries.contains_key(&correlation_id) {
            Some(RegistryError::DuplicateCorrelationId(correlation_id))
        } else if entries.len() >= self.max_pending {
            Some(RegistryError::CapacityExhausted {
                limit: self.max_pending,
            })
        } else {
            None
        };
        if let Some(err) = rejection {
            drop(entries);
            error!(
                correlation_id = %correlation_id,
                function_id = %function_id,
                error = %err,
                "Failed to register pending call"
            );
            command.cleanup();
            return Err(err);
        }

        // The callback only notifies; it never touches the map, so arming
        // under the lock cannot deadlock.
        let notify = self.on_expiry.clone();
        let timer = match self
            .timers
            .schedule(timeout, Box::new(move |handle| notify(correlation_id, handle)))
        {
            Ok(timer) => timer,
            Err(e) => {
                drop(entries);
                error!(
                    correlation_id = %correlation_id,
                    function_id = %function_id,
                    error = %e,
                    "Failed to arm timeout for pending call"
                );
                command.cleanup();
                return Err(e.into());
            }
        };

        entries.insert(
            correlation_id,
            CorrelationEntry {
                correlation_id,
                function_id,
                issued_at: Instant::now(),
                timeout,
                timer,
                command,
            },
        );
        drop(entries);

        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
        debug!(
            correlation_id = %correlation_id,
            function_id = %function_id,
            timeout_ms = timeout.as_millis() as u64,
            timer = %timer,
            "Registered pending call"
        );
        Ok(())
    }

    /// Deliver a reply to the call registered under `correlation_id`.
    ///
    /// A reply whose function id differs from the pending call's is foreign
    /// traffic and leaves the entry in place.
    pub fn resolve(
        &self,
        correlation_id: CorrelationId,
        event: &Event,
        ctx: &CommandContext,
    ) -> MatchResult {
        let claimed = {
            let mut entries = self.entries.lock();
            match entries.get(&correlation_id) {
                Some(entry) if entry.function_id == event.function_id => {
                    entries.remove(&correlation_id)
                }
                Some(entry) => {
                    warn!(
                        correlation_id = %correlation_id,
                        expected = %entry.function_id,
                        received = %event.function_id,
                        "Reply function does not match pending call"
                    );
                    None
                }
                None => None,
            }
        };

        let Some(mut entry) = claimed else {
            self.stats.total_unmatched.fetch_add(1, Ordering::Relaxed);
            warn!(
                correlation_id = %correlation_id,
                function_id = %event.function_id,
                "Event for unknown or expired correlation ID"
            );
            return MatchResult::Unmatched;
        };

        self.timers.cancel(entry.timer);
        let elapsed = entry.issued_at.elapsed();

        entry.command.on_event(event, ctx);
        entry.command.cleanup();

        self.stats.total_matched.fetch_add(1, Ordering::Relaxed);
        debug!(
            correlation_id = %correlation_id,
            function_id = %entry.function_id,
            response_time_ms = elapsed.as_millis() as u64,
            "Resolved pending call"
        );
        MatchResult::Matched
    }

    /// Time out the call registered under `correlation_id`, whatever timer
    /// it was armed with.
    ///
    /// Returns true if this call claimed the entry.
    pub fn expire(&self, correlation_id: CorrelationId, ctx: &CommandContext) -> bool {
        let claimed = self.entries.lock().remove(&correlation_id);
        match claimed {
            Some(entry) => {
                self.timers.cancel(entry.timer);
                self.fire_timeout(entry, ctx);
                true
            }
            None => {
                debug!(correlation_id = %correlation_id, "Expiry for call no longer pending");
                false
            }
        }
    }

    /// Time out the call only if it is still armed with `timer`.
    ///
    /// A timer left over from an earlier call that reused the id is a no-op.
    pub fn expire_armed(
        &self,
        correlation_id: CorrelationId,
        timer: TimerHandle,
        ctx: &CommandContext,
    ) -> bool {
        let claimed = {
            let mut entries = self.entries.lock();
            match entries.get(&correlation_id) {
                Some(entry) if entry.timer == timer => entries.remove(&correlation_id),
                Some(_) => {
                    debug!(
                        correlation_id = %correlation_id,
                        timer = %timer,
                        "Stale timer for reused correlation ID"
                    );
                    None
                }
                None => None,
            }
        };

        match claimed {
            Some(entry) => {
                self.fire_timeout(entry, ctx);
                true
            }
            None => false,
        }
    }

    fn fire_timeout(&self, mut entry: CorrelationEntry, ctx: &CommandContext) {
        info!(
            correlation_id = %entry.correlation_id,
            function_id = %entry.function_id,
            timeout_ms = entry.timeout.as_millis() as u64,
            "Pending call timed out"
        );

        entry.command.on_timeout(ctx);
        entry.command.cleanup();
        self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Deregister a call without invoking `on_event` or `on_timeout`.
    pub fn cancel(&self, correlation_id: CorrelationId) -> bool {
        let claimed = self.entries.lock().remove(&correlation_id);
        let Some(mut entry) = claimed else {
            return false;
        };

        self.timers.cancel(entry.timer);
        entry.command.cleanup();
        self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
        debug!(
            correlation_id = %correlation_id,
            function_id = %entry.function_id,
            "Cancelled pending call"
        );
        true
    }

    /// Cancel every pending call of `function_id`.
    ///
    /// Used when a caller never learned the id a call was issued under.
    /// Returns the number of calls cancelled.
    pub fn cancel_function(&self, function_id: FunctionId) -> usize {
        let claimed: Vec<CorrelationEntry> = {
            let mut entries = self.entries.lock();
            let ids: Vec<CorrelationId> = entries
                .values()
                .filter(|entry| entry.function_id == function_id)
                .map(|entry| entry.correlation_id)
                .collect();
            ids.iter().filter_map(|id| entries.remove(id)).collect()
        };

        let cancelled = claimed.len();
        for mut entry in claimed {
            self.timers.cancel(entry.timer);
            entry.command.cleanup();
            debug!(
                correlation_id = %entry.correlation_id,
                function_id = %function_id,
                "Cancelled pending call"
            );
        }
        self.stats
            .total_cancelled
            .fetch_add(cancelled as u64, Ordering::Relaxed);
        cancelled
    }

    /// Drop every pending call without invoking either terminal callback.
    ///
    /// Returns the number of calls dropped.
    pub fn shutdown(&self) -> usize {
        let drained: Vec<CorrelationEntry> = {
            let mut entries = self.entries.lock();
            entries.drain().map(|(_, entry)| entry).collect()
        };

        let dropped = drained.len();
        for mut entry in drained {
            self.timers.cancel(entry.timer);
            entry.command.cleanup();
        }

        self.stats
            .total_dropped
            .fetch_add(dropped as u64, Ordering::Relaxed);
        if dropped > 0 {
            info!(dropped = dropped, "Dropped pending calls at shutdown");
        }
        dropped
    }

    /// Check if a correlation ID is pending
    pub fn is_pending(&self, correlation_id: CorrelationId) -> bool {
        self.entries.lock().contains_key(&correlation_id)
    }

    /// Get number of currently pending calls
    pub fn pending_count(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn pending_call(&self, correlation_id: CorrelationId) -> Option<PendingCallInfo> {
        self.entries
            .lock()
            .get(&correlation_id)
            .map(|entry| PendingCallInfo {
                correlation_id: entry.correlation_id,
                function_id: entry.function_id,
                timeout: entry.timeout,
                timer: entry.timer,
            })
    }

    pub fn max_pending(&self) -> usize {
        self.max_pending
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}
