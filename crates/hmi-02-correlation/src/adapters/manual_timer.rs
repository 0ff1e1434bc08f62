//! Timer service driven by explicit calls to [`ManualTimer::advance`].
//!
//! Virtual time starts at zero and only moves when the owner advances it,
//! which makes timeout behaviour deterministic in tests and simulations.

use crate::ports::{TimerCallback, TimerError, TimerHandle, TimerService};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::trace;

#[derive(Default)]
struct ManualTimerState {
    now: Duration,
    next_handle: u64,
    shut_down: bool,
    /// Ordered by deadline, then by arming order.
    due: BTreeMap<(Duration, u64), TimerCallback>,
    deadlines: HashMap<TimerHandle, (Duration, u64)>,
}

#[derive(Default)]
pub struct ManualTimer {
    state: Mutex<ManualTimerState>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.state.lock().due.len()
    }

    /// Deadline of the earliest armed timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.state.lock().due.first_key_value().map(|(key, _)| key.0)
    }

    /// Move virtual time forward and fire every timer that became due.
    ///
    /// Timers fire in deadline order, each with the clock set to its own
    /// deadline. Callbacks run without the internal lock held, and timers
    /// armed by a callback fire in the same call if they fall due within the
    /// window. Returns the number of timers fired.
    pub fn advance(&self, by: Duration) -> usize {
        self.advance_with(by, || {})
    }

    /// Like [`advance`](Self::advance), but runs `settle` after each timer
    /// fires, with the clock still at that timer's deadline.
    ///
    /// Lets a caller whose callbacks only queue work process that work at the
    /// moment it became due, so anything it arms starts counting from there.
    pub fn advance_with(&self, by: Duration, mut settle: impl FnMut()) -> usize {
        let target = self.state.lock().now + by;

        let mut fired = 0;
        loop {
            let next = {
                let mut state = self.state.lock();
                match state.due.first_key_value() {
                    Some((key, _)) if key.0 <= target => {
                        let key = *key;
                        state.now = state.now.max(key.0);
                        state.due.remove(&key).map(|callback| {
                            let handle = TimerHandle::new(key.1);
                            state.deadlines.remove(&handle);
                            (handle, callback)
                        })
                    }
                    _ => None,
                }
            };

            let Some((handle, callback)) = next else {
                break;
            };
            trace!(timer = %handle, "Manual timer fired");
            callback(handle);
            settle();
            fired += 1;
        }

        self.state.lock().now = target;
        fired
    }

    /// Refuse every later `schedule`, as a stopped runtime would.
    pub fn shut_down(&self) {
        let mut state = self.state.lock();
        state.shut_down = true;
        state.due.clear();
        state.deadlines.clear();
    }
}

impl TimerService for ManualTimer {
    fn schedule(&self, after: Duration, callback: TimerCallback) -> Result<TimerHandle, TimerError> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(TimerError::Shutdown);
        }

        state.next_handle += 1;
        let seq = state.next_handle;
        let handle = TimerHandle::new(seq);
        let key = (state.now + after, seq);
        state.due.insert(key, callback);
        state.deadlines.insert(handle, key);
        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let mut state = self.state.lock();
        match state.deadlines.remove(&handle) {
            Some(key) => state.due.remove(&key).is_some(),
            None => false,
        }
    }
}
