//! Wall-clock timer service on the tokio runtime.
//!
//! Each timer is a spawned task sleeping for its duration. Cancelling aborts
//! the task; a task that already woke up still delivers its callback.

use crate::ports::{TimerCallback, TimerError, TimerHandle, TimerService};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::trace;

pub struct TokioTimerService {
    runtime: Option<Handle>,
    tasks: Arc<DashMap<TimerHandle, AbortHandle>>,
    next_handle: AtomicU64,
}

impl TokioTimerService {
    /// Arm timers on whatever runtime `schedule` is called from.
    pub fn new() -> Self {
        Self::on_runtime(None)
    }

    /// Arm timers on a specific runtime.
    pub fn with_handle(runtime: Handle) -> Self {
        Self::on_runtime(Some(runtime))
    }

    fn on_runtime(runtime: Option<Handle>) -> Self {
        Self {
            runtime,
            tasks: Arc::new(DashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Abort every armed timer.
    pub fn cancel_all(&self) {
        self.tasks.retain(|_, task| {
            task.abort();
            false
        });
    }
}

impl Default for TokioTimerService {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerService for TokioTimerService {
    fn schedule(&self, after: Duration, callback: TimerCallback) -> Result<TimerHandle, TimerError> {
        let runtime = match &self.runtime {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|_| TimerError::RuntimeUnavailable)?,
        };

        let handle = TimerHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let tasks = self.tasks.clone();

        // The task waits until its abort handle is recorded, so a zero
        // duration timer cannot finish before it can be cancelled.
        let (armed_tx, armed_rx) = oneshot::channel::<()>();
        let task = runtime.spawn(async move {
            if armed_rx.await.is_err() {
                return;
            }
            tokio::time::sleep(after).await;
            tasks.remove(&handle);
            trace!(timer = %handle, "Timer fired");
            callback(handle);
        });

        self.tasks.insert(handle, task.abort_handle());
        let _ = armed_tx.send(());
        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        match self.tasks.remove(&handle) {
            Some((_, task)) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for TokioTimerService {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
