//! Transport that keeps every sent message for inspection.

use crate::ports::{HmiTransport, TransportError};
use parking_lot::Mutex;
use shared_types::{FunctionId, HmiMessage};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<HmiMessage>>,
    fail_sends: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later send fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.fail_sends.store(failing, Ordering::SeqCst);
    }

    /// All messages sent so far.
    pub fn sent(&self) -> Vec<HmiMessage> {
        self.sent.lock().clone()
    }

    /// Take the messages sent so far, leaving the log empty.
    pub fn take(&self) -> Vec<HmiMessage> {
        std::mem::take(&mut *self.sent.lock())
    }

    /// Function ids of all messages sent so far, in order.
    pub fn sent_functions(&self) -> Vec<FunctionId> {
        self.sent.lock().iter().map(|m| m.function_id).collect()
    }

    /// Most recent message sent for `function_id`.
    pub fn last_for(&self, function_id: FunctionId) -> Option<HmiMessage> {
        self.sent
            .lock()
            .iter()
            .rev()
            .find(|m| m.function_id == function_id)
            .cloned()
    }

    pub fn count_for(&self, function_id: FunctionId) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|m| m.function_id == function_id)
            .count()
    }
}

impl HmiTransport for RecordingTransport {
    fn send(&self, message: HmiMessage) -> Result<(), TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed(format!(
                "{} rejected by test transport",
                message.function_id
            )));
        }
        self.sent.lock().push(message);
        Ok(())
    }
}
