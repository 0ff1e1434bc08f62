//! Capability store that records every write.
//!
//! The flag setters of the real store are idempotent, so tests that need to
//! see *that* a command wrote `cooperating = false` use this wrapper.

use super::capabilities::HmiCapabilities;
use crate::ports::CapabilityStore;
use parking_lot::Mutex;
use serde_json::Value;
use shared_types::{FunctionId, HmiInterface};

/// One write made through a [`RecordingCapabilityStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityWrite {
    Cooperating(HmiInterface, bool),
    Supported(HmiInterface, bool),
    Stored(FunctionId),
}

/// Wraps an [`HmiCapabilities`] and keeps a log of writes.
#[derive(Default)]
pub struct RecordingCapabilityStore {
    inner: HmiCapabilities,
    writes: Mutex<Vec<CapabilityWrite>>,
}

impl RecordingCapabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes so far, in order.
    pub fn writes(&self) -> Vec<CapabilityWrite> {
        self.writes.lock().clone()
    }

    /// Writes that concern `interface`.
    pub fn writes_for(&self, interface: HmiInterface) -> Vec<CapabilityWrite> {
        self.writes
            .lock()
            .iter()
            .filter(|write| match write {
                CapabilityWrite::Cooperating(i, _) | CapabilityWrite::Supported(i, _) => {
                    *i == interface
                }
                CapabilityWrite::Stored(function_id) => function_id.interface() == interface,
            })
            .cloned()
            .collect()
    }
}

impl CapabilityStore for RecordingCapabilityStore {
    fn set_cooperating(&self, interface: HmiInterface, cooperating: bool) {
        self.writes
            .lock()
            .push(CapabilityWrite::Cooperating(interface, cooperating));
        self.inner.set_cooperating(interface, cooperating);
    }

    fn set_supported(&self, interface: HmiInterface, supported: bool) {
        self.writes
            .lock()
            .push(CapabilityWrite::Supported(interface, supported));
        self.inner.set_supported(interface, supported);
    }

    fn is_cooperating(&self, interface: HmiInterface) -> bool {
        self.inner.is_cooperating(interface)
    }

    fn is_supported(&self, interface: HmiInterface) -> bool {
        self.inner.is_supported(interface)
    }

    fn store_capabilities(&self, function_id: FunctionId, capabilities: Value) {
        self.writes.lock().push(CapabilityWrite::Stored(function_id));
        self.inner.store_capabilities(function_id, capabilities);
    }

    fn capabilities(&self, function_id: FunctionId) -> Option<Value> {
        self.inner.capabilities(function_id)
    }
}
