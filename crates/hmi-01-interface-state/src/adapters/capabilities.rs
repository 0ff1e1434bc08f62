//! In-memory capability store.

use crate::ports::CapabilityStore;
use parking_lot::RwLock;
use serde_json::Value;
use shared_bus::{EventPublisher, HmiBusEvent};
use shared_types::{FunctionId, HmiInterface};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InterfaceFlags {
    cooperating: bool,
    supported: bool,
}

impl Default for InterfaceFlags {
    fn default() -> Self {
        Self {
            cooperating: false,
            supported: true,
        }
    }
}

/// Capability store backed by in-memory maps.
pub struct HmiCapabilities {
    flags: RwLock<HashMap<HmiInterface, InterfaceFlags>>,
    payloads: RwLock<HashMap<FunctionId, Value>>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl HmiCapabilities {
    pub fn new() -> Self {
        Self {
            flags: RwLock::new(HashMap::new()),
            payloads: RwLock::new(HashMap::new()),
            publisher: None,
        }
    }

    /// Create a store that publishes flag changes and stored payloads.
    pub fn with_publisher(publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            publisher: Some(publisher),
            ..Self::new()
        }
    }

    fn flags(&self, interface: HmiInterface) -> InterfaceFlags {
        self.flags
            .read()
            .get(&interface)
            .copied()
            .unwrap_or_default()
    }

    /// Apply `update` and publish `changed` if the flags differ afterwards.
    fn update_flags(
        &self,
        interface: HmiInterface,
        update: impl FnOnce(&mut InterfaceFlags),
        changed: impl FnOnce(&InterfaceFlags) -> HmiBusEvent,
    ) {
        let mut flags = self.flags.write();
        let entry = flags.entry(interface).or_default();
        let before = *entry;
        update(&mut *entry);
        if before == *entry {
            return;
        }

        debug!(
            interface = %interface,
            cooperating = entry.cooperating,
            supported = entry.supported,
            "Capability flags updated"
        );
        if let Some(publisher) = &self.publisher {
            publisher.publish(changed(&*entry));
        }
    }
}

impl Default for HmiCapabilities {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityStore for HmiCapabilities {
    fn set_cooperating(&self, interface: HmiInterface, cooperating: bool) {
        self.update_flags(
            interface,
            |flags| flags.cooperating = cooperating,
            |flags| HmiBusEvent::CooperationChanged {
                interface,
                cooperating: flags.cooperating,
            },
        );
    }

    fn set_supported(&self, interface: HmiInterface, supported: bool) {
        self.update_flags(
            interface,
            |flags| flags.supported = supported,
            |flags| HmiBusEvent::SupportChanged {
                interface,
                supported: flags.supported,
            },
        );
    }

    fn is_cooperating(&self, interface: HmiInterface) -> bool {
        self.flags(interface).cooperating
    }

    fn is_supported(&self, interface: HmiInterface) -> bool {
        self.flags(interface).supported
    }

    fn store_capabilities(&self, function_id: FunctionId, capabilities: Value) {
        self.payloads.write().insert(function_id, capabilities);
        debug!(function_id = %function_id, "Capabilities stored");

        if let Some(publisher) = &self.publisher {
            publisher.publish(HmiBusEvent::CapabilitiesStored { function_id });
        }
    }

    fn capabilities(&self, function_id: FunctionId) -> Option<Value> {
        self.payloads.read().get(&function_id).cloned()
    }
}
