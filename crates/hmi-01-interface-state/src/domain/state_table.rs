//! # Interface State Table
//!
//! Current readiness per HMI interface.
//!
//! Writes for one interface are serialised by that interface's shard lock;
//! writes for different interfaces never contend on a shared lock. A change
//! notification is published while the shard is still held, so subscribers
//! observe transitions of one interface in the order they were applied.

use dashmap::DashMap;
use shared_bus::{EventPublisher, HmiBusEvent};
use shared_types::{HmiInterface, InterfaceState};
use std::sync::Arc;
use tracing::{debug, info};

/// A readiness change produced by [`InterfaceStateTable::set_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub interface: HmiInterface,
    pub old_state: InterfaceState,
    pub new_state: InterfaceState,
}

/// Readiness state for every HMI interface in a session.
///
/// Interfaces never written report [`InterfaceState::NotResponded`].
pub struct InterfaceStateTable {
    states: DashMap<HmiInterface, InterfaceState>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl InterfaceStateTable {
    /// Create a table that does not publish notifications.
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
            publisher: None,
        }
    }

    /// Create a table that publishes `InterfaceStateChanged` on every change.
    pub fn with_publisher(publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            states: DashMap::new(),
            publisher: Some(publisher),
        }
    }

    /// Current readiness of `interface`.
    pub fn get_state(&self, interface: HmiInterface) -> InterfaceState {
        self.states
            .get(&interface)
            .map(|state| *state)
            .unwrap_or_default()
    }

    /// Overwrite the readiness of `interface`.
    ///
    /// Returns the transition when the state actually changed; re-setting the
    /// current value is silent.
    pub fn set_state(
        &self,
        interface: HmiInterface,
        new_state: InterfaceState,
    ) -> Option<StateTransition> {
        let mut entry = self.states.entry(interface).or_default();
        let old_state = std::mem::replace(entry.value_mut(), new_state);

        if old_state == new_state {
            debug!(interface = %interface, state = %new_state, "Interface state unchanged");
            return None;
        }

        info!(
            interface = %interface,
            old_state = %old_state,
            new_state = %new_state,
            "Interface state changed"
        );

        if let Some(publisher) = &self.publisher {
            publisher.publish(HmiBusEvent::InterfaceStateChanged {
                interface,
                old_state,
                new_state,
            });
        }
        drop(entry);

        Some(StateTransition {
            interface,
            old_state,
            new_state,
        })
    }

    /// True when the interface last reported itself available.
    pub fn is_available(&self, interface: HmiInterface) -> bool {
        self.get_state(interface) == InterfaceState::Available
    }

    /// States of every interface, in catalogue order.
    pub fn snapshot(&self) -> Vec<(HmiInterface, InterfaceState)> {
        HmiInterface::ALL
            .iter()
            .map(|interface| (*interface, self.get_state(*interface)))
            .collect()
    }
}

impl Default for InterfaceStateTable {
    fn default() -> Self {
        Self::new()
    }
}
