//! # Bus Events
//!
//! Notifications that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{FunctionId, HmiInterface, InterfaceState};

/// All notifications that can be published to the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HmiBusEvent {
    // =========================================================================
    // INTERFACE STATE
    // =========================================================================
    /// The readiness state of an interface changed.
    /// Only published when `old_state != new_state`.
    InterfaceStateChanged {
        interface: HmiInterface,
        old_state: InterfaceState,
        new_state: InterfaceState,
    },

    // =========================================================================
    // CAPABILITIES
    // =========================================================================
    /// The cooperating flag of an interface changed.
    CooperationChanged {
        interface: HmiInterface,
        cooperating: bool,
    },

    /// The supported flag of an interface changed.
    SupportChanged {
        interface: HmiInterface,
        supported: bool,
    },

    /// Capability data arrived for a function.
    CapabilitiesStored { function_id: FunctionId },
}

impl HmiBusEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::InterfaceStateChanged { .. } => EventTopic::InterfaceState,
            Self::CooperationChanged { .. }
            | Self::SupportChanged { .. }
            | Self::CapabilitiesStored { .. } => EventTopic::Capabilities,
        }
    }

    /// Get the interface the event concerns.
    #[must_use]
    pub fn interface(&self) -> HmiInterface {
        match self {
            Self::InterfaceStateChanged { interface, .. }
            | Self::CooperationChanged { interface, .. }
            | Self::SupportChanged { interface, .. } => *interface,
            Self::CapabilitiesStored { function_id } => function_id.interface(),
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Readiness transitions.
    InterfaceState,
    /// Capability flags and payloads.
    Capabilities,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Interfaces to include. Empty means all interfaces.
    pub interfaces: Vec<HmiInterface>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            interfaces: Vec::new(),
        }
    }

    /// Restrict the filter to the given interfaces.
    #[must_use]
    pub fn for_interfaces(mut self, interfaces: Vec<HmiInterface>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &HmiBusEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let interface_match =
            self.interfaces.is_empty() || self.interfaces.contains(&event.interface());

        topic_match && interface_match
    }
}
