//! Readiness state of an HMI interface.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Readiness of one HMI interface as last reported by the HMI.
///
/// Every state may be re-entered from every other state; a module can flap
/// between available and unavailable over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterfaceState {
    /// No explicit availability reported yet.
    #[default]
    NotResponded,
    /// The HMI reported the interface as available.
    Available,
    /// The HMI reported the interface as not available.
    NotAvailable,
}

impl InterfaceState {
    /// State corresponding to an explicit availability flag.
    pub const fn from_available(available: bool) -> Self {
        if available {
            InterfaceState::Available
        } else {
            InterfaceState::NotAvailable
        }
    }
}

impl fmt::Display for InterfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterfaceState::NotResponded => "NOT_RESPONDED",
            InterfaceState::Available => "AVAILABLE",
            InterfaceState::NotAvailable => "NOT_AVAILABLE",
        };
        f.write_str(name)
    }
}
