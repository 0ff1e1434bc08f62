//! # Capability Store Port
//!
//! What readiness and capability-fetch commands record about each interface.

use serde_json::Value;
use shared_types::{FunctionId, HmiInterface};

/// Session-scoped capability state, shared by every command of a session.
///
/// Two flags are tracked per interface:
///
/// - **cooperating**: the interface answered its readiness probe with
///   `available = true`. Starts `false`.
/// - **supported**: the interface may be used at all. Starts `true` and is
///   cleared when the interface turns out not to cooperate.
pub trait CapabilityStore: Send + Sync {
    /// Record whether the interface participates at all.
    fn set_cooperating(&self, interface: HmiInterface, cooperating: bool);

    /// Record whether the interface is supported.
    fn set_supported(&self, interface: HmiInterface, supported: bool);

    fn is_cooperating(&self, interface: HmiInterface) -> bool;

    fn is_supported(&self, interface: HmiInterface) -> bool;

    /// Keep the parameters of a successful capability reply.
    fn store_capabilities(&self, function_id: FunctionId, capabilities: Value);

    /// Last stored reply parameters for `function_id`.
    fn capabilities(&self, function_id: FunctionId) -> Option<Value>;
}
