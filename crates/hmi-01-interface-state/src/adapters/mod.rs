//! # Adapters Module
//!
//! Capability store implementations.

pub mod capabilities;
#[cfg(any(test, feature = "test-utils"))]
pub mod recording;

pub use capabilities::HmiCapabilities;
#[cfg(any(test, feature = "test-utils"))]
pub use recording::{CapabilityWrite, RecordingCapabilityStore};
