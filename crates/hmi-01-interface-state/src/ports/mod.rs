//! # Ports Module
//!
//! Interfaces consumed by commands that record capability outcomes.

pub mod capability_store;

pub use capability_store::CapabilityStore;
