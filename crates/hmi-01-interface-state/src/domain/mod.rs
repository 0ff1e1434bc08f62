//! # Domain Module
//!
//! Readiness state per HMI interface.

pub mod state_table;

pub use state_table::{InterfaceStateTable, StateTransition};
