//! # Service Module
//!
//! The correlation engine loop and the pump feeding it from the HMI.

pub mod engine;
pub mod pump;

pub use engine::{CorrelationEngine, EngineDependencies, EngineError, EngineHandle, EngineInput};
pub use pump::InboundPump;
