//! # Shared Types Crate
//!
//! This crate contains the types that cross crate boundaries in the HMI
//! correlation core.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the function catalogue, interface catalogue
//!   and message envelope are defined once, here.
//! - **Integer Correlation**: outbound calls are correlated by a `u32` id
//!   allocated per session; `0` is never handed out.
//! - **Payload Agnostic**: message parameters stay as JSON maps; concrete
//!   command bodies decide what they need from them.

pub mod catalogue;
pub mod errors;
pub mod ids;
pub mod message;
pub mod state;

pub use catalogue::{FunctionId, HmiInterface};
pub use errors::CatalogueError;
pub use ids::{CorrelationId, CorrelationIdGenerator};
pub use message::{Event, HmiMessage, MessageType, ResultCode};
pub use state::InterfaceState;
