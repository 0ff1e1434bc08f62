//! # Error Types
//!
//! Errors raised while interpreting catalogue names.

use thiserror::Error;

/// Errors related to the function and interface catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    /// The name does not match any known HMI function.
    #[error("Unknown HMI function: {0}")]
    UnknownFunction(String),

    /// The name does not match any known HMI interface.
    #[error("Unknown HMI interface: {0}")]
    UnknownInterface(String),
}
