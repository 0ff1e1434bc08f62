//! Command factory port.

use crate::domain::Command;
use shared_types::HmiMessage;

/// Builds the command that handles an inbound HMI message.
pub trait CommandFactory: Send + Sync {
    /// `None` means the message is not supported and is dropped.
    fn create(&self, message: HmiMessage) -> Option<Box<dyn Command>>;
}
