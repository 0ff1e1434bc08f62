//! Transport ports to and from the HMI.

use async_trait::async_trait;
use shared_types::HmiMessage;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("channel closed")]
    ChannelClosed,
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Outbound side. Sends are fire-and-forget: success means the message was
/// handed to the transport, not that the HMI received it.
pub trait HmiTransport: Send + Sync {
    fn send(&self, message: HmiMessage) -> Result<(), TransportError>;
}

/// Inbound side, delivering messages in receipt order.
#[async_trait]
pub trait HmiReceiver: Send + Sync {
    /// Receive next message (waits until available)
    async fn receive(&self) -> Result<HmiMessage, TransportError>;
}
