//! In-process transport over tokio channels.
//!
//! Used to connect the engine to an HMI simulator, and by tests that play the
//! HMI side themselves.

use crate::ports::{HmiReceiver, HmiTransport, TransportError};
use async_trait::async_trait;
use shared_types::HmiMessage;
use tokio::sync::{mpsc, Mutex};

/// Outbound half: messages sent here come out of the paired receiver.
#[derive(Clone)]
pub struct ChannelTransport(pub mpsc::UnboundedSender<HmiMessage>);

impl HmiTransport for ChannelTransport {
    fn send(&self, message: HmiMessage) -> Result<(), TransportError> {
        self.0.send(message).map_err(|_| TransportError::ChannelClosed)
    }
}

/// Inbound half, readable through the [`HmiReceiver`] port.
pub struct ChannelReceiver(Mutex<mpsc::UnboundedReceiver<HmiMessage>>);

impl ChannelReceiver {
    pub fn new(receiver: mpsc::UnboundedReceiver<HmiMessage>) -> Self {
        Self(Mutex::new(receiver))
    }
}

#[async_trait]
impl HmiReceiver for ChannelReceiver {
    async fn receive(&self) -> Result<HmiMessage, TransportError> {
        let mut guard = self.0.lock().await;
        guard.recv().await.ok_or(TransportError::ChannelClosed)
    }
}

/// Create a connected transport/receiver pair.
pub fn transport_channel() -> (ChannelTransport, ChannelReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelTransport(tx), ChannelReceiver::new(rx))
}
