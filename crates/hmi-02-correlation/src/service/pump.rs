//! Forwards messages from the HMI receiver into the engine inbox.

use crate::ports::{HmiReceiver, TransportError};
use crate::service::engine::EngineHandle;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct InboundPump {
    receiver: Arc<dyn HmiReceiver>,
    engine: EngineHandle,
}

impl InboundPump {
    pub fn new(receiver: Arc<dyn HmiReceiver>, engine: EngineHandle) -> Self {
        Self { receiver, engine }
    }

    /// Run until the receiver closes or the engine stops.
    ///
    /// Returns the number of messages forwarded.
    pub async fn run(self) -> u64 {
        let mut forwarded = 0;
        loop {
            match self.receiver.receive().await {
                Ok(message) => {
                    debug!(
                        function_id = %message.function_id,
                        correlation_id = ?message.correlation_id,
                        "Received HMI message"
                    );
                    if self.engine.deliver(message).is_err() {
                        warn!("Correlation engine stopped, stopping inbound pump");
                        break;
                    }
                    forwarded += 1;
                }
                Err(TransportError::ChannelClosed) => {
                    warn!("HMI receiver channel closed, stopping inbound pump");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Error receiving HMI message");
                }
            }
        }
        forwarded
    }
}
