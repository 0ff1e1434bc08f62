//! # HMI Simulator
//!
//! Plays the HMI side of a session over in-process channels: announces
//! `BasicCommunication.OnReady`, then answers each request according to a
//! per-interface script.

use hmi_02_correlation::{HmiReceiver, HmiTransport, TransportError};
use parking_lot::Mutex;
use serde_json::{json, Value};
use shared_types::{FunctionId, HmiInterface, HmiMessage, MessageType};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// How the simulated HMI answers requests for one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedReply {
    /// `IsReady` carries `available`; capability requests succeed.
    Available(bool),
    /// `IsReady` carries no `available` field; capability requests succeed.
    Absent,
    /// Nothing for this interface is ever answered.
    Silent,
}

pub struct HmiSimulator {
    script: HashMap<HmiInterface, SimulatedReply>,
    seen: Arc<Mutex<Vec<FunctionId>>>,
}

impl Default for HmiSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl HmiSimulator {
    /// Every interface available.
    pub fn new() -> Self {
        Self {
            script: HashMap::new(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_reply(mut self, interface: HmiInterface, reply: SimulatedReply) -> Self {
        self.script.insert(interface, reply);
        self
    }

    /// Shared log of every request received, in order.
    pub fn requests_seen(&self) -> Arc<Mutex<Vec<FunctionId>>> {
        self.seen.clone()
    }

    fn reply_for(&self, interface: HmiInterface) -> SimulatedReply {
        self.script
            .get(&interface)
            .copied()
            .unwrap_or(SimulatedReply::Available(true))
    }

    /// The response to `request`, if the script answers it.
    pub fn respond(&self, request: &HmiMessage) -> Option<HmiMessage> {
        if request.message_type != MessageType::Request {
            return None;
        }
        let correlation_id = request.correlation_id?;
        let function_id = request.function_id;

        let reply = self.reply_for(function_id.interface());
        if reply == SimulatedReply::Silent {
            return None;
        }

        let params = if function_id.is_readiness_probe() {
            match reply {
                SimulatedReply::Available(available) => json!({ "available": available }),
                _ => json!({}),
            }
        } else {
            canned_capabilities(function_id)
        };
        Some(HmiMessage::response(function_id, correlation_id, params))
    }

    /// Announce readiness, then answer requests until either channel closes.
    ///
    /// Returns the number of requests received.
    pub async fn run(self, requests: Arc<dyn HmiReceiver>, responses: Arc<dyn HmiTransport>) -> u64 {
        let ready = HmiMessage::notification(FunctionId::BasicCommunicationOnReady, json!({}));
        if responses.send(ready).is_err() {
            warn!("Session closed before OnReady was announced");
            return 0;
        }

        let mut received = 0;
        loop {
            let request = match requests.receive().await {
                Ok(request) => request,
                Err(TransportError::ChannelClosed) => break,
                Err(e) => {
                    warn!(error = %e, "Simulator failed to receive request");
                    continue;
                }
            };
            received += 1;
            self.seen.lock().push(request.function_id);

            let Some(response) = self.respond(&request) else {
                debug!(function_id = %request.function_id, "Simulator stays silent");
                continue;
            };
            if responses.send(response).is_err() {
                break;
            }
        }
        received
    }
}

fn canned_capabilities(function_id: FunctionId) -> Value {
    match function_id {
        FunctionId::UiGetLanguage | FunctionId::VrGetLanguage | FunctionId::TtsGetLanguage => {
            json!({ "language": "EN-US" })
        }
        FunctionId::UiGetSupportedLanguages
        | FunctionId::VrGetSupportedLanguages
        | FunctionId::TtsGetSupportedLanguages => json!({ "languages": ["EN-US", "DE-DE"] }),
        FunctionId::VehicleInfoGetVehicleType => {
            json!({ "vehicleType": { "make": "Generic", "model": "Simulated" } })
        }
        _ => json!({ "source": function_id.as_str() }),
    }
}
