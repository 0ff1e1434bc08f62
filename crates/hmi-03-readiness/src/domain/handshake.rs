//! # Readiness Handshake
//!
//! One instance per outbound `*.IsReady` call. The reply, or its absence,
//! decides three things for the target interface:
//!
//! | Reply `available` | Interface state | cooperating | supported | capability fetch |
//! |-------------------|-----------------|-------------|-----------|------------------|
//! | `true`            | `AVAILABLE`     | `true`      | untouched | sent             |
//! | `false`           | `NOT_AVAILABLE` | `false`     | `false`   | suppressed       |
//! | absent/malformed  | untouched       | `false`     | `false`   | sent             |
//! | (timeout)         | untouched       | untouched   | untouched | sent             |

use crate::domain::capability_fetch::CapabilityFetchRequest;
use crate::domain::errors::HandshakeError;
use crate::domain::reply::ReadinessReply;
use hmi_02_correlation::{Command, CommandContext, CommandError, Dispatch};
use shared_types::{CorrelationId, Event, FunctionId, HmiInterface, HmiMessage, InterfaceState};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePhase {
    Idle,
    AwaitingReply,
    Replied,
    TimedOut,
}

impl HandshakePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, HandshakePhase::Replied | HandshakePhase::TimedOut)
    }
}

pub struct ReadinessHandshake {
    interface: HmiInterface,
    function_id: FunctionId,
    correlation_id: Option<CorrelationId>,
    timeout: Option<Duration>,
    phase: HandshakePhase,
}

impl ReadinessHandshake {
    pub fn new(interface: HmiInterface) -> Result<Self, HandshakeError> {
        let function_id = interface
            .is_ready_function()
            .ok_or(HandshakeError::NoReadinessProbe(interface))?;
        Ok(Self {
            interface,
            function_id,
            correlation_id: None,
            timeout: None,
            phase: HandshakePhase::Idle,
        })
    }

    /// Send under a fixed correlation id instead of allocating one.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn interface(&self) -> HmiInterface {
        self.interface
    }

    pub fn phase(&self) -> HandshakePhase {
        self.phase
    }

    fn request_capabilities(&self, ctx: &CommandContext) {
        let requests = self.interface.capability_requests();
        for function_id in requests {
            ctx.submit(Box::new(CapabilityFetchRequest::new(*function_id)));
        }
        debug!(
            interface = %self.interface,
            requests = requests.len(),
            "Capability requests queued"
        );
    }
}

impl Command for ReadinessHandshake {
    fn function_id(&self) -> FunctionId {
        self.function_id
    }

    fn init(&mut self, _ctx: &CommandContext) -> bool {
        self.phase == HandshakePhase::Idle
    }

    fn run(&mut self, ctx: &CommandContext) -> Result<Dispatch, CommandError> {
        let correlation_id = *self
            .correlation_id
            .get_or_insert_with(|| ctx.next_correlation_id());
        self.phase = HandshakePhase::AwaitingReply;

        debug!(
            interface = %self.interface,
            correlation_id = %correlation_id,
            "Probing interface readiness"
        );
        Ok(Dispatch::AwaitReply(HmiMessage::request(
            self.function_id,
            correlation_id,
        )))
    }

    fn on_event(&mut self, event: &Event, ctx: &CommandContext) {
        self.phase = HandshakePhase::Replied;

        let available = if event.is_success() {
            match ReadinessReply::from_event(event) {
                Ok(reply) => reply.available,
                Err(e) => {
                    warn!(interface = %self.interface, error = %e, "Readiness reply ignored");
                    None
                }
            }
        } else {
            warn!(
                interface = %self.interface,
                result_code = ?event.result_code,
                "Readiness probe answered with an error"
            );
            None
        };

        let cooperating = available.unwrap_or(false);
        let capabilities = ctx.capabilities();
        capabilities.set_cooperating(self.interface, cooperating);
        if !cooperating {
            capabilities.set_supported(self.interface, false);
        }

        if let Some(available) = available {
            ctx.states()
                .set_state(self.interface, InterfaceState::from_available(available));
        }

        info!(
            interface = %self.interface,
            available = ?available,
            state = %ctx.states().get_state(self.interface),
            "Readiness reply handled"
        );

        if available == Some(false) {
            debug!(interface = %self.interface, "Interface not available, capabilities not requested");
            return;
        }
        self.request_capabilities(ctx);
    }

    fn on_timeout(&mut self, ctx: &CommandContext) {
        self.phase = HandshakePhase::TimedOut;
        warn!(
            interface = %self.interface,
            state = %ctx.states().get_state(self.interface),
            "Readiness probe timed out, requesting capabilities anyway"
        );
        self.request_capabilities(ctx);
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
