//! # Command Contract
//!
//! Every unit of work the engine executes implements [`Command`]. Outbound
//! requests return [`Dispatch::AwaitReply`] from `run` and are parked in the
//! pending-call registry until exactly one of `on_event` or `on_timeout`
//! fires. Inbound responses and notifications raise an event and complete.
//!
//! ```text
//!   init ──► run ──► AwaitReply ──► [registry] ──► on_event | on_timeout ──► cleanup
//!                └─► Send / Raise / Complete ─────────────────────────────► cleanup
//! ```

use crate::domain::errors::CommandError;
use crate::ports::HmiTransport;
use hmi_01_interface_state::{CapabilityStore, InterfaceStateTable};
use parking_lot::Mutex;
use shared_types::{CorrelationId, CorrelationIdGenerator, Event, FunctionId, HmiMessage};
use std::sync::Arc;
use std::time::Duration;

/// What the engine should do after a command's `run`.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Register the command under the message's correlation id, then send.
    AwaitReply(HmiMessage),
    /// Send and complete; no reply is expected.
    Send(HmiMessage),
    /// Route the event through the router and complete.
    Raise(Event),
    /// Nothing further to do.
    Complete,
}

/// A unit of work driven by the correlation engine.
///
/// Only `function_id` and `run` are required. A command that awaits a reply
/// stays alive in the registry as the continuation of its call.
pub trait Command: Send {
    /// RPC this command belongs to.
    fn function_id(&self) -> FunctionId;

    /// Prepare the command. Returning false drops it without running.
    fn init(&mut self, _ctx: &CommandContext) -> bool {
        true
    }

    fn run(&mut self, ctx: &CommandContext) -> Result<Dispatch, CommandError>;

    /// The correlated reply arrived.
    fn on_event(&mut self, _event: &Event, _ctx: &CommandContext) {}

    /// No reply arrived in time.
    fn on_timeout(&mut self, _ctx: &CommandContext) {}

    /// Release resources. Called once, after the command is finished.
    fn cleanup(&mut self) {}

    /// Timeout for the awaited reply. `None` uses the configured timeout
    /// for the function.
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

/// Session-scoped collaborators handed to every command callback.
///
/// Commands never call back into the engine directly; follow-up commands are
/// queued with [`CommandContext::submit`] and executed once the current input
/// has been fully processed.
pub struct CommandContext {
    states: Arc<InterfaceStateTable>,
    capabilities: Arc<dyn CapabilityStore>,
    transport: Arc<dyn HmiTransport>,
    correlation_ids: Arc<CorrelationIdGenerator>,
    outbox: Mutex<Vec<Box<dyn Command>>>,
}

impl CommandContext {
    pub fn new(
        states: Arc<InterfaceStateTable>,
        capabilities: Arc<dyn CapabilityStore>,
        transport: Arc<dyn HmiTransport>,
        correlation_ids: Arc<CorrelationIdGenerator>,
    ) -> Self {
        Self {
            states,
            capabilities,
            transport,
            correlation_ids,
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn states(&self) -> &InterfaceStateTable {
        &self.states
    }

    pub fn capabilities(&self) -> &dyn CapabilityStore {
        self.capabilities.as_ref()
    }

    pub fn transport(&self) -> &dyn HmiTransport {
        self.transport.as_ref()
    }

    /// Allocate a correlation id for a new outbound request.
    pub fn next_correlation_id(&self) -> CorrelationId {
        self.correlation_ids.next_id()
    }

    /// Queue a follow-up command.
    pub fn submit(&self, command: Box<dyn Command>) {
        self.outbox.lock().push(command);
    }

    /// Take every queued follow-up, oldest first.
    pub fn take_submitted(&self) -> Vec<Box<dyn Command>> {
        std::mem::take(&mut *self.outbox.lock())
    }

    /// Number of queued follow-ups.
    pub fn submitted_count(&self) -> usize {
        self.outbox.lock().len()
    }
}
