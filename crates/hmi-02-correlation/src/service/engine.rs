//! # Correlation Engine
//!
//! The single event-processing loop. Inbound messages, routed events, timer
//! expirations, submitted commands and cancellations all arrive on one inbox
//! and are processed strictly one at a time, in arrival order.
//!
//! Follow-up commands queued by callbacks run after the input that queued
//! them, before the next input is taken.

use crate::config::CorrelationConfig;
use crate::domain::{
    Command, CommandContext, CommandError, Dispatch, EventRouter, ExpiryNotifier,
    PendingCallRegistry, RouteOutcome,
};
use crate::ports::{CommandFactory, HmiTransport, TimerHandle, TimerService};
use hmi_01_interface_state::{CapabilityStore, InterfaceStateTable};
use shared_types::{CorrelationId, CorrelationIdGenerator, Event, FunctionId, HmiMessage};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// One unit of work for the engine loop.
pub enum EngineInput {
    /// A message received from the HMI.
    Inbound(HmiMessage),
    /// An event to route directly.
    Event(Event),
    /// A call's timeout elapsed.
    TimerExpired {
        correlation_id: CorrelationId,
        timer: TimerHandle,
    },
    /// A command to execute.
    Submit(Box<dyn Command>),
    /// Deregister a pending call without callbacks.
    Cancel(CorrelationId),
    /// Deregister every pending call of a function without callbacks.
    CancelFunction(FunctionId),
    /// Drop all pending calls and stop.
    Shutdown,
}

impl fmt::Debug for EngineInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbound(message) => f.debug_tuple("Inbound").field(message).finish(),
            Self::Event(event) => f.debug_tuple("Event").field(event).finish(),
            Self::TimerExpired {
                correlation_id,
                timer,
            } => f
                .debug_struct("TimerExpired")
                .field("correlation_id", correlation_id)
                .field("timer", timer)
                .finish(),
            Self::Submit(command) => f.debug_tuple("Submit").field(&command.function_id()).finish(),
            Self::Cancel(id) => f.debug_tuple("Cancel").field(id).finish(),
            Self::CancelFunction(function_id) => {
                f.debug_tuple("CancelFunction").field(function_id).finish()
            }
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("correlation engine stopped")]
    Stopped,
}

/// Cloneable ingress to a running engine.
#[derive(Clone)]
pub struct EngineHandle {
    inbox: mpsc::UnboundedSender<EngineInput>,
}

impl EngineHandle {
    pub fn send(&self, input: EngineInput) -> Result<(), EngineError> {
        self.inbox.send(input).map_err(|_| EngineError::Stopped)
    }

    /// Hand over a message received from the HMI.
    pub fn deliver(&self, message: HmiMessage) -> Result<(), EngineError> {
        self.send(EngineInput::Inbound(message))
    }

    pub fn dispatch(&self, event: Event) -> Result<(), EngineError> {
        self.send(EngineInput::Event(event))
    }

    pub fn submit(&self, command: Box<dyn Command>) -> Result<(), EngineError> {
        self.send(EngineInput::Submit(command))
    }

    pub fn cancel(&self, correlation_id: CorrelationId) -> Result<(), EngineError> {
        self.send(EngineInput::Cancel(correlation_id))
    }

    /// Cancel whatever calls of `function_id` are pending when this is
    /// processed, such as a handshake that picked its own correlation id.
    pub fn cancel_function(&self, function_id: FunctionId) -> Result<(), EngineError> {
        self.send(EngineInput::CancelFunction(function_id))
    }

    pub fn shutdown(&self) -> Result<(), EngineError> {
        self.send(EngineInput::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.inbox.is_closed()
    }
}

/// Collaborators the engine is assembled from.
pub struct EngineDependencies {
    pub states: Arc<InterfaceStateTable>,
    pub capabilities: Arc<dyn CapabilityStore>,
    pub transport: Arc<dyn HmiTransport>,
    pub timers: Arc<dyn TimerService>,
    pub factory: Arc<dyn CommandFactory>,
    pub correlation_ids: Arc<CorrelationIdGenerator>,
}

pub struct CorrelationEngine {
    config: CorrelationConfig,
    context: CommandContext,
    registry: Arc<PendingCallRegistry>,
    router: Arc<EventRouter>,
    factory: Arc<dyn CommandFactory>,
    inbox: mpsc::UnboundedReceiver<EngineInput>,
    handle: EngineHandle,
    stopped: bool,
}

impl CorrelationEngine {
    pub fn new(config: CorrelationConfig, deps: EngineDependencies) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = EngineHandle { inbox: tx };

        let expiry_sink = handle.clone();
        let on_expiry: ExpiryNotifier = Arc::new(move |correlation_id: CorrelationId, timer: TimerHandle| {
            if expiry_sink
                .send(EngineInput::TimerExpired {
                    correlation_id,
                    timer,
                })
                .is_err()
            {
                debug!(correlation_id = %correlation_id, "Timer fired after engine stopped");
            }
        });

        let registry = Arc::new(PendingCallRegistry::new(
            deps.timers,
            on_expiry,
            config.max_pending_calls,
        ));
        let router = Arc::new(EventRouter::new(registry.clone()));
        let context = CommandContext::new(
            deps.states,
            deps.capabilities,
            deps.transport,
            deps.correlation_ids,
        );

        Self {
            config,
            context,
            registry,
            router,
            factory: deps.factory,
            inbox: rx,
            handle,
            stopped: false,
        }
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    pub fn registry(&self) -> &Arc<PendingCallRegistry> {
        &self.registry
    }

    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Process inputs until shutdown.
    pub async fn run(&mut self) {
        info!(
            default_timeout_ms = self.config.default_timeout_ms,
            max_pending_calls = self.config.max_pending_calls,
            "Correlation engine started"
        );
        while let Some(input) = self.inbox.recv().await {
            if !self.process(input) {
                break;
            }
        }
    }

    /// Process every input already queued, without waiting.
    ///
    /// Returns the number of inputs processed.
    pub fn drain(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(input) = self.inbox.try_recv() {
            processed += 1;
            if !self.process(input) {
                break;
            }
        }
        processed
    }

    /// Process one input. Returns false once the engine has stopped.
    pub fn process(&mut self, input: EngineInput) -> bool {
        if self.stopped {
            debug!(input = ?input, "Input ignored, engine stopped");
            if let EngineInput::Submit(mut command) = input {
                command.cleanup();
            }
            return false;
        }

        match input {
            EngineInput::Inbound(message) => self.handle_inbound(message),
            EngineInput::Event(event) => {
                self.route(&event);
            }
            EngineInput::TimerExpired {
                correlation_id,
                timer,
            } => {
                self.registry
                    .expire_armed(correlation_id, timer, &self.context);
            }
            EngineInput::Submit(command) => self.execute(command),
            EngineInput::Cancel(correlation_id) => {
                if !self.registry.cancel(correlation_id) {
                    debug!(correlation_id = %correlation_id, "Cancel for call no longer pending");
                }
            }
            EngineInput::CancelFunction(function_id) => {
                let cancelled = self.registry.cancel_function(function_id);
                debug!(function_id = %function_id, cancelled = cancelled, "Cancelled calls by function");
            }
            EngineInput::Shutdown => {
                self.shutdown();
                return false;
            }
        }

        self.run_follow_ups();
        true
    }

    /// Execute a command immediately, then any follow-ups it queued.
    pub fn submit(&mut self, command: Box<dyn Command>) {
        self.process(EngineInput::Submit(command));
    }

    /// Route an event immediately and report what happened to it.
    pub fn dispatch_event(&mut self, event: Event) -> RouteOutcome {
        let outcome = self.route(&event);
        self.run_follow_ups();
        outcome
    }

    /// Drop every pending call without callbacks and stop processing.
    ///
    /// Returns the number of pending calls dropped.
    pub fn shutdown(&mut self) -> usize {
        if self.stopped {
            return 0;
        }
        self.stopped = true;

        for mut command in self.context.take_submitted() {
            command.cleanup();
        }
        let dropped = self.registry.shutdown();
        info!(dropped = dropped, "Correlation engine stopped");
        dropped
    }

    fn handle_inbound(&mut self, message: HmiMessage) {
        let function_id = message.function_id;
        let message_type = message.message_type;
        match self.factory.create(message) {
            Some(command) => self.execute(command),
            None => warn!(
                function_id = %function_id,
                message_type = ?message_type,
                "No command for inbound message, dropped"
            ),
        }
    }

    fn route(&self, event: &Event) -> RouteOutcome {
        let outcome = self.router.dispatch(event, &self.context);
        debug!(
            function_id = %event.function_id,
            correlation_id = ?event.correlation_id,
            outcome = ?outcome,
            "Event routed"
        );
        outcome
    }

    fn run_follow_ups(&mut self) {
        loop {
            let batch = self.context.take_submitted();
            if batch.is_empty() {
                break;
            }
            for command in batch {
                self.execute(command);
            }
        }
    }

    fn execute(&mut self, mut command: Box<dyn Command>) {
        let function_id = command.function_id();

        if !command.init(&self.context) {
            warn!(function_id = %function_id, "Command init failed, dropped");
            command.cleanup();
            return;
        }

        let dispatch = match command.run(&self.context) {
            Ok(dispatch) => dispatch,
            Err(e) => {
                error!(function_id = %function_id, error = %e, "Command failed to run");
                command.cleanup();
                return;
            }
        };

        match dispatch {
            Dispatch::AwaitReply(message) => self.await_reply(command, message),
            Dispatch::Send(message) => {
                self.send(message);
                command.cleanup();
            }
            Dispatch::Raise(event) => {
                self.route(&event);
                command.cleanup();
            }
            Dispatch::Complete => command.cleanup(),
        }
    }

    fn await_reply(&mut self, mut command: Box<dyn Command>, message: HmiMessage) {
        let function_id = message.function_id;
        let Some(correlation_id) = message.correlation_id else {
            let err = CommandError::MissingCorrelationId(function_id);
            error!(function_id = %function_id, error = %err, "Request dropped");
            command.cleanup();
            return;
        };

        let timeout = command
            .timeout()
            .unwrap_or_else(|| self.config.timeout_for(function_id));

        // Register before sending so a fast reply always finds its entry.
        if self
            .registry
            .register(correlation_id, function_id, command, timeout)
            .is_err()
        {
            return;
        }
        self.send(message);
    }

    fn send(&self, message: HmiMessage) {
        let function_id = message.function_id;
        let correlation_id = message.correlation_id;
        match self.context.transport().send(message) {
            Ok(()) => debug!(
                function_id = %function_id,
                correlation_id = ?correlation_id,
                "Sent HMI message"
            ),
            // A request that never left will be resolved by its timeout.
            Err(e) => warn!(
                function_id = %function_id,
                correlation_id = ?correlation_id,
                error = %e,
                "Failed to send HMI message"
            ),
        }
    }
}
