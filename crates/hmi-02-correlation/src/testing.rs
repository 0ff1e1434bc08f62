//! Test support: probe commands that record their callbacks, and fixtures
//! that assemble a context or a whole engine over in-memory collaborators.

use crate::adapters::{ManualTimer, RecordingTransport};
use crate::config::CorrelationConfig;
use crate::domain::{Command, CommandContext, CommandError, Dispatch};
use crate::ports::CommandFactory;
use crate::service::{CorrelationEngine, EngineDependencies, EngineInput};
use hmi_01_interface_state::{InterfaceStateTable, RecordingCapabilityStore};
use parking_lot::Mutex;
use shared_types::{CorrelationId, CorrelationIdGenerator, Event, FunctionId, HmiMessage, MessageType};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Terminal callback a probe received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Event,
    Timeout,
}

#[derive(Default)]
struct LogState {
    next_instance: usize,
    outcomes: Vec<(usize, CorrelationId, Outcome)>,
    cleanups: Vec<usize>,
}

/// Shared record of what every [`ProbeCommand`] observed.
///
/// Each probe gets its own instance number, so two probes that reuse a
/// correlation id are still told apart.
#[derive(Clone, Default)]
pub struct CallLog {
    state: Arc<Mutex<LogState>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_instance(&self) -> usize {
        let mut state = self.state.lock();
        state.next_instance += 1;
        state.next_instance
    }

    fn record(&self, instance: usize, id: CorrelationId, outcome: Outcome) {
        self.state.lock().outcomes.push((instance, id, outcome));
    }

    fn record_cleanup(&self, instance: usize) {
        self.state.lock().cleanups.push(instance);
    }

    /// Terminal callbacks for `id`, in the order they fired.
    pub fn outcomes(&self, id: CorrelationId) -> Vec<Outcome> {
        self.state
            .lock()
            .outcomes
            .iter()
            .filter(|(_, call, _)| *call == id)
            .map(|(_, _, outcome)| *outcome)
            .collect()
    }

    /// Every terminal callback, in the order they fired.
    pub fn all(&self) -> Vec<(CorrelationId, Outcome)> {
        self.state
            .lock()
            .outcomes
            .iter()
            .map(|(_, id, outcome)| (*id, *outcome))
            .collect()
    }

    pub fn cleanups(&self) -> usize {
        self.state.lock().cleanups.len()
    }

    /// Terminal callback count per probe instance.
    pub fn terminal_by_instance(&self) -> HashMap<usize, usize> {
        let mut counts = HashMap::new();
        for (instance, _, _) in &self.state.lock().outcomes {
            *counts.entry(*instance).or_insert(0) += 1;
        }
        counts
    }

    /// Cleanup count per probe instance.
    pub fn cleanups_by_instance(&self) -> HashMap<usize, usize> {
        let mut counts = HashMap::new();
        for instance in &self.state.lock().cleanups {
            *counts.entry(*instance).or_insert(0) += 1;
        }
        counts
    }
}

/// Request command that awaits a reply and records what happens to it.
pub struct ProbeCommand {
    instance: usize,
    correlation_id: CorrelationId,
    function_id: FunctionId,
    timeout: Option<Duration>,
    log: CallLog,
}

impl ProbeCommand {
    pub fn new(correlation_id: CorrelationId, function_id: FunctionId, log: &CallLog) -> Self {
        Self {
            instance: log.next_instance(),
            correlation_id,
            function_id,
            timeout: None,
            log: log.clone(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Command for ProbeCommand {
    fn function_id(&self) -> FunctionId {
        self.function_id
    }

    fn run(&mut self, _ctx: &CommandContext) -> Result<Dispatch, CommandError> {
        Ok(Dispatch::AwaitReply(HmiMessage::request(
            self.function_id,
            self.correlation_id,
        )))
    }

    fn on_event(&mut self, _event: &Event, _ctx: &CommandContext) {
        self.log
            .record(self.instance, self.correlation_id, Outcome::Event);
    }

    fn on_timeout(&mut self, _ctx: &CommandContext) {
        self.log
            .record(self.instance, self.correlation_id, Outcome::Timeout);
    }

    fn cleanup(&mut self) {
        self.log.record_cleanup(self.instance);
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Raises every inbound response or notification as an event.
pub struct PassthroughFactory;

struct RaiseCommand(HmiMessage);

impl Command for RaiseCommand {
    fn function_id(&self) -> FunctionId {
        self.0.function_id
    }

    fn run(&mut self, _ctx: &CommandContext) -> Result<Dispatch, CommandError> {
        Ok(Dispatch::Raise(Event::from(self.0.clone())))
    }
}

impl CommandFactory for PassthroughFactory {
    fn create(&self, message: HmiMessage) -> Option<Box<dyn Command>> {
        match message.message_type {
            MessageType::Request => None,
            _ => Some(Box::new(RaiseCommand(message))),
        }
    }
}

/// A [`CommandContext`] over in-memory collaborators.
pub struct ContextFixture {
    pub states: Arc<InterfaceStateTable>,
    pub capabilities: Arc<RecordingCapabilityStore>,
    pub transport: Arc<RecordingTransport>,
    pub context: CommandContext,
}

impl ContextFixture {
    pub fn new() -> Self {
        let states = Arc::new(InterfaceStateTable::new());
        let capabilities = Arc::new(RecordingCapabilityStore::new());
        let transport = Arc::new(RecordingTransport::new());
        let context = CommandContext::new(
            states.clone(),
            capabilities.clone(),
            transport.clone(),
            Arc::new(CorrelationIdGenerator::new()),
        );
        Self {
            states,
            capabilities,
            transport,
            context,
        }
    }
}

impl Default for ContextFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`CorrelationEngine`] driven by virtual time.
pub struct EngineFixture {
    pub engine: CorrelationEngine,
    pub timer: Arc<ManualTimer>,
    pub states: Arc<InterfaceStateTable>,
    pub capabilities: Arc<RecordingCapabilityStore>,
    pub transport: Arc<RecordingTransport>,
}

impl EngineFixture {
    pub fn new() -> Self {
        Self::with_config(CorrelationConfig::for_testing())
    }

    pub fn with_config(config: CorrelationConfig) -> Self {
        Self::with_factory(config, Arc::new(PassthroughFactory))
    }

    pub fn with_factory(config: CorrelationConfig, factory: Arc<dyn CommandFactory>) -> Self {
        let timer = Arc::new(ManualTimer::new());
        let states = Arc::new(InterfaceStateTable::new());
        let capabilities = Arc::new(RecordingCapabilityStore::new());
        let transport = Arc::new(RecordingTransport::new());

        let engine = CorrelationEngine::new(
            config,
            EngineDependencies {
                states: states.clone(),
                capabilities: capabilities.clone(),
                transport: transport.clone(),
                timers: timer.clone(),
                factory,
                correlation_ids: Arc::new(CorrelationIdGenerator::new()),
            },
        );

        Self {
            engine,
            timer,
            states,
            capabilities,
            transport,
        }
    }

    /// Advance virtual time, processing each expiry at the moment it fires.
    pub fn advance(&mut self, by: Duration) {
        let engine = &mut self.engine;
        self.timer.advance_with(by, || {
            engine.drain();
        });
        engine.drain();
    }

    /// Feed an inbound message and process it.
    pub fn deliver(&mut self, message: HmiMessage) {
        self.engine.process(EngineInput::Inbound(message));
    }
}

impl Default for EngineFixture {
    fn default() -> Self {
        Self::new()
    }
}
