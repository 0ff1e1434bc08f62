//! An engine wired like a session, but driven by virtual time.

use hmi_01_interface_state::{HmiCapabilities, InterfaceStateTable};
use hmi_02_correlation::adapters::{ManualTimer, RecordingTransport};
use hmi_02_correlation::{
    CorrelationConfig, CorrelationEngine, EngineDependencies, EngineInput, RouteOutcome,
};
use hmi_03_readiness::{DefaultCommandFactory, ReadinessHandshake};
use hmi_runtime::OnReadyListener;
use serde_json::{json, Value};
use shared_bus::{EventFilter, EventTopic, HmiBusEvent, InMemoryEventBus, Subscription};
use shared_types::{
    CorrelationId, CorrelationIdGenerator, Event, FunctionId, HmiInterface, HmiMessage, InterfaceState,
};
use std::sync::Arc;
use std::time::Duration;

pub struct Harness {
    pub engine: CorrelationEngine,
    pub bus: Arc<InMemoryEventBus>,
    pub states: Arc<InterfaceStateTable>,
    pub capabilities: Arc<HmiCapabilities>,
    pub transport: Arc<RecordingTransport>,
    pub timer: Arc<ManualTimer>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(CorrelationConfig::for_testing())
    }

    pub fn with_config(config: CorrelationConfig) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let states = Arc::new(InterfaceStateTable::with_publisher(bus.clone()));
        let capabilities = Arc::new(HmiCapabilities::with_publisher(bus.clone()));
        let transport = Arc::new(RecordingTransport::new());
        let timer = Arc::new(ManualTimer::new());

        let engine = CorrelationEngine::new(
            config,
            EngineDependencies {
                states: states.clone(),
                capabilities: capabilities.clone(),
                transport: transport.clone(),
                timers: timer.clone(),
                factory: Arc::new(DefaultCommandFactory::new()),
                correlation_ids: Arc::new(CorrelationIdGenerator::starting_at(1_000)),
            },
        );

        Self {
            engine,
            bus,
            states,
            capabilities,
            transport,
            timer,
        }
    }

    /// Register the OnReady listener a session would register.
    pub fn with_on_ready(self, interfaces: Vec<HmiInterface>) -> Self {
        self.engine.router().add_listener(
            FunctionId::BasicCommunicationOnReady,
            Arc::new(OnReadyListener::new(interfaces)),
        );
        self
    }

    pub fn state_changes(&self) -> Subscription {
        self.bus
            .subscribe(EventFilter::topics(vec![EventTopic::InterfaceState]))
    }

    /// Start a handshake under a fixed correlation id.
    pub fn probe(&mut self, interface: HmiInterface, id: u32, timeout: Duration) {
        let handshake = ReadinessHandshake::new(interface)
            .expect("interface has a readiness probe")
            .with_correlation_id(CorrelationId::new(id))
            .with_timeout(timeout);
        self.engine.submit(Box::new(handshake));
    }

    /// Deliver a successful reply from the HMI.
    pub fn reply(&mut self, function_id: FunctionId, id: u32, params: Value) {
        self.engine.process(EngineInput::Inbound(HmiMessage::response(
            function_id,
            CorrelationId::new(id),
            params,
        )));
    }

    /// Answer the most recent request for `function_id`.
    pub fn answer_last(&mut self, function_id: FunctionId, params: Value) -> bool {
        let Some(request) = self.transport.last_for(function_id) else {
            return false;
        };
        let Some(id) = request.correlation_id else {
            return false;
        };
        self.reply(function_id, id.as_u32(), params);
        true
    }

    pub fn announce_ready(&mut self) -> RouteOutcome {
        self.engine.dispatch_event(Event::broadcast(
            FunctionId::BasicCommunicationOnReady,
            json!({}),
        ))
    }

    /// Advance virtual time, processing each expiry at the moment it fires.
    pub fn advance(&mut self, by: Duration) {
        let engine = &mut self.engine;
        self.timer.advance_with(by, || {
            engine.drain();
        });
        engine.drain();
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// `(interface, new_state)` of every state change in `events`, in order.
pub fn transitions(events: &[HmiBusEvent]) -> Vec<(HmiInterface, InterfaceState)> {
    events
        .iter()
        .filter_map(|event| match event {
            HmiBusEvent::InterfaceStateChanged {
                interface,
                new_state,
                ..
            } => Some((*interface, *new_state)),
            _ => None,
        })
        .collect()
}
