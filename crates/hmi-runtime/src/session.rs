//! # HMI Session
//!
//! Owns every session-scoped object. Nothing here is global: two sessions in
//! one process share no state.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Create the bus, interface state table and capability store
//! 3. Create the correlation engine over a tokio timer service
//! 4. Register the OnReady listener
//! 5. Spawn the engine loop and the inbound pump

use crate::config::RuntimeConfig;
use crate::listener::OnReadyListener;
use crate::simulator::HmiSimulator;
use anyhow::{Context, Result};
use hmi_01_interface_state::{HmiCapabilities, InterfaceStateTable};
use hmi_02_correlation::adapters::{transport_channel, TokioTimerService};
use hmi_02_correlation::{
    CorrelationEngine, EngineDependencies, EngineHandle, EventRouter, HmiReceiver, HmiTransport,
    InboundPump, PendingCallRegistry, PendingStatsSnapshot,
};
use hmi_03_readiness::{DefaultCommandFactory, ReadinessHandshake};
use shared_bus::InMemoryEventBus;
use shared_types::{CorrelationIdGenerator, FunctionId};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct HmiSession {
    config: RuntimeConfig,
    bus: Arc<InMemoryEventBus>,
    states: Arc<InterfaceStateTable>,
    capabilities: Arc<HmiCapabilities>,
    registry: Arc<PendingCallRegistry>,
    router: Arc<EventRouter>,
    on_ready: Arc<OnReadyListener>,
    timers: Arc<TokioTimerService>,
    engine: EngineHandle,
    engine_task: JoinHandle<()>,
    pump_task: JoinHandle<u64>,
}

impl HmiSession {
    /// Start a session that sends through `transport` and receives from
    /// `receiver`. Must be called from within a tokio runtime.
    pub fn start(
        config: RuntimeConfig,
        transport: Arc<dyn HmiTransport>,
        receiver: Arc<dyn HmiReceiver>,
    ) -> Result<Self> {
        config
            .validate()
            .context("Invalid runtime configuration")?;
        let runtime = Handle::try_current().context("HMI session requires a tokio runtime")?;

        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));
        let states = Arc::new(InterfaceStateTable::with_publisher(bus.clone()));
        let capabilities = Arc::new(HmiCapabilities::with_publisher(bus.clone()));
        let timers = Arc::new(TokioTimerService::with_handle(runtime.clone()));

        let mut engine = CorrelationEngine::new(
            config.correlation.clone(),
            EngineDependencies {
                states: states.clone(),
                capabilities: capabilities.clone(),
                transport,
                timers: timers.clone(),
                factory: Arc::new(DefaultCommandFactory::new()),
                correlation_ids: Arc::new(CorrelationIdGenerator::new()),
            },
        );
        let handle = engine.handle();
        let registry = engine.registry().clone();
        let router = engine.router().clone();

        let on_ready = Arc::new(OnReadyListener::new(config.handshake_interfaces.clone()));
        router.add_listener(FunctionId::BasicCommunicationOnReady, on_ready.clone());

        let engine_task = runtime.spawn(async move { engine.run().await });
        let pump_task = runtime.spawn(InboundPump::new(receiver, handle.clone()).run());

        info!(
            interfaces = config.handshake_interfaces.len(),
            default_timeout_ms = config.correlation.default_timeout_ms,
            "HMI session started"
        );

        Ok(Self {
            config,
            bus,
            states,
            capabilities,
            registry,
            router,
            on_ready,
            timers,
            engine: handle,
            engine_task,
            pump_task,
        })
    }

    /// Probe every configured interface now, without waiting for OnReady.
    pub fn start_handshakes(&self) -> Result<usize> {
        for interface in &self.config.handshake_interfaces {
            let handshake = ReadinessHandshake::new(*interface)
                .with_context(|| format!("Cannot handshake {interface}"))?;
            self.engine
                .submit(Box::new(handshake))
                .context("Correlation engine is not running")?;
        }
        Ok(self.config.handshake_interfaces.len())
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn handle(&self) -> EngineHandle {
        self.engine.clone()
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    pub fn states(&self) -> &Arc<InterfaceStateTable> {
        &self.states
    }

    pub fn capabilities(&self) -> &Arc<HmiCapabilities> {
        &self.capabilities
    }

    pub fn registry(&self) -> &Arc<PendingCallRegistry> {
        &self.registry
    }

    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    /// Number of OnReady announcements handled so far.
    pub fn ready_rounds(&self) -> u64 {
        self.on_ready.rounds()
    }

    /// Stop the engine, dropping pending calls without callbacks.
    pub async fn shutdown(self) -> Result<PendingStatsSnapshot> {
        info!("Shutting down HMI session");

        if self.engine.shutdown().is_err() {
            warn!("Correlation engine already stopped");
        }
        self.engine_task
            .await
            .context("Correlation engine task failed")?;

        self.pump_task.abort();
        self.timers.cancel_all();

        let stats = self.registry.stats().snapshot();
        info!(
            registered = stats.registered,
            matched = stats.matched,
            timeouts = stats.timeouts,
            dropped = stats.dropped,
            "HMI session stopped"
        );
        Ok(stats)
    }
}

/// Start a session wired to an in-process [`HmiSimulator`].
///
/// The simulator announces OnReady as soon as it runs.
pub fn simulated_session(
    config: RuntimeConfig,
    simulator: HmiSimulator,
) -> Result<(HmiSession, JoinHandle<u64>)> {
    let (to_hmi, hmi_requests) = transport_channel();
    let (hmi_responses, from_hmi) = transport_channel();

    let session = HmiSession::start(config, Arc::new(to_hmi), Arc::new(from_hmi))
        .context("Failed to start simulated session")?;
    let simulator_task = tokio::spawn(simulator.run(Arc::new(hmi_requests), Arc::new(hmi_responses)));
    Ok((session, simulator_task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::SimulatedReply;
    use hmi_01_interface_state::CapabilityStore;
    use shared_bus::{EventFilter, EventTopic, HmiBusEvent};
    use shared_types::{HmiInterface, InterfaceState};
    use std::time::Duration;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_interfaces_available() {
        let (session, simulator) =
            simulated_session(RuntimeConfig::for_testing(), HmiSimulator::new()).unwrap();
        settle().await;

        assert_eq!(session.ready_rounds(), 1);
        for interface in HmiInterface::with_readiness_handshake() {
            assert_eq!(session.states().get_state(interface), InterfaceState::Available);
            assert!(session.capabilities().is_cooperating(interface));
        }
        assert!(session
            .capabilities()
            .capabilities(FunctionId::UiGetLanguage)
            .is_some());
        assert_eq!(session.registry().pending_count(), 0);

        let stats = session.shutdown().await.unwrap();
        assert_eq!(stats.timeouts, 0);
        assert_eq!(stats.registered, stats.matched);
        simulator.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_replies() {
        let simulator = HmiSimulator::new()
            .with_reply(HmiInterface::Vr, SimulatedReply::Available(false))
            .with_reply(HmiInterface::Tts, SimulatedReply::Absent)
            .with_reply(HmiInterface::Rc, SimulatedReply::Silent);
        let seen = simulator.requests_seen();
        let (session, simulator) =
            simulated_session(RuntimeConfig::for_testing(), simulator).unwrap();

        settle().await;
        assert_eq!(session.states().get_state(HmiInterface::Vr), InterfaceState::NotAvailable);
        assert!(!session.capabilities().is_supported(HmiInterface::Vr));
        assert_eq!(session.states().get_state(HmiInterface::Tts), InterfaceState::NotResponded);
        assert!(session.capabilities().capabilities(FunctionId::TtsGetLanguage).is_some());
        assert!(!seen.lock().contains(&FunctionId::VrGetLanguage));

        // RC never answers: after the 1s test timeout its capabilities are
        // requested anyway, and that request times out too.
        assert!(!seen.lock().contains(&FunctionId::RcGetCapabilities));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(seen.lock().contains(&FunctionId::RcGetCapabilities));
        assert_eq!(session.states().get_state(HmiInterface::Rc), InterfaceState::NotResponded);

        let stats = session.shutdown().await.unwrap();
        assert_eq!(stats.timeouts, 2);
        simulator.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_changes_published() {
        let simulator = HmiSimulator::new().with_reply(HmiInterface::Rc, SimulatedReply::Silent);
        let (session, simulator) = simulated_session(
            RuntimeConfig {
                handshake_interfaces: vec![HmiInterface::Ui, HmiInterface::Rc],
                ..RuntimeConfig::for_testing()
            },
            simulator,
        )
        .unwrap();
        let mut states = session
            .bus()
            .subscribe(EventFilter::topics(vec![EventTopic::InterfaceState]));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(
            states.drain(),
            vec![HmiBusEvent::InterfaceStateChanged {
                interface: HmiInterface::Ui,
                old_state: InterfaceState::NotResponded,
                new_state: InterfaceState::Available,
            }]
        );

        session.shutdown().await.unwrap();
        simulator.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_pending_calls() {
        let simulator = HmiSimulator::new().with_reply(HmiInterface::Navigation, SimulatedReply::Silent);
        let (session, simulator) = simulated_session(
            RuntimeConfig {
                handshake_interfaces: vec![HmiInterface::Navigation],
                ..RuntimeConfig::for_testing()
            },
            simulator,
        )
        .unwrap();
        settle().await;
        assert_eq!(session.registry().pending_count(), 1);

        let stats = session.shutdown().await.unwrap();
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.timeouts, 0);
        simulator.abort();
    }

    #[tokio::test]
    async fn test_start_handshakes_directly() {
        let (to_hmi, hmi_requests) = transport_channel();
        let (_hmi_responses, from_hmi) = transport_channel();
        let session = HmiSession::start(
            RuntimeConfig {
                handshake_interfaces: vec![HmiInterface::Ui, HmiInterface::Vr],
                ..RuntimeConfig::for_testing()
            },
            Arc::new(to_hmi),
            Arc::new(from_hmi),
        )
        .unwrap();

        assert_eq!(session.start_handshakes().unwrap(), 2);
        assert_eq!(hmi_requests.receive().await.unwrap().function_id, FunctionId::UiIsReady);
        assert_eq!(hmi_requests.receive().await.unwrap().function_id, FunctionId::VrIsReady);

        let stats = session.shutdown().await.unwrap();
        assert_eq!(stats.dropped, 2);
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let (to_hmi, _) = transport_channel();
        let (_, from_hmi) = transport_channel();
        let err = HmiSession::start(RuntimeConfig::for_testing(), Arc::new(to_hmi), Arc::new(from_hmi))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "HMI session requires a tokio runtime");
    }
}
