//! # Event Router
//!
//! Correlated events go to the pending call that issued them; broadcasts go
//! to every listener registered for the event's function.

use crate::domain::command::CommandContext;
use crate::domain::registry::{MatchResult, PendingCallRegistry};
use parking_lot::RwLock;
use shared_types::{Event, FunctionId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Receives broadcast events for the functions it was registered under.
pub trait EventListener: Send + Sync {
    fn on_broadcast(&self, event: &Event, ctx: &CommandContext);
}

/// Handle returned by [`EventRouter::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Correlated event claimed its pending call.
    Resolved,
    /// Correlated event with no live call.
    Unmatched,
    /// Broadcast delivered to this many listeners.
    Broadcast(usize),
    /// Broadcast with no listener.
    Dropped,
}

type ListenerList = Vec<(ListenerId, Arc<dyn EventListener>)>;

pub struct EventRouter {
    registry: Arc<PendingCallRegistry>,
    listeners: RwLock<HashMap<FunctionId, ListenerList>>,
    next_listener: AtomicU64,
}

impl EventRouter {
    pub fn new(registry: Arc<PendingCallRegistry>) -> Self {
        Self {
            registry,
            listeners: RwLock::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Deliver one event.
    pub fn dispatch(&self, event: &Event, ctx: &CommandContext) -> RouteOutcome {
        if let Some(correlation_id) = event.correlation_id {
            return match self.registry.resolve(correlation_id, event, ctx) {
                MatchResult::Matched => RouteOutcome::Resolved,
                MatchResult::Unmatched => RouteOutcome::Unmatched,
            };
        }

        // Snapshot so listeners may add or remove listeners while handling.
        let targets: Vec<Arc<dyn EventListener>> = self
            .listeners
            .read()
            .get(&event.function_id)
            .map(|list| list.iter().map(|(_, listener)| listener.clone()).collect())
            .unwrap_or_default();

        if targets.is_empty() {
            trace!(function_id = %event.function_id, "Broadcast with no listeners dropped");
            return RouteOutcome::Dropped;
        }

        for listener in &targets {
            listener.on_broadcast(event, ctx);
        }
        debug!(
            function_id = %event.function_id,
            listeners = targets.len(),
            "Broadcast delivered"
        );
        RouteOutcome::Broadcast(targets.len())
    }

    /// Register `listener` for broadcasts of `function_id`.
    pub fn add_listener(&self, function_id: FunctionId, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .entry(function_id)
            .or_default()
            .push((id, listener));
        debug!(function_id = %function_id, listener = %id, "Listener added");
        id
    }

    /// Returns false if the listener was not registered.
    pub fn remove_listener(&self, function_id: FunctionId, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let Some(list) = listeners.get_mut(&function_id) else {
            return false;
        };

        let before = list.len();
        list.retain(|(listener_id, _)| *listener_id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            listeners.remove(&function_id);
        }
        removed
    }

    pub fn listener_count(&self, function_id: FunctionId) -> usize {
        self.listeners
            .read()
            .get(&function_id)
            .map_or(0, |list| list.len())
    }

    pub fn registry(&self) -> &Arc<PendingCallRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ManualTimer;
    use crate::domain::registry::ExpiryNotifier;
    use crate::ports::TimerHandle;
    use crate::testing::{CallLog, ContextFixture, Outcome, ProbeCommand};
    use parking_lot::Mutex;
    use serde_json::json;
    use shared_types::CorrelationId;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Event>>,
    }

    impl EventListener for Recorder {
        fn on_broadcast(&self, event: &Event, _ctx: &CommandContext) {
            self.seen.lock().push(event.clone());
        }
    }

    fn router() -> EventRouter {
        let notifier: ExpiryNotifier = Arc::new(|_: CorrelationId, _: TimerHandle| {});
        let registry = PendingCallRegistry::new(Arc::new(ManualTimer::new()), notifier, 16);
        EventRouter::new(Arc::new(registry))
    }

    #[test]
    fn test_correlated_event_resolves() {
        let router = router();
        let ctx = ContextFixture::new();
        let log = CallLog::new();
        let id = CorrelationId::new(42);
        router
            .registry()
            .register(
                id,
                FunctionId::RcIsReady,
                Box::new(ProbeCommand::new(id, FunctionId::RcIsReady, &log)),
                Duration::from_secs(5),
            )
            .unwrap();

        let reply = Event::reply(FunctionId::RcIsReady, id, json!({ "available": true }));
        assert_eq!(router.dispatch(&reply, &ctx.context), RouteOutcome::Resolved);
        assert_eq!(router.dispatch(&reply, &ctx.context), RouteOutcome::Unmatched);
        assert_eq!(log.outcomes(id), vec![Outcome::Event]);
    }

    #[test]
    fn test_correlated_event_never_reaches_listeners() {
        let router = router();
        let ctx = ContextFixture::new();
        let recorder = Arc::new(Recorder::default());
        router.add_listener(FunctionId::RcIsReady, recorder.clone());

        let reply = Event::reply(FunctionId::RcIsReady, CorrelationId::new(1), json!({}));
        assert_eq!(router.dispatch(&reply, &ctx.context), RouteOutcome::Unmatched);
        assert!(recorder.seen.lock().is_empty());
    }

    #[test]
    fn test_broadcast_reaches_all_listeners_in_order() {
        let router = router();
        let ctx = ContextFixture::new();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        router.add_listener(FunctionId::RcOnInteriorVehicleData, first.clone());
        router.add_listener(FunctionId::RcOnInteriorVehicleData, second.clone());

        let a = Event::broadcast(FunctionId::RcOnInteriorVehicleData, json!({ "seq": 1 }));
        let b = Event::broadcast(FunctionId::RcOnInteriorVehicleData, json!({ "seq": 2 }));
        assert_eq!(router.dispatch(&a, &ctx.context), RouteOutcome::Broadcast(2));
        assert_eq!(router.dispatch(&b, &ctx.context), RouteOutcome::Broadcast(2));

        assert_eq!(*first.seen.lock(), vec![a.clone(), b.clone()]);
        assert_eq!(*second.seen.lock(), vec![a, b]);
    }

    #[test]
    fn test_broadcast_without_listener_dropped() {
        let router = router();
        let ctx = ContextFixture::new();
        let recorder = Arc::new(Recorder::default());
        router.add_listener(FunctionId::BasicCommunicationOnReady, recorder.clone());

        let event = Event::broadcast(FunctionId::RcOnRemoteControlSettings, json!({}));
        assert_eq!(router.dispatch(&event, &ctx.context), RouteOutcome::Dropped);
        assert!(recorder.seen.lock().is_empty());
    }

    #[test]
    fn test_remove_listener() {
        let router = router();
        let recorder = Arc::new(Recorder::default());
        let id = router.add_listener(FunctionId::BasicCommunicationOnReady, recorder);
        assert_eq!(router.listener_count(FunctionId::BasicCommunicationOnReady), 1);

        assert!(router.remove_listener(FunctionId::BasicCommunicationOnReady, id));
        assert!(!router.remove_listener(FunctionId::BasicCommunicationOnReady, id));
        assert_eq!(router.listener_count(FunctionId::BasicCommunicationOnReady), 0);
    }
}
