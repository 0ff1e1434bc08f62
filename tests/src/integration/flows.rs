//! # Readiness Flows
//!
//! The engine, router, registry, handshake and state table working together
//! with state changes observed on the bus.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{transitions, Harness};
    use hmi_01_interface_state::CapabilityStore;
    use hmi_02_correlation::RouteOutcome;
    use serde_json::json;
    use shared_types::{CorrelationId, FunctionId, HmiInterface, InterfaceState};
    use std::time::Duration;

    const FIVE_SECONDS: Duration = Duration::from_secs(5);

    // =========================================================================
    // CONCRETE SCENARIO
    // =========================================================================

    #[test]
    fn test_rc_probe_times_out_and_fetches_capabilities() {
        let mut h = Harness::new();
        let mut changes = h.state_changes();

        h.probe(HmiInterface::Rc, 42, FIVE_SECONDS);
        assert_eq!(h.transport.sent_functions(), vec![FunctionId::RcIsReady]);

        h.advance(Duration::from_secs(4));
        assert!(h.engine.registry().is_pending(CorrelationId::new(42)));
        assert_eq!(h.transport.count_for(FunctionId::RcGetCapabilities), 0);

        h.advance(Duration::from_secs(1));
        assert!(!h.engine.registry().is_pending(CorrelationId::new(42)));
        assert_eq!(h.transport.count_for(FunctionId::RcGetCapabilities), 1);
        assert_eq!(h.states.get_state(HmiInterface::Rc), InterfaceState::NotResponded);
        assert!(changes.drain().is_empty());
    }

    // =========================================================================
    // BOOT
    // =========================================================================

    #[test]
    fn test_boot_sequence() {
        let mut h = Harness::new().with_on_ready(
            HmiInterface::with_readiness_handshake().collect(),
        );
        let mut changes = h.state_changes();

        assert_eq!(h.announce_ready(), RouteOutcome::Broadcast(1));
        assert_eq!(
            h.transport.sent_functions(),
            vec![
                FunctionId::NavigationIsReady,
                FunctionId::VrIsReady,
                FunctionId::TtsIsReady,
                FunctionId::UiIsReady,
                FunctionId::VehicleInfoIsReady,
                FunctionId::RcIsReady,
            ]
        );

        h.answer_last(FunctionId::UiIsReady, json!({ "available": true }));
        h.answer_last(FunctionId::VrIsReady, json!({ "available": false }));
        h.answer_last(FunctionId::TtsIsReady, json!({}));
        h.answer_last(FunctionId::RcIsReady, json!({ "available": true }));

        assert_eq!(
            transitions(&changes.drain()),
            vec![
                (HmiInterface::Ui, InterfaceState::Available),
                (HmiInterface::Vr, InterfaceState::NotAvailable),
                (HmiInterface::Rc, InterfaceState::Available),
            ]
        );

        // UI: three fetches. VR: none. TTS: three, despite the unknown answer.
        assert_eq!(h.transport.count_for(FunctionId::UiGetCapabilities), 1);
        assert_eq!(h.transport.count_for(FunctionId::VrGetCapabilities), 0);
        assert_eq!(h.transport.count_for(FunctionId::TtsGetCapabilities), 1);
        assert_eq!(h.transport.count_for(FunctionId::RcGetCapabilities), 1);

        // Navigation and VehicleInfo never answer.
        h.advance(Duration::from_secs(1));
        assert_eq!(h.states.get_state(HmiInterface::Navigation), InterfaceState::NotResponded);
        assert_eq!(h.transport.count_for(FunctionId::VehicleInfoGetVehicleType), 1);
    }

    #[test]
    fn test_capability_reply_restores_support() {
        let mut h = Harness::new();
        h.probe(HmiInterface::Tts, 7, FIVE_SECONDS);
        h.reply(FunctionId::TtsIsReady, 7, json!({}));
        assert!(!h.capabilities.is_supported(HmiInterface::Tts));

        assert!(h.answer_last(FunctionId::TtsGetLanguage, json!({ "language": "EN-US" })));
        assert!(h.capabilities.is_supported(HmiInterface::Tts));
        assert!(!h.capabilities.is_cooperating(HmiInterface::Tts));
        assert_eq!(
            h.capabilities.capabilities(FunctionId::TtsGetLanguage),
            Some(json!({ "language": "EN-US" }))
        );
    }

    // =========================================================================
    // CORRELATION EDGE CASES
    // =========================================================================

    #[test]
    fn test_duplicate_reply_changes_state_once() {
        let mut h = Harness::new();
        let mut changes = h.state_changes();

        h.probe(HmiInterface::Ui, 42, FIVE_SECONDS);
        h.reply(FunctionId::UiIsReady, 42, json!({ "available": true }));
        h.reply(FunctionId::UiIsReady, 42, json!({ "available": false }));

        assert_eq!(
            transitions(&changes.drain()),
            vec![(HmiInterface::Ui, InterfaceState::Available)]
        );
        assert_eq!(h.transport.count_for(FunctionId::UiGetLanguage), 1);
        assert_eq!(h.engine.registry().stats().snapshot().unmatched, 1);
    }

    #[test]
    fn test_foreign_reply_leaves_call_pending() {
        let mut h = Harness::new();
        h.probe(HmiInterface::Rc, 42, FIVE_SECONDS);

        h.reply(FunctionId::UiIsReady, 42, json!({ "available": false }));
        assert!(h.engine.registry().is_pending(CorrelationId::new(42)));
        assert_eq!(h.states.get_state(HmiInterface::Ui), InterfaceState::NotResponded);

        h.reply(FunctionId::RcIsReady, 42, json!({ "available": true }));
        assert_eq!(h.states.get_state(HmiInterface::Rc), InterfaceState::Available);
    }

    #[test]
    fn test_cancelled_handshake_is_silent() {
        let mut h = Harness::new();
        let mut changes = h.state_changes();
        h.probe(HmiInterface::Rc, 42, FIVE_SECONDS);

        h.engine.handle().cancel(CorrelationId::new(42)).unwrap();
        h.engine.drain();

        h.reply(FunctionId::RcIsReady, 42, json!({ "available": true }));
        h.advance(Duration::from_secs(10));

        assert_eq!(h.states.get_state(HmiInterface::Rc), InterfaceState::NotResponded);
        assert_eq!(h.transport.count_for(FunctionId::RcGetCapabilities), 0);
        assert!(changes.drain().is_empty());
        let stats = h.engine.registry().stats().snapshot();
        assert_eq!((stats.cancelled, stats.unmatched, stats.timeouts), (1, 1, 0));
    }

    #[test]
    fn test_reply_at_deadline_loses_to_queued_timeout() {
        let mut h = Harness::new();
        h.probe(HmiInterface::Rc, 42, FIVE_SECONDS);

        // The timer fires first; its expiry is queued ahead of the reply.
        h.timer.advance(FIVE_SECONDS);
        h.engine
            .handle()
            .deliver(shared_types::HmiMessage::response(
                FunctionId::RcIsReady,
                CorrelationId::new(42),
                json!({ "available": false }),
            ))
            .unwrap();
        h.engine.drain();

        assert_eq!(h.states.get_state(HmiInterface::Rc), InterfaceState::NotResponded);
        assert_eq!(h.transport.count_for(FunctionId::RcGetCapabilities), 1);
    }

    #[test]
    fn test_interface_flaps() {
        let mut h = Harness::new();
        let mut changes = h.state_changes();

        for (id, available) in [(1, true), (2, false), (3, true)] {
            h.probe(HmiInterface::VehicleInfo, id, FIVE_SECONDS);
            h.reply(FunctionId::VehicleInfoIsReady, id, json!({ "available": available }));
        }
        // A later unknown answer does not overwrite the last explicit one.
        h.probe(HmiInterface::VehicleInfo, 4, FIVE_SECONDS);
        h.reply(FunctionId::VehicleInfoIsReady, 4, json!({}));

        assert_eq!(
            transitions(&changes.drain()),
            vec![
                (HmiInterface::VehicleInfo, InterfaceState::Available),
                (HmiInterface::VehicleInfo, InterfaceState::NotAvailable),
                (HmiInterface::VehicleInfo, InterfaceState::Available),
            ]
        );
        assert_eq!(h.states.get_state(HmiInterface::VehicleInfo), InterfaceState::Available);
    }
}
