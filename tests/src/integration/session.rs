//! # Session Over Channels
//!
//! A full [`HmiSession`](hmi_runtime::HmiSession) on tokio, with the test
//! playing the HMI by hand.

#[cfg(test)]
mod tests {
    use hmi_01_interface_state::CapabilityStore;
    use hmi_02_correlation::adapters::{transport_channel, ChannelReceiver, ChannelTransport};
    use hmi_02_correlation::{HmiReceiver, HmiTransport};
    use hmi_runtime::{HmiSession, RuntimeConfig};
    use serde_json::json;
    use shared_types::{FunctionId, HmiInterface, HmiMessage, InterfaceState};
    use std::sync::Arc;
    use std::time::Duration;

    struct Hmi {
        requests: ChannelReceiver,
        replies: ChannelTransport,
    }

    impl Hmi {
        async fn expect(&self, function_id: FunctionId) -> HmiMessage {
            let request = self.requests.receive().await.unwrap();
            assert_eq!(request.function_id, function_id);
            request
        }

        fn answer(&self, request: &HmiMessage, params: serde_json::Value) {
            let reply = HmiMessage::response(
                request.function_id,
                request.correlation_id.unwrap(),
                params,
            );
            self.replies.send(reply).unwrap();
        }
    }

    fn start(interfaces: Vec<HmiInterface>) -> (HmiSession, Hmi) {
        let (to_hmi, requests) = transport_channel();
        let (replies, from_hmi) = transport_channel();
        let session = HmiSession::start(
            RuntimeConfig {
                handshake_interfaces: interfaces,
                ..RuntimeConfig::for_testing()
            },
            Arc::new(to_hmi),
            Arc::new(from_hmi),
        )
        .unwrap();
        (session, Hmi { requests, replies })
    }

    #[tokio::test(start_paused = true)]
    async fn test_hand_driven_boot_with_late_reply() {
        let (session, hmi) = start(vec![HmiInterface::Ui, HmiInterface::Rc]);

        hmi.replies
            .send(HmiMessage::notification(
                FunctionId::BasicCommunicationOnReady,
                json!({}),
            ))
            .unwrap();
        let ui_ready = hmi.expect(FunctionId::UiIsReady).await;
        let rc_ready = hmi.expect(FunctionId::RcIsReady).await;

        hmi.answer(&ui_ready, json!({ "available": true }));
        for function_id in HmiInterface::Ui.capability_requests() {
            let request = hmi.expect(*function_id).await;
            hmi.answer(&request, json!({ "source": function_id.as_str() }));
        }

        // RC stays silent past its 1s timeout.
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        hmi.expect(FunctionId::RcGetCapabilities).await;

        hmi.answer(&rc_ready, json!({ "available": true }));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(session.ready_rounds(), 1);
        assert_eq!(session.states().get_state(HmiInterface::Ui), InterfaceState::Available);
        assert_eq!(session.states().get_state(HmiInterface::Rc), InterfaceState::NotResponded);
        assert!(session.capabilities().is_cooperating(HmiInterface::Ui));
        assert!(!session.capabilities().is_cooperating(HmiInterface::Rc));
        assert_eq!(
            session.capabilities().capabilities(FunctionId::UiGetCapabilities),
            Some(json!({ "source": "UI.GetCapabilities" }))
        );

        let stats = session.shutdown().await.unwrap();
        assert_eq!(stats.registered, 6);
        assert_eq!(stats.matched, 4);
        assert_eq!(stats.timeouts, 1);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.dropped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_on_ready_probes_again() {
        let (session, hmi) = start(vec![HmiInterface::Vr]);
        let on_ready = HmiMessage::notification(FunctionId::BasicCommunicationOnReady, json!({}));

        hmi.replies.send(on_ready.clone()).unwrap();
        let first = hmi.expect(FunctionId::VrIsReady).await;
        hmi.answer(&first, json!({ "available": false }));

        hmi.replies.send(on_ready).unwrap();
        let second = hmi.expect(FunctionId::VrIsReady).await;
        assert_ne!(first.correlation_id, second.correlation_id);
        hmi.answer(&second, json!({ "available": true }));

        for function_id in HmiInterface::Vr.capability_requests() {
            hmi.expect(*function_id).await;
        }
        assert_eq!(session.ready_rounds(), 2);
        assert_eq!(session.states().get_state(HmiInterface::Vr), InterfaceState::Available);

        let stats = session.shutdown().await.unwrap();
        assert_eq!(stats.dropped, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_outlives_hmi_hangup() {
        let (session, hmi) = start(vec![HmiInterface::Navigation]);
        let Hmi { requests, replies } = hmi;
        drop(replies);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(session.start_handshakes().unwrap(), 1);
        assert_eq!(
            requests.receive().await.unwrap().function_id,
            FunctionId::NavigationIsReady
        );

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(session.registry().pending_count(), 0);
        let stats = session.shutdown().await.unwrap();
        assert_eq!(stats.timeouts, 1);
    }
}
