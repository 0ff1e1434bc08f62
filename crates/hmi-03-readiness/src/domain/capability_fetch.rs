//! Follow-up request fetching one capability set from the HMI.

use hmi_02_correlation::{Command, CommandContext, CommandError, Dispatch};
use serde_json::Value;
use shared_types::{Event, FunctionId, HmiMessage};
use tracing::{debug, info, warn};

/// Requests `function_id` and stores the reply parameters.
///
/// A successful reply marks the interface supported. Error replies and
/// timeouts leave capability state as it was.
pub struct CapabilityFetchRequest {
    function_id: FunctionId,
}

impl CapabilityFetchRequest {
    pub fn new(function_id: FunctionId) -> Self {
        Self { function_id }
    }
}

impl Command for CapabilityFetchRequest {
    fn function_id(&self) -> FunctionId {
        self.function_id
    }

    fn run(&mut self, ctx: &CommandContext) -> Result<Dispatch, CommandError> {
        let correlation_id = ctx.next_correlation_id();
        debug!(
            function_id = %self.function_id,
            correlation_id = %correlation_id,
            "Requesting capabilities"
        );
        Ok(Dispatch::AwaitReply(HmiMessage::request(
            self.function_id,
            correlation_id,
        )))
    }

    fn on_event(&mut self, event: &Event, ctx: &CommandContext) {
        if !event.is_success() {
            warn!(
                function_id = %self.function_id,
                result_code = ?event.result_code,
                "Capability request failed"
            );
            return;
        }

        let Some(params) = event.params() else {
            warn!(function_id = %self.function_id, "Capability reply without params ignored");
            return;
        };

        let interface = self.function_id.interface();
        let capabilities = ctx.capabilities();
        capabilities.store_capabilities(self.function_id, Value::Object(params.clone()));
        capabilities.set_supported(interface, true);
        info!(
            function_id = %self.function_id,
            interface = %interface,
            "Capabilities stored"
        );
    }

    fn on_timeout(&mut self, _ctx: &CommandContext) {
        warn!(function_id = %self.function_id, "Capability request timed out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmi_01_interface_state::{CapabilityStore, CapabilityWrite};
    use hmi_02_correlation::testing::ContextFixture;
    use serde_json::json;
    use shared_types::{CorrelationId, HmiInterface, ResultCode};

    #[test]
    fn test_run_allocates_fresh_id() {
        let f = ContextFixture::new();
        let mut first = CapabilityFetchRequest::new(FunctionId::RcGetCapabilities);
        let mut second = CapabilityFetchRequest::new(FunctionId::RcGetCapabilities);

        let ids: Vec<_> = [first.run(&f.context), second.run(&f.context)]
            .into_iter()
            .map(|dispatch| match dispatch {
                Ok(Dispatch::AwaitReply(message)) => message.correlation_id,
                other => panic!("unexpected dispatch {other:?}"),
            })
            .collect();
        assert_eq!(ids, vec![Some(CorrelationId::new(1)), Some(CorrelationId::new(2))]);
    }

    #[test]
    fn test_success_stores_and_marks_supported() {
        let f = ContextFixture::new();
        f.capabilities.set_supported(HmiInterface::Rc, false);

        let mut request = CapabilityFetchRequest::new(FunctionId::RcGetCapabilities);
        let params = json!({ "remoteControlCapability": { "buttonCapabilities": [] } });
        request.on_event(
            &Event::reply(FunctionId::RcGetCapabilities, CorrelationId::new(3), params.clone()),
            &f.context,
        );

        assert_eq!(f.capabilities.capabilities(FunctionId::RcGetCapabilities), Some(params));
        assert!(f.capabilities.is_supported(HmiInterface::Rc));
    }

    #[test]
    fn test_error_reply_leaves_state() {
        let f = ContextFixture::new();
        let mut request = CapabilityFetchRequest::new(FunctionId::UiGetLanguage);
        let reply = HmiMessage::error_response(
            FunctionId::UiGetLanguage,
            CorrelationId::new(4),
            ResultCode::Rejected,
        );
        request.on_event(&Event::from(reply), &f.context);
        request.on_timeout(&f.context);

        assert!(f.capabilities.writes().is_empty());
        assert_eq!(f.capabilities.capabilities(FunctionId::UiGetLanguage), None);
    }

    #[test]
    fn test_non_object_params_ignored() {
        let f = ContextFixture::new();
        let mut request = CapabilityFetchRequest::new(FunctionId::VehicleInfoGetVehicleType);
        request.on_event(
            &Event::reply(FunctionId::VehicleInfoGetVehicleType, CorrelationId::new(5), json!("sedan")),
            &f.context,
        );
        assert_eq!(
            f.capabilities.writes_for(HmiInterface::VehicleInfo),
            Vec::<CapabilityWrite>::new()
        );
    }
}
