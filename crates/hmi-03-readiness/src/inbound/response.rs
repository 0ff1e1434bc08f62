//! Response received from the HMI.

use crate::domain::ReplyError;
use hmi_02_correlation::{Command, CommandContext, CommandError, Dispatch};
use shared_types::{Event, FunctionId, HmiMessage};
use tracing::warn;

/// Raises an HMI response as a correlated event, resolving the call that
/// issued the matching request.
pub struct HmiResponseCommand {
    message: Option<HmiMessage>,
    function_id: FunctionId,
}

impl HmiResponseCommand {
    pub fn new(message: HmiMessage) -> Self {
        Self {
            function_id: message.function_id,
            message: Some(message),
        }
    }
}

impl Command for HmiResponseCommand {
    fn function_id(&self) -> FunctionId {
        self.function_id
    }

    fn run(&mut self, _ctx: &CommandContext) -> Result<Dispatch, CommandError> {
        let Some(message) = self.message.take() else {
            return Ok(Dispatch::Complete);
        };

        if message.correlation_id.is_none() {
            let err = ReplyError::MalformedReply {
                function_id: self.function_id,
                reason: "response without correlation id".into(),
            };
            warn!(error = %err, "Response dropped");
            return Ok(Dispatch::Complete);
        }

        Ok(Dispatch::Raise(Event::from(message)))
    }
}
