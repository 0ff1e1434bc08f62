//! Notification received from the HMI.

use hmi_02_correlation::{Command, CommandContext, CommandError, Dispatch};
use shared_types::{Event, FunctionId, HmiMessage};

/// Raises an HMI notification as a broadcast event.
pub struct HmiNotificationCommand {
    message: Option<HmiMessage>,
    function_id: FunctionId,
}

impl HmiNotificationCommand {
    pub fn new(message: HmiMessage) -> Self {
        Self {
            function_id: message.function_id,
            message: Some(message),
        }
    }
}

impl Command for HmiNotificationCommand {
    fn function_id(&self) -> FunctionId {
        self.function_id
    }

    fn run(&mut self, _ctx: &CommandContext) -> Result<Dispatch, CommandError> {
        let Some(message) = self.message.take() else {
            return Ok(Dispatch::Complete);
        };

        // Notifications never resolve a pending call.
        let mut event = Event::from(message);
        event.correlation_id = None;
        Ok(Dispatch::Raise(event))
    }
}
