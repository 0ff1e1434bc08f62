//! Maps inbound HMI messages to the commands that handle them.

use crate::inbound::{HmiNotificationCommand, HmiResponseCommand};
use hmi_02_correlation::{Command, CommandFactory};
use shared_types::{HmiMessage, MessageType};
use tracing::warn;

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCommandFactory;

impl DefaultCommandFactory {
    pub fn new() -> Self {
        Self
    }
}

impl CommandFactory for DefaultCommandFactory {
    fn create(&self, message: HmiMessage) -> Option<Box<dyn Command>> {
        match message.message_type {
            MessageType::Response | MessageType::ErrorResponse => {
                Some(Box::new(HmiResponseCommand::new(message)))
            }
            MessageType::Notification => Some(Box::new(HmiNotificationCommand::new(message))),
            MessageType::Request => {
                warn!(
                    function_id = %message.function_id,
                    "Requests from the HMI are not supported"
                );
                None
            }
        }
    }
}
