//! # HMI Messages and Events
//!
//! `HmiMessage` is what crosses the transport in either direction. `Event` is
//! the inbound view handed to commands: a reply correlated to one pending call,
//! or a broadcast for every listener of a function.

use crate::catalogue::FunctionId;
use crate::ids::CorrelationId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of HMI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Request,
    Response,
    ErrorResponse,
    Notification,
}

/// Result code carried by HMI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Success,
    UnsupportedResource,
    Rejected,
    Aborted,
    TimedOut,
    InvalidData,
    DataNotAvailable,
    GenericError,
}

impl ResultCode {
    pub const fn is_success(&self) -> bool {
        matches!(self, ResultCode::Success)
    }
}

/// A message exchanged with the HMI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmiMessage {
    /// RPC this message belongs to.
    pub function_id: FunctionId,
    /// Present on requests and their replies; absent on notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    /// Request, response, error response or notification.
    pub message_type: MessageType,
    /// Result code of a response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_code: Option<ResultCode>,
    /// Message parameters (`msg_params`), normally a JSON map.
    #[serde(default)]
    pub params: Value,
}

impl HmiMessage {
    /// Outbound request with empty parameters.
    pub fn request(function_id: FunctionId, correlation_id: CorrelationId) -> Self {
        Self {
            function_id,
            correlation_id: Some(correlation_id),
            message_type: MessageType::Request,
            result_code: None,
            params: Value::Object(Map::new()),
        }
    }

    /// Successful response carrying `params`.
    pub fn response(function_id: FunctionId, correlation_id: CorrelationId, params: Value) -> Self {
        Self {
            function_id,
            correlation_id: Some(correlation_id),
            message_type: MessageType::Response,
            result_code: Some(ResultCode::Success),
            params,
        }
    }

    /// Error response with the given result code.
    pub fn error_response(
        function_id: FunctionId,
        correlation_id: CorrelationId,
        result_code: ResultCode,
    ) -> Self {
        Self {
            function_id,
            correlation_id: Some(correlation_id),
            message_type: MessageType::ErrorResponse,
            result_code: Some(result_code),
            params: Value::Object(Map::new()),
        }
    }

    /// Notification carrying `params`.
    pub fn notification(function_id: FunctionId, params: Value) -> Self {
        Self {
            function_id,
            correlation_id: None,
            message_type: MessageType::Notification,
            result_code: None,
            params,
        }
    }

    /// Replace the parameters.
    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

/// An inbound event delivered to commands and listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// RPC the event belongs to.
    pub function_id: FunctionId,
    /// Absent for broadcast events.
    pub correlation_id: Option<CorrelationId>,
    /// Kind of message the event was raised from.
    pub message_type: MessageType,
    /// Result code of a response.
    pub result_code: Option<ResultCode>,
    /// Message parameters.
    pub payload: Value,
}

impl Event {
    /// Successful reply correlated to a pending call.
    pub fn reply(function_id: FunctionId, correlation_id: CorrelationId, payload: Value) -> Self {
        Self {
            function_id,
            correlation_id: Some(correlation_id),
            message_type: MessageType::Response,
            result_code: Some(ResultCode::Success),
            payload,
        }
    }

    /// Broadcast event with no correlation id.
    pub fn broadcast(function_id: FunctionId, payload: Value) -> Self {
        Self {
            function_id,
            correlation_id: None,
            message_type: MessageType::Notification,
            result_code: None,
            payload,
        }
    }

    /// True when the event is not correlated to any call.
    pub fn is_broadcast(&self) -> bool {
        self.correlation_id.is_none()
    }

    /// True unless the HMI signalled an error.
    pub fn is_success(&self) -> bool {
        self.message_type != MessageType::ErrorResponse
            && self.result_code.map_or(true, |code| code.is_success())
    }

    /// Parameters as a JSON map, if they are one.
    pub fn params(&self) -> Option<&Map<String, Value>> {
        self.payload.as_object()
    }
}

impl From<HmiMessage> for Event {
    fn from(message: HmiMessage) -> Self {
        Self {
            function_id: message.function_id,
            correlation_id: message.correlation_id,
            message_type: message.message_type,
            result_code: message.result_code,
            payload: message.params,
        }
    }
}
