//! Parsing of `*.IsReady` replies.

use crate::domain::errors::ReplyError;
use serde::Deserialize;
use serde_json::Value;
use shared_types::Event;

/// The part of an is-ready reply the handshake acts on.
///
/// `available: None` is a valid outcome meaning "unknown", distinct from
/// `Some(false)`. Other reply fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ReadinessReply {
    #[serde(default)]
    pub available: Option<bool>,
}

impl ReadinessReply {
    pub fn from_event(event: &Event) -> Result<Self, ReplyError> {
        let malformed = |reason: String| ReplyError::MalformedReply {
            function_id: event.function_id,
            reason,
        };

        match &event.payload {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => {
                Self::deserialize(&event.payload).map_err(|e| malformed(e.to_string()))
            }
            _ => Err(malformed("params is not an object".into())),
        }
    }
}
