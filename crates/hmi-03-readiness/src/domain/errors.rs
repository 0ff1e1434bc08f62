//! Error types for readiness handling.

use shared_types::{FunctionId, HmiInterface};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplyError {
    /// The reply is structurally invalid. Handled as if it carried no
    /// availability signal.
    #[error("malformed {function_id} reply: {reason}")]
    MalformedReply {
        function_id: FunctionId,
        reason: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("{0} has no readiness probe")]
    NoReadinessProbe(HmiInterface),
}
