//! Protocol-level errors
//!
//! Hook and step failures are not errors at this level; they travel to Gauge
//! inside `ExecutionResult`. What remains here are faults that leave the
//! runner unable to produce a correlated response.

use gauge_rust_sdk::{IpcError, Message, MessageType};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("No processor registered for message type {0}")]
    UnsupportedMessageType(MessageType),

    #[error("Message {message_id} of type {message_type} carries unexpected payload `{found}`")]
    PayloadMismatch {
        message_id: i64,
        message_type: MessageType,
        found: &'static str,
    },

    /// A malformed frame. Plain I/O failures end the loop cleanly instead.
    #[error("Transport error: {0}")]
    Transport(#[source] IpcError),

    #[error("Codec error: {0}")]
    Codec(#[source] IpcError),
}

impl ProtocolError {
    /// The request's payload does not match what its processor expects.
    pub fn payload_mismatch(request: &Message) -> Self {
        ProtocolError::PayloadMismatch {
            message_id: request.message_id,
            message_type: request.message_type,
            found: request.payload.name(),
        }
    }
}

impl From<IpcError> for ProtocolError {
    fn from(err: IpcError) -> Self {
        match err {
            IpcError::Decode(_) | IpcError::InvalidMessage(_) => ProtocolError::Codec(err),
            IpcError::Io(_) | IpcError::InvalidFrame(_) => ProtocolError::Transport(err),
        }
    }
}
