//! Kill request acknowledgement
//!
//! The processor only acknowledges; the message loop closes the connection
//! after the acknowledgement has been written.

use gauge_rust_sdk::{ExecutionResult, Message, MessageType, Payload};

use super::MessageProcessor;
use crate::error::ProtocolError;

pub struct KillProcessProcessor;

impl MessageProcessor for KillProcessProcessor {
    fn process(&self, request: Message) -> Result<Message, ProtocolError> {
        match (&request.message_type, &request.payload) {
            (MessageType::KillProcessRequest, Payload::KillProcessRequest(_)) => {
                Ok(Message::execution_status(request.message_id, ExecutionResult::passed(0)))
            }
            _ => Err(ProtocolError::payload_mismatch(&request)),
        }
    }
}
