//! Step execution, validation and listing

use std::sync::Arc;

use gauge_rust_sdk::message::{StepNamesResponse, StepValidateResponse};
use gauge_rust_sdk::{ExecutionResult, Message, MessageType, Payload};

use super::MessageProcessor;
use crate::error::ProtocolError;
use crate::executor::MethodExecutor;
use crate::registry::StepRegistry;

/// Runs the step implementation matching `parsedStepText`
pub struct ExecuteStepProcessor {
    steps: Arc<StepRegistry>,
    executor: Arc<dyn MethodExecutor>,
}

impl ExecuteStepProcessor {
    pub fn new(steps: Arc<StepRegistry>, executor: Arc<dyn MethodExecutor>) -> Self {
        Self { steps, executor }
    }
}

impl MessageProcessor for ExecuteStepProcessor {
    fn process(&self, request: Message) -> Result<Message, ProtocolError> {
        let step_request = match (&request.message_type, &request.payload) {
            (MessageType::ExecuteStep, Payload::ExecuteStepRequest(r)) => r,
            _ => return Err(ProtocolError::payload_mismatch(&request)),
        };

        let result = match self.steps.get(&step_request.parsed_step_text) {
            Some(step) => self.executor.execute_step(step, &step_request.parameters),
            None => {
                tracing::warn!(step = %step_request.parsed_step_text, "No implementation for step");
                ExecutionResult::failure(
                    0,
                    format!("Step implementation not found: {}", step_request.actual_step_text),
                )
            }
        };

        Ok(Message::execution_status(request.message_id, result))
    }
}

/// Checks that a step has an implementation with a matching parameter count
pub struct StepValidateProcessor {
    steps: Arc<StepRegistry>,
}

impl StepValidateProcessor {
    pub fn new(steps: Arc<StepRegistry>) -> Self {
        Self { steps }
    }
}

impl MessageProcessor for StepValidateProcessor {
    fn process(&self, request: Message) -> Result<Message, ProtocolError> {
        let validate = match (&request.message_type, &request.payload) {
            (MessageType::StepValidateRequest, Payload::StepValidateRequest(r)) => r,
            _ => return Err(ProtocolError::payload_mismatch(&request)),
        };

        let response = match self.steps.get(&validate.step_text) {
            None => StepValidateResponse {
                is_valid: false,
                error_message: Some(format!("Step implementation not found: {}", validate.step_text)),
            },
            Some(step) if step.arity() != validate.number_of_parameters => StepValidateResponse {
                is_valid: false,
                error_message: Some(format!(
                    "Step `{}` takes {} parameter(s) but {} were given",
                    validate.step_text,
                    step.arity(),
                    validate.number_of_parameters
                )),
            },
            Some(_) => StepValidateResponse {
                is_valid: true,
                error_message: None,
            },
        };

        Ok(Message::new(
            request.message_id,
            MessageType::StepValidateResponse,
            Payload::StepValidateResponse(response),
        ))
    }
}

/// Lists the texts of all implemented steps
pub struct StepNamesProcessor {
    steps: Arc<StepRegistry>,
}

impl StepNamesProcessor {
    pub fn new(steps: Arc<StepRegistry>) -> Self {
        Self { steps }
    }
}

impl MessageProcessor for StepNamesProcessor {
    fn process(&self, request: Message) -> Result<Message, ProtocolError> {
        if !matches!(
            (&request.message_type, &request.payload),
            (MessageType::StepNamesRequest, Payload::StepNamesRequest(_))
        ) {
            return Err(ProtocolError::payload_mismatch(&request));
        }

        Ok(Message::new(
            request.message_id,
            MessageType::StepNamesResponse,
            Payload::StepNamesResponse(StepNamesResponse {
                steps: self.steps.step_texts(),
            }),
        ))
    }
}
