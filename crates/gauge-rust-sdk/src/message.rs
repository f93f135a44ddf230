//! Protocol messages exchanged between Gauge and the runner
//!
//! Every message carries a correlation id, a type tag and exactly one payload.
//! On the wire these travel as protobuf (see [`crate::proto`]). The serde
//! form names the payload as a single camelCase field next to the tag, which
//! is what shows up in logs and in values stored from hooks:
//!
//! ```json
//! {"messageId": 20, "messageType": "ExecutionEnding", "executionEndingRequest": {}}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::ExecutionInfo;
use crate::result::ExecutionResult;

/// A protocol message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Correlation id, echoed verbatim on the response
    pub message_id: i64,

    /// Type tag selecting the processor
    pub message_type: MessageType,

    /// The typed payload
    #[serde(flatten)]
    pub payload: Payload,
}

impl Message {
    pub fn new(message_id: i64, message_type: MessageType, payload: Payload) -> Self {
        Self {
            message_id,
            message_type,
            payload,
        }
    }

    /// Build an `ExecutionStatusResponse` correlated with `message_id`.
    pub fn execution_status(message_id: i64, execution_result: ExecutionResult) -> Self {
        Self::new(
            message_id,
            MessageType::ExecutionStatusResponse,
            Payload::ExecutionStatusResponse(ExecutionStatusResponse { execution_result }),
        )
    }
}

/// Message type tags, named exactly as Gauge names them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    ExecutionStarting,
    SpecExecutionStarting,
    SpecExecutionEnding,
    ScenarioExecutionStarting,
    ScenarioExecutionEnding,
    StepExecutionStarting,
    StepExecutionEnding,
    ExecuteStep,
    ExecutionEnding,
    StepValidateRequest,
    StepValidateResponse,
    ExecutionStatusResponse,
    StepNamesRequest,
    StepNamesResponse,
    KillProcessRequest,
    SuiteDataStoreInit,
    SpecDataStoreInit,
    ScenarioDataStoreInit,
}

impl MessageType {
    /// The response type Gauge expects for a request of this type.
    ///
    /// Returns `None` for types that are themselves responses.
    pub fn response_type(self) -> Option<MessageType> {
        use MessageType::*;
        match self {
            ExecutionStarting
            | ExecutionEnding
            | SpecExecutionStarting
            | SpecExecutionEnding
            | ScenarioExecutionStarting
            | ScenarioExecutionEnding
            | StepExecutionStarting
            | StepExecutionEnding
            | ExecuteStep
            | SuiteDataStoreInit
            | SpecDataStoreInit
            | ScenarioDataStoreInit
            | KillProcessRequest => Some(ExecutionStatusResponse),
            StepValidateRequest => Some(StepValidateResponse),
            StepNamesRequest => Some(StepNamesResponse),
            ExecutionStatusResponse | StepValidateResponse | StepNamesResponse => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Payload variants. Exactly one is present on every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Payload {
    ExecutionStartingRequest(ExecutionStartingRequest),
    ExecutionEndingRequest(ExecutionEndingRequest),
    SpecExecutionStartingRequest(SpecExecutionStartingRequest),
    SpecExecutionEndingRequest(SpecExecutionEndingRequest),
    ScenarioExecutionStartingRequest(ScenarioExecutionStartingRequest),
    ScenarioExecutionEndingRequest(ScenarioExecutionEndingRequest),
    StepExecutionStartingRequest(StepExecutionStartingRequest),
    StepExecutionEndingRequest(StepExecutionEndingRequest),
    ExecuteStepRequest(ExecuteStepRequest),
    StepValidateRequest(StepValidateRequest),
    StepValidateResponse(StepValidateResponse),
    StepNamesRequest(StepNamesRequest),
    StepNamesResponse(StepNamesResponse),
    SuiteDataStoreInitRequest(DataStoreInitRequest),
    SpecDataStoreInitRequest(DataStoreInitRequest),
    ScenarioDataStoreInitRequest(DataStoreInitRequest),
    KillProcessRequest(KillProcessRequest),
    ExecutionStatusResponse(ExecutionStatusResponse),
}

impl Payload {
    /// Wire name of the payload field, used in protocol error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Payload::ExecutionStartingRequest(_) => "executionStartingRequest",
            Payload::ExecutionEndingRequest(_) => "executionEndingRequest",
            Payload::SpecExecutionStartingRequest(_) => "specExecutionStartingRequest",
            Payload::SpecExecutionEndingRequest(_) => "specExecutionEndingRequest",
            Payload::ScenarioExecutionStartingRequest(_) => "scenarioExecutionStartingRequest",
            Payload::ScenarioExecutionEndingRequest(_) => "scenarioExecutionEndingRequest",
            Payload::StepExecutionStartingRequest(_) => "stepExecutionStartingRequest",
            Payload::StepExecutionEndingRequest(_) => "stepExecutionEndingRequest",
            Payload::ExecuteStepRequest(_) => "executeStepRequest",
            Payload::StepValidateRequest(_) => "stepValidateRequest",
            Payload::StepValidateResponse(_) => "stepValidateResponse",
            Payload::StepNamesRequest(_) => "stepNamesRequest",
            Payload::StepNamesResponse(_) => "stepNamesResponse",
            Payload::SuiteDataStoreInitRequest(_) => "suiteDataStoreInitRequest",
            Payload::SpecDataStoreInitRequest(_) => "specDataStoreInitRequest",
            Payload::ScenarioDataStoreInitRequest(_) => "scenarioDataStoreInitRequest",
            Payload::KillProcessRequest(_) => "killProcessRequest",
            Payload::ExecutionStatusResponse(_) => "executionStatusResponse",
        }
    }
}

/// Declares the lifecycle request payloads, which all carry the same context.
macro_rules! lifecycle_request {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            #[serde(rename_all = "camelCase")]
            pub struct $name {
                #[serde(default)]
                pub current_execution_info: Option<ExecutionInfo>,
            }
        )*
    };
}

lifecycle_request!(
    ExecutionStartingRequest,
    ExecutionEndingRequest,
    SpecExecutionStartingRequest,
    SpecExecutionEndingRequest,
    ScenarioExecutionStartingRequest,
    ScenarioExecutionEndingRequest,
    StepExecutionStartingRequest,
    StepExecutionEndingRequest,
);

/// Request to run one step implementation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStepRequest {
    /// Step text as written in the spec, e.g. `Vowels in "gauge" are "3"`
    pub actual_step_text: String,

    /// Parameterised step text, e.g. `Vowels in {} are {}`
    pub parsed_step_text: String,

    /// Resolved argument values, in order
    #[serde(default)]
    pub parameters: Vec<String>,

    #[serde(default)]
    pub scenario_failing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepValidateRequest {
    pub step_text: String,

    #[serde(default)]
    pub number_of_parameters: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepValidateResponse {
    pub is_valid: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepNamesRequest {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepNamesResponse {
    #[serde(default)]
    pub steps: Vec<String>,
}

/// Shared shape of the suite/spec/scenario data store init requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataStoreInitRequest {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KillProcessRequest {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStatusResponse {
    pub execution_result: ExecutionResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_shape() {
        let msg = Message::new(
            20,
            MessageType::ExecutionEnding,
            Payload::ExecutionEndingRequest(ExecutionEndingRequest::default()),
        );
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({
            "messageId": 20,
            "messageType": "ExecutionEnding",
            "executionEndingRequest": { "currentExecutionInfo": null },
        }));
    }

    #[test]
    fn test_parse_json_form() {
        let raw = json!({
            "messageId": 7,
            "messageType": "ExecuteStep",
            "executeStepRequest": {
                "actualStepText": "Say \"hi\"",
                "parsedStepText": "Say {}",
                "parameters": ["hi"],
            },
        });
        let msg: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.message_id, 7);
        assert_eq!(msg.message_type, MessageType::ExecuteStep);
        match msg.payload {
            Payload::ExecuteStepRequest(req) => {
                assert_eq!(req.parsed_step_text, "Say {}");
                assert_eq!(req.parameters, vec!["hi".to_string()]);
                assert!(!req.scenario_failing);
            }
            other => panic!("unexpected payload {}", other.name()),
        }
    }

    #[test]
    fn test_response_type_table() {
        assert_eq!(MessageType::ExecutionEnding.response_type(), Some(MessageType::ExecutionStatusResponse));
        assert_eq!(MessageType::KillProcessRequest.response_type(), Some(MessageType::ExecutionStatusResponse));
        assert_eq!(MessageType::StepValidateRequest.response_type(), Some(MessageType::StepValidateResponse));
        assert_eq!(MessageType::StepNamesRequest.response_type(), Some(MessageType::StepNamesResponse));
        assert_eq!(MessageType::ExecutionStatusResponse.response_type(), None);
    }
}
