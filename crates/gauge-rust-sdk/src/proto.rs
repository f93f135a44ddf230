//! Protobuf wire form of the Gauge messages (package `gauge.messages`)
//!
//! These structs mirror Gauge's `messages.proto` and `spec.proto` field for
//! field, in the shape `prost-build` emits for proto2 sources. Only the
//! messages the runner exchanges are declared; the decoder skips any field it
//! does not know, so newer hosts can add fields freely.
//!
//! The rest of the crate works with the domain types in [`crate::message`].
//! Conversions live at the bottom of this module and are used by
//! [`crate::ipc`].

use crate::context;
use crate::error::IpcError;
use crate::message::{self as domain, Payload};
use crate::result::ExecutionResult;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Message {
    #[prost(enumeration = "message::MessageType", required, tag = "1")]
    pub message_type: i32,
    #[prost(int64, required, tag = "2")]
    pub message_id: i64,
    #[prost(message, optional, tag = "3")]
    pub execution_starting_request: Option<ExecutionStartingRequest>,
    #[prost(message, optional, tag = "4")]
    pub spec_execution_starting_request: Option<SpecExecutionStartingRequest>,
    #[prost(message, optional, tag = "5")]
    pub spec_execution_ending_request: Option<SpecExecutionEndingRequest>,
    #[prost(message, optional, tag = "6")]
    pub scenario_execution_starting_request: Option<ScenarioExecutionStartingRequest>,
    #[prost(message, optional, tag = "7")]
    pub scenario_execution_ending_request: Option<ScenarioExecutionEndingRequest>,
    #[prost(message, optional, tag = "8")]
    pub step_execution_starting_request: Option<StepExecutionStartingRequest>,
    #[prost(message, optional, tag = "9")]
    pub step_execution_ending_request: Option<StepExecutionEndingRequest>,
    #[prost(message, optional, tag = "10")]
    pub execute_step_request: Option<ExecuteStepRequest>,
    #[prost(message, optional, tag = "11")]
    pub execution_ending_request: Option<ExecutionEndingRequest>,
    #[prost(message, optional, tag = "12")]
    pub step_validate_request: Option<StepValidateRequest>,
    #[prost(message, optional, tag = "13")]
    pub step_validate_response: Option<StepValidateResponse>,
    #[prost(message, optional, tag = "14")]
    pub execution_status_response: Option<ExecutionStatusResponse>,
    #[prost(message, optional, tag = "15")]
    pub step_names_request: Option<StepNamesRequest>,
    #[prost(message, optional, tag = "16")]
    pub step_names_response: Option<StepNamesResponse>,
    #[prost(message, optional, tag = "18")]
    pub kill_process_request: Option<KillProcessRequest>,
    #[prost(message, optional, tag = "19")]
    pub scenario_data_store_init_request: Option<ScenarioDataStoreInitRequest>,
    #[prost(message, optional, tag = "20")]
    pub spec_data_store_init_request: Option<SpecDataStoreInitRequest>,
    #[prost(message, optional, tag = "21")]
    pub suite_data_store_init_request: Option<SuiteDataStoreInitRequest>,
}

/// Nested types of [`Message`]
pub mod message {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum MessageType {
        ExecutionStarting = 0,
        SpecExecutionStarting = 1,
        SpecExecutionEnding = 2,
        ScenarioExecutionStarting = 3,
        ScenarioExecutionEnding = 4,
        StepExecutionStarting = 5,
        StepExecutionEnding = 6,
        ExecuteStep = 7,
        ExecutionEnding = 8,
        StepValidateRequest = 9,
        StepValidateResponse = 10,
        ExecutionStatusResponse = 11,
        StepNamesRequest = 12,
        StepNamesResponse = 13,
        KillProcessRequest = 14,
        SuiteExecutionResult = 15,
        ScenarioDataStoreInit = 16,
        SpecDataStoreInit = 17,
        SuiteDataStoreInit = 18,
    }
}

macro_rules! lifecycle_request {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct $name {
                #[prost(message, optional, tag = "1")]
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

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionInfo {
    #[prost(message, optional, tag = "1")]
    pub current_spec: Option<SpecInfo>,
    #[prost(message, optional, tag = "2")]
    pub current_scenario: Option<ScenarioInfo>,
    #[prost(message, optional, tag = "3")]
    pub current_step: Option<StepInfo>,
    #[prost(string, optional, tag = "4")]
    pub stacktrace: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SpecInfo {
    #[prost(string, required, tag = "1")]
    pub name: String,
    #[prost(string, required, tag = "2")]
    pub file_name: String,
    #[prost(bool, required, tag = "3")]
    pub is_failed: bool,
    #[prost(string, repeated, tag = "4")]
    pub tags: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScenarioInfo {
    #[prost(string, required, tag = "1")]
    pub name: String,
    #[prost(bool, required, tag = "2")]
    pub is_failed: bool,
    #[prost(string, repeated, tag = "3")]
    pub tags: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StepInfo {
    #[prost(message, optional, tag = "1")]
    pub step: Option<ExecuteStepRequest>,
    #[prost(bool, required, tag = "2")]
    pub is_failed: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteStepRequest {
    #[prost(string, required, tag = "1")]
    pub actual_step_text: String,
    #[prost(string, required, tag = "2")]
    pub parsed_step_text: String,
    #[prost(bool, optional, tag = "3")]
    pub scenario_failing: Option<bool>,
    #[prost(message, repeated, tag = "4")]
    pub parameters: Vec<Parameter>,
}

/// A resolved step argument. Tables arrive in field 4, which the runner
/// does not read.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Parameter {
    #[prost(enumeration = "parameter::ParameterType", required, tag = "1")]
    pub parameter_type: i32,
    #[prost(string, optional, tag = "2")]
    pub value: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub name: Option<String>,
}

/// Nested types of [`Parameter`]
pub mod parameter {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ParameterType {
        Static = 1,
        Dynamic = 2,
        SpecialString = 3,
        SpecialTable = 4,
        Table = 5,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StepValidateRequest {
    #[prost(string, required, tag = "1")]
    pub step_text: String,
    #[prost(int32, required, tag = "2")]
    pub number_of_parameters: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StepValidateResponse {
    #[prost(bool, required, tag = "1")]
    pub is_valid: bool,
    #[prost(string, optional, tag = "2")]
    pub error_message: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StepNamesRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StepNamesResponse {
    #[prost(string, repeated, tag = "1")]
    pub steps: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionStatusResponse {
    #[prost(message, optional, tag = "1")]
    pub execution_result: Option<ProtoExecutionResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoExecutionResult {
    #[prost(bool, required, tag = "1")]
    pub failed: bool,
    #[prost(bool, optional, tag = "2")]
    pub recoverable_error: Option<bool>,
    #[prost(string, optional, tag = "3")]
    pub error_message: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub stack_trace: Option<String>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub screen_shot: Option<Vec<u8>>,
    #[prost(int64, required, tag = "6")]
    pub execution_time: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KillProcessRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScenarioDataStoreInitRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SpecDataStoreInitRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SuiteDataStoreInitRequest {}

// Domain <-> wire conversions

impl From<domain::MessageType> for message::MessageType {
    fn from(value: domain::MessageType) -> Self {
        use domain::MessageType as D;
        match value {
            D::ExecutionStarting => Self::ExecutionStarting,
            D::SpecExecutionStarting => Self::SpecExecutionStarting,
            D::SpecExecutionEnding => Self::SpecExecutionEnding,
            D::ScenarioExecutionStarting => Self::ScenarioExecutionStarting,
            D::ScenarioExecutionEnding => Self::ScenarioExecutionEnding,
            D::StepExecutionStarting => Self::StepExecutionStarting,
            D::StepExecutionEnding => Self::StepExecutionEnding,
            D::ExecuteStep => Self::ExecuteStep,
            D::ExecutionEnding => Self::ExecutionEnding,
            D::StepValidateRequest => Self::StepValidateRequest,
            D::StepValidateResponse => Self::StepValidateResponse,
            D::ExecutionStatusResponse => Self::ExecutionStatusResponse,
            D::StepNamesRequest => Self::StepNamesRequest,
            D::StepNamesResponse => Self::StepNamesResponse,
            D::KillProcessRequest => Self::KillProcessRequest,
            D::SuiteDataStoreInit => Self::SuiteDataStoreInit,
            D::SpecDataStoreInit => Self::SpecDataStoreInit,
            D::ScenarioDataStoreInit => Self::ScenarioDataStoreInit,
        }
    }
}

impl TryFrom<message::MessageType> for domain::MessageType {
    type Error = IpcError;

    fn try_from(value: message::MessageType) -> Result<Self, IpcError> {
        use message::MessageType as W;
        Ok(match value {
            W::ExecutionStarting => Self::ExecutionStarting,
            W::SpecExecutionStarting => Self::SpecExecutionStarting,
            W::SpecExecutionEnding => Self::SpecExecutionEnding,
            W::ScenarioExecutionStarting => Self::ScenarioExecutionStarting,
            W::ScenarioExecutionEnding => Self::ScenarioExecutionEnding,
            W::StepExecutionStarting => Self::StepExecutionStarting,
            W::StepExecutionEnding => Self::StepExecutionEnding,
            W::ExecuteStep => Self::ExecuteStep,
            W::ExecutionEnding => Self::ExecutionEnding,
            W::StepValidateRequest => Self::StepValidateRequest,
            W::StepValidateResponse => Self::StepValidateResponse,
            W::ExecutionStatusResponse => Self::ExecutionStatusResponse,
            W::StepNamesRequest => Self::StepNamesRequest,
            W::StepNamesResponse => Self::StepNamesResponse,
            W::KillProcessRequest => Self::KillProcessRequest,
            W::SuiteDataStoreInit => Self::SuiteDataStoreInit,
            W::SpecDataStoreInit => Self::SpecDataStoreInit,
            W::ScenarioDataStoreInit => Self::ScenarioDataStoreInit,
            W::SuiteExecutionResult => {
                return Err(IpcError::InvalidMessage(format!("message type {:?} is not for runners", value)));
            }
        })
    }
}

impl From<ExecutionInfo> for context::ExecutionInfo {
    fn from(wire: ExecutionInfo) -> Self {
        Self {
            current_spec: wire.current_spec.map(|spec| context::SpecInfo {
                name: spec.name,
                file_name: spec.file_name,
                is_failed: spec.is_failed,
                tags: spec.tags,
            }),
            current_scenario: wire.current_scenario.map(|scenario| context::ScenarioInfo {
                name: scenario.name,
                is_failed: scenario.is_failed,
                tags: scenario.tags,
            }),
            current_step: wire.current_step.map(|step| context::StepInfo {
                step_text: step.step.map(|s| s.actual_step_text).unwrap_or_default(),
                is_failed: step.is_failed,
            }),
            stacktrace: wire.stacktrace,
        }
    }
}

impl From<&context::ExecutionInfo> for ExecutionInfo {
    fn from(info: &context::ExecutionInfo) -> Self {
        Self {
            current_spec: info.current_spec.as_ref().map(|spec| SpecInfo {
                name: spec.name.clone(),
                file_name: spec.file_name.clone(),
                is_failed: spec.is_failed,
                tags: spec.tags.clone(),
            }),
            current_scenario: info.current_scenario.as_ref().map(|scenario| ScenarioInfo {
                name: scenario.name.clone(),
                is_failed: scenario.is_failed,
                tags: scenario.tags.clone(),
            }),
            current_step: info.current_step.as_ref().map(|step| StepInfo {
                step: Some(ExecuteStepRequest {
                    actual_step_text: step.step_text.clone(),
                    ..Default::default()
                }),
                is_failed: step.is_failed,
            }),
            stacktrace: info.stacktrace.clone(),
        }
    }
}

impl From<&ExecutionResult> for ProtoExecutionResult {
    fn from(result: &ExecutionResult) -> Self {
        Self {
            failed: result.failed,
            recoverable_error: Some(result.recoverable_error),
            error_message: result.error_message.clone(),
            stack_trace: result.stack_trace.clone(),
            screen_shot: result.screenshot.clone(),
            execution_time: i64::try_from(result.execution_time).unwrap_or(i64::MAX),
        }
    }
}

impl From<ProtoExecutionResult> for ExecutionResult {
    fn from(wire: ProtoExecutionResult) -> Self {
        Self {
            failed: wire.failed,
            execution_time: u64::try_from(wire.execution_time).unwrap_or(0),
            recoverable_error: wire.recoverable_error.unwrap_or(false),
            error_message: wire.error_message,
            stack_trace: wire.stack_trace,
            screenshot: wire.screen_shot,
        }
    }
}

impl From<&domain::ExecuteStepRequest> for ExecuteStepRequest {
    fn from(request: &domain::ExecuteStepRequest) -> Self {
        Self {
            actual_step_text: request.actual_step_text.clone(),
            parsed_step_text: request.parsed_step_text.clone(),
            scenario_failing: Some(request.scenario_failing),
            parameters: request
                .parameters
                .iter()
                .map(|value| Parameter {
                    parameter_type: parameter::ParameterType::Static as i32,
                    value: Some(value.clone()),
                    name: None,
                })
                .collect(),
        }
    }
}

impl From<ExecuteStepRequest> for domain::ExecuteStepRequest {
    fn from(wire: ExecuteStepRequest) -> Self {
        Self {
            actual_step_text: wire.actual_step_text,
            parsed_step_text: wire.parsed_step_text,
            parameters: wire
                .parameters
                .into_iter()
                .map(|p| p.value.unwrap_or_default())
                .collect(),
            scenario_failing: wire.scenario_failing.unwrap_or(false),
        }
    }
}

fn lifecycle_context(info: &Option<context::ExecutionInfo>) -> Option<ExecutionInfo> {
    info.as_ref().map(ExecutionInfo::from)
}

impl From<&domain::Message> for Message {
    fn from(msg: &domain::Message) -> Self {
        let mut wire = Message {
            message_type: message::MessageType::from(msg.message_type) as i32,
            message_id: msg.message_id,
            ..Default::default()
        };

        match &msg.payload {
            Payload::ExecutionStartingRequest(r) => {
                wire.execution_starting_request = Some(ExecutionStartingRequest {
                    current_execution_info: lifecycle_context(&r.current_execution_info),
                })
            }
            Payload::ExecutionEndingRequest(r) => {
                wire.execution_ending_request = Some(ExecutionEndingRequest {
                    current_execution_info: lifecycle_context(&r.current_execution_info),
                })
            }
            Payload::SpecExecutionStartingRequest(r) => {
                wire.spec_execution_starting_request = Some(SpecExecutionStartingRequest {
                    current_execution_info: lifecycle_context(&r.current_execution_info),
                })
            }
            Payload::SpecExecutionEndingRequest(r) => {
                wire.spec_execution_ending_request = Some(SpecExecutionEndingRequest {
                    current_execution_info: lifecycle_context(&r.current_execution_info),
                })
            }
            Payload::ScenarioExecutionStartingRequest(r) => {
                wire.scenario_execution_starting_request = Some(ScenarioExecutionStartingRequest {
                    current_execution_info: lifecycle_context(&r.current_execution_info),
                })
            }
            Payload::ScenarioExecutionEndingRequest(r) => {
                wire.scenario_execution_ending_request = Some(ScenarioExecutionEndingRequest {
                    current_execution_info: lifecycle_context(&r.current_execution_info),
                })
            }
            Payload::StepExecutionStartingRequest(r) => {
                wire.step_execution_starting_request = Some(StepExecutionStartingRequest {
                    current_execution_info: lifecycle_context(&r.current_execution_info),
                })
            }
            Payload::StepExecutionEndingRequest(r) => {
                wire.step_execution_ending_request = Some(StepExecutionEndingRequest {
                    current_execution_info: lifecycle_context(&r.current_execution_info),
                })
            }
            Payload::ExecuteStepRequest(r) => wire.execute_step_request = Some(r.into()),
            Payload::StepValidateRequest(r) => {
                wire.step_validate_request = Some(StepValidateRequest {
                    step_text: r.step_text.clone(),
                    number_of_parameters: i32::try_from(r.number_of_parameters).unwrap_or(i32::MAX),
                })
            }
            Payload::StepValidateResponse(r) => {
                wire.step_validate_response = Some(StepValidateResponse {
                    is_valid: r.is_valid,
                    error_message: r.error_message.clone(),
                })
            }
            Payload::StepNamesRequest(_) => wire.step_names_request = Some(StepNamesRequest {}),
            Payload::StepNamesResponse(r) => {
                wire.step_names_response = Some(StepNamesResponse { steps: r.steps.clone() })
            }
            Payload::SuiteDataStoreInitRequest(_) => {
                wire.suite_data_store_init_request = Some(SuiteDataStoreInitRequest {})
            }
            Payload::SpecDataStoreInitRequest(_) => {
                wire.spec_data_store_init_request = Some(SpecDataStoreInitRequest {})
            }
            Payload::ScenarioDataStoreInitRequest(_) => {
                wire.scenario_data_store_init_request = Some(ScenarioDataStoreInitRequest {})
            }
            Payload::KillProcessRequest(_) => wire.kill_process_request = Some(KillProcessRequest {}),
            Payload::ExecutionStatusResponse(r) => {
                wire.execution_status_response = Some(ExecutionStatusResponse {
                    execution_result: Some((&r.execution_result).into()),
                })
            }
        }

        wire
    }
}

/// Payload field named by the message type, or an error when a type that
/// needs content arrives without it. Empty and context-only payloads default.
fn required<T>(field: Option<T>, name: &str) -> Result<T, IpcError> {
    field.ok_or_else(|| IpcError::InvalidMessage(format!("missing {} payload", name)))
}

fn execution_info(info: Option<ExecutionInfo>) -> Option<context::ExecutionInfo> {
    info.map(context::ExecutionInfo::from)
}

impl TryFrom<Message> for domain::Message {
    type Error = IpcError;

    fn try_from(wire: Message) -> Result<Self, IpcError> {
        use domain::MessageType as T;

        let wire_type = message::MessageType::try_from(wire.message_type)
            .map_err(|_| IpcError::InvalidMessage(format!("unknown message type {}", wire.message_type)))?;
        let message_type = domain::MessageType::try_from(wire_type)?;

        let payload = match message_type {
            T::ExecutionStarting => Payload::ExecutionStartingRequest(domain::ExecutionStartingRequest {
                current_execution_info: execution_info(
                    wire.execution_starting_request.and_then(|r| r.current_execution_info),
                ),
            }),
            T::ExecutionEnding => Payload::ExecutionEndingRequest(domain::ExecutionEndingRequest {
                current_execution_info: execution_info(
                    wire.execution_ending_request.and_then(|r| r.current_execution_info),
                ),
            }),
            T::SpecExecutionStarting => Payload::SpecExecutionStartingRequest(domain::SpecExecutionStartingRequest {
                current_execution_info: execution_info(
                    wire.spec_execution_starting_request.and_then(|r| r.current_execution_info),
                ),
            }),
            T::SpecExecutionEnding => Payload::SpecExecutionEndingRequest(domain::SpecExecutionEndingRequest {
                current_execution_info: execution_info(
                    wire.spec_execution_ending_request.and_then(|r| r.current_execution_info),
                ),
            }),
            T::ScenarioExecutionStarting => {
                Payload::ScenarioExecutionStartingRequest(domain::ScenarioExecutionStartingRequest {
                    current_execution_info: execution_info(
                        wire.scenario_execution_starting_request.and_then(|r| r.current_execution_info),
                    ),
                })
            }
            T::ScenarioExecutionEnding => {
                Payload::ScenarioExecutionEndingRequest(domain::ScenarioExecutionEndingRequest {
                    current_execution_info: execution_info(
                        wire.scenario_execution_ending_request.and_then(|r| r.current_execution_info),
                    ),
                })
            }
            T::StepExecutionStarting => Payload::StepExecutionStartingRequest(domain::StepExecutionStartingRequest {
                current_execution_info: execution_info(
                    wire.step_execution_starting_request.and_then(|r| r.current_execution_info),
                ),
            }),
            T::StepExecutionEnding => Payload::StepExecutionEndingRequest(domain::StepExecutionEndingRequest {
                current_execution_info: execution_info(
                    wire.step_execution_ending_request.and_then(|r| r.current_execution_info),
                ),
            }),
            T::ExecuteStep => {
                Payload::ExecuteStepRequest(required(wire.execute_step_request, "executeStepRequest")?.into())
            }
            T::StepValidateRequest => {
                let r = required(wire.step_validate_request, "stepValidateRequest")?;
                Payload::StepValidateRequest(domain::StepValidateRequest {
                    step_text: r.step_text,
                    number_of_parameters: usize::try_from(r.number_of_parameters).unwrap_or(0),
                })
            }
            T::StepValidateResponse => {
                let r = required(wire.step_validate_response, "stepValidateResponse")?;
                Payload::StepValidateResponse(domain::StepValidateResponse {
                    is_valid: r.is_valid,
                    error_message: r.error_message,
                })
            }
            T::StepNamesRequest => Payload::StepNamesRequest(domain::StepNamesRequest {}),
            T::StepNamesResponse => Payload::StepNamesResponse(domain::StepNamesResponse {
                steps: wire.step_names_response.map(|r| r.steps).unwrap_or_default(),
            }),
            T::SuiteDataStoreInit => Payload::SuiteDataStoreInitRequest(domain::DataStoreInitRequest {}),
            T::SpecDataStoreInit => Payload::SpecDataStoreInitRequest(domain::DataStoreInitRequest {}),
            T::ScenarioDataStoreInit => Payload::ScenarioDataStoreInitRequest(domain::DataStoreInitRequest {}),
            T::KillProcessRequest => Payload::KillProcessRequest(domain::KillProcessRequest {}),
            T::ExecutionStatusResponse => {
                let r = required(wire.execution_status_response, "executionStatusResponse")?;
                Payload::ExecutionStatusResponse(domain::ExecutionStatusResponse {
                    execution_result: required(r.execution_result, "executionResult")?.into(),
                })
            }
        };

        Ok(domain::Message::new(wire.message_id, message_type, payload))
    }
}
