//! Processors for the suite/spec/scenario/step lifecycle requests

use std::sync::Arc;

use gauge_rust_sdk::{ExecutionInfo, Message, MessageType, Payload};

use super::MessageProcessor;
use crate::error::ProtocolError;
use crate::executor::MethodExecutor;
use crate::registry::{HookCategory, HookSource};

/// Lifecycle requests that trigger a hook batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    ExecutionStarting,
    ExecutionEnding,
    SpecExecutionStarting,
    SpecExecutionEnding,
    ScenarioExecutionStarting,
    ScenarioExecutionEnding,
    StepExecutionStarting,
    StepExecutionEnding,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 8] = [
        LifecycleEvent::ExecutionStarting,
        LifecycleEvent::ExecutionEnding,
        LifecycleEvent::SpecExecutionStarting,
        LifecycleEvent::SpecExecutionEnding,
        LifecycleEvent::ScenarioExecutionStarting,
        LifecycleEvent::ScenarioExecutionEnding,
        LifecycleEvent::StepExecutionStarting,
        LifecycleEvent::StepExecutionEnding,
    ];

    pub fn message_type(self) -> MessageType {
        match self {
            LifecycleEvent::ExecutionStarting => MessageType::ExecutionStarting,
            LifecycleEvent::ExecutionEnding => MessageType::ExecutionEnding,
            LifecycleEvent::SpecExecutionStarting => MessageType::SpecExecutionStarting,
            LifecycleEvent::SpecExecutionEnding => MessageType::SpecExecutionEnding,
            LifecycleEvent::ScenarioExecutionStarting => MessageType::ScenarioExecutionStarting,
            LifecycleEvent::ScenarioExecutionEnding => MessageType::ScenarioExecutionEnding,
            LifecycleEvent::StepExecutionStarting => MessageType::StepExecutionStarting,
            LifecycleEvent::StepExecutionEnding => MessageType::StepExecutionEnding,
        }
    }

    /// Hook category run for this event
    pub fn category(self) -> HookCategory {
        match self {
            LifecycleEvent::ExecutionStarting => HookCategory::BeforeSuite,
            LifecycleEvent::ExecutionEnding => HookCategory::AfterSuite,
            LifecycleEvent::SpecExecutionStarting => HookCategory::BeforeSpec,
            LifecycleEvent::SpecExecutionEnding => HookCategory::AfterSpec,
            LifecycleEvent::ScenarioExecutionStarting => HookCategory::BeforeScenario,
            LifecycleEvent::ScenarioExecutionEnding => HookCategory::AfterScenario,
            LifecycleEvent::StepExecutionStarting => HookCategory::BeforeStep,
            LifecycleEvent::StepExecutionEnding => HookCategory::AfterStep,
        }
    }

    /// Execution context of a request payload belonging to this event.
    ///
    /// The outer `None` means the payload is not this event's request; the
    /// inner one means Gauge sent no context.
    fn context(self, payload: &Payload) -> Option<Option<&ExecutionInfo>> {
        let info = match (self, payload) {
            (LifecycleEvent::ExecutionStarting, Payload::ExecutionStartingRequest(r)) => &r.current_execution_info,
            (LifecycleEvent::ExecutionEnding, Payload::ExecutionEndingRequest(r)) => &r.current_execution_info,
            (LifecycleEvent::SpecExecutionStarting, Payload::SpecExecutionStartingRequest(r)) => &r.current_execution_info,
            (LifecycleEvent::SpecExecutionEnding, Payload::SpecExecutionEndingRequest(r)) => &r.current_execution_info,
            (LifecycleEvent::ScenarioExecutionStarting, Payload::ScenarioExecutionStartingRequest(r)) => &r.current_execution_info,
            (LifecycleEvent::ScenarioExecutionEnding, Payload::ScenarioExecutionEndingRequest(r)) => &r.current_execution_info,
            (LifecycleEvent::StepExecutionStarting, Payload::StepExecutionStartingRequest(r)) => &r.current_execution_info,
            (LifecycleEvent::StepExecutionEnding, Payload::StepExecutionEndingRequest(r)) => &r.current_execution_info,
            _ => return None,
        };
        Some(info.as_ref())
    }
}

/// Runs the hooks of one lifecycle event and reports the batch result
pub struct HookProcessor {
    event: LifecycleEvent,
    hooks: Arc<dyn HookSource>,
    executor: Arc<dyn MethodExecutor>,
}

impl HookProcessor {
    pub fn new(event: LifecycleEvent, hooks: Arc<dyn HookSource>, executor: Arc<dyn MethodExecutor>) -> Self {
        Self { event, hooks, executor }
    }
}

impl MessageProcessor for HookProcessor {
    fn process(&self, request: Message) -> Result<Message, ProtocolError> {
        if request.message_type != self.event.message_type() {
            return Err(ProtocolError::payload_mismatch(&request));
        }
        let context = self
            .event
            .context(&request.payload)
            .ok_or_else(|| ProtocolError::payload_mismatch(&request))?;

        let fallback = ExecutionInfo::default();
        let info = context.unwrap_or(&fallback);

        let hooks = self.hooks.get(self.event.category());
        tracing::debug!(
            message_id = request.message_id,
            category = %self.event.category(),
            hooks = hooks.len(),
            "Running hooks"
        );

        let result = self.executor.execute_hooks(&hooks, info);
        Ok(Message::execution_status(request.message_id, result))
    }
}
