//! Routes inbound messages to their processor by type tag

use std::collections::HashMap;
use std::sync::Arc;

use gauge_rust_sdk::datastore::DataStoreScope;
use gauge_rust_sdk::{Message, MessageType};

use crate::error::ProtocolError;
use crate::executor::MethodExecutor;
use crate::processors::{
    DataStoreInitProcessor, ExecuteStepProcessor, HookProcessor, KillProcessProcessor, LifecycleEvent,
    MessageProcessor, StepNamesProcessor, StepValidateProcessor,
};
use crate::registry::{HookSource, StepRegistry};

/// Fixed mapping from message type to processor
#[derive(Default)]
pub struct ProcessorDispatcher {
    processors: HashMap<MessageType, Box<dyn MessageProcessor>>,
}

impl ProcessorDispatcher {
    /// Dispatcher with no processors. Use [`ProcessorDispatcher::with_processor`]
    /// to fill it, or [`ProcessorDispatcher::standard`] for the full set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher wired with a processor for every request type Gauge sends.
    pub fn standard(
        hooks: Arc<dyn HookSource>,
        steps: Arc<StepRegistry>,
        executor: Arc<dyn MethodExecutor>,
    ) -> Self {
        let mut dispatcher = Self::new();

        for event in LifecycleEvent::ALL {
            dispatcher = dispatcher.with_processor(
                event.message_type(),
                HookProcessor::new(event, Arc::clone(&hooks), Arc::clone(&executor)),
            );
        }

        for scope in [DataStoreScope::Suite, DataStoreScope::Spec, DataStoreScope::Scenario] {
            let processor = DataStoreInitProcessor::new(scope);
            dispatcher = dispatcher.with_processor(processor.message_type(), processor);
        }

        dispatcher
            .with_processor(
                MessageType::ExecuteStep,
                ExecuteStepProcessor::new(Arc::clone(&steps), executor),
            )
            .with_processor(MessageType::StepValidateRequest, StepValidateProcessor::new(Arc::clone(&steps)))
            .with_processor(MessageType::StepNamesRequest, StepNamesProcessor::new(steps))
            .with_processor(MessageType::KillProcessRequest, KillProcessProcessor)
    }

    /// Register `processor` for `message_type`, replacing any previous one.
    pub fn with_processor<P>(mut self, message_type: MessageType, processor: P) -> Self
    where
        P: MessageProcessor + 'static,
    {
        self.processors.insert(message_type, Box::new(processor));
        self
    }

    pub fn handles(&self, message_type: MessageType) -> bool {
        self.processors.contains_key(&message_type)
    }

    /// Hand `message` to its processor and return the response.
    pub fn dispatch(&self, message: Message) -> Result<Message, ProtocolError> {
        let processor = self
            .processors
            .get(&message.message_type)
            .ok_or(ProtocolError::UnsupportedMessageType(message.message_type))?;

        processor.process(message)
    }
}
