//! Data store resets

use gauge_rust_sdk::datastore::{self, DataStoreScope};
use gauge_rust_sdk::{ExecutionResult, Message, MessageType, Payload};

use super::MessageProcessor;
use crate::error::ProtocolError;

/// Clears the suite, spec or scenario data store
pub struct DataStoreInitProcessor {
    scope: DataStoreScope,
}

impl DataStoreInitProcessor {
    pub fn new(scope: DataStoreScope) -> Self {
        Self { scope }
    }

    /// Message type this processor answers
    pub fn message_type(&self) -> MessageType {
        match self.scope {
            DataStoreScope::Suite => MessageType::SuiteDataStoreInit,
            DataStoreScope::Spec => MessageType::SpecDataStoreInit,
            DataStoreScope::Scenario => MessageType::ScenarioDataStoreInit,
        }
    }

    fn accepts(&self, payload: &Payload) -> bool {
        matches!(
            (self.scope, payload),
            (DataStoreScope::Suite, Payload::SuiteDataStoreInitRequest(_))
                | (DataStoreScope::Spec, Payload::SpecDataStoreInitRequest(_))
                | (DataStoreScope::Scenario, Payload::ScenarioDataStoreInitRequest(_))
        )
    }
}

impl MessageProcessor for DataStoreInitProcessor {
    fn process(&self, request: Message) -> Result<Message, ProtocolError> {
        if request.message_type != self.message_type() || !self.accepts(&request.payload) {
            return Err(ProtocolError::payload_mismatch(&request));
        }

        datastore::store(self.scope).clear();
        tracing::debug!(scope = ?self.scope, "Data store cleared");

        Ok(Message::execution_status(request.message_id, ExecutionResult::passed(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_rust_sdk::message::DataStoreInitRequest;
    use serde_json::json;

    #[test]
    fn test_scenario_init_clears_scenario_store() {
        datastore::scenario().put("datastore_test_key", json!(1));

        let processor = DataStoreInitProcessor::new(DataStoreScope::Scenario);
        let response = processor
            .process(Message::new(
                31,
                MessageType::ScenarioDataStoreInit,
                Payload::ScenarioDataStoreInitRequest(DataStoreInitRequest {}),
            ))
            .unwrap();

        assert_eq!(response.message_id, 31);
        assert_eq!(response.message_type, MessageType::ExecutionStatusResponse);
        assert!(datastore::scenario().get("datastore_test_key").is_none());
    }

    #[test]
    fn test_each_scope_answers_its_own_message() {
        assert_eq!(
            DataStoreInitProcessor::new(DataStoreScope::Suite).message_type(),
            MessageType::SuiteDataStoreInit
        );
        assert_eq!(
            DataStoreInitProcessor::new(DataStoreScope::Spec).message_type(),
            MessageType::SpecDataStoreInit
        );
        assert_eq!(
            DataStoreInitProcessor::new(DataStoreScope::Scenario).message_type(),
            MessageType::ScenarioDataStoreInit
        );
    }

    #[test]
    fn test_wrong_scope_payload_rejected() {
        let processor = DataStoreInitProcessor::new(DataStoreScope::Spec);
        let err = processor
            .process(Message::new(
                1,
                MessageType::SpecDataStoreInit,
                Payload::SuiteDataStoreInitRequest(DataStoreInitRequest {}),
            ))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::PayloadMismatch { .. }));
    }
}
