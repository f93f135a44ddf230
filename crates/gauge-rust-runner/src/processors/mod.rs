//! Message processors, one per inbound message type
//!
//! A processor takes a request and returns exactly one response carrying the
//! same `message_id`. Processors only fail on protocol faults, such as a
//! payload that does not belong to the message type.

mod datastore;
mod hooks;
mod kill;
mod steps;

pub use datastore::DataStoreInitProcessor;
pub use hooks::{HookProcessor, LifecycleEvent};
pub use kill::KillProcessProcessor;
pub use steps::{ExecuteStepProcessor, StepNamesProcessor, StepValidateProcessor};

use gauge_rust_sdk::Message;

use crate::error::ProtocolError;

/// Turns one request message into its response
pub trait MessageProcessor: Send + Sync {
    fn process(&self, request: Message) -> Result<Message, ProtocolError>;
}
