//! Gauge Rust SDK - Types and utilities for writing Gauge hooks and steps
//!
//! This crate provides the protocol types, hook/step handles and shared data
//! stores that test code uses. The engine that drives them lives in
//! `gauge-rust-runner`.

pub mod context;
pub mod datastore;
pub mod error;
pub mod hook;
pub mod ipc;
pub mod message;
pub mod proto;
pub mod result;
pub mod screenshot;

pub mod prelude {
    //! Common imports for Gauge hook and step code
    pub use crate::context::{ExecutionInfo, ScenarioInfo, SpecInfo, StepInfo};
    pub use crate::datastore::{self, DataStore};
    pub use crate::error::HookError;
    pub use crate::hook::{HookHandle, StepHandle};
    pub use crate::result::ExecutionResult;
    pub use crate::screenshot::ScreenGrabber;
    pub use serde_json::{json, Value as JsonValue};
}

// Re-export key types at crate root
pub use context::ExecutionInfo;
pub use error::{HookError, IpcError};
pub use hook::{HookHandle, StepHandle};
pub use message::{Message, MessageType, Payload};
pub use result::ExecutionResult;
pub use screenshot::ScreenGrabber;
