//! Execution result reported back to Gauge for a hook batch or a step

use serde::{Deserialize, Serialize};

/// Outcome of one hook batch or one step execution.
///
/// # Quick Reference
///
/// | Method | failed | Use Case |
/// |--------|--------|----------|
/// | `passed(ms)` | false | Every hook/step body succeeded |
/// | `failure(ms, msg)` | true | A hook/step returned an error or panicked |
///
/// Failure detail can be enriched with the `with_*` builders:
/// ```ignore
/// ExecutionResult::failure(12, "boom")
///     .with_stack_trace("at before_suite")
///     .with_screenshot(png_bytes)
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Whether the execution failed
    pub failed: bool,

    /// Elapsed time in milliseconds
    pub execution_time: u64,

    /// Whether Gauge may continue with the next step after this failure
    #[serde(default)]
    pub recoverable_error: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,

    /// PNG screenshot bytes, base64 in the JSON form
    #[serde(
        default,
        rename = "screenShot",
        skip_serializing_if = "Option::is_none",
        with = "screenshot_base64"
    )]
    pub screenshot: Option<Vec<u8>>,
}

impl ExecutionResult {
    /// A successful result.
    pub fn passed(execution_time: u64) -> Self {
        Self {
            failed: false,
            execution_time,
            ..Default::default()
        }
    }

    /// A failed result carrying the failure message.
    pub fn failure(execution_time: u64, message: impl Into<String>) -> Self {
        Self {
            failed: true,
            execution_time,
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    pub fn with_screenshot(mut self, screenshot: Vec<u8>) -> Self {
        self.screenshot = Some(screenshot);
        self
    }

    pub fn with_recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable_error = recoverable;
        self
    }
}

mod screenshot_base64 {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| {
                base64::engine::general_purpose::STANDARD
                    .decode(s)
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}
