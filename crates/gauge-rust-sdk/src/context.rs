//! Execution context snapshot sent by Gauge with every lifecycle request
//!
//! The runner never interprets these values. They are handed to hooks as-is so
//! a hook can see which spec, scenario or step is currently running.

use serde::{Deserialize, Serialize};

/// Snapshot of the current suite/spec/scenario/step state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionInfo {
    /// Spec currently executing, if any
    #[serde(default)]
    pub current_spec: Option<SpecInfo>,

    /// Scenario currently executing, if any
    #[serde(default)]
    pub current_scenario: Option<ScenarioInfo>,

    /// Step currently executing, if any
    #[serde(default)]
    pub current_step: Option<StepInfo>,

    /// Stack trace of the last failure reported by Gauge
    #[serde(default)]
    pub stacktrace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecInfo {
    pub name: String,

    #[serde(default)]
    pub file_name: String,

    #[serde(default)]
    pub is_failed: bool,

    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInfo {
    pub name: String,

    #[serde(default)]
    pub is_failed: bool,

    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInfo {
    /// Step text as written in the spec
    pub step_text: String,

    #[serde(default)]
    pub is_failed: bool,
}

impl ExecutionInfo {
    /// Name of the current spec, if one is executing.
    pub fn spec_name(&self) -> Option<&str> {
        self.current_spec.as_ref().map(|s| s.name.as_str())
    }

    /// Name of the current scenario, if one is executing.
    pub fn scenario_name(&self) -> Option<&str> {
        self.current_scenario.as_ref().map(|s| s.name.as_str())
    }
}
