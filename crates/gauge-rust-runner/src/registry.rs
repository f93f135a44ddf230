//! Hook and step registries
//!
//! Registries are populated once, before the start phase begins, and are only
//! read afterwards. Handles keep their registration order, which is the order
//! the executor runs them in.
//!
//! # Example
//!
//! ```ignore
//! let hooks = HookRegistry::builder()
//!     .before_suite(HookHandle::new("start_server", |_| Ok(())))
//!     .after_suite(HookHandle::new("stop_server", |_| Ok(())))
//!     .build();
//!
//! let steps = StepRegistry::builder()
//!     .step(StepHandle::new("Open {}", |args| open(&args[0])))
//!     .build();
//! ```

use std::collections::HashMap;
use std::fmt;

use gauge_rust_sdk::{HookHandle, StepHandle};
use indexmap::IndexMap;

/// Lifecycle points hooks can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookCategory {
    BeforeSuite,
    AfterSuite,
    BeforeSpec,
    AfterSpec,
    BeforeScenario,
    AfterScenario,
    BeforeStep,
    AfterStep,
}

impl HookCategory {
    pub const ALL: [HookCategory; 8] = [
        HookCategory::BeforeSuite,
        HookCategory::AfterSuite,
        HookCategory::BeforeSpec,
        HookCategory::AfterSpec,
        HookCategory::BeforeScenario,
        HookCategory::AfterScenario,
        HookCategory::BeforeStep,
        HookCategory::AfterStep,
    ];
}

impl fmt::Display for HookCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookCategory::BeforeSuite => "before suite",
            HookCategory::AfterSuite => "after suite",
            HookCategory::BeforeSpec => "before spec",
            HookCategory::AfterSpec => "after spec",
            HookCategory::BeforeScenario => "before scenario",
            HookCategory::AfterScenario => "after scenario",
            HookCategory::BeforeStep => "before step",
            HookCategory::AfterStep => "after step",
        };
        f.write_str(name)
    }
}

/// Ordered set of hooks, unique by name.
///
/// A hook's name is its identity here. Two handles sharing a name are the
/// same hook as far as the set is concerned, whatever their bodies do.
#[derive(Debug, Clone, Default)]
pub struct HookSet {
    hooks: IndexMap<String, HookHandle>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook. Returns `false` if a hook with the same name is already
    /// present, in which case the set is unchanged.
    pub fn insert(&mut self, hook: HookHandle) -> bool {
        if self.hooks.contains_key(hook.name()) {
            return false;
        }
        self.hooks.insert(hook.name().to_string(), hook);
        true
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hooks in registration order
    pub fn iter(&self) -> impl Iterator<Item = &HookHandle> {
        self.hooks.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.hooks.keys().map(String::as_str).collect()
    }
}

impl FromIterator<HookHandle> for HookSet {
    fn from_iter<I: IntoIterator<Item = HookHandle>>(iter: I) -> Self {
        let mut set = HookSet::new();
        for hook in iter {
            set.insert(hook);
        }
        set
    }
}

/// Read access to registered hooks
pub trait HookSource: Send + Sync {
    /// Hooks registered for `category`; empty when none are registered.
    fn get(&self, category: HookCategory) -> HookSet;
}

/// Hooks per lifecycle category
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<HookCategory, HookSet>,
}

impl HookRegistry {
    pub fn builder() -> HookRegistryBuilder {
        HookRegistryBuilder::default()
    }

    /// Registry with no hooks at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of hooks across all categories
    pub fn count(&self) -> usize {
        self.hooks.values().map(HookSet::len).sum()
    }
}

impl HookSource for HookRegistry {
    fn get(&self, category: HookCategory) -> HookSet {
        self.hooks.get(&category).cloned().unwrap_or_default()
    }
}

/// Builder for [`HookRegistry`]
#[derive(Debug, Default)]
pub struct HookRegistryBuilder {
    hooks: HashMap<HookCategory, HookSet>,
}

impl HookRegistryBuilder {
    /// Register a hook for a category. Duplicate names within a category are
    /// ignored; the first registration keeps its position.
    pub fn hook(mut self, category: HookCategory, hook: HookHandle) -> Self {
        let name = hook.name().to_string();
        if !self.hooks.entry(category).or_default().insert(hook) {
            tracing::warn!(hook = %name, category = %category, "Duplicate hook ignored");
        }
        self
    }

    pub fn before_suite(self, hook: HookHandle) -> Self {
        self.hook(HookCategory::BeforeSuite, hook)
    }

    pub fn after_suite(self, hook: HookHandle) -> Self {
        self.hook(HookCategory::AfterSuite, hook)
    }

    pub fn before_spec(self, hook: HookHandle) -> Self {
        self.hook(HookCategory::BeforeSpec, hook)
    }

    pub fn after_spec(self, hook: HookHandle) -> Self {
        self.hook(HookCategory::AfterSpec, hook)
    }

    pub fn before_scenario(self, hook: HookHandle) -> Self {
        self.hook(HookCategory::BeforeScenario, hook)
    }

    pub fn after_scenario(self, hook: HookHandle) -> Self {
        self.hook(HookCategory::AfterScenario, hook)
    }

    pub fn before_step(self, hook: HookHandle) -> Self {
        self.hook(HookCategory::BeforeStep, hook)
    }

    pub fn after_step(self, hook: HookHandle) -> Self {
        self.hook(HookCategory::AfterStep, hook)
    }

    pub fn build(self) -> HookRegistry {
        HookRegistry { hooks: self.hooks }
    }
}

/// Step implementations keyed by parameterised step text
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    steps: IndexMap<String, StepHandle>,
}

impl StepRegistry {
    pub fn builder() -> StepRegistryBuilder {
        StepRegistryBuilder::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, text: &str) -> Option<&StepHandle> {
        self.steps.get(text)
    }

    pub fn contains(&self, text: &str) -> bool {
        self.steps.contains_key(text)
    }

    /// Registered step texts in registration order
    pub fn step_texts(&self) -> Vec<String> {
        self.steps.keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.steps.len()
    }
}

/// Builder for [`StepRegistry`]
#[derive(Debug, Default)]
pub struct StepRegistryBuilder {
    steps: IndexMap<String, StepHandle>,
}

impl StepRegistryBuilder {
    /// Register a step implementation. A second implementation for the same
    /// text is ignored.
    pub fn step(mut self, step: StepHandle) -> Self {
        if self.steps.contains_key(step.text()) {
            tracing::warn!(step = %step.text(), "Duplicate step implementation ignored");
        } else {
            self.steps.insert(step.text().to_string(), step);
        }
        self
    }

    pub fn build(self) -> StepRegistry {
        StepRegistry { steps: self.steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> HookHandle {
        HookHandle::new(name, |_| Ok(()))
    }

    #[test]
    fn test_unregistered_category_is_empty() {
        let registry = HookRegistry::builder().after_suite(noop("a")).build();

        for category in HookCategory::ALL {
            if category != HookCategory::AfterSuite {
                assert!(registry.get(category).is_empty(), "{category} should be empty");
            }
        }
        assert!(HookRegistry::empty().get(HookCategory::AfterSuite).is_empty());
    }

    #[test]
    fn test_registration_order_and_uniqueness() {
        let registry = HookRegistry::builder()
            .before_scenario(noop("login"))
            .before_scenario(noop("seed"))
            .before_scenario(noop("login"))
            .before_scenario(noop("clock"))
            .build();

        let set = registry.get(HookCategory::BeforeScenario);
        assert_eq!(set.names(), vec!["login", "seed", "clock"]);
        assert_eq!(registry.count(), 3);

        // Same instance, same order on every read
        assert_eq!(registry.get(HookCategory::BeforeScenario).names(), set.names());
    }

    #[test]
    fn test_same_name_keeps_first_body() {
        let registry = HookRegistry::builder()
            .after_spec(HookHandle::new("cleanup", |_| Ok(())))
            .after_spec(HookHandle::new("cleanup", |_| Err(gauge_rust_sdk::HookError::failed("second"))))
            .build();

        let set = registry.get(HookCategory::AfterSpec);
        assert_eq!(set.len(), 1);
        let info = gauge_rust_sdk::ExecutionInfo::default();
        assert!(set.iter().all(|hook| hook.invoke(&info).is_ok()));
    }

    #[test]
    fn test_step_registry() {
        let steps = StepRegistry::builder()
            .step(StepHandle::new("Open {}", |_args: &[String]| Ok(())))
            .step(StepHandle::new("Close", |_args: &[String]| Ok(())))
            .step(StepHandle::new("Open {}", |_args: &[String]| Err(gauge_rust_sdk::HookError::failed("dup"))))
            .build();

        assert_eq!(steps.step_texts(), vec!["Open {}".to_string(), "Close".to_string()]);
        assert!(steps.get("Open {}").unwrap().invoke(&["x".into()]).is_ok());
        assert!(!steps.contains("Missing"));
    }
}
