//! Hook and step execution
//!
//! The executor runs a batch of hooks (or a single step) and folds the outcome
//! into one [`ExecutionResult`]. Failures never escape: an `Err` return or a
//! panic inside a hook body becomes `failed = true` on the result.
//!
//! Batches are fail-fast. The first failing hook ends the batch and the hooks
//! registered after it are not invoked.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use gauge_rust_sdk::{ExecutionInfo, ExecutionResult, HookError, ScreenGrabber, StepHandle};

use crate::registry::HookSet;

/// Runs hooks and steps, producing execution results
pub trait MethodExecutor: Send + Sync {
    /// Invoke `hooks` in order against `info`.
    fn execute_hooks(&self, hooks: &HookSet, info: &ExecutionInfo) -> ExecutionResult;

    /// Invoke one step implementation with its arguments.
    fn execute_step(&self, step: &StepHandle, args: &[String]) -> ExecutionResult;
}

/// Details of the first failure in a batch
struct Failure {
    message: String,
    stack_trace: String,
}

/// Default [`MethodExecutor`]
#[derive(Default)]
pub struct HookExecutor {
    screen_grabber: Option<Arc<dyn ScreenGrabber>>,
}

impl HookExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach screenshots from `grabber` to failed results.
    pub fn with_screen_grabber(mut self, grabber: Arc<dyn ScreenGrabber>) -> Self {
        self.screen_grabber = Some(grabber);
        self
    }

    fn build_result(&self, started: Instant, failure: Option<Failure>) -> ExecutionResult {
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match failure {
            None => ExecutionResult::passed(elapsed),
            Some(failure) => {
                let mut result = ExecutionResult::failure(elapsed, failure.message)
                    .with_stack_trace(failure.stack_trace);
                if let Some(screenshot) = self.screen_grabber.as_ref().and_then(|g| g.take_screenshot()) {
                    result = result.with_screenshot(screenshot);
                }
                result
            }
        }
    }
}

impl MethodExecutor for HookExecutor {
    fn execute_hooks(&self, hooks: &HookSet, info: &ExecutionInfo) -> ExecutionResult {
        let started = Instant::now();
        let mut failure = None;

        for hook in hooks.iter() {
            tracing::debug!(hook = %hook.name(), "Invoking hook");

            if let Err(f) = guarded(&format!("hook `{}`", hook.name()), || hook.invoke(info)) {
                tracing::warn!(hook = %hook.name(), error = %f.message, "Hook failed, skipping the rest of the batch");
                failure = Some(f);
                break;
            }
        }

        self.build_result(started, failure)
    }

    fn execute_step(&self, step: &StepHandle, args: &[String]) -> ExecutionResult {
        let started = Instant::now();
        tracing::debug!(step = %step.text(), args = args.len(), "Invoking step");

        let failure = guarded(&format!("step `{}`", step.text()), || step.invoke(args)).err();
        if let Some(f) = &failure {
            tracing::warn!(step = %step.text(), error = %f.message, "Step failed");
        }

        self.build_result(started, failure)
    }
}

/// Run a hook or step body, turning an error or a panic into a [`Failure`].
fn guarded<F>(location: &str, body: F) -> Result<(), Failure>
where
    F: FnOnce() -> Result<(), HookError>,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(Failure {
            message: err.to_string(),
            stack_trace: format!("{}\n    in {}", err.chain(), location),
        }),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            Err(Failure {
                stack_trace: format!("panicked: {}\n    in {}", message, location),
                message,
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
