//! Gauge Rust Runner - the execution side of the Gauge runner protocol
//!
//! Gauge launches the runner as a child process. With `--init` the runner
//! scaffolds a project and exits; otherwise it connects back to Gauge and
//! answers lifecycle, step and data store requests one at a time, running the
//! user's hooks and steps along the way.
//!
//! # Example
//!
//! ```ignore
//! use gauge_rust_runner::prelude::*;
//!
//! runner_main! {
//!     hooks: HookRegistry::builder()
//!         .after_suite(HookHandle::new("report", |_info| Ok(())))
//!         .build(),
//!     steps: StepRegistry::builder()
//!         .step(StepHandle::new("Say {}", |args| {
//!             println!("{}", args[0]);
//!             Ok(())
//!         }))
//!         .build(),
//! }
//! ```

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod message_loop;
pub mod phase;
pub mod processors;
pub mod registry;
pub mod setup;
pub mod transport;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use gauge_rust_sdk::ScreenGrabber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::RunnerConfig;
use crate::dispatcher::ProcessorDispatcher;
use crate::executor::HookExecutor;
use crate::phase::{PhaseExecutor, PhaseExecutorKind, StartPhaseExecutor};
use crate::registry::{HookRegistry, HookSource, StepRegistry};
use crate::setup::SetupPhaseExecutor;

pub use error::ProtocolError;
pub use gauge_rust_sdk as sdk;

pub mod prelude {
    //! Everything a test project needs to declare hooks and steps
    pub use crate::config::RunnerConfig;
    pub use crate::registry::{HookCategory, HookRegistry, StepRegistry};
    pub use crate::{runner_main, Runner};
    pub use gauge_rust_sdk::prelude::*;
}

/// Hooks, steps and settings for one runner process
pub struct Runner {
    config: RunnerConfig,
    hooks: Arc<dyn HookSource>,
    steps: Arc<StepRegistry>,
    screen_grabber: Option<Arc<dyn ScreenGrabber>>,
}

impl Runner {
    /// Runner with no hooks or steps registered.
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            hooks: Arc::new(HookRegistry::empty()),
            steps: Arc::new(StepRegistry::empty()),
            screen_grabber: None,
        }
    }

    pub fn with_hooks(mut self, hooks: impl HookSource + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn with_steps(mut self, steps: StepRegistry) -> Self {
        self.steps = Arc::new(steps);
        self
    }

    /// Capture screenshots on failure. Ignored when `screenshot_enabled` is
    /// turned off in the environment.
    pub fn with_screen_grabber(mut self, grabber: impl ScreenGrabber + 'static) -> Self {
        self.screen_grabber = Some(Arc::new(grabber));
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Executor used for every hook batch and step
    pub fn executor(&self) -> HookExecutor {
        match &self.screen_grabber {
            Some(grabber) if self.config.screenshot_on_failure => {
                HookExecutor::new().with_screen_grabber(Arc::clone(grabber))
            }
            _ => HookExecutor::new(),
        }
    }

    /// Dispatcher serving every request type with this runner's registries
    pub fn dispatcher(&self) -> ProcessorDispatcher {
        ProcessorDispatcher::standard(
            Arc::clone(&self.hooks),
            Arc::clone(&self.steps),
            Arc::new(self.executor()),
        )
    }

    pub fn phase_executor(&self, kind: PhaseExecutorKind) -> Box<dyn PhaseExecutor> {
        match kind {
            PhaseExecutorKind::Setup => Box::new(SetupPhaseExecutor::new(self.config.project_root.clone())),
            PhaseExecutorKind::Start => Box::new(StartPhaseExecutor::new(self.config.clone(), self.dispatcher())),
        }
    }

    /// Select the phase for `indicator` and run it to completion.
    pub fn run_phase(&self, indicator: Option<&str>) -> anyhow::Result<()> {
        let kind = phase::select(indicator);
        tracing::debug!(?kind, ?indicator, "Phase selected");
        self.phase_executor(kind).execute()
    }
}

/// Install the stderr log subscriber. Stdout is left to Gauge's console capture.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gauge_rust_runner=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Process entry point: parse the launch argument and run the chosen phase.
///
/// A missing argument prints usage and exits before any phase is selected.
pub fn run(runner: Runner) -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match runner.run_phase(Some(cli.phase())) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Runner failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Define `main` for a test project's runner binary.
///
/// ```ignore
/// runner_main! {
///     hooks: my_hooks(),
///     steps: my_steps(),
///     screen_grabber: || Some(capture_png()),
/// }
/// ```
#[macro_export]
macro_rules! runner_main {
    (hooks: $hooks:expr, steps: $steps:expr $(, screen_grabber: $grabber:expr)? $(,)?) => {
        fn main() -> ::std::process::ExitCode {
            $crate::run(
                $crate::Runner::new($crate::config::RunnerConfig::from_env())
                    .with_hooks($hooks)
                    .with_steps($steps)
                    $( .with_screen_grabber($grabber) )?,
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MethodExecutor;
    use gauge_rust_sdk::{HookError, StepHandle};
    use std::path::PathBuf;

    fn config(root: PathBuf, screenshots: bool) -> RunnerConfig {
        RunnerConfig {
            project_root: root,
            host: "127.0.0.1".into(),
            internal_port: None,
            connect_timeout_secs: 0,
            screenshot_on_failure: screenshots,
        }
    }

    fn failing_step() -> StepHandle {
        StepHandle::new("Fail", |_args: &[String]| Err(HookError::failed("boom")))
    }

    #[test]
    fn test_init_phase_scaffolds_project() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = Runner::new(config(dir.path().to_path_buf(), true));

        runner.run_phase(Some("--init")).unwrap();
        assert!(dir.path().join("env/default/rust.properties").is_file());
    }

    #[test]
    fn test_start_phase_needs_port() {
        let runner = Runner::new(config(PathBuf::from("."), true));
        assert!(runner.run_phase(None).is_err());
    }

    #[test]
    fn test_screenshot_attached_when_enabled() {
        let runner = Runner::new(config(PathBuf::from("."), true)).with_screen_grabber(|| Some(vec![1u8, 2, 3]));
        let result = runner.executor().execute_step(&failing_step(), &[]);
        assert_eq!(result.screenshot, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_screenshot_skipped_when_disabled() {
        let runner = Runner::new(config(PathBuf::from("."), false)).with_screen_grabber(|| Some(vec![1u8, 2, 3]));
        let result = runner.executor().execute_step(&failing_step(), &[]);
        assert!(result.failed);
        assert_eq!(result.screenshot, None);
    }
}
