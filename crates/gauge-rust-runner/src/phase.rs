//! Phase selection and the start phase
//!
//! Gauge launches the runner twice over a project's life: once with `--init`
//! to scaffold files, and for every run with anything else to serve requests.

use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::config::RunnerConfig;
use crate::dispatcher::ProcessorDispatcher;
use crate::message_loop::{self, LoopExit};
use crate::transport::{TcpTransport, Transport};

/// Argument Gauge passes for the one-time setup phase
pub const INIT_FLAG: &str = "--init";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseExecutorKind {
    Setup,
    Start,
}

/// Pick the phase for the launch argument. Anything other than `--init`,
/// including no argument at all, starts the runner.
pub fn select(indicator: Option<&str>) -> PhaseExecutorKind {
    match indicator {
        Some(INIT_FLAG) => PhaseExecutorKind::Setup,
        _ => PhaseExecutorKind::Start,
    }
}

/// One runner phase, run to completion
pub trait PhaseExecutor {
    fn execute(&self) -> Result<()>;
}

/// Connects to Gauge and serves requests until disconnect or kill
pub struct StartPhaseExecutor {
    config: RunnerConfig,
    dispatcher: ProcessorDispatcher,
}

impl StartPhaseExecutor {
    pub fn new(config: RunnerConfig, dispatcher: ProcessorDispatcher) -> Self {
        Self { config, dispatcher }
    }

    /// Serve requests over an already-open transport.
    pub fn run_on<T: Transport>(&self, transport: &mut T) -> Result<LoopExit> {
        message_loop::run(transport, &self.dispatcher).context("Message loop terminated by a protocol fault")
    }
}

impl PhaseExecutor for StartPhaseExecutor {
    fn execute(&self) -> Result<()> {
        let address = self.config.address()?;
        let timeout = Duration::from_secs(self.config.connect_timeout_secs);

        tracing::info!(%address, "Connecting to Gauge");
        let mut transport = TcpTransport::connect(&address, timeout)?;

        let exit = self.run_on(&mut transport)?;
        tracing::info!(?exit, "Runner stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::IoTransport;
    use gauge_rust_sdk::ipc;
    use gauge_rust_sdk::message::KillProcessRequest;
    use gauge_rust_sdk::{Message, MessageType, Payload};
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn test_init_selects_setup() {
        assert_eq!(select(Some("--init")), PhaseExecutorKind::Setup);
    }

    #[test]
    fn test_everything_else_selects_start() {
        assert_eq!(select(Some("")), PhaseExecutorKind::Start);
        assert_eq!(select(None), PhaseExecutorKind::Start);
        assert_eq!(select(Some("--start")), PhaseExecutorKind::Start);
        assert_eq!(select(Some("init")), PhaseExecutorKind::Start);
    }

    fn config(port: Option<&str>) -> RunnerConfig {
        RunnerConfig {
            project_root: PathBuf::from("."),
            host: "127.0.0.1".into(),
            internal_port: port.map(str::to_string),
            connect_timeout_secs: 0,
            screenshot_on_failure: false,
        }
    }

    #[test]
    fn test_start_without_port_fails() {
        let start = StartPhaseExecutor::new(config(None), ProcessorDispatcher::new());
        let err = start.execute().unwrap_err();
        assert!(err.to_string().contains("GAUGE_INTERNAL_PORT"));
    }

    #[test]
    fn test_run_on_stops_at_kill() {
        let dispatcher = ProcessorDispatcher::new()
            .with_processor(MessageType::KillProcessRequest, crate::processors::KillProcessProcessor);
        let start = StartPhaseExecutor::new(config(Some("1")), dispatcher);

        let mut wire = Vec::new();
        ipc::write_message(
            &mut wire,
            &Message::new(3, MessageType::KillProcessRequest, Payload::KillProcessRequest(KillProcessRequest {})),
        )
        .unwrap();
        let mut transport = IoTransport::new(Cursor::new(wire), Vec::new());

        assert_eq!(start.run_on(&mut transport).unwrap(), LoopExit::Killed);
        assert!(!transport.is_connected());
    }
}
