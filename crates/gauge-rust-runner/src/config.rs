//! Runner configuration

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Environment variable Gauge sets to the port the runner must connect to
pub const GAUGE_INTERNAL_PORT: &str = "GAUGE_INTERNAL_PORT";

/// Runner configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Root of the Gauge project (where `--init` scaffolds files)
    pub project_root: PathBuf,

    /// Host Gauge listens on
    pub host: String,

    /// Port Gauge listens on for this runner, required by the start phase
    pub internal_port: Option<String>,

    /// How long to keep retrying the initial connection, in seconds
    pub connect_timeout_secs: u64,

    /// Attach a screenshot to failed results when a grabber is configured
    pub screenshot_on_failure: bool,
}

impl RunnerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            project_root: env::var("GAUGE_PROJECT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),

            host: env::var("GAUGE_RUNNER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),

            internal_port: env::var(GAUGE_INTERNAL_PORT)
                .ok()
                .filter(|s| !s.is_empty()),

            connect_timeout_secs: env::var("GAUGE_RUNNER_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),

            screenshot_on_failure: env::var("screenshot_enabled")
                .map(|s| !s.trim().eq_ignore_ascii_case("false"))
                .unwrap_or(true),
        }
    }

    /// Parsed internal port, or a descriptive error when unset or malformed.
    pub fn port(&self) -> Result<u16> {
        let raw = self
            .internal_port
            .as_deref()
            .ok_or_else(|| anyhow!("{} not set", GAUGE_INTERNAL_PORT))?;
        raw.trim()
            .parse()
            .map_err(|_| anyhow!("{} is not a valid port: {}", GAUGE_INTERNAL_PORT, raw))
    }

    /// `host:port` address of Gauge's internal listener.
    pub fn address(&self) -> Result<String> {
        Ok(format!("{}:{}", self.host, self.port()?))
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
