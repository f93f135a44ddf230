//! Gauge Rust Runner - standalone binary
//!
//! Runs with empty registries. Test projects that define hooks and steps build
//! their own binary with `runner_main!`.

use std::process::ExitCode;

use gauge_rust_runner::config::RunnerConfig;
use gauge_rust_runner::Runner;

fn main() -> ExitCode {
    gauge_rust_runner::run(Runner::new(RunnerConfig::from_env()))
}
