//! Command line of the runner binary

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "gauge-rust-runner")]
#[command(about = "Gauge language runner for Rust", long_about = None)]
pub struct Cli {
    /// Launch phase: `--init` scaffolds a project, anything else starts the runner
    #[arg(allow_hyphen_values = true)]
    pub phase: String,
}

impl Cli {
    pub fn phase(&self) -> &str {
        &self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_flag_is_taken_as_phase() {
        let cli = Cli::try_parse_from(["gauge-rust-runner", "--init"]).unwrap();
        assert_eq!(cli.phase(), "--init");
    }

    #[test]
    fn test_empty_phase_is_accepted() {
        let cli = Cli::try_parse_from(["gauge-rust-runner", ""]).unwrap();
        assert_eq!(cli.phase(), "");
    }

    #[test]
    fn test_missing_phase_is_a_usage_error() {
        let err = Cli::try_parse_from(["gauge-rust-runner"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_extra_arguments_rejected() {
        assert!(Cli::try_parse_from(["gauge-rust-runner", "--start", "extra"]).is_err());
    }
}
