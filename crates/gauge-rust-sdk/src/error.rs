//! Error types for Gauge hooks, steps and the runner IPC

use thiserror::Error;

/// Errors a hook or step implementation can return.
///
/// A returned error fails the current hook batch or step; it never aborts the
/// runner itself.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

impl HookError {
    /// Shorthand for a plain failure message.
    pub fn failed(message: impl Into<String>) -> Self {
        HookError::Failed(message.into())
    }

    /// Render the error and its source chain, one cause per line.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\ncaused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

/// Errors raised while framing or decoding protocol messages
#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Failed to decode message: {0}")]
    Decode(#[source] prost::DecodeError),

    /// Well-formed protobuf that does not map onto a runner message
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_error_chain_includes_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
        let err = HookError::from(io);
        assert_eq!(err.chain(), "IO error: config.toml\ncaused by: config.toml");

        let err = HookError::failed("login button missing");
        assert_eq!(err.to_string(), "login button missing");
    }
}
