//! Sequential request/response loop
//!
//! Messages are handled strictly one at a time in arrival order, and each
//! response is written before the next frame is read.

use gauge_rust_sdk::{ipc, IpcError, MessageType};

use crate::dispatcher::ProcessorDispatcher;
use crate::error::ProtocolError;
use crate::transport::Transport;

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Gauge closed the connection
    HostClosed,
    /// A kill request was acknowledged
    Killed,
    /// The connection failed mid-session (reset, broken pipe, truncated frame)
    TransportClosed,
}

/// Serve requests from `transport` until Gauge disconnects or asks the runner
/// to stop.
///
/// Any protocol fault (malformed frame, undecodable message, unknown message
/// type, payload that does not fit its type) closes the transport and is
/// returned. An I/O failure on the connection is not a fault: the host is
/// gone, so the loop ends with [`LoopExit::TransportClosed`].
pub fn run<T: Transport>(transport: &mut T, dispatcher: &ProcessorDispatcher) -> Result<LoopExit, ProtocolError> {
    let exit = serve(transport, dispatcher);
    transport.close();

    match &exit {
        Ok(reason) => tracing::info!(?reason, "Message loop finished"),
        Err(e) => tracing::error!(error = %e, "Message loop aborted"),
    }
    exit
}

fn serve<T: Transport>(transport: &mut T, dispatcher: &ProcessorDispatcher) -> Result<LoopExit, ProtocolError> {
    loop {
        let frame = match transport.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(LoopExit::HostClosed),
            Err(IpcError::Io(e)) => return Ok(connection_lost("read", e)),
            Err(e) => return Err(e.into()),
        };

        let request = ipc::decode_message(&frame)?;
        let request_type = request.message_type;
        tracing::debug!(message_id = request.message_id, message_type = %request_type, "Received");

        let response = dispatcher.dispatch(request)?;
        match transport.write_frame(&ipc::encode_message(&response)) {
            Ok(()) => {}
            Err(IpcError::Io(e)) => return Ok(connection_lost("write", e)),
            Err(e) => return Err(e.into()),
        }
        tracing::debug!(message_id = response.message_id, message_type = %response.message_type, "Sent");

        if request_type == MessageType::KillProcessRequest {
            return Ok(LoopExit::Killed);
        }
    }
}

fn connection_lost(op: &str, error: std::io::Error) -> LoopExit {
    tracing::warn!(op, error = %error, "Connection to Gauge lost");
    LoopExit::TransportClosed
}
