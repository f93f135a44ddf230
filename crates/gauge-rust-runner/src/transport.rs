//! Connection to Gauge
//!
//! The message loop only needs to move whole frames, so it talks to a
//! [`Transport`]. Production uses [`TcpTransport`]; tests drive the loop
//! through an [`IoTransport`] over in-memory buffers.

use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context as _, Result};
use bytes::Bytes;
use gauge_rust_sdk::ipc;
use gauge_rust_sdk::IpcError;

/// Delay between connection attempts while Gauge is still starting its listener
const CONNECT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Frame-level channel to Gauge
pub trait Transport {
    /// Next inbound frame, `None` once Gauge has closed its side.
    fn read_frame(&mut self) -> Result<Option<Bytes>, IpcError>;

    /// Send one frame.
    fn write_frame(&mut self, payload: &[u8]) -> Result<(), IpcError>;

    fn is_connected(&self) -> bool;

    /// Close the connection. Further reads return `None`.
    fn close(&mut self);
}

/// Transport over any reader/writer pair
pub struct IoTransport<R, W> {
    reader: R,
    writer: W,
    open: bool,
}

impl<R: Read, W: Write> IoTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer, open: true }
    }

    /// Give back the writer, e.g. to inspect what was sent.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: Read, W: Write> Transport for IoTransport<R, W> {
    fn read_frame(&mut self) -> Result<Option<Bytes>, IpcError> {
        if !self.open {
            return Ok(None);
        }
        ipc::read_frame(&mut self.reader)
    }

    fn write_frame(&mut self, payload: &[u8]) -> Result<(), IpcError> {
        if !self.open {
            return Err(IpcError::Io(std::io::ErrorKind::NotConnected.into()));
        }
        ipc::write_frame(&mut self.writer, payload)
    }

    fn is_connected(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        let _ = self.writer.flush();
        self.open = false;
    }
}

/// TCP connection to Gauge's internal port
pub struct TcpTransport {
    inner: IoTransport<BufReader<TcpStream>, BufWriter<TcpStream>>,
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to `address`, retrying until `timeout` elapses.
    ///
    /// Gauge launches the runner before it is guaranteed to be accepting, so
    /// early refusals are retried.
    pub fn connect(address: &str, timeout: Duration) -> Result<Self> {
        let deadline = Instant::now() + timeout;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match Self::try_connect(address) {
                Ok(stream) => {
                    tracing::debug!(address, attempts, "Connected to Gauge");
                    return Self::from_stream(stream);
                }
                Err(e) if Instant::now() < deadline => {
                    tracing::trace!(address, attempts, error = %e, "Connection attempt failed, retrying");
                    thread::sleep(CONNECT_RETRY_INTERVAL);
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to connect to Gauge at {} after {} attempt(s)", address, attempts)
                    });
                }
            }
        }
    }

    fn try_connect(address: &str) -> Result<TcpStream> {
        let addr = address
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| anyhow!("{} did not resolve to any address", address))?;
        Ok(TcpStream::connect(addr)?)
    }

    fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let reader = BufReader::new(stream.try_clone()?);
        let writer = BufWriter::new(stream.try_clone()?);
        Ok(Self {
            inner: IoTransport::new(reader, writer),
            stream,
        })
    }
}

impl Transport for TcpTransport {
    fn read_frame(&mut self) -> Result<Option<Bytes>, IpcError> {
        self.inner.read_frame()
    }

    fn write_frame(&mut self, payload: &[u8]) -> Result<(), IpcError> {
        self.inner.write_frame(payload)
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn close(&mut self) {
        if !self.inner.is_connected() {
            return;
        }
        self.inner.close();
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::debug!(error = %e, "Socket shutdown failed");
        }
    }
}
