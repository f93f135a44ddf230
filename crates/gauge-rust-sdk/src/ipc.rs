//! IPC framing and codec for talking to Gauge.
//!
//! Each frame is an unsigned LEB128 varint length followed by that many payload
//! bytes. The payload is a protobuf `gauge.messages.Message`, see
//! [`crate::proto`].
//!
//! ```text
//! +----------------+--------------------------------+
//! | varint length  | protobuf message (length bytes)|
//! +----------------+--------------------------------+
//! ```
//!
//! All functions here are blocking and work over any `Read`/`Write`, so the
//! same code serves a TCP stream in production and a `Cursor` in tests.

use bytes::{BufMut, Bytes, BytesMut};
use prost::Message as ProstMessage;
use std::io::{self, Read, Write};

use crate::error::IpcError;
use crate::message::Message;
use crate::proto;

/// Longest possible encoding of a u64 varint
const MAX_VARINT_LEN: usize = 10;

/// Upper bound on a single frame, guards against a corrupt length prefix
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Read one frame.
///
/// Returns `Ok(None)` when the stream ends cleanly before a new frame starts,
/// which is how Gauge signals that it closed the connection.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Bytes>, IpcError> {
    // Read the varint length prefix one byte at a time
    let mut prefix = BytesMut::with_capacity(MAX_VARINT_LEN);
    loop {
        let mut byte = [0u8; 1];
        match reader.read(&mut byte) {
            Ok(0) if prefix.is_empty() => return Ok(None),
            Ok(0) => {
                return Err(IpcError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream closed inside length prefix",
                )));
            }
            Ok(_) => {
                prefix.put_u8(byte[0]);
                if byte[0] & 0x80 == 0 {
                    break;
                }
                if prefix.len() == MAX_VARINT_LEN {
                    return Err(IpcError::InvalidFrame("length prefix too long".into()));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(IpcError::Io(e)),
        }
    }

    let len = prost::encoding::decode_varint(&mut prefix.freeze())
        .map_err(|e| IpcError::InvalidFrame(format!("bad length prefix: {}", e)))?;
    let len = usize::try_from(len)
        .ok()
        .filter(|len| *len <= MAX_FRAME_LEN)
        .ok_or_else(|| IpcError::InvalidFrame(format!("frame of {} bytes exceeds limit", len)))?;
    if len == 0 {
        return Err(IpcError::InvalidFrame("empty frame".into()));
    }

    // Read the payload
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;

    Ok(Some(Bytes::from(payload)))
}

/// Write one frame and flush it.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), IpcError> {
    let mut frame = BytesMut::with_capacity(payload.len() + MAX_VARINT_LEN);
    prost::encoding::encode_varint(payload.len() as u64, &mut frame);
    frame.extend_from_slice(payload);

    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Serialize a message into frame payload bytes.
pub fn encode_message(message: &Message) -> Vec<u8> {
    proto::Message::from(message).encode_to_vec()
}

/// Parse frame payload bytes into a message.
pub fn decode_message(bytes: &[u8]) -> Result<Message, IpcError> {
    let wire = proto::Message::decode(bytes).map_err(IpcError::Decode)?;
    Message::try_from(wire)
}

/// Read and decode the next message, `None` on clean end of stream.
pub fn read_message<R: Read>(reader: &mut R) -> Result<Option<Message>, IpcError> {
    match read_frame(reader)? {
        Some(frame) => decode_message(&frame).map(Some),
        None => Ok(None),
    }
}

/// Encode and write a message as one frame.
pub fn write_message<W: Write>(writer: &mut W, message: &Message) -> Result<(), IpcError> {
    write_frame(writer, &encode_message(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{KillProcessRequest, MessageType, Payload};
    use crate::result::ExecutionResult;
    use std::io::Cursor;

    #[test]
    fn test_frames_in_sequence_then_clean_eof() {
        let mut wire = Vec::new();
        write_frame(&mut wire, b"first").unwrap();
        write_frame(&mut wire, &[7u8; 300]).unwrap();

        // 300 needs a two byte varint
        assert_eq!(&wire[..6], b"\x05first");
        assert_eq!(&wire[6..8], &[0xAC, 0x02]);

        let mut reader = Cursor::new(wire);
        assert_eq!(read_frame(&mut reader).unwrap().unwrap(), Bytes::from_static(b"first"));
        assert_eq!(read_frame(&mut reader).unwrap().unwrap().len(), 300);
        assert!(read_frame(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_truncated_payload_is_an_error() {
        let mut reader = Cursor::new(vec![0x05, b'a', b'b']);
        assert!(matches!(read_frame(&mut reader), Err(IpcError::Io(_))));
    }

    #[test]
    fn test_empty_frame_rejected() {
        let mut reader = Cursor::new(vec![0x00]);
        assert!(matches!(read_frame(&mut reader), Err(IpcError::InvalidFrame(_))));
    }

    #[test]
    fn test_eof_inside_prefix() {
        let mut reader = Cursor::new(vec![0x80]);
        match read_frame(&mut reader) {
            Err(IpcError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected EOF error, got {:?}", other),
        }
    }

    #[test]
    fn test_message_over_frames() {
        let kill = Message::new(
            3,
            MessageType::KillProcessRequest,
            Payload::KillProcessRequest(KillProcessRequest {}),
        );
        let status = Message::execution_status(3, ExecutionResult::passed(0));

        let mut wire = Vec::new();
        write_message(&mut wire, &kill).unwrap();
        write_message(&mut wire, &status).unwrap();

        let mut reader = Cursor::new(wire);
        assert_eq!(read_message(&mut reader).unwrap(), Some(kill));
        assert_eq!(read_message(&mut reader).unwrap(), Some(status));
        assert_eq!(read_message(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_garbage_payload_fails_decode() {
        // field 1 announced as length-delimited with a length past the end
        assert!(matches!(decode_message(&[0x0A, 0x7F]), Err(IpcError::Decode(_))));
    }
}
