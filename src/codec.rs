// ABOUTME: SMPP v3.4 wire codec: header, field primitives and the Encodable trait
// ABOUTME: All multi-byte integers are big-endian; C-Octet Strings are NUL-terminated

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;
use thiserror::Error;

use crate::datatypes::{CommandId, CommandStatus, RESPONSE_BIT};

/// Maximum allowed PDU size. A command_length above this means the stream
/// is corrupt or the peer is hostile; either way the session cannot
/// continue.
pub const MAX_PDU_SIZE: u32 = 65_536;

/// SMPP v3.4 PDU header: four 32-bit fields in network byte order,
/// common to every PDU (Section 2.2.1).
///
/// `command_id` and `command_status` are kept raw so that PDUs with
/// unknown or vendor-specific codes survive parsing; the session layer has
/// to see those to answer them with generic_nack. Typed views are available
/// through [`PduHeader::command`] and [`PduHeader::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduHeader {
    /// Total PDU size including this header; always `16 + body length`.
    pub command_length: u32,
    pub command_id: u32,
    pub command_status: u32,
    pub sequence_number: u32,
}

impl PduHeader {
    pub const SIZE: usize = 16;

    /// Parse a header from the first 16 bytes of `bytes`. Trailing bytes
    /// are ignored. Length bounds are validated here so the framing layer
    /// can reject a desynchronized stream before trying to buffer a body.
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < Self::SIZE {
            return Err(CodecError::HeaderTooShort { actual: bytes.len() });
        }

        let mut buf = Cursor::new(bytes);
        let header = PduHeader {
            command_length: buf.get_u32(),
            command_id: buf.get_u32(),
            command_status: buf.get_u32(),
            sequence_number: buf.get_u32(),
        };

        if header.command_length < Self::SIZE as u32 || header.command_length > MAX_PDU_SIZE {
            return Err(CodecError::InvalidPduLength {
                length: header.command_length,
                min: Self::SIZE as u32,
                max: MAX_PDU_SIZE,
            });
        }

        Ok(header)
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.command_length);
        buf.put_u32(self.command_id);
        buf.put_u32(self.command_status);
        buf.put_u32(self.sequence_number);
    }

    /// Typed command id, if this header carries one of the known commands.
    pub fn command(&self) -> Option<CommandId> {
        CommandId::try_from(self.command_id).ok()
    }

    /// Typed command status. Total: unknown codes become
    /// [`CommandStatus::Other`].
    pub fn status(&self) -> CommandStatus {
        CommandStatus::from(self.command_status)
    }

    pub fn is_response(&self) -> bool {
        self.command_id & RESPONSE_BIT != 0
    }
}

/// A framed PDU: validated header plus the raw body octets.
///
/// Bodies are parsed lazily by the typed parsers in [`crate::datatypes`];
/// the framing layer never interprets them.
#[derive(Debug, Clone)]
pub struct Pdu {
    pub header: PduHeader,
    pub body: Bytes,
}

impl Pdu {
    pub fn command(&self) -> Option<CommandId> {
        self.header.command()
    }

    pub fn status(&self) -> CommandStatus {
        self.header.status()
    }

    pub fn sequence(&self) -> u32 {
        self.header.sequence_number
    }

    pub fn is_response(&self) -> bool {
        self.header.is_response()
    }
}

/// Outbound PDUs serialize themselves through this trait. The body is
/// written after a placeholder header and `command_length` is patched once
/// the final size is known, which keeps the length invariant
/// `command_length == 16 + body` true by construction.
pub trait Encodable {
    fn command_id(&self) -> CommandId;

    /// Requests always carry 0; the auto-generated responses override this.
    fn command_status(&self) -> CommandStatus {
        CommandStatus::Ok
    }

    fn sequence_number(&self) -> u32;

    fn encode_body(&self, buf: &mut BytesMut);

    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(64);
        buf.put_u32(0); // patched below
        buf.put_u32(self.command_id() as u32);
        buf.put_u32(u32::from(self.command_status()));
        buf.put_u32(self.sequence_number());
        self.encode_body(&mut buf);

        let length = buf.len() as u32;
        buf[0..4].copy_from_slice(&length.to_be_bytes());
        buf.freeze()
    }
}

/// Codec errors. Any of these on the inbound path is fatal to the session:
/// a byte stream that produced one cannot be resynchronized.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("PDU header requires 16 bytes, got {actual}")]
    HeaderTooShort { actual: usize },

    #[error("invalid command_length {length}: must be within {min}..={max}")]
    InvalidPduLength { length: u32, min: u32, max: u32 },

    #[error("PDU body ended inside field '{field}'")]
    TruncatedBody { field: &'static str },

    #[error("C-Octet String '{field}' exceeds its maximum without a NUL terminator")]
    MissingTerminator { field: &'static str },

    #[error("field '{field}' is not valid UTF-8")]
    Utf8 {
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Decode a single octet.
pub fn decode_u8(buf: &mut Cursor<&[u8]>, field: &'static str) -> Result<u8, CodecError> {
    if buf.remaining() < 1 {
        return Err(CodecError::TruncatedBody { field });
    }
    Ok(buf.get_u8())
}

/// Decode a big-endian 16-bit integer.
pub fn decode_u16(buf: &mut Cursor<&[u8]>, field: &'static str) -> Result<u16, CodecError> {
    if buf.remaining() < 2 {
        return Err(CodecError::TruncatedBody { field });
    }
    Ok(buf.get_u16())
}

/// Decode a big-endian 32-bit integer.
pub fn decode_u32(buf: &mut Cursor<&[u8]>, field: &'static str) -> Result<u32, CodecError> {
    if buf.remaining() < 4 {
        return Err(CodecError::TruncatedBody { field });
    }
    Ok(buf.get_u32())
}

/// Decode a C-Octet String: the bytes up to and including a NUL
/// terminator, of which at most `max_len` total may be consumed. The empty
/// string is the single byte 0x00.
pub fn decode_cstring(
    buf: &mut Cursor<&[u8]>,
    max_len: usize,
    field: &'static str,
) -> Result<String, CodecError> {
    let start = buf.position() as usize;
    let remaining = &buf.get_ref()[start..];
    let window = remaining.len().min(max_len);

    match remaining[..window].iter().position(|&b| b == 0) {
        Some(nul) => {
            let value = remaining[..nul].to_vec();
            buf.set_position((start + nul + 1) as u64);
            String::from_utf8(value).map_err(|source| CodecError::Utf8 { field, source })
        }
        None if remaining.len() < max_len => Err(CodecError::TruncatedBody { field }),
        None => Err(CodecError::MissingTerminator { field }),
    }
}

/// Decode exactly `len` raw octets.
pub fn decode_octets(
    buf: &mut Cursor<&[u8]>,
    len: usize,
    field: &'static str,
) -> Result<Bytes, CodecError> {
    if buf.remaining() < len {
        return Err(CodecError::TruncatedBody { field });
    }
    Ok(buf.copy_to_bytes(len))
}

/// Encode a C-Octet String: the value's bytes followed by a NUL.
pub fn encode_cstring(buf: &mut BytesMut, value: &str) {
    buf.put_slice(value.as_bytes());
    buf.put_u8(0);
}
