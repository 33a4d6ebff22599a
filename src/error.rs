// ABOUTME: The operational error type shared by connection, session and client layers

use std::io;
use thiserror::Error;

use crate::codec::CodecError;
use crate::datatypes::{AddressError, CommandStatus, TimeFormatError};
use crate::segmenter::SegmentError;

/// Errors surfaced by SMPP operations.
///
/// Fatal kinds (`Transport`, `ConnectionClosed`, `Codec`,
/// `ProtocolViolation`) leave the session Closed: once framing or
/// correlation breaks there is no way to realign the byte stream.
/// `Timeout` is retryable and leaves the session usable; the response may
/// still arrive and will be matched to its request. Status failures
/// (`BindFailed`, `SubmitFailed`) describe one rejected request, except
/// that a failed bind also closes the transport.
#[derive(Debug, Error)]
pub enum SmppError {
    /// I/O failure on the underlying byte stream. Fatal to the session.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The peer closed the connection.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A read or connect deadline expired. Retryable.
    #[error("operation timed out")]
    Timeout,

    /// Malformed inbound PDU. Fatal to the session.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// An address failed validation before anything was sent.
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    /// A schedule or validity time string failed validation.
    #[error(transparent)]
    InvalidTime(#[from] TimeFormatError),

    /// The message cannot be segmented under the configured policy.
    #[error(transparent)]
    Segmentation(#[from] SegmentError),

    /// The SMSC rejected a bind request; the transport has been closed.
    #[error("bind rejected by SMSC: {status}")]
    BindFailed { status: CommandStatus },

    /// The SMSC rejected a submit_sm; the session stays bound.
    #[error("submit_sm rejected by SMSC: {status}")]
    SubmitFailed { status: CommandStatus },

    /// A matched response carried a command id this library does not know.
    #[error("response with unknown command_id {command_id:#010x}")]
    UnknownCommand { command_id: u32 },

    /// The peer broke the request/response protocol.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The operation is not valid in the session's current state.
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),
}

/// Result alias used throughout the crate.
pub type SmppResult<T> = Result<T, SmppError>;
