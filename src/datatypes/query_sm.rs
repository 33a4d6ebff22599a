use bytes::BytesMut;
use num_enum::{FromPrimitive, IntoPrimitive};
use std::io::Cursor;

use crate::codec::{decode_cstring, decode_u8, encode_cstring, CodecError, Encodable, Pdu};
use crate::datatypes::{Address, CommandId};

/// query_sm PDU (Section 4.8.1): asks the SMSC for the current state of a
/// previously submitted message. The source address must match the one
/// used on submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuerySm {
    pub sequence_number: u32,
    pub message_id: String,
    pub source: Address,
}

impl Encodable for QuerySm {
    fn command_id(&self) -> CommandId {
        CommandId::QuerySm
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        encode_cstring(buf, &self.message_id);
        buf.extend_from_slice(&[u8::from(self.source.ton()), u8::from(self.source.npi())]);
        encode_cstring(buf, self.source.value());
    }
}

/// Message states reported by query_sm_resp (Section 5.2.28).
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageState {
    Enroute = 1,
    Delivered = 2,
    Expired = 3,
    Deleted = 4,
    Undeliverable = 5,
    Accepted = 6,
    Unknown = 7,
    Rejected = 8,
    #[num_enum(catch_all)]
    Other(u8),
}

/// A parsed query_sm_resp body (Section 4.8.2).
///
/// `final_date` is the raw 16-char SMPP time string ("" while the message
/// is still in a non-final state); [`crate::datatypes::SmppTime::parse`]
/// turns it into a typed value when needed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuerySmResponse {
    pub message_id: String,
    pub final_date: String,
    pub message_state: MessageState,
    pub error_code: u8,
}

impl QuerySmResponse {
    pub fn parse(pdu: &Pdu) -> Result<Self, CodecError> {
        let mut buf = Cursor::new(pdu.body.as_ref());
        let message_id = decode_cstring(&mut buf, 65, "message_id")?;
        let final_date = decode_cstring(&mut buf, 17, "final_date")?;
        let message_state = MessageState::from(decode_u8(&mut buf, "message_state")?);
        let error_code = decode_u8(&mut buf, "error_code")?;
        Ok(Self {
            message_id,
            final_date,
            message_state,
            error_code,
        })
    }
}
