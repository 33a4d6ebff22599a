use bytes::BytesMut;

use crate::codec::Encodable;
use crate::datatypes::CommandId;

/// enquire_link PDU (Section 4.11.1). Header only, no body. Sent by
/// either peer to confirm the session is alive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnquireLink {
    pub sequence_number: u32,
}

/// enquire_link_resp PDU (Section 4.11.2). Always carries status 0 and
/// echoes the request's sequence number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnquireLinkResponse {
    pub sequence_number: u32,
}

impl Encodable for EnquireLink {
    fn command_id(&self) -> CommandId {
        CommandId::EnquireLink
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn encode_body(&self, _buf: &mut BytesMut) {}
}

impl Encodable for EnquireLinkResponse {
    fn command_id(&self) -> CommandId {
        CommandId::EnquireLinkResp
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn encode_body(&self, _buf: &mut BytesMut) {}
}
