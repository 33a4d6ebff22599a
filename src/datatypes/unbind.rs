use bytes::BytesMut;

use crate::codec::Encodable;
use crate::datatypes::CommandId;

/// unbind PDU (Section 4.2.1). Announces that the sender is about to end
/// the session; no body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unbind {
    pub sequence_number: u32,
}

/// unbind_resp PDU (Section 4.2.2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnbindResponse {
    pub sequence_number: u32,
}

impl Encodable for Unbind {
    fn command_id(&self) -> CommandId {
        CommandId::Unbind
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn encode_body(&self, _buf: &mut BytesMut) {}
}

impl Encodable for UnbindResponse {
    fn command_id(&self) -> CommandId {
        CommandId::UnbindResp
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn encode_body(&self, _buf: &mut BytesMut) {}
}
