use bytes::BytesMut;

use crate::codec::Encodable;
use crate::datatypes::{CommandId, CommandStatus};

/// generic_nack PDU (Section 4.3.1). Sent in response to a PDU that could
/// not be understood; the status says why. When the offending PDU's
/// sequence number could not even be read, sequence 0 is used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericNack {
    pub sequence_number: u32,
    pub command_status: CommandStatus,
}

impl GenericNack {
    /// The nack this ESME sends for a request with an unrecognized
    /// command id.
    pub fn invalid_command_id(sequence_number: u32) -> Self {
        Self {
            sequence_number,
            command_status: CommandStatus::InvalidCommandId,
        }
    }
}

impl Encodable for GenericNack {
    fn command_id(&self) -> CommandId {
        CommandId::GenericNack
    }

    fn command_status(&self) -> CommandStatus {
        self.command_status
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn encode_body(&self, _buf: &mut BytesMut) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nack_carries_status() {
        let bytes = GenericNack::invalid_command_id(7).to_bytes();
        assert_eq!(
            bytes.as_ref(),
            &[
                0x00, 0x00, 0x00, 0x10, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x00,
                0x00, 0x00, 0x07,
            ]
        );
    }
}
