// ABOUTME: Defines the SMPP v3.4 command identifiers recognized by this ESME
// ABOUTME: Covers the bind/submit/deliver/query/link-management subset of Table 4-1

use num_enum::TryFromPrimitive;

/// SMPP v3.4 command identifiers (Table 4-1), restricted to the PDUs an
/// ESME-side session exchanges.
///
/// Bit 31 is the response indicator: a response PDU carries the request's
/// command_id with the top bit set. Command ids outside this set are valid
/// on the wire (vendor extensions, reserved ranges) and are handled by the
/// session dispatch layer, which is why [`crate::codec::PduHeader`] keeps
/// the raw `u32` and conversion happens through `try_from`.
#[derive(TryFromPrimitive)]
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandId {
    /// generic_nack PDU (Section 4.3.1) - error response for invalid PDUs
    GenericNack = 0x8000_0000,

    /// bind_receiver PDU (Section 4.1.3)
    BindReceiver = 0x0000_0001,
    /// bind_receiver_resp PDU (Section 4.1.4)
    BindReceiverResp = 0x8000_0001,
    /// bind_transmitter PDU (Section 4.1.1)
    BindTransmitter = 0x0000_0002,
    /// bind_transmitter_resp PDU (Section 4.1.2)
    BindTransmitterResp = 0x8000_0002,

    /// query_sm PDU (Section 4.8.1)
    QuerySm = 0x0000_0003,
    /// query_sm_resp PDU (Section 4.8.2)
    QuerySmResp = 0x8000_0003,

    /// submit_sm PDU (Section 4.4.1)
    SubmitSm = 0x0000_0004,
    /// submit_sm_resp PDU (Section 4.4.2)
    SubmitSmResp = 0x8000_0004,

    /// deliver_sm PDU (Section 4.6.1) - mobile originated SMS or receipt
    DeliverSm = 0x0000_0005,
    /// deliver_sm_resp PDU (Section 4.6.2)
    DeliverSmResp = 0x8000_0005,

    /// unbind PDU (Section 4.2.1)
    Unbind = 0x0000_0006,
    /// unbind_resp PDU (Section 4.2.2)
    UnbindResp = 0x8000_0006,

    /// bind_transceiver PDU (Section 4.2.5)
    BindTransceiver = 0x0000_0009,
    /// bind_transceiver_resp PDU (Section 4.2.6)
    BindTransceiverResp = 0x8000_0009,

    /// enquire_link PDU (Section 4.11.1) - keep-alive, either direction
    EnquireLink = 0x0000_0015,
    /// enquire_link_resp PDU (Section 4.11.2)
    EnquireLinkResp = 0x8000_0015,
}

/// Response indicator bit of the command_id field.
pub const RESPONSE_BIT: u32 = 0x8000_0000;

impl CommandId {
    /// Check whether this command id represents a response PDU.
    pub fn is_response(self) -> bool {
        (self as u32) & RESPONSE_BIT != 0
    }

    /// The response command id paired with this request.
    ///
    /// Defined for every request in the set; a response maps to itself so
    /// callers never observe a bogus pairing.
    pub fn response(self) -> CommandId {
        match self {
            CommandId::BindReceiver => CommandId::BindReceiverResp,
            CommandId::BindTransmitter => CommandId::BindTransmitterResp,
            CommandId::BindTransceiver => CommandId::BindTransceiverResp,
            CommandId::QuerySm => CommandId::QuerySmResp,
            CommandId::SubmitSm => CommandId::SubmitSmResp,
            CommandId::Unbind => CommandId::UnbindResp,
            CommandId::EnquireLink => CommandId::EnquireLinkResp,
            CommandId::DeliverSm => CommandId::DeliverSmResp,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_bit() {
        assert!(!CommandId::SubmitSm.is_response());
        assert!(CommandId::SubmitSmResp.is_response());
        assert!(CommandId::GenericNack.is_response());
        assert_eq!(CommandId::SubmitSm.response(), CommandId::SubmitSmResp);
        assert_eq!(CommandId::EnquireLink.response(), CommandId::EnquireLinkResp);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        assert!(CommandId::try_from(0x0000_000Au32).is_err());
        assert!(CommandId::try_from(0x0002_0001u32).is_err());
        assert_eq!(
            CommandId::try_from(0x8000_0001u32).unwrap(),
            CommandId::BindReceiverResp
        );
    }
}
