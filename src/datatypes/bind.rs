// ABOUTME: The three bind operations and their shared response body
// ABOUTME: bind_transmitter/bind_receiver/bind_transceiver differ only in command id

use bytes::BytesMut;
use std::io::Cursor;

use crate::codec::{decode_cstring, encode_cstring, CodecError, Encodable, Pdu};
use crate::datatypes::{CommandId, NumericPlanIndicator, Tlv, TypeOfNumber};

/// interface_version sent in every bind request: SMPP v3.4.
pub const INTERFACE_VERSION: u8 = 0x34;

/// The role requested when binding to the SMSC (Section 2.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindMode {
    /// May submit messages (submit_sm, query_sm).
    Transmitter,
    /// Receives deliver_sm PDUs.
    Receiver,
    /// Both directions on one session.
    Transceiver,
}

impl BindMode {
    pub(crate) fn command_id(self) -> CommandId {
        match self {
            BindMode::Transmitter => CommandId::BindTransmitter,
            BindMode::Receiver => CommandId::BindReceiver,
            BindMode::Transceiver => CommandId::BindTransceiver,
        }
    }

    /// Whether a session bound in this mode may submit messages.
    pub fn can_transmit(self) -> bool {
        matches!(self, BindMode::Transmitter | BindMode::Transceiver)
    }

    /// Whether a session bound in this mode receives deliver_sm PDUs.
    pub fn can_receive(self) -> bool {
        matches!(self, BindMode::Receiver | BindMode::Transceiver)
    }
}

/// A bind request (Section 4.1.1). The body layout is identical for all
/// three modes: system_id, password and system_type as C-Octet Strings,
/// then interface_version, addr_ton, addr_npi and the address_range the
/// receiver wants routed to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bind {
    pub sequence_number: u32,
    pub mode: BindMode,
    pub system_id: String,
    pub password: String,
    pub system_type: String,
    pub addr_ton: TypeOfNumber,
    pub addr_npi: NumericPlanIndicator,
    pub address_range: String,
}

impl Encodable for Bind {
    fn command_id(&self) -> CommandId {
        self.mode.command_id()
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        encode_cstring(buf, &self.system_id);
        encode_cstring(buf, &self.password);
        encode_cstring(buf, &self.system_type);
        buf.extend_from_slice(&[
            INTERFACE_VERSION,
            u8::from(self.addr_ton),
            u8::from(self.addr_npi),
        ]);
        encode_cstring(buf, &self.address_range);
    }
}

/// A parsed bind_*_resp body (Section 4.1.2): the SMSC's system_id plus
/// any optional parameters. An empty body is legal when the response
/// carries a failure status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindResponse {
    pub system_id: String,
    pub tlvs: Vec<Tlv>,
}

impl BindResponse {
    pub fn parse(pdu: &Pdu) -> Result<Self, CodecError> {
        if pdu.body.is_empty() {
            return Ok(Self::default());
        }
        let mut buf = Cursor::new(pdu.body.as_ref());
        let system_id = decode_cstring(&mut buf, 16, "system_id")?;
        let tlvs = Tlv::decode_all(&mut buf)?;
        Ok(Self { system_id, tlvs })
    }
}
