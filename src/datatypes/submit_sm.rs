// ABOUTME: submit_sm request and response for message submission (Section 4.4)
// ABOUTME: Carries one segment's worth of user data plus optional TLVs

use bytes::BytesMut;
use std::io::Cursor;

use crate::codec::{decode_cstring, encode_cstring, CodecError, Encodable, Pdu};
use crate::datatypes::{Address, CommandId, DataCoding, Tlv};

/// submit_sm PDU (Section 4.4.1): one short message from the ESME to the
/// SMSC for onward delivery. Long messages are represented as several of
/// these, produced by the segmenter.
///
/// `sm_length` is not stored; it is derived from `short_message` at encode
/// time, which keeps the two coherent by construction. `short_message` may
/// be empty when the content travels in a message_payload TLV instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitSm {
    pub sequence_number: u32,

    pub service_type: String,
    pub source: Address,
    pub destination: Address,
    pub esm_class: u8,
    pub protocol_id: u8,
    pub priority_flag: u8,
    pub schedule_delivery_time: String,
    pub validity_period: String,
    pub registered_delivery: u8,
    pub replace_if_present_flag: u8,
    pub data_coding: DataCoding,
    pub sm_default_msg_id: u8,
    pub short_message: Vec<u8>,
    pub tlvs: Vec<Tlv>,
}

impl Encodable for SubmitSm {
    fn command_id(&self) -> CommandId {
        CommandId::SubmitSm
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        encode_cstring(buf, &self.service_type);
        buf.extend_from_slice(&[u8::from(self.source.ton()), u8::from(self.source.npi())]);
        encode_cstring(buf, self.source.value());
        buf.extend_from_slice(&[
            u8::from(self.destination.ton()),
            u8::from(self.destination.npi()),
        ]);
        encode_cstring(buf, self.destination.value());
        buf.extend_from_slice(&[self.esm_class, self.protocol_id, self.priority_flag]);
        encode_cstring(buf, &self.schedule_delivery_time);
        encode_cstring(buf, &self.validity_period);
        buf.extend_from_slice(&[
            self.registered_delivery,
            self.replace_if_present_flag,
            u8::from(self.data_coding),
            self.sm_default_msg_id,
            self.short_message.len() as u8,
        ]);
        buf.extend_from_slice(&self.short_message);
        for tlv in &self.tlvs {
            tlv.encode(buf);
        }
    }
}

/// A parsed submit_sm_resp body (Section 4.4.2): the message id the SMSC
/// assigned, used later for query_sm and matched by delivery receipts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitSmResponse {
    pub message_id: String,
}

impl SubmitSmResponse {
    pub fn parse(pdu: &Pdu) -> Result<Self, CodecError> {
        let mut buf = Cursor::new(pdu.body.as_ref());
        let message_id = decode_cstring(&mut buf, 65, "message_id")?;
        Ok(Self { message_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PduHeader;
    use bytes::Bytes;

    fn sample() -> SubmitSm {
        SubmitSm {
            sequence_number: 5,
            service_type: String::new(),
            source: Address::international("1234").unwrap(),
            destination: Address::international("5678").unwrap(),
            esm_class: 0,
            protocol_id: 0,
            priority_flag: 0,
            schedule_delivery_time: String::new(),
            validity_period: String::new(),
            registered_delivery: 0,
            replace_if_present_flag: 0,
            data_coding: DataCoding::Default,
            sm_default_msg_id: 0,
            short_message: b"Hello World".to_vec(),
            tlvs: Vec::new(),
        }
    }

    #[test]
    fn body_layout() {
        let bytes = sample().to_bytes();
        let header = PduHeader::parse(&bytes).unwrap();
        assert_eq!(header.command(), Some(CommandId::SubmitSm));
        assert_eq!(header.command_length as usize, bytes.len());

        let body = &bytes[16..];
        let expected: &[u8] = &[
            0x00, // service_type ""
            0x01, 0x01, // source ton/npi international/isdn
            b'1', b'2', b'3', b'4', 0x00, // source_addr
            0x01, 0x01, // dest ton/npi
            b'5', b'6', b'7', b'8', 0x00, // destination_addr
            0x00, 0x00, 0x00, // esm_class protocol_id priority_flag
            0x00, 0x00, // schedule, validity (both immediate)
            0x00, 0x00, // registered_delivery, replace_if_present
            0x00, 0x00, // data_coding, sm_default_msg_id
            0x0B, // sm_length
            b'H', b'e', b'l', b'l', b'o', b' ', b'W', b'o', b'r', b'l', b'd',
        ];
        assert_eq!(body, expected);
    }

    #[test]
    fn sm_length_tracks_short_message() {
        let mut submit = sample();
        submit.short_message = vec![0x41; 153];
        let bytes = submit.to_bytes();
        // sm_length sits right before the message bytes
        let sm_length = bytes[bytes.len() - 154];
        assert_eq!(sm_length, 153);
    }

    #[test]
    fn tlvs_follow_the_message() {
        let mut submit = sample();
        submit.tlvs = vec![Tlv::u16(crate::datatypes::tags::SAR_MSG_REF_NUM, 0x0102)];
        let bytes = submit.to_bytes();
        assert_eq!(
            &bytes[bytes.len() - 6..],
            &[0x02, 0x0C, 0x00, 0x02, 0x01, 0x02]
        );
    }

    #[test]
    fn parse_response_message_id() {
        let pdu = Pdu {
            header: PduHeader {
                command_length: 16 + 7,
                command_id: CommandId::SubmitSmResp as u32,
                command_status: 0,
                sequence_number: 5,
            },
            body: Bytes::from_static(b"msg123\0"),
        };
        let resp = SubmitSmResponse::parse(&pdu).unwrap();
        assert_eq!(resp.message_id, "msg123");
    }

    #[test]
    fn parse_response_truncated() {
        let pdu = Pdu {
            header: PduHeader {
                command_length: 16 + 3,
                command_id: CommandId::SubmitSmResp as u32,
                command_status: 0,
                sequence_number: 5,
            },
            body: Bytes::from_static(b"msg"),
        };
        assert!(matches!(
            SubmitSmResponse::parse(&pdu),
            Err(CodecError::TruncatedBody { .. })
        ));
    }
}
