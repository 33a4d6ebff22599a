// ABOUTME: deliver_sm parsing: mobile-originated SMS and delivery receipts (Section 4.6)
// ABOUTME: The receipt bit of esm_class selects which of the two the PDU carries

use bytes::{Bytes, BytesMut};
use std::io::Cursor;

use crate::codec::{
    decode_cstring, decode_octets, decode_u8, CodecError, Encodable, Pdu,
};
use crate::datatypes::delivery_receipt::DeliveryReceipt;
use crate::datatypes::{tags, Address, CommandId, DataCoding, Tlv, ESM_CLASS_RECEIPT};

/// A parsed deliver_sm body (Section 4.6.1): the mandatory fields in wire
/// order, followed by whatever optional parameters the SMSC attached.
///
/// `short_message` may be empty with the content carried in a
/// message_payload TLV instead; [`Sms::content`] hides the difference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sms {
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
    pub short_message: Bytes,
    pub tlvs: Vec<Tlv>,
}

/// What a deliver_sm turned out to be once parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundSms {
    /// A mobile-originated short message.
    Sms(Sms),
    /// A delivery receipt for an earlier submission; carries the SMS
    /// fields plus the parsed receipt record.
    Receipt(DeliveryReceipt),
}

impl InboundSms {
    /// Parse a deliver_sm PDU. Produces a [`DeliveryReceipt`] whenever the
    /// receipt bit of esm_class is set, a plain [`Sms`] otherwise.
    pub fn parse(pdu: &Pdu) -> Result<Self, CodecError> {
        let sms = Sms::parse_body(&pdu.body)?;
        if sms.esm_class & ESM_CLASS_RECEIPT != 0 {
            Ok(InboundSms::Receipt(DeliveryReceipt::from_sms(sms)))
        } else {
            Ok(InboundSms::Sms(sms))
        }
    }

    /// The SMS fields, regardless of variant.
    pub fn sms(&self) -> &Sms {
        match self {
            InboundSms::Sms(sms) => sms,
            InboundSms::Receipt(receipt) => &receipt.sms,
        }
    }
}

impl Sms {
    fn parse_body(body: &Bytes) -> Result<Self, CodecError> {
        let mut buf = Cursor::new(body.as_ref());

        let service_type = decode_cstring(&mut buf, 6, "service_type")?;
        let source_ton = decode_u8(&mut buf, "source_addr_ton")?;
        let source_npi = decode_u8(&mut buf, "source_addr_npi")?;
        let source_addr = decode_cstring(&mut buf, 21, "source_addr")?;
        let dest_ton = decode_u8(&mut buf, "dest_addr_ton")?;
        let dest_npi = decode_u8(&mut buf, "dest_addr_npi")?;
        let dest_addr = decode_cstring(&mut buf, 21, "destination_addr")?;
        let esm_class = decode_u8(&mut buf, "esm_class")?;
        let protocol_id = decode_u8(&mut buf, "protocol_id")?;
        let priority_flag = decode_u8(&mut buf, "priority_flag")?;
        let schedule_delivery_time = decode_cstring(&mut buf, 17, "schedule_delivery_time")?;
        let validity_period = decode_cstring(&mut buf, 17, "validity_period")?;
        let registered_delivery = decode_u8(&mut buf, "registered_delivery")?;
        let replace_if_present_flag = decode_u8(&mut buf, "replace_if_present_flag")?;
        let data_coding = DataCoding::from(decode_u8(&mut buf, "data_coding")?);
        let sm_default_msg_id = decode_u8(&mut buf, "sm_default_msg_id")?;
        let sm_length = decode_u8(&mut buf, "sm_length")? as usize;
        let short_message = decode_octets(&mut buf, sm_length, "short_message")?;
        let tlvs = Tlv::decode_all(&mut buf)?;

        Ok(Sms {
            service_type,
            source: Address::from_wire(source_addr, source_ton, source_npi),
            destination: Address::from_wire(dest_addr, dest_ton, dest_npi),
            esm_class,
            protocol_id,
            priority_flag,
            schedule_delivery_time,
            validity_period,
            registered_delivery,
            replace_if_present_flag,
            data_coding,
            sm_default_msg_id,
            short_message,
            tlvs,
        })
    }

    /// The message content: short_message, or the message_payload TLV when
    /// short_message is empty.
    pub fn content(&self) -> &[u8] {
        if self.short_message.is_empty() {
            if let Some(payload) = self.tlv(tags::MESSAGE_PAYLOAD) {
                return payload.value.as_ref();
            }
        }
        self.short_message.as_ref()
    }

    /// Find an optional parameter by tag.
    pub fn tlv(&self, tag: u16) -> Option<&Tlv> {
        self.tlvs.iter().find(|tlv| tlv.tag == tag)
    }
}

/// deliver_sm_resp PDU (Section 4.6.2). The body is a single unused
/// message_id C-Octet String, always empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliverSmResponse {
    pub sequence_number: u32,
}

impl Encodable for DeliverSmResponse {
    fn command_id(&self) -> CommandId {
        CommandId::DeliverSmResp
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(&[0x00]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PduHeader;
    use crate::datatypes::TypeOfNumber;

    fn deliver_body(
        esm_class: u8,
        data_coding: u8,
        short_message: &[u8],
        tlvs: &[Tlv],
    ) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(b"\0"); // service_type
        body.extend_from_slice(&[0x01, 0x01]);
        body.extend_from_slice(b"491701111\0");
        body.extend_from_slice(&[0x01, 0x01]);
        body.extend_from_slice(b"491702222\0");
        body.extend_from_slice(&[esm_class, 0x00, 0x00]);
        body.extend_from_slice(&[0x00, 0x00]); // schedule, validity
        body.extend_from_slice(&[0x00, 0x00, data_coding, 0x00]);
        body.push(short_message.len() as u8);
        body.extend_from_slice(short_message);
        let mut buf = BytesMut::new();
        for tlv in tlvs {
            tlv.encode(&mut buf);
        }
        body.extend_from_slice(&buf);
        body
    }

    fn deliver_pdu(body: Vec<u8>) -> Pdu {
        Pdu {
            header: PduHeader {
                command_length: 16 + body.len() as u32,
                command_id: CommandId::DeliverSm as u32,
                command_status: 0,
                sequence_number: 77,
            },
            body: Bytes::from(body),
        }
    }

    #[test]
    fn parse_plain_sms() {
        let pdu = deliver_pdu(deliver_body(0x00, 0x00, b"hi there", &[]));
        let inbound = InboundSms::parse(&pdu).unwrap();
        let InboundSms::Sms(sms) = inbound else {
            panic!("expected plain SMS");
        };
        assert_eq!(sms.source.value(), "491701111");
        assert_eq!(sms.source.ton(), TypeOfNumber::International);
        assert_eq!(sms.destination.value(), "491702222");
        assert_eq!(sms.content(), b"hi there");
        assert!(sms.tlvs.is_empty());
    }

    #[test]
    fn receipt_bit_selects_receipt() {
        let text = b"id:abc sub:001 dlvrd:001 submit date:2601221200 done date:2601221201 stat:DELIVRD err:000 text:ok";
        let pdu = deliver_pdu(deliver_body(0x04, 0x00, text, &[]));
        assert!(matches!(
            InboundSms::parse(&pdu).unwrap(),
            InboundSms::Receipt(_)
        ));
    }

    #[test]
    fn payload_tlv_backs_empty_short_message() {
        let payload = Tlv::new(tags::MESSAGE_PAYLOAD, Bytes::from_static(b"long content"));
        let pdu = deliver_pdu(deliver_body(0x00, 0x00, b"", &[payload]));
        let inbound = InboundSms::parse(&pdu).unwrap();
        assert_eq!(inbound.sms().content(), b"long content");
    }

    #[test]
    fn truncated_body_is_rejected() {
        let mut body = deliver_body(0x00, 0x00, b"hi there", &[]);
        body.truncate(body.len() - 3); // cut into short_message
        assert!(matches!(
            InboundSms::parse(&deliver_pdu(body)),
            Err(CodecError::TruncatedBody { .. })
        ));
    }

    #[test]
    fn deliver_resp_wire_image() {
        let bytes = DeliverSmResponse { sequence_number: 77 }.to_bytes();
        assert_eq!(
            bytes.as_ref(),
            &[
                0x00, 0x00, 0x00, 0x11, 0x80, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x4D, 0x00,
            ]
        );
    }
}
