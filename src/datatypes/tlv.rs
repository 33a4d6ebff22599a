use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;

use crate::codec::CodecError;

/// Optional-parameter tags used by this library (Section 5.3.2).
pub mod tags {
    /// Full message content when it does not fit short_message.
    pub const MESSAGE_PAYLOAD: u16 = 0x0424;
    /// Reference number shared by all segments of one concatenated message (u16).
    pub const SAR_MSG_REF_NUM: u16 = 0x020C;
    /// Total number of segments in the concatenated message (u8).
    pub const SAR_TOTAL_SEGMENTS: u16 = 0x020E;
    /// 1-based position of this segment (u8).
    pub const SAR_SEGMENT_SEQNUM: u16 = 0x020F;
}

/// A Tag-Length-Value optional parameter.
///
/// The wire length field always equals the value length, so only the tag
/// and value are stored; the length is emitted at encode time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    pub tag: u16,
    pub value: Bytes,
}

impl Tlv {
    pub fn new(tag: u16, value: impl Into<Bytes>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    /// A TLV holding a single octet.
    pub fn u8(tag: u16, value: u8) -> Self {
        Self::new(tag, Bytes::copy_from_slice(&[value]))
    }

    /// A TLV holding one big-endian 16-bit integer.
    pub fn u16(tag: u16, value: u16) -> Self {
        Self::new(tag, Bytes::copy_from_slice(&value.to_be_bytes()))
    }

    /// Interpret the value as a single octet.
    pub fn as_u8(&self) -> Option<u8> {
        match self.value.as_ref() {
            [b] => Some(*b),
            _ => None,
        }
    }

    /// Interpret the value as one big-endian 16-bit integer.
    pub fn as_u16(&self) -> Option<u16> {
        match self.value.as_ref() {
            [hi, lo] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }

    /// Encoded size: 2 bytes tag, 2 bytes length, then the value.
    pub fn encoded_len(&self) -> usize {
        4 + self.value.len()
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.tag);
        buf.put_u16(self.value.len() as u16);
        buf.put_slice(&self.value);
    }

    /// Decode a single TLV from the cursor.
    pub fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        if buf.remaining() < 4 {
            return Err(CodecError::TruncatedBody { field: "tlv header" });
        }
        let tag = buf.get_u16();
        let length = buf.get_u16() as usize;
        if buf.remaining() < length {
            return Err(CodecError::TruncatedBody { field: "tlv value" });
        }
        let value = buf.copy_to_bytes(length);
        Ok(Self { tag, value })
    }

    /// Decode TLVs until the cursor is exhausted. A PDU body carries its
    /// optional parameters back to back after the mandatory fields.
    pub fn decode_all(buf: &mut Cursor<&[u8]>) -> Result<Vec<Self>, CodecError> {
        let mut tlvs = Vec::new();
        while buf.has_remaining() {
            tlvs.push(Self::decode(buf)?);
        }
        Ok(tlvs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_layout() {
        let tlv = Tlv::new(0x0424, Bytes::from_static(b"hi"));
        let mut buf = BytesMut::new();
        tlv.encode(&mut buf);
        assert_eq!(buf.as_ref(), &[0x04, 0x24, 0x00, 0x02, b'h', b'i']);
    }

    #[test]
    fn encode_empty_value() {
        let tlv = Tlv::new(0x020C, Bytes::new());
        let mut buf = BytesMut::new();
        tlv.encode(&mut buf);
        assert_eq!(buf.as_ref(), &[0x02, 0x0C, 0x00, 0x00]);
    }

    #[test]
    fn integer_accessors() {
        assert_eq!(Tlv::u8(tags::SAR_SEGMENT_SEQNUM, 3).as_u8(), Some(3));
        assert_eq!(Tlv::u16(tags::SAR_MSG_REF_NUM, 0xBEEF).as_u16(), Some(0xBEEF));
        assert_eq!(Tlv::u16(tags::SAR_MSG_REF_NUM, 7).as_u8(), None);
    }

    #[test]
    fn decode_roundtrip() {
        let mut buf = BytesMut::new();
        Tlv::u16(tags::SAR_MSG_REF_NUM, 42).encode(&mut buf);
        Tlv::u8(tags::SAR_TOTAL_SEGMENTS, 2).encode(&mut buf);
        let frozen = buf.freeze();

        let mut cursor = Cursor::new(frozen.as_ref());
        let tlvs = Tlv::decode_all(&mut cursor).unwrap();
        assert_eq!(tlvs.len(), 2);
        assert_eq!(tlvs[0].as_u16(), Some(42));
        assert_eq!(tlvs[1].as_u8(), Some(2));
    }

    #[test]
    fn decode_truncated_value() {
        let data = [0x04u8, 0x24, 0x00, 0x10, 0xAA];
        let mut cursor = Cursor::new(&data[..]);
        assert!(matches!(
            Tlv::decode(&mut cursor),
            Err(CodecError::TruncatedBody { field: "tlv value" })
        ));
    }
}
