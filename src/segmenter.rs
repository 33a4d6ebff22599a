// ABOUTME: Concatenated-SMS segmentation: SAR TLVs, 8-bit UDH, or message_payload
// ABOUTME: Splits encoded message bytes on wire-size budgets per data coding

use bytes::Bytes;
use thiserror::Error;

use crate::datatypes::{tags, DataCoding, Tlv, ESM_CLASS_UDHI};

/// How a message that exceeds the single-part budget is carried
/// (the CSMS method).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CsmsMethod {
    /// One submit_sm per segment, tagged with the sar_* TLVs.
    #[default]
    Sar16bit,
    /// One submit_sm per segment with a 6-byte concatenation UDH
    /// prepended to short_message and the UDHI bit set in esm_class.
    Udh8bit,
    /// A single submit_sm carrying the whole message in a
    /// message_payload TLV.
    PayloadTlv,
}

/// The most segments one concatenated message may span; the sequence
/// number field of both SAR and UDH is a single octet.
pub const MAX_SEGMENTS: usize = 255;

/// One submit_sm's worth of a segmented message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub short_message: Vec<u8>,
    pub tlvs: Vec<Tlv>,
    /// Bits to OR into the submit's esm_class (UDHI for UDH segments).
    pub esm_class_bits: u8,
}

/// Deterministic segmentation failures. Messages are never silently
/// truncated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("data coding {0:?} cannot be split with SAR or UDH")]
    UnsupportedCoding(DataCoding),

    #[error("message would span {parts} segments, limit is {MAX_SEGMENTS}")]
    TooManySegments { parts: usize },
}

/// Splits encoded messages into wire-size-bounded segments.
///
/// Holds the concatenation reference counter: every multi-part message
/// consumes one 16-bit reference (truncated to 8 bits for UDH), wrapping,
/// seeded at construction so two sessions started back to back do not
/// reuse references against the same SMSC.
#[derive(Debug)]
pub struct Segmenter {
    next_reference: u16,
}

/// Single-part budget for the short_message field, in octets.
fn single_part_limit(coding: DataCoding) -> usize {
    match coding {
        DataCoding::Ucs2 => 140,
        _ => 160,
    }
}

/// Per-segment payload budget when splitting with SAR TLVs.
fn sar_segment_limit(coding: DataCoding) -> usize {
    match coding {
        DataCoding::Ucs2 => 134,
        _ => 153,
    }
}

/// Per-segment payload budget when splitting with a 6-byte UDH.
fn udh_segment_limit(coding: DataCoding) -> usize {
    match coding {
        DataCoding::Ucs2 => 132,
        _ => 153,
    }
}

impl Segmenter {
    pub fn new(reference_seed: u16) -> Self {
        Self {
            next_reference: reference_seed,
        }
    }

    fn allocate_reference(&mut self) -> u16 {
        let reference = self.next_reference;
        self.next_reference = self.next_reference.wrapping_add(1);
        reference
    }

    /// Split `data` (already encoded per `coding`) into submit-ready
    /// segments.
    ///
    /// A message within the single-part budget yields exactly one segment
    /// with no concatenation fields, whatever the method. SAR and UDH are
    /// only defined for the default alphabet and UCS-2; message_payload
    /// carries any coding. UCS-2 payloads are split on even offsets so a
    /// UTF-16BE code unit is never cut in half.
    pub fn segment(
        &mut self,
        data: &[u8],
        coding: DataCoding,
        method: CsmsMethod,
    ) -> Result<Vec<Segment>, SegmentError> {
        if data.len() <= single_part_limit(coding) {
            return Ok(vec![Segment {
                short_message: data.to_vec(),
                tlvs: Vec::new(),
                esm_class_bits: 0,
            }]);
        }

        match method {
            CsmsMethod::PayloadTlv => Ok(vec![Segment {
                short_message: Vec::new(),
                tlvs: vec![Tlv::new(tags::MESSAGE_PAYLOAD, Bytes::copy_from_slice(data))],
                esm_class_bits: 0,
            }]),
            CsmsMethod::Sar16bit => {
                let chunk = checked_chunk(data, coding, sar_segment_limit(coding))?;
                let reference = self.allocate_reference();
                let total = data.len().div_ceil(chunk) as u8;

                Ok(data
                    .chunks(chunk)
                    .enumerate()
                    .map(|(index, piece)| Segment {
                        short_message: piece.to_vec(),
                        tlvs: vec![
                            Tlv::u16(tags::SAR_MSG_REF_NUM, reference),
                            Tlv::u8(tags::SAR_TOTAL_SEGMENTS, total),
                            Tlv::u8(tags::SAR_SEGMENT_SEQNUM, index as u8 + 1),
                        ],
                        esm_class_bits: 0,
                    })
                    .collect())
            }
            CsmsMethod::Udh8bit => {
                let chunk = checked_chunk(data, coding, udh_segment_limit(coding))?;
                let reference = self.allocate_reference() as u8;
                let total = data.len().div_ceil(chunk) as u8;

                Ok(data
                    .chunks(chunk)
                    .enumerate()
                    .map(|(index, piece)| {
                        // 05 00 03 ref total seq: concatenation IE, 8-bit ref
                        let mut short_message = Vec::with_capacity(6 + piece.len());
                        short_message
                            .extend_from_slice(&[0x05, 0x00, 0x03, reference, total, index as u8 + 1]);
                        short_message.extend_from_slice(piece);
                        Segment {
                            short_message,
                            tlvs: Vec::new(),
                            esm_class_bits: ESM_CLASS_UDHI,
                        }
                    })
                    .collect())
            }
        }
    }

}

/// Validate that `coding` may be split at all and that the part count
/// fits the one-octet sequence field; returns the (alignment-adjusted)
/// chunk size.
fn checked_chunk(
    data: &[u8],
    coding: DataCoding,
    mut chunk: usize,
) -> Result<usize, SegmentError> {
    if !coding.is_splittable() {
        return Err(SegmentError::UnsupportedCoding(coding));
    }
    if coding == DataCoding::Ucs2 {
        chunk &= !1;
    }
    let parts = data.len().div_ceil(chunk);
    if parts > MAX_SEGMENTS {
        return Err(SegmentError::TooManySegments { parts });
    }
    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_a_single_segment() {
        let mut segmenter = Segmenter::new(0);
        let segments = segmenter
            .segment(b"Hello World", DataCoding::Default, CsmsMethod::Sar16bit)
            .unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].short_message, b"Hello World");
        assert!(segments[0].tlvs.is_empty());
        assert_eq!(segments[0].esm_class_bits, 0);
    }

    #[test]
    fn gsm_boundary_160_stays_single() {
        let mut segmenter = Segmenter::new(0);
        let data = vec![b'A'; 160];
        let segments = segmenter
            .segment(&data, DataCoding::Default, CsmsMethod::Sar16bit)
            .unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].tlvs.is_empty());
    }

    #[test]
    fn sar_split_200_gsm_bytes() {
        let mut segmenter = Segmenter::new(7);
        let data = vec![b'A'; 200];
        let segments = segmenter
            .segment(&data, DataCoding::Default, CsmsMethod::Sar16bit)
            .unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].short_message.len(), 153);
        assert_eq!(segments[1].short_message.len(), 47);

        for (index, segment) in segments.iter().enumerate() {
            assert_eq!(segment.tlvs[0].tag, tags::SAR_MSG_REF_NUM);
            assert_eq!(segment.tlvs[0].as_u16(), Some(7));
            assert_eq!(segment.tlvs[1].tag, tags::SAR_TOTAL_SEGMENTS);
            assert_eq!(segment.tlvs[1].as_u8(), Some(2));
            assert_eq!(segment.tlvs[2].tag, tags::SAR_SEGMENT_SEQNUM);
            assert_eq!(segment.tlvs[2].as_u8(), Some(index as u8 + 1));
            assert_eq!(segment.esm_class_bits, 0);
        }
    }

    #[test]
    fn udh_split_prepends_header_and_sets_udhi() {
        let mut segmenter = Segmenter::new(0x01FE);
        let data = vec![b'B'; 200];
        let segments = segmenter
            .segment(&data, DataCoding::Default, CsmsMethod::Udh8bit)
            .unwrap();

        assert_eq!(segments.len(), 2);
        // reference truncated to its low byte
        assert_eq!(
            &segments[0].short_message[..6],
            &[0x05, 0x00, 0x03, 0xFE, 0x02, 0x01]
        );
        assert_eq!(
            &segments[1].short_message[..6],
            &[0x05, 0x00, 0x03, 0xFE, 0x02, 0x02]
        );
        assert_eq!(segments[0].short_message.len(), 6 + 153);
        assert_eq!(segments[1].short_message.len(), 6 + 47);
        assert!(segments.iter().all(|s| s.esm_class_bits == ESM_CLASS_UDHI));
        assert!(segments.iter().all(|s| s.tlvs.is_empty()));
    }

    #[test]
    fn ucs2_splits_on_even_boundaries() {
        let mut segmenter = Segmenter::new(0);
        let data = vec![0x00; 300]; // 150 UTF-16BE code units
        let segments = segmenter
            .segment(&data, DataCoding::Ucs2, CsmsMethod::Sar16bit)
            .unwrap();
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| s.short_message.len() % 2 == 0));
        assert_eq!(segments[0].short_message.len(), 134);

        let udh = segmenter
            .segment(&data, DataCoding::Ucs2, CsmsMethod::Udh8bit)
            .unwrap();
        assert!(udh.iter().all(|s| (s.short_message.len() - 6) % 2 == 0));
        assert_eq!(udh[0].short_message.len(), 6 + 132);
    }

    #[test]
    fn payload_tlv_carries_whole_message() {
        let mut segmenter = Segmenter::new(0);
        let data = vec![0x42; 500];
        let segments = segmenter
            .segment(&data, DataCoding::Binary, CsmsMethod::PayloadTlv)
            .unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].short_message.is_empty());
        assert_eq!(segments[0].tlvs[0].tag, tags::MESSAGE_PAYLOAD);
        assert_eq!(segments[0].tlvs[0].value.len(), 500);
    }

    #[test]
    fn binary_cannot_split_with_sar_or_udh() {
        let mut segmenter = Segmenter::new(0);
        let data = vec![0x42; 200];
        assert_eq!(
            segmenter.segment(&data, DataCoding::Binary, CsmsMethod::Sar16bit),
            Err(SegmentError::UnsupportedCoding(DataCoding::Binary))
        );
        assert_eq!(
            segmenter.segment(&data, DataCoding::Binary, CsmsMethod::Udh8bit),
            Err(SegmentError::UnsupportedCoding(DataCoding::Binary))
        );
    }

    #[test]
    fn segment_count_is_bounded() {
        let mut segmenter = Segmenter::new(0);
        let data = vec![b'A'; 153 * 256];
        assert_eq!(
            segmenter.segment(&data, DataCoding::Default, CsmsMethod::Sar16bit),
            Err(SegmentError::TooManySegments { parts: 256 })
        );
    }

    #[test]
    fn references_advance_and_wrap() {
        let mut segmenter = Segmenter::new(u16::MAX);
        let data = vec![b'A'; 200];

        let first = segmenter
            .segment(&data, DataCoding::Default, CsmsMethod::Sar16bit)
            .unwrap();
        let second = segmenter
            .segment(&data, DataCoding::Default, CsmsMethod::Sar16bit)
            .unwrap();

        assert_eq!(first[0].tlvs[0].as_u16(), Some(u16::MAX));
        assert_eq!(second[0].tlvs[0].as_u16(), Some(0));
    }
}
