// ABOUTME: Parses the textual delivery-receipt body carried in deliver_sm short_message
// ABOUTME: Positional against the fixed key list to tolerate SMSC formatting quirks

use std::fmt;

use crate::datatypes::Sms;

/// The fixed key sequence of a receipt body (Appendix B):
/// `id:... sub:... dlvrd:... submit date:... done date:... stat:... err:... text:...`
///
/// Extraction is positional against this list rather than free-form so
/// that odd whitespace or a missing field from one SMSC does not shift the
/// remaining values.
const KEYS: [&str; 8] = [
    "id",
    "sub",
    "dlvrd",
    "submit date",
    "done date",
    "stat",
    "err",
    "text",
];

/// Final state keywords used in the `stat` field of a receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptState {
    Delivered,
    Expired,
    Deleted,
    Undeliverable,
    Accepted,
    Unknown,
    Rejected,
}

impl ReceiptState {
    fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().to_ascii_uppercase().as_str() {
            "DELIVRD" => ReceiptState::Delivered,
            "EXPIRED" => ReceiptState::Expired,
            "DELETED" => ReceiptState::Deleted,
            "UNDELIV" => ReceiptState::Undeliverable,
            "ACCEPTD" => ReceiptState::Accepted,
            "REJECTD" => ReceiptState::Rejected,
            _ => ReceiptState::Unknown,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ReceiptState::Delivered => "DELIVRD",
            ReceiptState::Expired => "EXPIRED",
            ReceiptState::Deleted => "DELETED",
            ReceiptState::Undeliverable => "UNDELIV",
            ReceiptState::Accepted => "ACCEPTD",
            ReceiptState::Unknown => "UNKNOWN",
            ReceiptState::Rejected => "REJECTD",
        }
    }
}

impl fmt::Display for ReceiptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A receipt timestamp: `YYMMDDhhmm` or `YYMMDDhhmmss`, no timezone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReceiptTime {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl ReceiptTime {
    fn parse(value: &str) -> Option<Self> {
        let digits = value.trim();
        if !matches!(digits.len(), 10 | 12) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let pair = |at: usize| {
            let b = digits.as_bytes();
            (b[at] - b'0') * 10 + (b[at + 1] - b'0')
        };
        Some(ReceiptTime {
            year: pair(0),
            month: pair(2),
            day: pair(4),
            hour: pair(6),
            minute: pair(8),
            second: if digits.len() == 12 { pair(10) } else { 0 },
        })
    }
}

/// A delivery receipt: the deliver_sm fields plus the record parsed from
/// the receipt text. Produced by [`crate::datatypes::InboundSms::parse`]
/// whenever the receipt bit of esm_class is set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// The deliver_sm this receipt arrived in.
    pub sms: Sms,
    /// SMSC message id of the receipted submission.
    pub message_id: String,
    /// Number of short messages originally submitted.
    pub submitted: u16,
    /// Number of short messages delivered.
    pub delivered: u16,
    pub submit_date: Option<ReceiptTime>,
    pub done_date: Option<ReceiptTime>,
    pub state: ReceiptState,
    /// Network-specific error code, 0 when none.
    pub error_code: u32,
    /// First 20 characters of the original message.
    pub text: String,
}

impl DeliveryReceipt {
    /// Parsing is lenient: missing or malformed fields default rather than
    /// fail, since a receipt PDU that reached this point is already known
    /// to be a receipt and dropping it would lose the status entirely.
    pub(crate) fn from_sms(sms: Sms) -> Self {
        let body = String::from_utf8_lossy(sms.content()).into_owned();
        let fields = extract_fields(&body);

        DeliveryReceipt {
            message_id: fields[0].clone(),
            submitted: fields[1].parse().unwrap_or(0),
            delivered: fields[2].parse().unwrap_or(0),
            submit_date: ReceiptTime::parse(&fields[3]),
            done_date: ReceiptTime::parse(&fields[4]),
            state: ReceiptState::from_keyword(&fields[5]),
            error_code: fields[6].parse().unwrap_or(0),
            text: fields[7].clone(),
            sms,
        }
    }
}

/// Walk the key list in order, locating each `key:` from where the
/// previous one matched; a field's value runs up to the start of the next
/// matched key. Keys an SMSC omitted yield empty values without
/// disturbing the rest.
fn extract_fields(body: &str) -> [String; 8] {
    let haystack = body.to_ascii_lowercase();
    let mut positions: Vec<(usize, usize, usize)> = Vec::with_capacity(KEYS.len());

    let mut from = 0;
    for (index, key) in KEYS.iter().enumerate() {
        let pattern = format!("{key}:");
        if let Some(at) = haystack[from..].find(&pattern) {
            let key_start = from + at;
            let value_start = key_start + pattern.len();
            positions.push((index, key_start, value_start));
            from = value_start;
        }
    }

    let mut fields: [String; 8] = Default::default();
    for (slot, &(index, _, value_start)) in positions.iter().enumerate() {
        let value_end = positions
            .get(slot + 1)
            .map(|&(_, next_key_start, _)| next_key_start)
            .unwrap_or(body.len());
        fields[index] = body[value_start..value_end].trim().to_string();
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_fields() {
        let body = "id:msg123 sub:001 dlvrd:001 submit date:2601221200 \
                    done date:2601221201 stat:DELIVRD err:000 text:Test";
        let fields = extract_fields(body);
        assert_eq!(fields[0], "msg123");
        assert_eq!(fields[1], "001");
        assert_eq!(fields[2], "001");
        assert_eq!(fields[3], "2601221200");
        assert_eq!(fields[4], "2601221201");
        assert_eq!(fields[5], "DELIVRD");
        assert_eq!(fields[6], "000");
        assert_eq!(fields[7], "Test");
    }

    #[test]
    fn tolerates_missing_keys_and_extra_whitespace() {
        let body = "id: abc-1  stat:EXPIRED  err:042";
        let fields = extract_fields(body);
        assert_eq!(fields[0], "abc-1");
        assert_eq!(fields[1], "");
        assert_eq!(fields[5], "EXPIRED");
        assert_eq!(fields[6], "042");
        assert_eq!(fields[7], "");
    }

    #[test]
    fn text_keeps_inner_spaces() {
        let body = "id:1 stat:DELIVRD err:0 text:Hello there friend";
        let fields = extract_fields(body);
        assert_eq!(fields[7], "Hello there friend");
    }

    #[test]
    fn receipt_time_both_lengths() {
        assert_eq!(
            ReceiptTime::parse("2601221200"),
            Some(ReceiptTime {
                year: 26,
                month: 1,
                day: 22,
                hour: 12,
                minute: 0,
                second: 0,
            })
        );
        assert_eq!(
            ReceiptTime::parse("260122120034").map(|t| t.second),
            Some(34)
        );
        assert_eq!(ReceiptTime::parse("26012212"), None);
        assert_eq!(ReceiptTime::parse("26012212003x"), None);
    }

    #[test]
    fn state_keywords() {
        assert_eq!(ReceiptState::from_keyword("DELIVRD"), ReceiptState::Delivered);
        assert_eq!(ReceiptState::from_keyword("undeliv"), ReceiptState::Undeliverable);
        assert_eq!(ReceiptState::from_keyword("whatever"), ReceiptState::Unknown);
    }
}
