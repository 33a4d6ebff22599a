use num_enum::{FromPrimitive, IntoPrimitive};

/// Type of Number for source and destination addresses (Section 5.2.5).
///
/// Conversion from the wire is total; reserved codes are preserved in
/// [`TypeOfNumber::Reserved`] rather than failing the parse, since inbound
/// deliver_sm PDUs from real SMSCs occasionally carry them.
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeOfNumber {
    Unknown = 0b0000_0000,
    International = 0b0000_0001,
    National = 0b0000_0010,
    NetworkSpecific = 0b0000_0011,
    SubscriberNumber = 0b0000_0100,
    Alphanumeric = 0b0000_0101,
    Abbreviated = 0b0000_0110,
    #[num_enum(catch_all)]
    Reserved(u8),
}

impl Default for TypeOfNumber {
    fn default() -> Self {
        TypeOfNumber::Unknown
    }
}
