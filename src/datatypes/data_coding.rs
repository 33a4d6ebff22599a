use num_enum::{FromPrimitive, IntoPrimitive};

/// data_coding field values (Section 5.2.19).
///
/// This library treats [`DataCoding::Default`] as opaque 8-bit bytes
/// supplied by the caller (pre-packed GSM 03.38 or plain ASCII) and
/// [`DataCoding::Ucs2`] as UTF-16BE on the wire. Everything else passes
/// through untouched.
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataCoding {
    /// SMSC default alphabet (GSM 03.38)
    Default = 0x00,
    /// IA5 (CCITT T.50) / ASCII
    Ia5 = 0x01,
    /// Latin 1 (ISO-8859-1)
    Latin1 = 0x03,
    /// 8-bit binary octets
    Binary = 0x04,
    /// UCS-2 (ISO/IEC 10646), UTF-16BE on the wire
    Ucs2 = 0x08,
    #[num_enum(catch_all)]
    Other(u8),
}

impl DataCoding {
    /// Whether long messages in this coding may be split with the SAR or
    /// UDH concatenation methods. Only the default alphabet and UCS-2 have
    /// well-defined per-segment budgets.
    pub fn is_splittable(self) -> bool {
        matches!(self, DataCoding::Default | DataCoding::Ucs2)
    }
}

impl Default for DataCoding {
    fn default() -> Self {
        DataCoding::Default
    }
}
