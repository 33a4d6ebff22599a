// ABOUTME: SMPP address triple (value, TON, NPI) with format validation
// ABOUTME: Enforces the 11-octet alphanumeric and 20-octet numeric limits at construction

use std::fmt;
use thiserror::Error;

use crate::datatypes::{NumericPlanIndicator, TypeOfNumber};

/// Maximum length of a phone-number address value.
pub const MAX_NUMERIC_LEN: usize = 20;
/// Maximum length of an alphanumeric sender id.
pub const MAX_ALPHANUMERIC_LEN: usize = 11;

/// A source or destination address: an octet-string value qualified by
/// Type of Number and Numbering Plan Indicator.
///
/// Addresses are validated when built through the public constructors and
/// immutable afterwards. Addresses parsed off the wire skip validation so
/// an SMSC quirk cannot fail an inbound deliver_sm.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    value: String,
    ton: TypeOfNumber,
    npi: NumericPlanIndicator,
}

/// Rejected address values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address too long for {ton:?}: {actual} octets (max {max})")]
    TooLong {
        ton: TypeOfNumber,
        max: usize,
        actual: usize,
    },

    #[error("invalid address for {ton:?}: {reason}")]
    InvalidFormat {
        ton: TypeOfNumber,
        reason: &'static str,
    },
}

impl Address {
    /// Build a validated address. Alphanumeric values are limited to 11
    /// octets, everything else to 20, matching the submit_sm field sizes.
    pub fn new(
        value: impl Into<String>,
        ton: TypeOfNumber,
        npi: NumericPlanIndicator,
    ) -> Result<Self, AddressError> {
        let value = value.into();

        let max = match ton {
            TypeOfNumber::Alphanumeric => MAX_ALPHANUMERIC_LEN,
            _ => MAX_NUMERIC_LEN,
        };
        if value.len() > max {
            return Err(AddressError::TooLong {
                ton,
                max,
                actual: value.len(),
            });
        }

        match ton {
            TypeOfNumber::International => {
                let digits = value.strip_prefix('+').unwrap_or(&value);
                if !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(AddressError::InvalidFormat {
                        ton,
                        reason: "expected digits with optional leading +",
                    });
                }
            }
            TypeOfNumber::National
            | TypeOfNumber::NetworkSpecific
            | TypeOfNumber::SubscriberNumber
            | TypeOfNumber::Abbreviated => {
                if !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(AddressError::InvalidFormat {
                        ton,
                        reason: "expected digits only",
                    });
                }
            }
            TypeOfNumber::Alphanumeric => {
                if !value
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b' ')
                {
                    return Err(AddressError::InvalidFormat {
                        ton,
                        reason: "expected letters, digits and spaces",
                    });
                }
            }
            TypeOfNumber::Unknown | TypeOfNumber::Reserved(_) => {
                if !value.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
                    return Err(AddressError::InvalidFormat {
                        ton,
                        reason: "expected printable ASCII",
                    });
                }
            }
        }

        Ok(Self { value, ton, npi })
    }

    /// An international (E.164) number on the ISDN plan.
    pub fn international(number: impl Into<String>) -> Result<Self, AddressError> {
        Self::new(
            number,
            TypeOfNumber::International,
            NumericPlanIndicator::Isdn,
        )
    }

    /// A national number on the ISDN plan.
    pub fn national(number: impl Into<String>) -> Result<Self, AddressError> {
        Self::new(number, TypeOfNumber::National, NumericPlanIndicator::Isdn)
    }

    /// An alphanumeric sender id, max 11 characters.
    pub fn alphanumeric(label: impl Into<String>) -> Result<Self, AddressError> {
        Self::new(
            label,
            TypeOfNumber::Alphanumeric,
            NumericPlanIndicator::Unknown,
        )
    }

    /// Rebuild an address from decoded PDU fields without validation.
    pub(crate) fn from_wire(value: String, ton: u8, npi: u8) -> Self {
        Self {
            value,
            ton: TypeOfNumber::from(ton),
            npi: NumericPlanIndicator::from(npi),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn ton(&self) -> TypeOfNumber {
        self.ton
    }

    pub fn npi(&self) -> NumericPlanIndicator {
        self.npi
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
