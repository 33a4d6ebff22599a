// ABOUTME: SMPP time format (Section 7.1): 16-char absolute and relative forms
// ABOUTME: Used for schedule_delivery_time, validity_period and query final_date values

use std::fmt;
use thiserror::Error;

/// An SMPP time value in the `YYMMDDhhmmsstnnp` format.
///
/// The final character selects the form: `+`/`-` is an absolute time with a
/// UTC offset expressed in quarter hours, `R` is an interval relative to the
/// SMSC's local time. An empty string means immediate delivery / default
/// validity and maps to [`SmppTime::Immediate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmppTime {
    Immediate,
    Absolute {
        year: u8,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        tenths: u8,
        /// UTC offset in quarter hours, `00+` for UTC.
        utc_offset: u8,
        /// `+` for ahead of UTC, `-` for behind.
        east_of_utc: bool,
    },
    Relative {
        years: u8,
        months: u8,
        days: u8,
        hours: u8,
        minutes: u8,
        seconds: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeFormatError {
    #[error("time value must be empty or 16 characters, got {0}")]
    InvalidLength(usize),

    #[error("non-digit at position {0} of time value")]
    InvalidDigit(usize),

    #[error("time value must end in '+', '-' or 'R', got {0:?}")]
    InvalidSuffix(char),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: u8 },
}

fn two_digits(bytes: &[u8], at: usize) -> Result<u8, TimeFormatError> {
    let hi = bytes[at];
    let lo = bytes[at + 1];
    if !hi.is_ascii_digit() {
        return Err(TimeFormatError::InvalidDigit(at));
    }
    if !lo.is_ascii_digit() {
        return Err(TimeFormatError::InvalidDigit(at + 1));
    }
    Ok((hi - b'0') * 10 + (lo - b'0'))
}

fn check_range(field: &'static str, value: u8, min: u8, max: u8) -> Result<(), TimeFormatError> {
    if value < min || value > max {
        return Err(TimeFormatError::OutOfRange { field, value });
    }
    Ok(())
}

impl SmppTime {
    /// Parse either time form. Accepts the empty string as immediate.
    pub fn parse(value: &str) -> Result<Self, TimeFormatError> {
        if value.is_empty() {
            return Ok(SmppTime::Immediate);
        }
        if value.len() != 16 {
            return Err(TimeFormatError::InvalidLength(value.len()));
        }

        let bytes = value.as_bytes();
        let year = two_digits(bytes, 0)?;
        let month = two_digits(bytes, 2)?;
        let day = two_digits(bytes, 4)?;
        let hour = two_digits(bytes, 6)?;
        let minute = two_digits(bytes, 8)?;
        let second = two_digits(bytes, 10)?;
        if !bytes[12].is_ascii_digit() {
            return Err(TimeFormatError::InvalidDigit(12));
        }
        let tenths = bytes[12] - b'0';
        let offset = two_digits(bytes, 13)?;

        match bytes[15] {
            b'R' => Ok(SmppTime::Relative {
                years: year,
                months: month,
                days: day,
                hours: hour,
                minutes: minute,
                seconds: second,
            }),
            sign @ (b'+' | b'-') => {
                check_range("month", month, 1, 12)?;
                check_range("day", day, 1, 31)?;
                check_range("hour", hour, 0, 23)?;
                check_range("minute", minute, 0, 59)?;
                check_range("second", second, 0, 59)?;
                check_range("utc offset", offset, 0, 48)?;
                Ok(SmppTime::Absolute {
                    year,
                    month,
                    day,
                    hour,
                    minute,
                    second,
                    tenths,
                    utc_offset: offset,
                    east_of_utc: sign == b'+',
                })
            }
            other => Err(TimeFormatError::InvalidSuffix(other as char)),
        }
    }
}

impl fmt::Display for SmppTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SmppTime::Immediate => Ok(()),
            SmppTime::Absolute {
                year,
                month,
                day,
                hour,
                minute,
                second,
                tenths,
                utc_offset,
                east_of_utc,
            } => write!(
                f,
                "{year:02}{month:02}{day:02}{hour:02}{minute:02}{second:02}{tenths}{utc_offset:02}{}",
                if east_of_utc { '+' } else { '-' }
            ),
            SmppTime::Relative {
                years,
                months,
                days,
                hours,
                minutes,
                seconds,
            } => write!(
                f,
                "{years:02}{months:02}{days:02}{hours:02}{minutes:02}{seconds:02}000R"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_immediate() {
        assert_eq!(SmppTime::parse("").unwrap(), SmppTime::Immediate);
        assert_eq!(SmppTime::Immediate.to_string(), "");
    }

    #[test]
    fn absolute_utc() {
        let t = SmppTime::parse("260124120000000+").unwrap();
        assert_eq!(
            t,
            SmppTime::Absolute {
                year: 26,
                month: 1,
                day: 24,
                hour: 12,
                minute: 0,
                second: 0,
                tenths: 0,
                utc_offset: 0,
                east_of_utc: true,
            }
        );
        assert_eq!(t.to_string(), "260124120000000+");
    }

    #[test]
    fn relative_form() {
        let t = SmppTime::parse("000000480000000R").unwrap();
        assert_eq!(
            t,
            SmppTime::Relative {
                years: 0,
                months: 0,
                days: 0,
                hours: 48,
                minutes: 0,
                seconds: 0,
            }
        );
        assert_eq!(t.to_string(), "000000480000000R");
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            SmppTime::parse("2601"),
            Err(TimeFormatError::InvalidLength(4))
        ));
        assert!(matches!(
            SmppTime::parse("260124120000000?"),
            Err(TimeFormatError::InvalidSuffix('?'))
        ));
        assert!(matches!(
            SmppTime::parse("261324120000000+"),
            Err(TimeFormatError::OutOfRange { field: "month", .. })
        ));
        assert!(matches!(
            SmppTime::parse("26012412000000a+"),
            Err(TimeFormatError::InvalidDigit(_))
        ));
    }
}
