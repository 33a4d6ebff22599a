use num_enum::{FromPrimitive, IntoPrimitive};
use std::fmt;

/// The command_status field of an SMPP response indicates the success or
/// failure of the corresponding request. It is only meaningful in response
/// PDUs; requests carry 0. The SMSC may return vendor-specific codes, so
/// conversion from the wire is total and unrecognized values land in
/// [`CommandStatus::Other`].
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    /// No error (ESME_ROK)
    Ok = 0x0000_0000,

    /// Message length is invalid
    InvalidMsgLength = 0x0000_0001,

    /// Command length is invalid
    InvalidCommandLength = 0x0000_0002,

    /// Invalid command id
    InvalidCommandId = 0x0000_0003,

    /// Incorrect bind status for given command
    IncorrectBindStatus = 0x0000_0004,

    /// ESME already in bound state
    AlreadyBound = 0x0000_0005,

    /// Invalid priority flag
    InvalidPriorityFlag = 0x0000_0006,

    /// Invalid registered delivery flag
    InvalidRegisteredDeliveryFlag = 0x0000_0007,

    /// System error
    SystemError = 0x0000_0008,

    /// Invalid source address
    InvalidSourceAddress = 0x0000_000A,

    /// Invalid destination address
    InvalidDestinationAddress = 0x0000_000B,

    /// Message id is invalid
    InvalidMessageId = 0x0000_000C,

    /// Bind failed (ESME_RBINDFAIL)
    BindFailed = 0x0000_000D,

    /// Invalid password
    InvalidPassword = 0x0000_000E,

    /// Invalid system id
    InvalidSystemId = 0x0000_000F,

    /// Message queue full
    MessageQueueFull = 0x0000_0014,

    /// Invalid service type
    InvalidServiceType = 0x0000_0015,

    /// Invalid esm_class field data
    InvalidEsmClass = 0x0000_0043,

    /// submit_sm or submit_multi failed
    SubmitFailed = 0x0000_0045,

    /// Throttling error, ESME exceeded allowed message limits
    Throttled = 0x0000_0058,

    /// Invalid scheduled delivery time
    InvalidScheduleTime = 0x0000_0061,

    /// Invalid message validity period
    InvalidValidityPeriod = 0x0000_0062,

    /// query_sm request failed
    QueryFailed = 0x0000_0067,

    /// Unknown error
    UnknownError = 0x0000_00FF,

    /// Any other status, including vendor-specific codes (0x400-0x4FF)
    #[num_enum(catch_all)]
    Other(u32),
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = u32::from(*self);
        match self {
            CommandStatus::Other(_) => write!(f, "status {code:#010x}"),
            known => write!(f, "{known:?} ({code:#010x})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_is_total() {
        assert_eq!(CommandStatus::from(0u32), CommandStatus::Ok);
        assert_eq!(CommandStatus::from(0x0Du32), CommandStatus::BindFailed);
        assert_eq!(CommandStatus::from(0x423u32), CommandStatus::Other(0x423));
        assert_eq!(u32::from(CommandStatus::Throttled), 0x58);
        assert_eq!(u32::from(CommandStatus::Other(0x423)), 0x423);
    }

    #[test]
    fn display_names_known_codes() {
        assert_eq!(
            CommandStatus::BindFailed.to_string(),
            "BindFailed (0x0000000d)"
        );
        assert_eq!(CommandStatus::Other(0x423).to_string(), "status 0x00000423");
    }
}
