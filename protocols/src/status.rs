//! NT status codes carried in the SMB header.
//!
//! Only the codes a probe run can realistically meet are named. Anything
//! else is rendered as its raw hexadecimal value.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NtStatus(pub u32);

impl NtStatus {
    pub const SUCCESS: NtStatus = NtStatus(0x0000_0000);
    pub const BUFFER_OVERFLOW: NtStatus = NtStatus(0x8000_0005);
    pub const INVALID_HANDLE: NtStatus = NtStatus(0xC000_0008);
    pub const INVALID_PARAMETER: NtStatus = NtStatus(0xC000_000D);
    pub const MORE_PROCESSING_REQUIRED: NtStatus = NtStatus(0xC000_0016);
    pub const ACCESS_DENIED: NtStatus = NtStatus(0xC000_0022);
    pub const OBJECT_NAME_NOT_FOUND: NtStatus = NtStatus(0xC000_0034);
    pub const OBJECT_PATH_NOT_FOUND: NtStatus = NtStatus(0xC000_003A);
    pub const ACCOUNT_RESTRICTION: NtStatus = NtStatus(0xC000_006E);
    pub const LOGON_FAILURE: NtStatus = NtStatus(0xC000_006D);
    pub const INVALID_LOGON_HOURS: NtStatus = NtStatus(0xC000_006F);
    pub const INVALID_WORKSTATION: NtStatus = NtStatus(0xC000_0070);
    pub const PASSWORD_EXPIRED: NtStatus = NtStatus(0xC000_0071);
    pub const ACCOUNT_DISABLED: NtStatus = NtStatus(0xC000_0072);
    pub const INSUFFICIENT_RESOURCES: NtStatus = NtStatus(0xC000_009A);
    pub const PIPE_NOT_AVAILABLE: NtStatus = NtStatus(0xC000_00AC);
    pub const INSTANCE_NOT_AVAILABLE: NtStatus = NtStatus(0xC000_00AB);
    pub const PIPE_BUSY: NtStatus = NtStatus(0xC000_00AE);
    pub const PIPE_DISCONNECTED: NtStatus = NtStatus(0xC000_00B0);
    pub const PIPE_BROKEN: NtStatus = NtStatus(0xC000_014B);
    pub const NOT_SUPPORTED: NtStatus = NtStatus(0xC000_00BB);
    pub const NETWORK_ACCESS_DENIED: NtStatus = NtStatus(0xC000_00CA);
    pub const BAD_NETWORK_NAME: NtStatus = NtStatus(0xC000_00CC);
    pub const REQUEST_NOT_ACCEPTED: NtStatus = NtStatus(0xC000_00D0);
    pub const PASSWORD_MUST_CHANGE: NtStatus = NtStatus(0xC000_0224);
    pub const INSUFF_SERVER_RESOURCES: NtStatus = NtStatus(0xC000_0205);
    pub const USER_SESSION_DELETED: NtStatus = NtStatus(0xC000_0203);
    pub const ACCOUNT_EXPIRED: NtStatus = NtStatus(0xC000_0193);
    pub const ACCOUNT_LOCKED_OUT: NtStatus = NtStatus(0xC000_0234);
    pub const TRUSTED_RELATIONSHIP_FAILURE: NtStatus = NtStatus(0xC000_018D);
    pub const LOGON_TYPE_NOT_GRANTED: NtStatus = NtStatus(0xC000_015B);
    pub const NO_LOGON_SERVERS: NtStatus = NtStatus(0xC000_005E);

    pub fn code(self) -> u32 {
        self.0
    }

    /// Severity bits `11`, the error class.
    pub fn is_error(self) -> bool {
        self.0 >> 30 == 0b11
    }

    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::SUCCESS => "STATUS_SUCCESS",
            Self::BUFFER_OVERFLOW => "STATUS_BUFFER_OVERFLOW",
            Self::INVALID_HANDLE => "STATUS_INVALID_HANDLE",
            Self::INVALID_PARAMETER => "STATUS_INVALID_PARAMETER",
            Self::MORE_PROCESSING_REQUIRED => "STATUS_MORE_PROCESSING_REQUIRED",
            Self::ACCESS_DENIED => "STATUS_ACCESS_DENIED",
            Self::OBJECT_NAME_NOT_FOUND => "STATUS_OBJECT_NAME_NOT_FOUND",
            Self::OBJECT_PATH_NOT_FOUND => "STATUS_OBJECT_PATH_NOT_FOUND",
            Self::LOGON_FAILURE => "STATUS_LOGON_FAILURE",
            Self::ACCOUNT_RESTRICTION => "STATUS_ACCOUNT_RESTRICTION",
            Self::INVALID_LOGON_HOURS => "STATUS_INVALID_LOGON_HOURS",
            Self::INVALID_WORKSTATION => "STATUS_INVALID_WORKSTATION",
            Self::PASSWORD_EXPIRED => "STATUS_PASSWORD_EXPIRED",
            Self::ACCOUNT_DISABLED => "STATUS_ACCOUNT_DISABLED",
            Self::NO_LOGON_SERVERS => "STATUS_NO_LOGON_SERVERS",
            Self::INSUFFICIENT_RESOURCES => "STATUS_INSUFFICIENT_RESOURCES",
            Self::INSTANCE_NOT_AVAILABLE => "STATUS_INSTANCE_NOT_AVAILABLE",
            Self::PIPE_NOT_AVAILABLE => "STATUS_PIPE_NOT_AVAILABLE",
            Self::PIPE_BUSY => "STATUS_PIPE_BUSY",
            Self::PIPE_DISCONNECTED => "STATUS_PIPE_DISCONNECTED",
            Self::NOT_SUPPORTED => "STATUS_NOT_SUPPORTED",
            Self::NETWORK_ACCESS_DENIED => "STATUS_NETWORK_ACCESS_DENIED",
            Self::BAD_NETWORK_NAME => "STATUS_BAD_NETWORK_NAME",
            Self::REQUEST_NOT_ACCEPTED => "STATUS_REQUEST_NOT_ACCEPTED",
            Self::PIPE_BROKEN => "STATUS_PIPE_BROKEN",
            Self::LOGON_TYPE_NOT_GRANTED => "STATUS_LOGON_TYPE_NOT_GRANTED",
            Self::TRUSTED_RELATIONSHIP_FAILURE => "STATUS_TRUSTED_RELATIONSHIP_FAILURE",
            Self::ACCOUNT_EXPIRED => "STATUS_ACCOUNT_EXPIRED",
            Self::USER_SESSION_DELETED => "STATUS_USER_SESSION_DELETED",
            Self::INSUFF_SERVER_RESOURCES => "STATUS_INSUFF_SERVER_RESOURCES",
            Self::PASSWORD_MUST_CHANGE => "STATUS_PASSWORD_MUST_CHANGE",
            Self::ACCOUNT_LOCKED_OUT => "STATUS_ACCOUNT_LOCKED_OUT",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for NtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

impl From<u32> for NtStatus {
    fn from(value: u32) -> Self {
        NtStatus(value)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
