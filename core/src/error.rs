use std::io;

use mscheck_protocols::CodecError;
use mscheck_protocols::NtStatus;
use mscheck_protocols::dcerpc::BindError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// Refused, reset, timed out or closed by the peer.
    #[error("{0}")]
    Connection(#[from] io::Error),

    #[error("SMBv1 not supported")]
    Smb1Unsupported,

    /// The server refused the credentials.
    #[error("{0}")]
    Auth(NtStatus),

    /// Any other request answered with an error status.
    #[error("{0}")]
    Session(NtStatus),

    #[error("malformed reply: {0}")]
    Protocol(#[from] CodecError),

    #[error("{0}")]
    Bind(#[from] BindError),

    #[error("interrupted")]
    Interrupted,
}

impl ProbeError {
    /// True when the connection itself is gone and nothing more can be sent on it.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    pub(crate) fn timed_out() -> Self {
        Self::Connection(io::Error::new(io::ErrorKind::TimedOut, "timed out"))
    }

    pub(crate) fn closed() -> Self {
        Self::Connection(io::Error::new(
            io::ErrorKind::NotConnected,
            "session is closed",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_render_the_status_name() {
        assert_eq!(
            ProbeError::Auth(NtStatus::LOGON_FAILURE).to_string(),
            "STATUS_LOGON_FAILURE"
        );
        assert_eq!(
            ProbeError::Session(NtStatus(0xC0DE_0000)).to_string(),
            "0xC0DE0000"
        );
    }

    #[test]
    fn only_connection_errors_are_transport() {
        assert!(ProbeError::timed_out().is_transport());
        assert!(!ProbeError::Session(NtStatus::ACCESS_DENIED).is_transport());
        assert!(!ProbeError::Smb1Unsupported.is_transport());
    }
}
