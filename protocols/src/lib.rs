//! Wire codecs for the subset of SMB1, NTLMSSP and DCE/RPC the probe speaks.
//!
//! Everything here is pure encoding and decoding except [`netbios`], which
//! also moves frames over any tokio stream.

pub mod dcerpc;
pub mod error;
pub mod netbios;
pub mod ntlm;
pub mod smb;
pub mod spnego;
pub mod status;
pub mod utf16;

pub use error::CodecError;
pub use status::NtStatus;
