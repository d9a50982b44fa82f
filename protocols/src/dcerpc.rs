//! Connection-oriented DCE/RPC bind PDUs.
//!
//! Just enough of C706 chapter 12 to propose one presentation context and
//! read back whether the server accepted it.

use std::fmt;

use bytes::{Buf, BufMut};
use thiserror::Error;
use uuid::{Uuid, uuid};

use crate::error::{CodecError, need};

const RPC_VERSION: u8 = 5;
const RPC_VERSION_MINOR: u8 = 0;
const HEADER_LEN: usize = 16;

const PFC_FIRST_FRAG: u8 = 0x01;
const PFC_LAST_FRAG: u8 = 0x02;

/// Little-endian integers, ASCII characters, IEEE floats.
const DREP_LITTLE_ENDIAN: [u8; 4] = [0x10, 0x00, 0x00, 0x00];

pub const MAX_FRAGMENT: u16 = 4280;

pub mod ptype {
    pub const FAULT: u8 = 3;
    pub const BIND: u8 = 11;
    pub const BIND_ACK: u8 = 12;
    pub const BIND_NAK: u8 = 13;
}

/// An interface or transfer syntax identifier with its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxId {
    pub uuid: Uuid,
    pub major: u16,
    pub minor: u16,
}

impl SyntaxId {
    pub const fn new(uuid: Uuid, major: u16, minor: u16) -> Self {
        Self { uuid, major, minor }
    }

    fn put(&self, out: &mut Vec<u8>) {
        out.put_slice(&self.uuid.to_bytes_le());
        out.put_u16_le(self.major);
        out.put_u16_le(self.minor);
    }

    fn parse(buf: &mut &[u8]) -> Result<Self, CodecError> {
        need(buf, 20, "syntax id")?;
        let mut raw = [0u8; 16];
        buf.copy_to_slice(&mut raw);
        Ok(Self {
            uuid: Uuid::from_bytes_le(raw),
            major: buf.get_u16_le(),
            minor: buf.get_u16_le(),
        })
    }
}

impl fmt::Display for SyntaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}.{}", self.uuid.hyphenated(), self.major, self.minor)
    }
}

pub const NDR64: SyntaxId = SyntaxId::new(uuid!("71710533-beba-4937-8319-b5dbef9ccc36"), 1, 0);

/// A bind PDU proposing a single context (id 0) for `abstract_syntax`
/// over `transfer_syntax`.
pub fn bind_request(call_id: u32, abstract_syntax: &SyntaxId, transfer_syntax: &SyntaxId) -> Vec<u8> {
    let mut body = Vec::with_capacity(56);
    body.put_u16_le(MAX_FRAGMENT);
    body.put_u16_le(MAX_FRAGMENT);
    body.put_u32_le(0);
    body.put_u8(1);
    body.put_u8(0);
    body.put_u16_le(0);

    body.put_u16_le(0);
    body.put_u8(1);
    body.put_u8(0);
    abstract_syntax.put(&mut body);
    transfer_syntax.put(&mut body);

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.put_u8(RPC_VERSION);
    out.put_u8(RPC_VERSION_MINOR);
    out.put_u8(ptype::BIND);
    out.put_u8(PFC_FIRST_FRAG | PFC_LAST_FRAG);
    out.put_slice(&DREP_LITTLE_ENDIAN);
    out.put_u16_le((HEADER_LEN + body.len()) as u16);
    out.put_u16_le(0);
    out.put_u32_le(call_id);
    out.put_slice(&body);
    out
}

/// Presentation context negotiation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextResult(pub u16);

impl ContextResult {
    pub const ACCEPTANCE: ContextResult = ContextResult(0);
    pub const USER_REJECTION: ContextResult = ContextResult(1);
    pub const PROVIDER_REJECTION: ContextResult = ContextResult(2);
}

impl fmt::Display for ContextResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ACCEPTANCE => f.write_str("acceptance"),
            Self::USER_REJECTION => f.write_str("user_rejection"),
            Self::PROVIDER_REJECTION => f.write_str("provider_rejection"),
            Self(other) => write!(f, "result_{other}"),
        }
    }
}

/// Why a context or a whole bind was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectReason(pub u16);

impl RejectReason {
    pub const NOT_SPECIFIED: RejectReason = RejectReason(0);
    pub const ABSTRACT_SYNTAX_NOT_SUPPORTED: RejectReason = RejectReason(1);
    pub const TRANSFER_SYNTAXES_NOT_SUPPORTED: RejectReason = RejectReason(2);
    pub const LOCAL_LIMIT_EXCEEDED: RejectReason = RejectReason(3);
    pub const PROTOCOL_VERSION_NOT_SUPPORTED: RejectReason = RejectReason(4);
    pub const AUTHENTICATION_TYPE_NOT_RECOGNIZED: RejectReason = RejectReason(8);
    pub const INVALID_CHECKSUM: RejectReason = RejectReason(9);
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::NOT_SPECIFIED => "reason_not_specified",
            Self::ABSTRACT_SYNTAX_NOT_SUPPORTED => "abstract_syntax_not_supported",
            Self::TRANSFER_SYNTAXES_NOT_SUPPORTED => "proposed_transfer_syntaxes_not_supported",
            Self::LOCAL_LIMIT_EXCEEDED => "local_limit_exceeded",
            Self::PROTOCOL_VERSION_NOT_SUPPORTED => "protocol_version_not_supported",
            Self::AUTHENTICATION_TYPE_NOT_RECOGNIZED => "authentication_type_not_recognized",
            Self::INVALID_CHECKSUM => "invalid_checksum",
            Self(other) => return write!(f, "reason_{other}"),
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultStatus(pub u32);

impl fmt::Display for FaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            0x0000_0005 => "rpc_s_access_denied",
            0x1C01_0002 => "nca_s_op_rng_error",
            0x1C01_0003 => "nca_s_unk_if",
            0x1C01_000B => "nca_s_proto_error",
            0x1C00_001A => "nca_s_unsupported_type",
            other => return write!(f, "0x{other:08x}"),
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextResultEntry {
    pub result: ContextResult,
    pub reason: RejectReason,
    pub transfer_syntax: SyntaxId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindAck {
    pub max_xmit_frag: u16,
    pub max_recv_frag: u16,
    pub assoc_group: u32,
    pub secondary_address: String,
    pub results: Vec<ContextResultEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindReply {
    Ack(BindAck),
    Nak(RejectReason),
    Fault(FaultStatus),
}

impl BindReply {
    pub fn decode(data: &[u8]) -> Result<Self, BindError> {
        let mut buf = data;
        need(&buf, HEADER_LEN, "dcerpc header")?;

        let version = buf.get_u8();
        let _minor = buf.get_u8();
        if version != RPC_VERSION {
            return Err(CodecError::Malformed(format!("unsupported DCERPC version {version}")).into());
        }
        let packet_type = buf.get_u8();
        let _flags = buf.get_u8();
        let mut drep = [0u8; 4];
        buf.copy_to_slice(&mut drep);
        if drep[0] & 0xF0 != DREP_LITTLE_ENDIAN[0] {
            return Err(CodecError::Malformed("big-endian DCERPC replies are not supported".into()).into());
        }
        let frag_len = buf.get_u16_le() as usize;
        let _auth_len = buf.get_u16_le();
        let _call_id = buf.get_u32_le();

        let body_len = frag_len.saturating_sub(HEADER_LEN).min(buf.remaining());
        let mut body = &buf[..body_len];

        match packet_type {
            ptype::BIND_ACK => Ok(Self::Ack(parse_bind_ack(&mut body)?)),
            ptype::BIND_NAK => {
                need(&body, 2, "bind_nak reason")?;
                Ok(Self::Nak(RejectReason(body.get_u16_le())))
            }
            ptype::FAULT => {
                need(&body, 12, "fault body")?;
                body.advance(8);
                Ok(Self::Fault(FaultStatus(body.get_u32_le())))
            }
            other => Err(BindError::UnexpectedPacket(other)),
        }
    }

    /// The accepted transfer syntax, or why the bind was refused.
    pub fn accepted(&self) -> Result<SyntaxId, BindError> {
        match self {
            Self::Ack(ack) => {
                // one context is ever proposed
                let entry = ack.results.first().ok_or(BindError::NoResults)?;
                if entry.result == ContextResult::ACCEPTANCE {
                    Ok(entry.transfer_syntax)
                } else {
                    Err(BindError::ContextRejected {
                        context: 1,
                        result: entry.result,
                        reason: entry.reason,
                    })
                }
            }
            Self::Nak(reason) => Err(BindError::Rejected(*reason)),
            Self::Fault(status) => Err(BindError::Fault(*status)),
        }
    }
}

fn parse_bind_ack(body: &mut &[u8]) -> Result<BindAck, CodecError> {
    let start = body.len();
    need(body, 10, "bind_ack")?;
    let max_xmit_frag = body.get_u16_le();
    let max_recv_frag = body.get_u16_le();
    let assoc_group = body.get_u32_le();

    let address_len = body.get_u16_le() as usize;
    need(body, address_len, "bind_ack secondary address")?;
    let address = &body[..address_len];
    let secondary_address = String::from_utf8_lossy(address.strip_suffix(&[0]).unwrap_or(address))
        .into_owned();
    body.advance(address_len);

    // the result list is 4-byte aligned from the start of the PDU
    let consumed = HEADER_LEN + start - body.len();
    let pad = (4 - consumed % 4) % 4;
    need(body, pad + 4, "bind_ack result list")?;
    body.advance(pad);

    let count = body.get_u8() as usize;
    body.advance(3);
    let mut results = Vec::with_capacity(count);
    for _ in 0..count {
        need(body, 4, "bind_ack result")?;
        let result = ContextResult(body.get_u16_le());
        let reason = RejectReason(body.get_u16_le());
        let transfer_syntax = SyntaxId::parse(body)?;
        results.push(ContextResultEntry {
            result,
            reason,
            transfer_syntax,
        });
    }

    Ok(BindAck {
        max_xmit_frag,
        max_recv_frag,
        assoc_group,
        secondary_address,
        results,
    })
}

/// A bind that did not end with an accepted context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("Bind context {context} rejected: {result}; {reason}")]
    ContextRejected {
        context: u16,
        result: ContextResult,
        reason: RejectReason,
    },

    #[error("Bind context rejected: {0}")]
    Rejected(RejectReason),

    #[error("DCERPC fault: {0}")]
    Fault(FaultStatus),

    #[error("bind_ack carried no context results")]
    NoResults,

    #[error("unexpected DCERPC packet type {0}")]
    UnexpectedPacket(u8),

    #[error("malformed bind reply: {0}")]
    Malformed(#[from] CodecError),
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
