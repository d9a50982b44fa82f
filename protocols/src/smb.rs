//! SMB1 (CIFS) message layout and the handful of commands the probe issues.
//!
//! A [`Message`] is the 32-byte header followed by the parameter words and the
//! data bytes. Builders return messages with a default request header; the
//! session fills in UID/TID/MID and signs before framing.
//!
//! Every offset a server interprets (string alignment, transaction parameter
//! and data offsets) is relative to the first byte of the SMB header, so the
//! builders compute padding with [`bytes_offset`].

use bytes::{Buf, BufMut};
use md5::{Digest, Md5};

use crate::error::{CodecError, need, slice};
use crate::status::NtStatus;
use crate::utf16;

pub const MAGIC: &[u8; 4] = b"\xffSMB";
pub const HEADER_LEN: usize = 32;
const SIGNATURE_RANGE: std::ops::Range<usize> = 14..22;

pub mod command {
    pub const CLOSE: u8 = 0x04;
    pub const TRANSACTION: u8 = 0x25;
    pub const TREE_DISCONNECT: u8 = 0x71;
    pub const NEGOTIATE: u8 = 0x72;
    pub const SESSION_SETUP_ANDX: u8 = 0x73;
    pub const LOGOFF_ANDX: u8 = 0x74;
    pub const TREE_CONNECT_ANDX: u8 = 0x75;
    pub const NT_CREATE_ANDX: u8 = 0xA2;
}

pub const FLAGS_CASE_INSENSITIVE: u8 = 0x08;
pub const FLAGS_CANONICALIZED_PATHS: u8 = 0x10;
pub const FLAGS_REPLY: u8 = 0x80;

pub const FLAGS2_LONG_NAMES: u16 = 0x0001;
pub const FLAGS2_EAS: u16 = 0x0002;
pub const FLAGS2_SECURITY_SIGNATURE: u16 = 0x0004;
pub const FLAGS2_EXTENDED_SECURITY: u16 = 0x0800;
pub const FLAGS2_NT_STATUS: u16 = 0x4000;
pub const FLAGS2_UNICODE: u16 = 0x8000;

pub const CAP_UNICODE: u32 = 0x0000_0004;
pub const CAP_LARGE_FILES: u32 = 0x0000_0008;
pub const CAP_NT_SMBS: u32 = 0x0000_0010;
pub const CAP_STATUS32: u32 = 0x0000_0040;
pub const CAP_EXTENDED_SECURITY: u32 = 0x8000_0000;

pub const CLIENT_CAPABILITIES: u32 = CAP_UNICODE | CAP_LARGE_FILES | CAP_NT_SMBS | CAP_STATUS32;

pub const SECURITY_SIGNATURES_ENABLED: u8 = 0x04;
pub const SECURITY_SIGNATURES_REQUIRED: u8 = 0x08;

pub const ACTION_GUEST: u16 = 0x0001;

pub const DIALECT: &str = "NT LM 0.12";
pub const NO_DIALECT: u16 = 0xFFFF;

pub const TRANS_PEEK_NMPIPE: u16 = 0x0023;
pub const TRANS_TRANSACT_NMPIPE: u16 = 0x0026;
pub const PIPE_NAME: &str = "\\PIPE\\";

const NATIVE_OS: &str = "Unix";
const NATIVE_LAN_MAN: &str = "mscheck";
const CLIENT_MAX_BUFFER: u16 = 0xFFFF;

/// Read/write data plus attribute and security access, the set a DCE/RPC
/// client asks for on a named pipe.
const PIPE_DESIRED_ACCESS: u32 = 0x0012_019F;
const FILE_SHARE_READ_WRITE: u32 = 0x0000_0003;
const FILE_OPEN: u32 = 0x0000_0001;
const FILE_NON_DIRECTORY_FILE: u32 = 0x0000_0040;
const SECURITY_IMPERSONATION: u32 = 0x0000_0002;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub command: u8,
    pub status: NtStatus,
    pub flags: u8,
    pub flags2: u16,
    pub pid_high: u16,
    pub signature: [u8; 8],
    pub tid: u16,
    pub pid: u16,
    pub uid: u16,
    pub mid: u16,
}

impl Header {
    pub fn request(command: u8) -> Self {
        Self {
            command,
            status: NtStatus::SUCCESS,
            flags: FLAGS_CASE_INSENSITIVE | FLAGS_CANONICALIZED_PATHS,
            flags2: FLAGS2_UNICODE
                | FLAGS2_NT_STATUS
                | FLAGS2_EXTENDED_SECURITY
                | FLAGS2_EAS
                | FLAGS2_LONG_NAMES,
            pid_high: 0,
            signature: [0; 8],
            tid: 0,
            pid: 0,
            uid: 0,
            mid: 0,
        }
    }

    pub fn is_unicode(&self) -> bool {
        self.flags2 & FLAGS2_UNICODE != 0
    }

    fn put(&self, out: &mut Vec<u8>) {
        out.put_slice(MAGIC);
        out.put_u8(self.command);
        out.put_u32_le(self.status.code());
        out.put_u8(self.flags);
        out.put_u16_le(self.flags2);
        out.put_u16_le(self.pid_high);
        out.put_slice(&self.signature);
        out.put_u16_le(0);
        out.put_u16_le(self.tid);
        out.put_u16_le(self.pid);
        out.put_u16_le(self.uid);
        out.put_u16_le(self.mid);
    }

    fn parse(buf: &mut &[u8]) -> Result<Self, CodecError> {
        need(buf, HEADER_LEN, "smb header")?;
        let mut magic = [0u8; 4];
        buf.copy_to_slice(&mut magic);
        if &magic != MAGIC {
            return Err(CodecError::BadSignature {
                context: "smb header",
            });
        }

        let command = buf.get_u8();
        let status = NtStatus(buf.get_u32_le());
        let flags = buf.get_u8();
        let flags2 = buf.get_u16_le();
        let pid_high = buf.get_u16_le();
        let mut signature = [0u8; 8];
        buf.copy_to_slice(&mut signature);
        buf.advance(2);

        Ok(Self {
            command,
            status,
            flags,
            flags2,
            pid_high,
            signature,
            tid: buf.get_u16_le(),
            pid: buf.get_u16_le(),
            uid: buf.get_u16_le(),
            mid: buf.get_u16_le(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub words: Vec<u8>,
    pub bytes: Vec<u8>,
}

impl Message {
    pub fn new(header: Header, words: Vec<u8>, bytes: Vec<u8>) -> Self {
        Self {
            header,
            words,
            bytes,
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len() / 2
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(bytes_offset(self.words.len()) + self.bytes.len());
        self.header.put(&mut out);
        out.put_u8(self.word_count() as u8);
        out.put_slice(&self.words);
        out.put_u16_le(self.bytes.len() as u16);
        out.put_slice(&self.bytes);
        out
    }

    /// Decodes one SMB message. A byte count larger than what was received
    /// is clamped, some servers overstate it on error replies.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut buf = data;
        let header = Header::parse(&mut buf)?;

        need(&buf, 1, "smb word count")?;
        let word_count = buf.get_u8() as usize;
        need(&buf, word_count * 2, "smb parameter words")?;
        let words = buf[..word_count * 2].to_vec();
        buf.advance(word_count * 2);

        let bytes = if buf.remaining() >= 2 {
            let byte_count = buf.get_u16_le() as usize;
            buf[..byte_count.min(buf.remaining())].to_vec()
        } else {
            Vec::new()
        };

        Ok(Self {
            header,
            words,
            bytes,
        })
    }

    /// Start of the data bytes, relative to the SMB header.
    pub fn data_start(&self) -> usize {
        bytes_offset(self.words.len())
    }
}

/// Offset of the first data byte from the start of the SMB header for a
/// message with `words_len` bytes of parameter words.
pub fn bytes_offset(words_len: usize) -> usize {
    HEADER_LEN + 1 + words_len + 2
}

fn pad_to(out: &mut Vec<u8>, base: usize, align: usize) {
    while (base + out.len()) % align != 0 {
        out.put_u8(0);
    }
}

/// Signs an encoded message in place.
///
/// The signature field is first loaded with the sequence number, then
/// replaced by the first 8 bytes of MD5(mac key ‖ message).
pub fn sign(message: &mut [u8], mac_key: &[u8], sequence: u32) {
    let mut seq = [0u8; 8];
    seq[..4].copy_from_slice(&sequence.to_le_bytes());
    message[SIGNATURE_RANGE].copy_from_slice(&seq);

    let digest = Md5::new()
        .chain_update(mac_key)
        .chain_update(&message[..])
        .finalize();
    message[SIGNATURE_RANGE].copy_from_slice(&digest[..8]);
}

// ── Negotiate ────────────────────────────────────────────────────────────────

pub fn negotiate_request() -> Message {
    let mut bytes = Vec::new();
    bytes.put_u8(0x02);
    bytes.put_slice(DIALECT.as_bytes());
    bytes.put_u8(0);
    Message::new(Header::request(command::NEGOTIATE), Vec::new(), bytes)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiateResponse {
    pub dialect_index: u16,
    pub security_mode: u8,
    pub max_mpx_count: u16,
    pub max_buffer_size: u32,
    pub session_key: u32,
    pub capabilities: u32,
    pub system_time: u64,
    /// Present when the server does not do extended security.
    pub challenge: Option<[u8; 8]>,
    pub domain_name: String,
    pub server_guid: Option<[u8; 16]>,
    pub security_blob: Vec<u8>,
}

impl NegotiateResponse {
    pub fn parse(message: &Message) -> Result<Self, CodecError> {
        let mut words = message.words.as_slice();
        need(&words, 2, "negotiate dialect index")?;
        let dialect_index = words.get_u16_le();

        if dialect_index == NO_DIALECT {
            return Ok(Self {
                dialect_index,
                security_mode: 0,
                max_mpx_count: 0,
                max_buffer_size: 0,
                session_key: 0,
                capabilities: 0,
                system_time: 0,
                challenge: None,
                domain_name: String::new(),
                server_guid: None,
                security_blob: Vec::new(),
            });
        }

        need(&words, 32, "negotiate response words")?;
        let security_mode = words.get_u8();
        let max_mpx_count = words.get_u16_le();
        let _max_vcs = words.get_u16_le();
        let max_buffer_size = words.get_u32_le();
        let _max_raw = words.get_u32_le();
        let session_key = words.get_u32_le();
        let capabilities = words.get_u32_le();
        let system_time = words.get_u64_le();
        let _time_zone = words.get_i16_le();
        let challenge_len = words.get_u8() as usize;

        let mut response = Self {
            dialect_index,
            security_mode,
            max_mpx_count,
            max_buffer_size,
            session_key,
            capabilities,
            system_time,
            challenge: None,
            domain_name: String::new(),
            server_guid: None,
            security_blob: Vec::new(),
        };

        let data = message.bytes.as_slice();
        if capabilities & CAP_EXTENDED_SECURITY != 0 {
            let guid = slice(data, 0, 16, "negotiate server guid")?;
            let mut server_guid = [0u8; 16];
            server_guid.copy_from_slice(guid);
            response.server_guid = Some(server_guid);
            response.security_blob = data[16..].to_vec();
        } else {
            if challenge_len != 8 {
                return Err(CodecError::Malformed(format!(
                    "unsupported challenge length {challenge_len}"
                )));
            }
            let challenge = slice(data, 0, 8, "negotiate challenge")?;
            let mut key = [0u8; 8];
            key.copy_from_slice(challenge);
            response.challenge = Some(key);
            // DomainName follows the challenge with no alignment pad
            response.domain_name = if message.header.is_unicode() {
                utf16::decode_nul(&data[8..]).0
            } else {
                read_string(&data[8..], 0, false).0
            };
        }

        Ok(response)
    }

    pub fn extended_security(&self) -> bool {
        self.capabilities & CAP_EXTENDED_SECURITY != 0
    }

    pub fn signing_required(&self) -> bool {
        self.security_mode & SECURITY_SIGNATURES_REQUIRED != 0
    }
}

// ── Session setup ────────────────────────────────────────────────────────────

fn put_session_setup_prefix(words: &mut Vec<u8>, session_key: u32, max_mpx: u16) {
    words.put_u8(0xFF);
    words.put_u8(0);
    words.put_u16_le(0);
    words.put_u16_le(CLIENT_MAX_BUFFER);
    words.put_u16_le(max_mpx.max(1));
    words.put_u16_le(1);
    words.put_u32_le(session_key);
}

/// SESSION_SETUP_ANDX carrying a GSS-API security blob.
pub fn session_setup_extended(blob: &[u8], session_key: u32, max_mpx: u16) -> Message {
    let mut words = Vec::with_capacity(24);
    put_session_setup_prefix(&mut words, session_key, max_mpx);
    words.put_u16_le(blob.len() as u16);
    words.put_u32_le(0);
    words.put_u32_le(CLIENT_CAPABILITIES | CAP_EXTENDED_SECURITY);

    let base = bytes_offset(words.len());
    let mut bytes = Vec::new();
    bytes.put_slice(blob);
    pad_to(&mut bytes, base, 2);
    bytes.put_slice(&utf16::encode_nul(NATIVE_OS));
    bytes.put_slice(&utf16::encode_nul(NATIVE_LAN_MAN));

    Message::new(Header::request(command::SESSION_SETUP_ANDX), words, bytes)
}

/// SESSION_SETUP_ANDX with challenge responses in the password fields, for
/// servers that do not negotiate extended security.
pub fn session_setup_ntlm(
    lm_response: &[u8],
    nt_response: &[u8],
    username: &str,
    domain: &str,
    session_key: u32,
    max_mpx: u16,
) -> Message {
    let mut words = Vec::with_capacity(26);
    put_session_setup_prefix(&mut words, session_key, max_mpx);
    words.put_u16_le(lm_response.len() as u16);
    words.put_u16_le(nt_response.len() as u16);
    words.put_u32_le(0);
    words.put_u32_le(CLIENT_CAPABILITIES);

    let base = bytes_offset(words.len());
    let mut bytes = Vec::new();
    bytes.put_slice(lm_response);
    bytes.put_slice(nt_response);
    pad_to(&mut bytes, base, 2);
    bytes.put_slice(&utf16::encode_nul(username));
    bytes.put_slice(&utf16::encode_nul(domain));
    bytes.put_slice(&utf16::encode_nul(NATIVE_OS));
    bytes.put_slice(&utf16::encode_nul(NATIVE_LAN_MAN));

    let mut header = Header::request(command::SESSION_SETUP_ANDX);
    header.flags2 &= !FLAGS2_EXTENDED_SECURITY;
    Message::new(header, words, bytes)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSetupResponse {
    pub action: u16,
    pub security_blob: Vec<u8>,
    pub native_os: String,
    pub native_lan_man: String,
    pub primary_domain: String,
}

impl SessionSetupResponse {
    /// Error replies carry no words at all and decode to an empty response.
    pub fn parse(message: &Message) -> Result<Self, CodecError> {
        let mut words = message.words.as_slice();
        if words.is_empty() {
            return Ok(Self::default());
        }

        need(&words, 6, "session setup response words")?;
        words.advance(4);
        let action = words.get_u16_le();
        let blob_len = if words.remaining() >= 2 {
            words.get_u16_le() as usize
        } else {
            0
        };

        let data = message.bytes.as_slice();
        let security_blob = slice(data, 0, blob_len, "session setup security blob")?.to_vec();

        let unicode = message.header.is_unicode();
        let mut cursor = blob_len;
        let (native_os, used) = read_string(&data[cursor..], message.data_start() + cursor, unicode);
        cursor += used;
        let (native_lan_man, used) =
            read_string(&data[cursor..], message.data_start() + cursor, unicode);
        cursor += used;
        let (primary_domain, _) =
            read_string(&data[cursor..], message.data_start() + cursor, unicode);

        Ok(Self {
            action,
            security_blob,
            native_os,
            native_lan_man,
            primary_domain,
        })
    }

    pub fn is_guest(&self) -> bool {
        self.action & ACTION_GUEST != 0
    }
}

/// Reads a NUL terminated string starting at `data`, whose first byte sits at
/// `offset` from the SMB header. Unicode strings are 2-byte aligned there.
fn read_string(data: &[u8], offset: usize, unicode: bool) -> (String, usize) {
    if unicode {
        let pad = offset % 2;
        if data.len() <= pad {
            return (String::new(), data.len());
        }
        let (s, used) = utf16::decode_nul(&data[pad..]);
        (s, used + pad)
    } else {
        let end = data.iter().position(|&b| b == 0);
        let used = end.map_or(data.len(), |end| end + 1);
        let s = String::from_utf8_lossy(&data[..end.unwrap_or(data.len())]).into_owned();
        (s, used)
    }
}

// ── Tree connect / disconnect, logoff ────────────────────────────────────────

/// TREE_CONNECT_ANDX for `path` such as `\\10.0.0.5\IPC$`.
pub fn tree_connect_request(path: &str) -> Message {
    let mut words = Vec::with_capacity(8);
    words.put_u8(0xFF);
    words.put_u8(0);
    words.put_u16_le(0);
    words.put_u16_le(0);
    words.put_u16_le(1);

    let base = bytes_offset(words.len());
    let mut bytes = vec![0u8];
    pad_to(&mut bytes, base, 2);
    bytes.put_slice(&utf16::encode_nul(path));
    bytes.put_slice(b"?????\0");

    Message::new(Header::request(command::TREE_CONNECT_ANDX), words, bytes)
}

pub fn tree_disconnect_request() -> Message {
    Message::new(Header::request(command::TREE_DISCONNECT), Vec::new(), Vec::new())
}

pub fn logoff_request() -> Message {
    let mut words = Vec::with_capacity(4);
    words.put_u8(0xFF);
    words.put_u8(0);
    words.put_u16_le(0);
    Message::new(Header::request(command::LOGOFF_ANDX), words, Vec::new())
}

// ── Transactions ─────────────────────────────────────────────────────────────

/// An SMB_COM_TRANSACTION request against the named pipe subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransRequest {
    pub setup: Vec<u16>,
    pub name: String,
    pub parameters: Vec<u8>,
    pub data: Vec<u8>,
    pub max_parameter_count: u16,
    pub max_data_count: u16,
    pub max_setup_count: u8,
}

impl TransRequest {
    /// PeekNamedPipe with no file handle and empty buffers.
    ///
    /// A server missing the MS17-010 fix answers this with
    /// `STATUS_INSUFF_SERVER_RESOURCES`.
    pub fn peek_named_pipe() -> Self {
        Self {
            setup: vec![TRANS_PEEK_NMPIPE],
            name: PIPE_NAME.to_string(),
            parameters: Vec::new(),
            data: Vec::new(),
            max_parameter_count: 0xFFFF,
            max_data_count: 0x0800,
            max_setup_count: 0,
        }
    }

    /// TransactNamedPipe: write `data` to the pipe and read the reply in one round trip.
    pub fn transact_named_pipe(fid: u16, data: Vec<u8>, max_data_count: u16) -> Self {
        Self {
            setup: vec![TRANS_TRANSACT_NMPIPE, fid],
            name: PIPE_NAME.to_string(),
            parameters: Vec::new(),
            data,
            max_parameter_count: 0,
            max_data_count,
            max_setup_count: 0,
        }
    }

    pub fn subcommand(&self) -> Option<u16> {
        self.setup.first().copied()
    }

    pub fn to_message(&self) -> Message {
        let words_len = 28 + self.setup.len() * 2;
        let base = bytes_offset(words_len);

        let mut bytes = Vec::new();
        pad_to(&mut bytes, base, 2);
        bytes.put_slice(&utf16::encode_nul(&self.name));
        pad_to(&mut bytes, base, 4);
        let parameter_offset = base + bytes.len();
        bytes.put_slice(&self.parameters);
        if !self.data.is_empty() {
            pad_to(&mut bytes, base, 4);
        }
        let data_offset = base + bytes.len();
        bytes.put_slice(&self.data);

        let mut words = Vec::with_capacity(words_len);
        words.put_u16_le(self.parameters.len() as u16);
        words.put_u16_le(self.data.len() as u16);
        words.put_u16_le(self.max_parameter_count);
        words.put_u16_le(self.max_data_count);
        words.put_u8(self.max_setup_count);
        words.put_u8(0);
        words.put_u16_le(0);
        words.put_u32_le(0);
        words.put_u16_le(0);
        words.put_u16_le(self.parameters.len() as u16);
        words.put_u16_le(parameter_offset as u16);
        words.put_u16_le(self.data.len() as u16);
        words.put_u16_le(data_offset as u16);
        words.put_u8(self.setup.len() as u8);
        words.put_u8(0);
        for word in &self.setup {
            words.put_u16_le(*word);
        }

        Message::new(Header::request(command::TRANSACTION), words, bytes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransResponse {
    pub total_data_count: u16,
    pub parameters: Vec<u8>,
    pub data: Vec<u8>,
}

impl TransResponse {
    pub fn parse(message: &Message) -> Result<Self, CodecError> {
        let mut words = message.words.as_slice();
        if words.is_empty() {
            return Ok(Self::default());
        }

        need(&words, 20, "transaction response words")?;
        let _total_parameter_count = words.get_u16_le();
        let total_data_count = words.get_u16_le();
        words.advance(2);
        let parameter_count = words.get_u16_le() as usize;
        let parameter_offset = words.get_u16_le() as usize;
        words.advance(2);
        let data_count = words.get_u16_le() as usize;
        let data_offset = words.get_u16_le() as usize;

        let start = message.data_start();
        let parameters = if parameter_count == 0 {
            Vec::new()
        } else {
            let offset = parameter_offset.checked_sub(start).ok_or_else(|| {
                CodecError::Malformed(format!("parameter offset {parameter_offset} inside header"))
            })?;
            slice(&message.bytes, offset, parameter_count, "transaction parameters")?.to_vec()
        };
        let data = if data_count == 0 {
            Vec::new()
        } else {
            let offset = data_offset.checked_sub(start).ok_or_else(|| {
                CodecError::Malformed(format!("data offset {data_offset} inside header"))
            })?;
            slice(&message.bytes, offset, data_count, "transaction data")?.to_vec()
        };

        Ok(Self {
            total_data_count,
            parameters,
            data,
        })
    }
}

// ── Files ────────────────────────────────────────────────────────────────────

/// NT_CREATE_ANDX opening `name` (e.g. `\samr`) on the IPC$ tree.
pub fn nt_create_request(name: &str) -> Message {
    let encoded_name = utf16::encode(name);

    let mut words = Vec::with_capacity(48);
    words.put_u8(0xFF);
    words.put_u8(0);
    words.put_u16_le(0);
    words.put_u8(0);
    words.put_u16_le(encoded_name.len() as u16);
    words.put_u32_le(0);
    words.put_u32_le(0);
    words.put_u32_le(PIPE_DESIRED_ACCESS);
    words.put_u64_le(0);
    words.put_u32_le(0);
    words.put_u32_le(FILE_SHARE_READ_WRITE);
    words.put_u32_le(FILE_OPEN);
    words.put_u32_le(FILE_NON_DIRECTORY_FILE);
    words.put_u32_le(SECURITY_IMPERSONATION);
    words.put_u8(0);

    let base = bytes_offset(words.len());
    let mut bytes = Vec::new();
    pad_to(&mut bytes, base, 2);
    bytes.put_slice(&encoded_name);
    bytes.put_slice(&[0, 0]);

    Message::new(Header::request(command::NT_CREATE_ANDX), words, bytes)
}

/// The file id from an NT_CREATE_ANDX reply.
pub fn parse_nt_create_fid(message: &Message) -> Result<u16, CodecError> {
    let words = slice(&message.words, 5, 2, "nt create fid")?;
    Ok(u16::from_le_bytes([words[0], words[1]]))
}

pub fn close_request(fid: u16) -> Message {
    let mut words = Vec::with_capacity(6);
    words.put_u16_le(fid);
    words.put_u32_le(0xFFFF_FFFF);
    Message::new(Header::request(command::CLOSE), words, Vec::new())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
