//! NTLMSSP messages and NTLMv2 response computation.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut};
use hmac::{Hmac, Mac, digest::KeyInit};
use md4::Md4;
use md5::{Digest, Md5};

use crate::error::{CodecError, need, slice};
use crate::utf16;

type HmacMd5 = Hmac<Md5>;

pub const SIGNATURE: &[u8; 8] = b"NTLMSSP\0";

const NEGOTIATE_MESSAGE: u32 = 1;
const CHALLENGE_MESSAGE: u32 = 2;
const AUTHENTICATE_MESSAGE: u32 = 3;

pub mod flags {
    pub const UNICODE: u32 = 0x0000_0001;
    pub const REQUEST_TARGET: u32 = 0x0000_0004;
    pub const NTLM: u32 = 0x0000_0200;
    pub const ANONYMOUS: u32 = 0x0000_0800;
    pub const ALWAYS_SIGN: u32 = 0x0000_8000;
    pub const EXTENDED_SESSIONSECURITY: u32 = 0x0008_0000;
    pub const TARGET_INFO: u32 = 0x0080_0000;
    pub const KEY_128: u32 = 0x2000_0000;
    pub const KEY_56: u32 = 0x8000_0000;
}

pub const CLIENT_FLAGS: u32 = flags::UNICODE
    | flags::REQUEST_TARGET
    | flags::NTLM
    | flags::ALWAYS_SIGN
    | flags::EXTENDED_SESSIONSECURITY
    | flags::TARGET_INFO
    | flags::KEY_128
    | flags::KEY_56;

const AV_EOL: u16 = 0;
const AV_TIMESTAMP: u16 = 7;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_EPOCH_OFFSET: u64 = 11_644_473_600;

/// Current time as a Windows FILETIME (100ns ticks since 1601).
pub fn filetime_now() -> u64 {
    let since_unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (since_unix.as_secs() + FILETIME_EPOCH_OFFSET) * 10_000_000
        + u64::from(since_unix.subsec_nanos() / 100)
}

pub fn random_client_challenge() -> [u8; 8] {
    rand::random()
}

/// The NEGOTIATE_MESSAGE opening the exchange. Domain and workstation are left empty.
pub fn negotiate_message() -> Vec<u8> {
    let mut out = Vec::with_capacity(32);
    out.put_slice(SIGNATURE);
    out.put_u32_le(NEGOTIATE_MESSAGE);
    out.put_u32_le(CLIENT_FLAGS);
    put_fields(&mut out, 0, 32);
    put_fields(&mut out, 0, 32);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub flags: u32,
    pub server_challenge: [u8; 8],
    pub target_info: Vec<u8>,
}

impl Challenge {
    pub fn parse(data: &[u8]) -> Result<Self, CodecError> {
        let mut buf = data;
        need(&buf, 32, "ntlm challenge")?;
        if &buf[..8] != SIGNATURE {
            return Err(CodecError::BadSignature {
                context: "ntlm challenge",
            });
        }
        buf.advance(8);

        let message_type = buf.get_u32_le();
        if message_type != CHALLENGE_MESSAGE {
            return Err(CodecError::Malformed(format!(
                "expected NTLM challenge, got message type {message_type}"
            )));
        }

        buf.advance(8);
        let flags = buf.get_u32_le();
        let mut server_challenge = [0u8; 8];
        buf.copy_to_slice(&mut server_challenge);

        // TargetInfoFields sit after 8 reserved bytes and are absent in old servers
        let target_info = if data.len() >= 48 {
            let mut fields = &data[40..48];
            let len = fields.get_u16_le() as usize;
            fields.advance(2);
            let offset = fields.get_u32_le() as usize;
            slice(data, offset, len, "ntlm target info")?.to_vec()
        } else {
            Vec::new()
        };

        Ok(Self {
            flags,
            server_challenge,
            target_info,
        })
    }

    /// The server's MsvAvTimestamp, used instead of the local clock when present.
    pub fn timestamp(&self) -> Option<u64> {
        av_pairs(&self.target_info)
            .find(|(id, value)| *id == AV_TIMESTAMP && value.len() == 8)
            .map(|(_, mut value)| value.get_u64_le())
    }
}

fn av_pairs(mut data: &[u8]) -> impl Iterator<Item = (u16, &[u8])> {
    std::iter::from_fn(move || {
        if data.len() < 4 {
            return None;
        }
        let id = u16::from_le_bytes([data[0], data[1]]);
        let len = u16::from_le_bytes([data[2], data[3]]) as usize;
        if id == AV_EOL || data.len() < 4 + len {
            return None;
        }
        let value = &data[4..4 + len];
        data = &data[4 + len..];
        Some((id, value))
    })
}

fn hmac_md5(key: &[u8], parts: &[&[u8]]) -> [u8; 16] {
    let Ok(mut mac) = <HmacMd5 as KeyInit>::new_from_slice(key) else {
        unreachable!("HMAC accepts keys of any length");
    };
    for part in parts {
        mac.update(part);
    }
    to_array(&mac.finalize().into_bytes())
}

fn to_array(digest: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    out
}

/// MD4 of the UTF-16LE password.
pub fn nt_hash(password: &str) -> [u8; 16] {
    to_array(&Md4::digest(utf16::encode(password)))
}

/// NTOWFv2: HMAC-MD5 keyed by the NT hash over UPPER(user) ‖ domain.
pub fn ntowf_v2(password: &str, username: &str, domain: &str) -> [u8; 16] {
    let identity = utf16::encode(&format!("{}{}", username.to_uppercase(), domain));
    hmac_md5(&nt_hash(password), &[&identity])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ntlmv2Response {
    pub lm_response: Vec<u8>,
    pub nt_response: Vec<u8>,
    pub session_base_key: [u8; 16],
}

/// LMv2 and NTLMv2 responses for one challenge.
pub fn ntlmv2_response(
    response_key: &[u8; 16],
    server_challenge: &[u8; 8],
    client_challenge: &[u8; 8],
    timestamp: u64,
    target_info: &[u8],
) -> Ntlmv2Response {
    let mut temp = Vec::with_capacity(32 + target_info.len());
    temp.put_slice(&[0x01, 0x01, 0, 0, 0, 0, 0, 0]);
    temp.put_u64_le(timestamp);
    temp.put_slice(client_challenge);
    temp.put_u32_le(0);
    temp.put_slice(target_info);
    temp.put_u32_le(0);

    let nt_proof = hmac_md5(response_key, &[server_challenge, &temp]);
    let mut nt_response = nt_proof.to_vec();
    nt_response.extend_from_slice(&temp);

    let mut lm_response = hmac_md5(response_key, &[server_challenge, client_challenge]).to_vec();
    lm_response.extend_from_slice(client_challenge);

    Ntlmv2Response {
        lm_response,
        nt_response,
        session_base_key: hmac_md5(response_key, &[&nt_proof]),
    }
}

/// Who the client claims to be. An empty username means anonymous.
#[derive(Debug, Clone, Copy)]
pub struct Identity<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub domain: &'a str,
}

impl Identity<'_> {
    pub fn is_anonymous(&self) -> bool {
        self.username.is_empty()
    }
}

/// The AUTHENTICATE_MESSAGE plus the session key for signing, if any.
#[derive(Debug, Clone)]
pub struct Authentication {
    pub message: Vec<u8>,
    pub session_key: Option<[u8; 16]>,
}

/// Answers `challenge`. Anonymous logins send a single zero LM byte and an
/// empty NT response and produce no session key.
pub fn authenticate(
    challenge: &Challenge,
    identity: &Identity<'_>,
    client_challenge: [u8; 8],
) -> Authentication {
    if identity.is_anonymous() {
        return Authentication {
            message: authenticate_message(CLIENT_FLAGS | flags::ANONYMOUS, &[0], &[], "", "", ""),
            session_key: None,
        };
    }

    let key = ntowf_v2(identity.password, identity.username, identity.domain);
    let timestamp = challenge.timestamp().unwrap_or_else(filetime_now);
    let response = ntlmv2_response(
        &key,
        &challenge.server_challenge,
        &client_challenge,
        timestamp,
        &challenge.target_info,
    );

    Authentication {
        message: authenticate_message(
            CLIENT_FLAGS,
            &response.lm_response,
            &response.nt_response,
            identity.domain,
            identity.username,
            "",
        ),
        session_key: Some(response.session_base_key),
    }
}

pub fn authenticate_message(
    negotiate_flags: u32,
    lm_response: &[u8],
    nt_response: &[u8],
    domain: &str,
    username: &str,
    workstation: &str,
) -> Vec<u8> {
    const PAYLOAD_OFFSET: usize = 64;

    let domain = utf16::encode(domain);
    let username = utf16::encode(username);
    let workstation = utf16::encode(workstation);

    let mut out = Vec::with_capacity(
        PAYLOAD_OFFSET + lm_response.len() + nt_response.len() + domain.len() + username.len(),
    );
    out.put_slice(SIGNATURE);
    out.put_u32_le(AUTHENTICATE_MESSAGE);

    let mut offset = PAYLOAD_OFFSET;
    let fields: [&[u8]; 6] = [lm_response, nt_response, &domain, &username, &workstation, &[]];
    for field in fields {
        put_fields(&mut out, field.len(), offset);
        offset += field.len();
    }
    out.put_u32_le(negotiate_flags);

    out.put_slice(lm_response);
    out.put_slice(nt_response);
    out.put_slice(&domain);
    out.put_slice(&username);
    out.put_slice(&workstation);
    out
}

fn put_fields(out: &mut Vec<u8>, len: usize, offset: usize) {
    out.put_u16_le(len as u16);
    out.put_u16_le(len as u16);
    out.put_u32_le(offset as u32);
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
