//! Minimal SPNEGO (RFC 4178) wrapping for NTLMSSP tokens.
//!
//! Only the two client tokens are ever built: the initial `negTokenInit`
//! proposing NTLMSSP, and the `negTokenResp` carrying the AUTHENTICATE
//! message. Server tokens are not DER-decoded; the NTLMSSP payload is located
//! by its signature.

use bytes::BufMut;

use crate::ntlm;

const SPNEGO_OID: &[u8] = &[0x2b, 0x06, 0x01, 0x05, 0x05, 0x02];
const NTLMSSP_OID: &[u8] = &[0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x02, 0x02, 0x0a];

const APPLICATION_0: u8 = 0x60;
const SEQUENCE: u8 = 0x30;
const OID: u8 = 0x06;
const OCTET_STRING: u8 = 0x04;
const CONTEXT_0: u8 = 0xa0;
const CONTEXT_1: u8 = 0xa1;
const CONTEXT_2: u8 = 0xa2;

fn put_length(out: &mut Vec<u8>, len: usize) {
    match len {
        0..=0x7f => out.put_u8(len as u8),
        0x80..=0xff => {
            out.put_u8(0x81);
            out.put_u8(len as u8);
        }
        _ => {
            out.put_u8(0x82);
            out.put_u16(len as u16);
        }
    }
}

fn der(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 4);
    out.put_u8(tag);
    put_length(&mut out, content.len());
    out.put_slice(content);
    out
}

/// GSS-API initial context token offering NTLMSSP with `token` as the mech token.
pub fn neg_token_init(token: &[u8]) -> Vec<u8> {
    let mech_types = der(CONTEXT_0, &der(SEQUENCE, &der(OID, NTLMSSP_OID)));
    let mech_token = der(CONTEXT_2, &der(OCTET_STRING, token));

    let mut body = mech_types;
    body.extend_from_slice(&mech_token);
    let neg_token = der(CONTEXT_0, &der(SEQUENCE, &body));

    let mut inner = der(OID, SPNEGO_OID);
    inner.extend_from_slice(&neg_token);
    der(APPLICATION_0, &inner)
}

/// Subsequent client token carrying `token` as the response token.
pub fn neg_token_resp(token: &[u8]) -> Vec<u8> {
    let response_token = der(CONTEXT_2, &der(OCTET_STRING, token));
    der(CONTEXT_1, &der(SEQUENCE, &response_token))
}

/// The embedded NTLMSSP message, from its signature to the end of the blob.
pub fn ntlmssp_token(blob: &[u8]) -> Option<&[u8]> {
    blob.windows(ntlm::SIGNATURE.len())
        .position(|window| window == ntlm::SIGNATURE)
        .map(|start| &blob[start..])
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
