//! NetBIOS session service framing for SMB over TCP port 445.
//!
//! Each message is prefixed with a 4-byte header: a type byte (`0x00` for a
//! session message) followed by a 24-bit big-endian length.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const SESSION_MESSAGE: u8 = 0x00;
pub const KEEP_ALIVE: u8 = 0x85;

/// Largest frame accepted from a server. The probe never asks for more than a few KiB.
pub const MAX_FRAME_SIZE: usize = 128 * 1024;

/// Prepends the session message header to `payload`.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let len = payload.len() as u32;
    let mut out = Vec::with_capacity(payload.len() + 4);
    out.push(SESSION_MESSAGE);
    out.extend_from_slice(&len.to_be_bytes()[1..]);
    out.extend_from_slice(payload);
    out
}

/// Reads one session message, skipping keep-alives.
pub async fn read_frame<R>(stream: &mut R) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    loop {
        let mut header = [0u8; 4];
        stream.read_exact(&mut header).await?;

        let len = u32::from_be_bytes([0, header[1], header[2], header[3]]) as usize;
        if len > MAX_FRAME_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame too large: {len} bytes"),
            ));
        }

        let mut payload = vec![0u8; len];
        stream.read_exact(&mut payload).await?;

        match header[0] {
            SESSION_MESSAGE => return Ok(payload),
            KEEP_ALIVE => {
                tracing::trace!("skipping NetBIOS keep-alive");
                continue;
            }
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unexpected NetBIOS message type 0x{other:02x}"),
                ));
            }
        }
    }
}

pub async fn write_frame<W>(stream: &mut W, payload: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(&frame(payload)).await?;
    stream.flush().await
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
