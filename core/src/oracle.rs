//! MS17-010 patch oracle.
//!
//! A PeekNamedPipe transaction with no file handle is sent on the IPC$ tree.
//! Unpatched servers run it far enough to fail allocating the response and
//! answer `STATUS_INSUFF_SERVER_RESOURCES`; patched ones reject it earlier
//! with some other status.

use mscheck_protocols::NtStatus;
use mscheck_protocols::smb::TransRequest;
use tracing::debug;

use crate::error::ProbeError;
use crate::session::{SmbSession, TreeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStatus {
    Patched,
    NotPatched,
}

pub fn classify(status: NtStatus) -> PatchStatus {
    if status == NtStatus::INSUFF_SERVER_RESOURCES {
        PatchStatus::NotPatched
    } else {
        PatchStatus::Patched
    }
}

/// One round trip, no retries.
pub async fn probe<S>(session: &mut S, tree: TreeId) -> Result<PatchStatus, ProbeError>
where
    S: SmbSession + ?Sized,
{
    let reply = session
        .transaction(tree, &TransRequest::peek_named_pipe())
        .await?;
    debug!(status = %reply.status, "oracle reply");
    Ok(classify(reply.status))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
