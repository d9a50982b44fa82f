//! Named pipe reachability and RPC bitness.
//!
//! Each pipe gets one bind proposing NDR64. An accepted bind means a 64-bit
//! RPC stack; a provider rejection of the transfer syntax means the pipe is
//! there but only speaks 32-bit NDR. No second bind is attempted.

use std::fmt;

use mscheck_protocols::dcerpc::{self, BindError, BindReply, SyntaxId};
use tracing::debug;

use crate::catalog::PipeDescriptor;
use crate::error::ProbeError;
use crate::session::{SmbSession, TreeId};

const TRANSFER_SYNTAX_REJECTED: &str = "transfer_syntaxes_not_supported";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeOutcome {
    Bound64,
    Bound32,
    /// The bind failed for another reason. The pipe still answered.
    BoundOtherSyntax(String),
    /// The server refused the pipe at the SMB level.
    AccessDenied(String),
}

impl PipeOutcome {
    pub fn is_reachable(&self) -> bool {
        !matches!(self, Self::AccessDenied(_))
    }
}

impl fmt::Display for PipeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bound64 => f.write_str("OK (64 bit)"),
            Self::Bound32 => f.write_str("OK (32 bit)"),
            Self::BoundOtherSyntax(detail) => write!(f, "OK ({detail})"),
            Self::AccessDenied(detail) => f.write_str(detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeResult {
    pub pipe: &'static str,
    pub outcome: PipeOutcome,
}

pub fn classify_bind(result: Result<SyntaxId, BindError>) -> PipeOutcome {
    match result {
        Ok(_) => PipeOutcome::Bound64,
        Err(e) => {
            let detail = e.to_string();
            if detail.contains(TRANSFER_SYNTAX_REJECTED) {
                PipeOutcome::Bound32
            } else {
                PipeOutcome::BoundOtherSyntax(detail)
            }
        }
    }
}

/// Pipe-scoped failures become outcomes, a dead connection is passed up.
fn contain(error: ProbeError) -> Result<PipeOutcome, ProbeError> {
    match error {
        e if e.is_transport() => Err(e),
        ProbeError::Bind(e) => Ok(classify_bind(Err(e))),
        e => Ok(PipeOutcome::AccessDenied(e.to_string())),
    }
}

/// Opens, binds and closes one pipe.
///
/// Only transport failures are returned as errors.
pub async fn probe_pipe<S>(
    session: &mut S,
    tree: TreeId,
    pipe: &PipeDescriptor,
    call_id: u32,
) -> Result<PipeOutcome, ProbeError>
where
    S: SmbSession + ?Sized,
{
    let fid = match session.open_pipe(tree, &pipe.path()).await {
        Ok(fid) => fid,
        Err(e) => return contain(e),
    };

    let bind = dcerpc::bind_request(call_id, &pipe.interface, &dcerpc::NDR64);
    let outcome = match session.transact_pipe(tree, fid, &bind).await {
        Ok(reply) => Ok(classify_bind(
            BindReply::decode(&reply).and_then(|reply| reply.accepted()),
        )),
        Err(e) => contain(e),
    };

    match session.close_pipe(tree, fid).await {
        Err(e) if e.is_transport() => Err(e),
        Err(e) => {
            debug!(pipe = pipe.name, "close failed: {e}");
            outcome
        }
        Ok(()) => outcome,
    }
}

/// Probes every pipe of `catalog` in order, handing each result to
/// `on_result` as soon as it is known.
pub async fn probe_all_pipes<S, F>(
    session: &mut S,
    tree: TreeId,
    catalog: &[PipeDescriptor],
    mut on_result: F,
) -> Result<Vec<PipeResult>, ProbeError>
where
    S: SmbSession + ?Sized,
    F: FnMut(&PipeResult) + Send,
{
    let mut results = Vec::with_capacity(catalog.len());
    for (call_id, pipe) in (1..).zip(catalog) {
        let outcome = probe_pipe(session, tree, pipe, call_id).await?;
        let result = PipeResult {
            pipe: pipe.name,
            outcome,
        };
        on_result(&result);
        results.push(result);
    }
    Ok(results)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
