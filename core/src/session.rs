//! The seam between the probing logic and the wire.
//!
//! [`Connector`] opens one [`SmbSession`] per target. The engine and the
//! probes only ever talk to these traits, so tests can drive the whole
//! sequence against scripted sessions while production uses
//! [`crate::connection::TcpConnector`].

use async_trait::async_trait;
use mscheck_common::config::Credentials;
use mscheck_protocols::NtStatus;
use mscheck_protocols::smb::TransRequest;

use crate::error::ProbeError;

/// Handle for a connected tree.
///
/// Only [`SmbSession::tree_connect`] hands these out; a real session forgets
/// its tree on close, so stale ids are rejected by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u16);

impl TreeId {
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

/// Handle for an open named pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fid(u16);

impl Fid {
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

/// What the server told us about itself while logging in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub native_os: String,
    pub native_lan_man: String,
    pub primary_domain: String,
    pub guest: bool,
    pub signing: bool,
}

/// A transaction reply whose status is left for the caller to judge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReply {
    pub status: NtStatus,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait Connector: Send + Sync {
    type Session: SmbSession;

    /// Connects and negotiates a dialect. Nothing is authenticated yet.
    async fn open(&self, target: &str) -> Result<Self::Session, ProbeError>;
}

#[async_trait]
pub trait SmbSession: Send {
    /// The OS banner seen so far. Available after a failed login when the
    /// server sent one in an intermediate leg.
    fn server_os(&self) -> Option<&str>;

    async fn login(&mut self, credentials: &Credentials) -> Result<ServerInfo, ProbeError>;

    async fn tree_connect(&mut self, share: &str) -> Result<TreeId, ProbeError>;

    /// Sends a raw transaction. Error statuses are returned, not raised.
    async fn transaction(
        &mut self,
        tree: TreeId,
        request: &TransRequest,
    ) -> Result<TransactionReply, ProbeError>;

    async fn open_pipe(&mut self, tree: TreeId, name: &str) -> Result<Fid, ProbeError>;

    /// Writes `data` to the pipe and returns what the server answered.
    async fn transact_pipe(
        &mut self,
        tree: TreeId,
        fid: Fid,
        data: &[u8],
    ) -> Result<Vec<u8>, ProbeError>;

    async fn close_pipe(&mut self, tree: TreeId, fid: Fid) -> Result<(), ProbeError>;

    /// Best-effort tree disconnect and logoff, then drops the socket.
    /// Calling it again does nothing.
    async fn close(&mut self);
}
