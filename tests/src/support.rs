#![cfg(test)]
//! Scripted hosts for driving the engine without a network.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::BufMut;
use mscheck_common::config::Credentials;
use mscheck_core::session::{Fid, ServerInfo, TransactionReply, TreeId};
use mscheck_core::{Connector, ProbeError, ProbeEvent, Reporter, SmbSession};
use mscheck_protocols::NtStatus;
use mscheck_protocols::dcerpc::{self, ContextResult, RejectReason};
use mscheck_protocols::smb::TransRequest;

/// How a pipe answers a bind.
#[derive(Debug, Clone)]
pub enum Bind {
    Accept,
    Reject(RejectReason),
    Nak(RejectReason),
    Fault(u32),
    Garbage,
    /// NT_CREATE fails with this status.
    Denied(NtStatus),
}

#[derive(Debug, Clone)]
pub struct Host {
    pub name: &'static str,
    pub reachable: bool,
    pub os: Option<&'static str>,
    pub login: Result<(), NtStatus>,
    pub oracle: NtStatus,
    pub pipes: Vec<(&'static str, Bind)>,
    /// Login never completes.
    pub hang: bool,
}

impl Host {
    pub fn vulnerable(name: &'static str) -> Self {
        Self {
            name,
            reachable: true,
            os: Some("Windows 7 Professional 7601 Service Pack 1"),
            login: Ok(()),
            oracle: NtStatus::INSUFF_SERVER_RESOURCES,
            pipes: Vec::new(),
            hang: false,
        }
    }

    pub fn patched(name: &'static str) -> Self {
        Self {
            oracle: NtStatus::SUCCESS,
            ..Self::vulnerable(name)
        }
    }

    pub fn unreachable(name: &'static str) -> Self {
        Self {
            reachable: false,
            ..Self::vulnerable(name)
        }
    }

    pub fn pipe(mut self, name: &'static str, bind: Bind) -> Self {
        self.pipes.push((name, bind));
        self
    }

    fn bind_for(&self, pipe: &str) -> Bind {
        self.pipes
            .iter()
            .find(|(name, _)| *name == pipe)
            .map(|(_, bind)| bind.clone())
            .unwrap_or(Bind::Accept)
    }
}

/// Everything the fake sessions did, in order.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.entries().iter().any(|e| e.starts_with(prefix))
    }
}

pub struct FakeConnector {
    hosts: Vec<Host>,
    pub journal: Journal,
}

impl FakeConnector {
    pub fn new(hosts: Vec<Host>) -> Self {
        Self {
            hosts,
            journal: Journal::default(),
        }
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn open(&self, target: &str) -> Result<FakeSession, ProbeError> {
        self.journal.push(format!("open {target}"));
        let host = self
            .hosts
            .iter()
            .find(|host| host.name == target)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        if !host.reachable {
            return Err(io::Error::from(io::ErrorKind::ConnectionRefused).into());
        }
        Ok(FakeSession {
            host,
            journal: self.journal.clone(),
            open_pipe: None,
            closed: false,
        })
    }
}

pub struct FakeSession {
    host: Host,
    journal: Journal,
    open_pipe: Option<String>,
    closed: bool,
}

impl FakeSession {
    fn log(&self, what: &str) {
        self.journal.push(format!("{what} {}", self.host.name));
    }
}

#[async_trait]
impl SmbSession for FakeSession {
    fn server_os(&self) -> Option<&str> {
        self.host.os
    }

    async fn login(&mut self, _: &Credentials) -> Result<ServerInfo, ProbeError> {
        self.log("login");
        if self.host.hang {
            return std::future::pending().await;
        }
        self.host.login.map_err(ProbeError::Auth)?;
        Ok(ServerInfo {
            native_os: self.host.os.unwrap_or_default().to_string(),
            ..ServerInfo::default()
        })
    }

    async fn tree_connect(&mut self, share: &str) -> Result<TreeId, ProbeError> {
        self.log(&format!("tree {share}"));
        Ok(TreeId::new(0x0800))
    }

    async fn transaction(
        &mut self,
        _: TreeId,
        request: &TransRequest,
    ) -> Result<TransactionReply, ProbeError> {
        assert_eq!(request.subcommand(), Some(0x23));
        self.log("oracle");
        Ok(TransactionReply {
            status: self.host.oracle,
            data: Vec::new(),
        })
    }

    async fn open_pipe(&mut self, _: TreeId, name: &str) -> Result<Fid, ProbeError> {
        let pipe = name.trim_start_matches('\\').to_string();
        self.log(&format!("pipe {pipe}"));
        if let Bind::Denied(status) = self.host.bind_for(&pipe) {
            return Err(ProbeError::Session(status));
        }
        self.open_pipe = Some(pipe);
        Ok(Fid::new(0x4000))
    }

    async fn transact_pipe(&mut self, _: TreeId, _: Fid, data: &[u8]) -> Result<Vec<u8>, ProbeError> {
        // every bind must propose NDR64
        assert_eq!(&data[52..68], &dcerpc::NDR64.uuid.to_bytes_le()[..]);
        let pipe = self.open_pipe.clone().unwrap_or_default();
        Ok(match self.host.bind_for(&pipe) {
            Bind::Accept => bind_ack(ContextResult::ACCEPTANCE, RejectReason::NOT_SPECIFIED),
            Bind::Reject(reason) => bind_ack(ContextResult::PROVIDER_REJECTION, reason),
            Bind::Nak(reason) => pdu(13, &reason.0.to_le_bytes()),
            Bind::Fault(status) => {
                let mut body = vec![0u8; 8];
                body.put_u32_le(status);
                body.put_u32_le(0);
                pdu(3, &body)
            }
            Bind::Garbage => vec![5, 0, 12],
            Bind::Denied(_) => unreachable!("denied pipes are never opened"),
        })
    }

    async fn close_pipe(&mut self, _: TreeId, _: Fid) -> Result<(), ProbeError> {
        if let Some(pipe) = self.open_pipe.take() {
            self.log(&format!("close_pipe {pipe}"));
        }
        Ok(())
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log("close");
        }
    }
}

fn pdu(packet_type: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![5, 0, packet_type, 0x03, 0x10, 0, 0, 0];
    out.put_u16_le((16 + body.len()) as u16);
    out.put_u16_le(0);
    out.put_u32_le(1);
    out.put_slice(body);
    out
}

fn bind_ack(result: ContextResult, reason: RejectReason) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u16_le(4280);
    body.put_u16_le(4280);
    body.put_u32_le(0x53f0);
    // empty secondary address, then two bytes to reach the 4-byte boundary
    body.put_u16_le(0);
    body.put_slice(&[0, 0]);
    body.put_u8(1);
    body.put_slice(&[0, 0, 0]);
    body.put_u16_le(result.0);
    body.put_u16_le(reason.0);
    body.put_slice(&dcerpc::NDR64.uuid.to_bytes_le());
    body.put_u16_le(dcerpc::NDR64.major);
    body.put_u16_le(dcerpc::NDR64.minor);
    pdu(12, &body)
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<ProbeEvent>,
}

impl Recorder {
    pub fn for_target(&self, target: &str) -> Vec<&ProbeEvent> {
        self.events.iter().filter(|e| e.target() == target).collect()
    }
}

impl Reporter for Recorder {
    fn report(&mut self, event: ProbeEvent) {
        self.events.push(event);
    }
}

pub fn targets(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
