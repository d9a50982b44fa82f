//! SMB1 over direct-hosted TCP.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use mscheck_common::config::{Config, Credentials};
use mscheck_protocols::dcerpc::MAX_FRAGMENT;
use mscheck_protocols::ntlm::{self, Challenge, Identity};
use mscheck_protocols::smb::{
    self, FLAGS2_SECURITY_SIGNATURE, Message, NegotiateResponse, SessionSetupResponse,
    TransRequest, TransResponse,
};
use mscheck_protocols::{CodecError, NtStatus, netbios, spnego};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::ProbeError;
use crate::session::{Connector, Fid, ServerInfo, SmbSession, TransactionReply, TreeId};

/// Opens [`SmbConnection`]s over TCP.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    port: u16,
    timeout: Duration,
}

impl TcpConnector {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.port, cfg.timeout)
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Session = SmbConnection<TcpStream>;

    async fn open(&self, target: &str) -> Result<Self::Session, ProbeError> {
        let stream = timeout(self.timeout, TcpStream::connect((target, self.port)))
            .await
            .map_err(|_elapsed| ProbeError::timed_out())??;
        stream.set_nodelay(true)?;

        SmbConnection::negotiate(stream, target, self.timeout).await
    }
}

/// MAC key and the sequence number of the next request.
struct Signing {
    mac_key: Vec<u8>,
    sequence: u32,
}

/// One SMB1 session over any byte stream.
pub struct SmbConnection<S> {
    stream: Option<S>,
    host: String,
    timeout: Duration,
    negotiated: NegotiateResponse,
    uid: u16,
    tid: Option<u16>,
    pid: u16,
    mid: u16,
    signing: Option<Signing>,
    server_os: Option<String>,
    broken: bool,
}

impl<S> SmbConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Runs the dialect negotiation on a freshly connected stream.
    pub async fn negotiate(stream: S, host: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let mut conn = Self {
            stream: Some(stream),
            host: host.to_string(),
            timeout,
            negotiated: NegotiateResponse {
                dialect_index: smb::NO_DIALECT,
                security_mode: 0,
                max_mpx_count: 1,
                max_buffer_size: 0,
                session_key: 0,
                capabilities: 0,
                system_time: 0,
                challenge: None,
                domain_name: String::new(),
                server_guid: None,
                security_blob: Vec::new(),
            },
            uid: 0,
            tid: None,
            pid: std::process::id() as u16,
            mid: 0,
            signing: None,
            server_os: None,
            broken: false,
        };

        let reply = conn.request(smb::negotiate_request(), 0).await?;
        if reply.header.status.is_error() {
            return Err(ProbeError::Session(reply.header.status));
        }

        let negotiated = NegotiateResponse::parse(&reply)?;
        if negotiated.dialect_index == smb::NO_DIALECT {
            return Err(ProbeError::Smb1Unsupported);
        }
        debug!(
            host,
            extended_security = negotiated.extended_security(),
            signing_required = negotiated.signing_required(),
            domain = %negotiated.domain_name,
            "negotiated NT LM 0.12"
        );

        conn.negotiated = negotiated;
        Ok(conn)
    }

    async fn request(&mut self, mut message: Message, tid: u16) -> Result<Message, ProbeError> {
        if self.broken {
            return Err(ProbeError::closed());
        }
        let result = self.round_trip(&mut message, tid).await;
        if matches!(result, Err(ProbeError::Connection(_))) {
            self.broken = true;
        }
        result
    }

    async fn round_trip(&mut self, message: &mut Message, tid: u16) -> Result<Message, ProbeError> {
        self.mid = self.mid.wrapping_add(1);
        message.header.uid = self.uid;
        message.header.tid = tid;
        message.header.pid = self.pid;
        message.header.mid = self.mid;
        if self.signing.is_some() {
            message.header.flags2 |= FLAGS2_SECURITY_SIGNATURE;
        }

        let mut encoded = message.encode();
        if let Some(signing) = self.signing.as_mut() {
            smb::sign(&mut encoded, &signing.mac_key, signing.sequence);
            signing.sequence = signing.sequence.wrapping_add(2);
        }

        let command = message.header.command;
        let limit = self.timeout;
        let stream = self.stream.as_mut().ok_or_else(ProbeError::closed)?;

        timeout(limit, netbios::write_frame(&mut *stream, &encoded))
            .await
            .map_err(|_elapsed| ProbeError::timed_out())??;
        let frame = timeout(limit, netbios::read_frame(&mut *stream))
            .await
            .map_err(|_elapsed| ProbeError::timed_out())??;

        let reply = Message::decode(&frame)?;
        if reply.header.command != command {
            return Err(CodecError::Malformed(format!(
                "reply to command 0x{command:02x} carried command 0x{:02x}",
                reply.header.command
            ))
            .into());
        }
        trace!(command, status = %reply.header.status, "smb round trip");
        Ok(reply)
    }

    fn record_os(&mut self, response: &SessionSetupResponse) {
        if !response.native_os.is_empty() {
            self.server_os = Some(response.native_os.clone());
        }
    }

    fn server_info(&self, response: &SessionSetupResponse) -> ServerInfo {
        ServerInfo {
            native_os: self.server_os.clone().unwrap_or_default(),
            native_lan_man: response.native_lan_man.clone(),
            primary_domain: response.primary_domain.clone(),
            guest: response.is_guest(),
            signing: self.signing.is_some(),
        }
    }

    /// SPNEGO/NTLMSSP in two legs. The OS banner arrives with the first.
    async fn login_extended(&mut self, identity: &Identity<'_>) -> Result<ServerInfo, ProbeError> {
        let session_key = self.negotiated.session_key;
        let max_mpx = self.negotiated.max_mpx_count;

        let blob = spnego::neg_token_init(&ntlm::negotiate_message());
        let reply = self
            .request(smb::session_setup_extended(&blob, session_key, max_mpx), 0)
            .await?;
        let first = SessionSetupResponse::parse(&reply)?;
        self.record_os(&first);

        let status = reply.header.status;
        if status != NtStatus::MORE_PROCESSING_REQUIRED {
            return Err(if status.is_error() {
                ProbeError::Auth(status)
            } else {
                CodecError::Malformed(format!("session setup ended early with {status}")).into()
            });
        }
        self.uid = reply.header.uid;

        let token = spnego::ntlmssp_token(&first.security_blob).ok_or_else(|| {
            CodecError::Malformed("session setup reply carried no NTLMSSP challenge".into())
        })?;
        let challenge = Challenge::parse(token)?;
        let auth = ntlm::authenticate(&challenge, identity, ntlm::random_client_challenge());

        let blob = spnego::neg_token_resp(&auth.message);
        let reply = self
            .request(smb::session_setup_extended(&blob, session_key, max_mpx), 0)
            .await?;
        if reply.header.status.is_error() {
            return Err(ProbeError::Auth(reply.header.status));
        }
        let last = SessionSetupResponse::parse(&reply)?;
        self.record_os(&last);

        if let Some(key) = auth.session_key {
            self.enable_signing(key.to_vec(), last.is_guest());
        }
        Ok(self.server_info(&last))
    }

    /// Challenge responses straight in the password fields.
    async fn login_plain(&mut self, identity: &Identity<'_>) -> Result<ServerInfo, ProbeError> {
        let challenge = self.negotiated.challenge.ok_or_else(|| {
            CodecError::Malformed("negotiate reply carried no challenge".into())
        })?;

        let (lm, nt, mac_key) = if identity.is_anonymous() {
            (Vec::new(), Vec::new(), None)
        } else {
            let key = ntlm::ntowf_v2(identity.password, identity.username, identity.domain);
            let response = ntlm::ntlmv2_response(
                &key,
                &challenge,
                &ntlm::random_client_challenge(),
                ntlm::filetime_now(),
                &[],
            );
            let mut mac_key = response.session_base_key.to_vec();
            mac_key.extend_from_slice(&response.nt_response);
            (response.lm_response, response.nt_response, Some(mac_key))
        };

        let message = smb::session_setup_ntlm(
            &lm,
            &nt,
            identity.username,
            identity.domain,
            self.negotiated.session_key,
            self.negotiated.max_mpx_count,
        );
        let reply = self.request(message, 0).await?;
        let response = SessionSetupResponse::parse(&reply)?;
        self.record_os(&response);
        if reply.header.status.is_error() {
            return Err(ProbeError::Auth(reply.header.status));
        }
        self.uid = reply.header.uid;

        if let Some(mac_key) = mac_key {
            self.enable_signing(mac_key, response.is_guest());
        }
        Ok(self.server_info(&response))
    }

    /// Guest sessions have no usable key, so they stay unsigned.
    fn enable_signing(&mut self, mac_key: Vec<u8>, guest: bool) {
        if self.negotiated.signing_required() && !guest {
            debug!(host = %self.host, "signing enabled");
            self.signing = Some(Signing {
                mac_key,
                sequence: 2,
            });
        }
    }

    fn error_status(reply: &Message) -> Result<(), ProbeError> {
        if reply.header.status.is_error() {
            return Err(ProbeError::Session(reply.header.status));
        }
        Ok(())
    }
}

#[async_trait]
impl<S> SmbSession for SmbConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn server_os(&self) -> Option<&str> {
        self.server_os.as_deref()
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<ServerInfo, ProbeError> {
        let identity = Identity {
            username: &credentials.username,
            password: &credentials.password,
            domain: &credentials.domain,
        };

        if self.negotiated.extended_security() {
            self.login_extended(&identity).await
        } else {
            self.login_plain(&identity).await
        }
    }

    async fn tree_connect(&mut self, share: &str) -> Result<TreeId, ProbeError> {
        let path = format!("\\\\{}\\{}", self.host, share);
        let reply = self.request(smb::tree_connect_request(&path), 0).await?;
        Self::error_status(&reply)?;

        let tid = reply.header.tid;
        self.tid = Some(tid);
        Ok(TreeId::new(tid))
    }

    async fn transaction(
        &mut self,
        tree: TreeId,
        request: &TransRequest,
    ) -> Result<TransactionReply, ProbeError> {
        let reply = self.request(request.to_message(), tree.get()).await?;
        let data = TransResponse::parse(&reply)?.data;
        Ok(TransactionReply {
            status: reply.header.status,
            data,
        })
    }

    async fn open_pipe(&mut self, tree: TreeId, name: &str) -> Result<Fid, ProbeError> {
        let reply = self.request(smb::nt_create_request(name), tree.get()).await?;
        Self::error_status(&reply)?;
        Ok(Fid::new(smb::parse_nt_create_fid(&reply)?))
    }

    async fn transact_pipe(
        &mut self,
        tree: TreeId,
        fid: Fid,
        data: &[u8],
    ) -> Result<Vec<u8>, ProbeError> {
        let request = TransRequest::transact_named_pipe(fid.get(), data.to_vec(), MAX_FRAGMENT);
        let reply = self.request(request.to_message(), tree.get()).await?;
        Self::error_status(&reply)?;
        Ok(TransResponse::parse(&reply)?.data)
    }

    async fn close_pipe(&mut self, tree: TreeId, fid: Fid) -> Result<(), ProbeError> {
        let reply = self.request(smb::close_request(fid.get()), tree.get()).await?;
        Self::error_status(&reply)
    }

    async fn close(&mut self) {
        if self.stream.is_none() {
            return;
        }

        if let Some(tid) = self.tid.take() {
            if let Err(e) = self.request(smb::tree_disconnect_request(), tid).await {
                debug!(host = %self.host, "tree disconnect failed: {e}");
            }
        }
        if self.uid != 0 {
            if let Err(e) = self.request(smb::logoff_request(), 0).await {
                debug!(host = %self.host, "logoff failed: {e}");
            }
            self.uid = 0;
        }

        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = shutdown(&mut stream, self.timeout).await {
                trace!(host = %self.host, "socket shutdown: {e}");
            }
        }
    }
}

async fn shutdown<S: AsyncWrite + Unpin>(stream: &mut S, limit: Duration) -> io::Result<()> {
    timeout(limit, stream.shutdown())
        .await
        .map_err(|_elapsed| io::Error::new(io::ErrorKind::TimedOut, "timed out"))?
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{Buf, BufMut};
    use mscheck_protocols::smb::{FLAGS_REPLY, Header, command};

    use crate::oracle::{self, PatchStatus};
    use tokio::io::DuplexStream;

    async fn reply_to(server: &mut DuplexStream, status: NtStatus, words: Vec<u8>, bytes: Vec<u8>) -> Message {
        let frame = netbios::read_frame(server).await.unwrap();
        let request = Message::decode(&frame).unwrap();

        let mut header = Header::request(request.header.command);
        header.flags |= FLAGS_REPLY;
        header.status = status;
        header.mid = request.header.mid;
        header.uid = 0x0800;
        header.tid = 0x0801;
        let reply = Message::new(header, words, bytes);
        netbios::write_frame(server, &reply.encode()).await.unwrap();
        request
    }

    const WIN7: &str = "Windows 7 Professional 7601 Service Pack 1";

    fn negotiate_words(security_mode: u8, capabilities: u32, challenge_len: u8) -> Vec<u8> {
        let mut words = Vec::new();
        words.put_u16_le(0);
        words.put_u8(security_mode);
        words.put_u16_le(50);
        words.put_u16_le(1);
        words.put_u32_le(16644);
        words.put_u32_le(65536);
        words.put_u32_le(0);
        words.put_u32_le(capabilities);
        words.put_u64_le(0);
        words.put_i16_le(0);
        words.put_u8(challenge_len);
        words
    }

    fn extended_negotiate() -> Vec<u8> {
        negotiate_words(0x03, smb::CAP_EXTENDED_SECURITY | smb::CAP_UNICODE, 0)
    }

    /// Session setup reply words and data. Native strings are aligned the
    /// way a Windows server aligns them.
    fn session_setup_reply(action: u16, blob: &[u8], extended: bool) -> (Vec<u8>, Vec<u8>) {
        let mut words = vec![0xFF, 0, 0, 0];
        words.put_u16_le(action);
        if extended {
            words.put_u16_le(blob.len() as u16);
        }

        let mut bytes = blob.to_vec();
        if (smb::bytes_offset(words.len()) + bytes.len()) % 2 != 0 {
            bytes.put_u8(0);
        }
        bytes.extend(mscheck_protocols::utf16::encode_nul(WIN7));
        bytes.extend(mscheck_protocols::utf16::encode_nul("Windows 7 Professional 6.1"));
        bytes.extend(mscheck_protocols::utf16::encode_nul("CORP"));
        (words, bytes)
    }

    /// A bare CHALLENGE_MESSAGE behind a stand-in negTokenResp prefix.
    fn challenge_blob() -> Vec<u8> {
        let mut blob = vec![0xA1, 0x81];
        blob.put_slice(ntlm::SIGNATURE);
        blob.put_u32_le(2);
        blob.put_u64_le(0);
        blob.put_u32_le(0x6289_8215);
        blob.put_slice(&[0x11; 8]);
        blob
    }

    fn ntlm_message_type(request: &Message) -> u32 {
        let token = spnego::ntlmssp_token(&request.bytes).unwrap();
        u32::from_le_bytes([token[8], token[9], token[10], token[11]])
    }

    /// Negotiates plain NTLM: an 8 byte challenge and no security blob.
    async fn plain_negotiate(server: &mut DuplexStream, security_mode: u8) {
        let words = negotiate_words(security_mode, smb::CAP_UNICODE, 8);
        let mut bytes = vec![0x22; 8];
        bytes.extend(mscheck_protocols::utf16::encode_nul("CORP"));
        reply_to(server, NtStatus::SUCCESS, words, bytes).await;
    }

    fn trans_reply_words(data_len: u16) -> Vec<u8> {
        let mut words = Vec::new();
        words.put_u16_le(0);
        words.put_u16_le(data_len);
        words.put_u16_le(0);
        words.put_u16_le(0);
        words.put_u16_le(56);
        words.put_u16_le(0);
        words.put_u16_le(data_len);
        // data section starts at 55, one pad byte
        words.put_u16_le(56);
        words.put_u16_le(0);
        words.put_u8(0);
        words.put_u8(0);
        words
    }

    #[tokio::test]
    async fn negotiate_rejects_servers_without_smb1() {
        let (client, mut server) = tokio::io::duplex(4096);
        let stub = tokio::spawn(async move {
            reply_to(&mut server, NtStatus::SUCCESS, vec![0xFF, 0xFF], vec![]).await;
        });

        let result = SmbConnection::negotiate(client, "10.0.0.5", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ProbeError::Smb1Unsupported)));
        stub.await.unwrap();
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let (client, _server) = tokio::io::duplex(4096);
        let result = SmbConnection::negotiate(client, "10.0.0.5", Duration::from_millis(50)).await;
        match result {
            Err(ProbeError::Connection(e)) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
            Err(other) => panic!("expected a timeout, got {other}"),
            Ok(_) => panic!("expected a timeout"),
        }
    }

    #[tokio::test]
    async fn close_tears_down_once() {
        let (client, mut server) = tokio::io::duplex(4096);
        let stub = tokio::spawn(async move {
            reply_to(&mut server, NtStatus::SUCCESS, extended_negotiate(), vec![0; 16]).await;
            let tree = reply_to(&mut server, NtStatus::SUCCESS, vec![0xFF, 0, 0, 0, 0, 0], vec![]).await;
            assert_eq!(tree.header.command, command::TREE_CONNECT_ANDX);
            let disconnect = reply_to(&mut server, NtStatus::SUCCESS, vec![], vec![]).await;
            assert_eq!(disconnect.header.command, command::TREE_DISCONNECT);
            assert_eq!(disconnect.header.tid, 0x0801);
            // no logoff: the session never logged in
            let mut rest = Vec::new();
            tokio::io::AsyncReadExt::read_to_end(&mut server, &mut rest).await.unwrap();
            assert!(rest.is_empty());
        });

        let mut conn = SmbConnection::negotiate(client, "10.0.0.5", Duration::from_secs(1))
            .await
            .unwrap();
        let tree = conn.tree_connect("IPC$").await.unwrap();
        assert_eq!(tree.get(), 0x0801);

        conn.close().await;
        conn.close().await;
        assert!(conn.tree_connect("IPC$").await.is_err());
        drop(conn);
        stub.await.unwrap();
    }

    #[tokio::test]
    async fn extended_login_failure_keeps_os_from_first_leg() {
        let (client, mut server) = tokio::io::duplex(8192);
        let stub = tokio::spawn(async move {
            reply_to(&mut server, NtStatus::SUCCESS, extended_negotiate(), vec![0; 16]).await;

            let (words, bytes) = session_setup_reply(0, &challenge_blob(), true);
            let first = reply_to(&mut server, NtStatus::MORE_PROCESSING_REQUIRED, words, bytes).await;
            assert_eq!(ntlm_message_type(&first), 1);
            assert_eq!(first.header.uid, 0);

            let second = reply_to(&mut server, NtStatus::LOGON_FAILURE, vec![], vec![]).await;
            assert_eq!(second.header.command, command::SESSION_SETUP_ANDX);
            assert_eq!(ntlm_message_type(&second), 3);
            assert_eq!(second.header.uid, 0x0800);
        });

        let mut conn = SmbConnection::negotiate(client, "10.0.0.5", Duration::from_secs(1))
            .await
            .unwrap();
        let result = conn.login(&Credentials::new("alice", "Passw0rd")).await;

        assert!(matches!(result, Err(ProbeError::Auth(NtStatus::LOGON_FAILURE))));
        assert_eq!(conn.server_os(), Some(WIN7));
        stub.await.unwrap();
    }

    #[tokio::test]
    async fn extended_anonymous_login_is_a_guest_without_signing() {
        let (client, mut server) = tokio::io::duplex(8192);
        let stub = tokio::spawn(async move {
            let mut words = extended_negotiate();
            words[2] = 0x0F;
            reply_to(&mut server, NtStatus::SUCCESS, words, vec![0; 16]).await;

            let (words, bytes) = session_setup_reply(0, &challenge_blob(), true);
            reply_to(&mut server, NtStatus::MORE_PROCESSING_REQUIRED, words, bytes).await;

            let (words, bytes) = session_setup_reply(smb::ACTION_GUEST, &[], true);
            let second = reply_to(&mut server, NtStatus::SUCCESS, words, bytes).await;
            assert_eq!(ntlm_message_type(&second), 3);

            let tree = reply_to(&mut server, NtStatus::SUCCESS, vec![0xFF, 0, 0, 0, 0, 0], vec![]).await;
            assert_eq!(tree.header.flags2 & FLAGS2_SECURITY_SIGNATURE, 0);
        });

        let mut conn = SmbConnection::negotiate(client, "10.0.0.5", Duration::from_secs(1))
            .await
            .unwrap();
        let info = conn.login(&Credentials::anonymous()).await.unwrap();

        assert_eq!(info.native_os, WIN7);
        assert_eq!(info.native_lan_man, "Windows 7 Professional 6.1");
        assert_eq!(info.primary_domain, "CORP");
        assert!(info.guest);
        assert!(!info.signing);
        conn.tree_connect("IPC$").await.unwrap();
        stub.await.unwrap();
    }

    #[tokio::test]
    async fn plain_login_failure_is_an_auth_error() {
        let (client, mut server) = tokio::io::duplex(8192);
        let stub = tokio::spawn(async move {
            plain_negotiate(&mut server, 0x03).await;

            let setup = reply_to(&mut server, NtStatus::LOGON_FAILURE, vec![], vec![]).await;
            assert_eq!(setup.header.flags2 & smb::FLAGS2_EXTENDED_SECURITY, 0);
            let mut words = &setup.words[14..];
            assert_eq!(words.get_u16_le(), 24, "LMv2 response");
            assert!(words.get_u16_le() > 24, "NTLMv2 response");
        });

        let mut conn = SmbConnection::negotiate(client, "10.0.0.5", Duration::from_secs(1))
            .await
            .unwrap();
        let result = conn.login(&Credentials::new("alice", "wrong")).await;

        match result {
            Err(ProbeError::Auth(status)) => assert_eq!(status.code(), 0xC000_006D),
            other => panic!("expected an auth error, got {other:?}"),
        }
        stub.await.unwrap();
    }

    #[tokio::test]
    async fn plain_login_signs_when_the_server_requires_it() {
        let (client, mut server) = tokio::io::duplex(8192);
        let stub = tokio::spawn(async move {
            plain_negotiate(&mut server, 0x0F).await;

            let (words, bytes) = session_setup_reply(0, &[], false);
            reply_to(&mut server, NtStatus::SUCCESS, words, bytes).await;

            let tree = reply_to(&mut server, NtStatus::SUCCESS, vec![0xFF, 0, 0, 0, 0, 0], vec![]).await;
            assert_ne!(tree.header.flags2 & FLAGS2_SECURITY_SIGNATURE, 0);
            assert_ne!(tree.header.signature, [0; 8]);
            assert_eq!(tree.header.uid, 0x0800);
        });

        let mut conn = SmbConnection::negotiate(client, "10.0.0.5", Duration::from_secs(1))
            .await
            .unwrap();
        let info = conn.login(&Credentials::new("alice", "Passw0rd")).await.unwrap();

        assert_eq!(info.native_os, WIN7);
        assert!(!info.guest);
        assert!(info.signing);
        conn.tree_connect("IPC$").await.unwrap();
        stub.await.unwrap();
    }

    #[tokio::test]
    async fn oracle_peeks_on_the_ipc_tree() {
        let (client, mut server) = tokio::io::duplex(8192);
        let stub = tokio::spawn(async move {
            reply_to(&mut server, NtStatus::SUCCESS, extended_negotiate(), vec![0; 16]).await;
            reply_to(&mut server, NtStatus::SUCCESS, vec![0xFF, 0, 0, 0, 0, 0], vec![]).await;

            let peek = reply_to(&mut server, NtStatus::INSUFF_SERVER_RESOURCES, vec![], vec![]).await;
            assert_eq!(peek.header.command, command::TRANSACTION);
            assert_eq!(peek.header.tid, 0x0801);
            assert_eq!(peek.word_count(), 15);
            assert_eq!(&peek.words[28..30], &smb::TRANS_PEEK_NMPIPE.to_le_bytes());

            reply_to(&mut server, NtStatus::ACCESS_DENIED, vec![], vec![]).await;
        });

        let mut conn = SmbConnection::negotiate(client, "10.0.0.5", Duration::from_secs(1))
            .await
            .unwrap();
        let tree = conn.tree_connect("IPC$").await.unwrap();

        assert_eq!(oracle::probe(&mut conn, tree).await.unwrap(), PatchStatus::NotPatched);
        assert_eq!(oracle::probe(&mut conn, tree).await.unwrap(), PatchStatus::Patched);
        stub.await.unwrap();
    }

    #[tokio::test]
    async fn pipe_open_transact_and_close() {
        let (client, mut server) = tokio::io::duplex(8192);
        let stub = tokio::spawn(async move {
            reply_to(&mut server, NtStatus::SUCCESS, extended_negotiate(), vec![0; 16]).await;
            reply_to(&mut server, NtStatus::SUCCESS, vec![0xFF, 0, 0, 0, 0, 0], vec![]).await;

            let mut words = vec![0xFF, 0, 0, 0, 0];
            words.put_u16_le(0x4001);
            words.resize(68, 0);
            let create = reply_to(&mut server, NtStatus::SUCCESS, words, vec![]).await;
            assert_eq!(create.header.command, command::NT_CREATE_ANDX);
            assert_eq!(mscheck_protocols::utf16::decode_nul(&create.bytes[1..]).0, "\\samr");

            let transact = reply_to(
                &mut server,
                NtStatus::SUCCESS,
                trans_reply_words(4),
                vec![0, 5, 0, 12, 3],
            )
            .await;
            assert_eq!(&transact.words[28..30], &smb::TRANS_TRANSACT_NMPIPE.to_le_bytes());
            assert_eq!(&transact.words[30..32], &0x4001u16.to_le_bytes());
            let data_offset = u16::from_le_bytes([transact.words[24], transact.words[25]]) as usize;
            let data_at = data_offset - transact.data_start();
            assert_eq!(&transact.bytes[data_at..], &[5, 0, 11, 3]);

            let close = reply_to(&mut server, NtStatus::SUCCESS, vec![], vec![]).await;
            assert_eq!(close.header.command, command::CLOSE);
            assert_eq!(&close.words[..2], &0x4001u16.to_le_bytes());

            reply_to(&mut server, NtStatus::ACCESS_DENIED, vec![], vec![]).await;
        });

        let mut conn = SmbConnection::negotiate(client, "10.0.0.5", Duration::from_secs(1))
            .await
            .unwrap();
        let tree = conn.tree_connect("IPC$").await.unwrap();

        let fid = conn.open_pipe(tree, "\\samr").await.unwrap();
        assert_eq!(fid.get(), 0x4001);
        let answer = conn.transact_pipe(tree, fid, &[5, 0, 11, 3]).await.unwrap();
        assert_eq!(answer, vec![5, 0, 12, 3]);
        conn.close_pipe(tree, fid).await.unwrap();

        let denied = conn.open_pipe(tree, "\\browser").await;
        assert!(matches!(denied, Err(ProbeError::Session(NtStatus::ACCESS_DENIED))));
        stub.await.unwrap();
    }
}
