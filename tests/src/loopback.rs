#![cfg(test)]
//! The real TCP connector against local listeners that never speak SMB.

use std::time::Duration;

use mscheck_common::config::Config;
use mscheck_core::connection::TcpConnector;
use mscheck_core::{Connector, Engine, ProbeError, ProbeEvent, ProbeOutcome};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use crate::support::{Recorder, targets};

fn config(port: u16) -> Config {
    Config {
        port,
        timeout: Duration::from_millis(300),
        ..Config::default()
    }
}

/// The listener reads the negotiate request and then stays silent.
#[tokio::test]
async fn silent_server_times_out() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await?;
        let mut buf = [0u8; 512];
        let _ = socket.read(&mut buf).await?;
        tokio::time::sleep(Duration::from_secs(2)).await;
        anyhow::Ok(())
    });

    let connector = TcpConnector::from_config(&config(port));
    let err = connector.open("127.0.0.1").await.err();
    assert!(matches!(err, Some(ProbeError::Connection(ref e)) if e.kind() == std::io::ErrorKind::TimedOut));

    server.abort();
    Ok(())
}

/// A peer that hangs up mid-negotiate is a connection failure for that target only.
#[tokio::test]
async fn hangup_during_negotiate_is_connection_failed() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        drop(socket);
        anyhow::Ok(())
    });

    let cfg = config(port);
    let connector = TcpConnector::from_config(&cfg);
    let mut engine = Engine::new(cfg, connector, Recorder::default());
    let summary = engine
        .run(targets(&["127.0.0.1"]), std::future::pending())
        .await?;

    assert!(matches!(
        summary.reports[0].outcome,
        ProbeOutcome::ConnectionFailed(_)
    ));
    assert!(matches!(
        engine.reporter().events.last(),
        Some(ProbeEvent::ConnectionFailed { .. })
    ));

    server.await??;
    Ok(())
}
