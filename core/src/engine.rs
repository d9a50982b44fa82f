//! Drives targets through connect, login, oracle and pipe probing.
//!
//! Targets are handled strictly one after another. Each gets its own session,
//! which is closed before the next target starts no matter how the probe
//! ended. A failure only ever ends the target it happened on; an interrupt
//! ends the batch.

use std::future::Future;
use std::pin::Pin;

use mscheck_common::config::Config;
use tracing::debug;

use crate::catalog::PIPES;
use crate::error::ProbeError;
use crate::oracle::{self, PatchStatus};
use crate::pipes::{self, PipeResult};
use crate::report::{ProbeEvent, Reporter};
use crate::session::{Connector, SmbSession};

const IPC_SHARE: &str = "IPC$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    ConnectionFailed(String),
    LoginFailed(String),
    Patched,
    NotPatched(Vec<PipeResult>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub target: String,
    pub server_os: Option<String>,
    pub outcome: ProbeOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub reports: Vec<TargetReport>,
}

impl BatchSummary {
    fn count(&self, predicate: impl Fn(&ProbeOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| predicate(&r.outcome)).count()
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn not_patched(&self) -> usize {
        self.count(|o| matches!(o, ProbeOutcome::NotPatched(_)))
    }

    pub fn patched(&self) -> usize {
        self.count(|o| matches!(o, ProbeOutcome::Patched))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                ProbeOutcome::ConnectionFailed(_) | ProbeOutcome::LoginFailed(_)
            )
        })
    }
}

pub struct Engine<C, R> {
    config: Config,
    connector: C,
    reporter: R,
}

impl<C, R> Engine<C, R>
where
    C: Connector,
    R: Reporter,
{
    pub fn new(config: Config, connector: C, reporter: R) -> Self {
        Self {
            config,
            connector,
            reporter,
        }
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Probes every target until the list is exhausted or `interrupt` resolves.
    pub async fn run<I, F>(&mut self, targets: I, interrupt: F) -> Result<BatchSummary, ProbeError>
    where
        I: IntoIterator<Item = String>,
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);

        let mut summary = BatchSummary::default();
        for target in targets {
            let report = self.probe_target(&target, interrupt.as_mut()).await?;
            summary.reports.push(report);
        }
        Ok(summary)
    }

    /// Runs the full sequence against one target.
    ///
    /// Returns `Err` only when interrupted, after the session is closed.
    pub async fn probe_target<F>(
        &mut self,
        target: &str,
        mut interrupt: Pin<&mut F>,
    ) -> Result<TargetReport, ProbeError>
    where
        F: Future<Output = ()>,
    {
        self.reporter.report(ProbeEvent::Connecting {
            target: target.to_string(),
        });

        let opened = tokio::select! {
            _ = &mut interrupt => None,
            opened = self.connector.open(target) => Some(opened),
        };
        let mut session = match opened {
            None => return Err(self.interrupted(target)),
            Some(Ok(session)) => session,
            Some(Err(e)) => {
                let outcome = connection_failed(&mut self.reporter, target, e);
                return Ok(TargetReport {
                    target: target.to_string(),
                    server_os: None,
                    outcome,
                });
            }
        };

        let outcome = tokio::select! {
            _ = &mut interrupt => None,
            outcome = drive(&mut session, &self.config, target, &mut self.reporter) => Some(outcome),
        };
        let server_os = session.server_os().map(str::to_owned);
        session.close().await;

        match outcome {
            Some(outcome) => Ok(TargetReport {
                target: target.to_string(),
                server_os,
                outcome,
            }),
            None => Err(self.interrupted(target)),
        }
    }

    fn interrupted(&mut self, target: &str) -> ProbeError {
        self.reporter.report(ProbeEvent::Interrupted {
            target: target.to_string(),
        });
        ProbeError::Interrupted
    }
}

fn connection_failed<R>(reporter: &mut R, target: &str, error: ProbeError) -> ProbeOutcome
where
    R: Reporter + ?Sized,
{
    debug!(host = target, "connection failed: {error:?}");
    let reason = error.to_string();
    reporter.report(ProbeEvent::ConnectionFailed {
        target: target.to_string(),
        reason: reason.clone(),
    });
    ProbeOutcome::ConnectionFailed(reason)
}

/// Login, tree connect, oracle and, on an unpatched host, the pipe sweep.
async fn drive<S, R>(session: &mut S, config: &Config, target: &str, reporter: &mut R) -> ProbeOutcome
where
    S: SmbSession + ?Sized,
    R: Reporter + ?Sized,
{
    match session.login(&config.credentials).await {
        Ok(info) => {
            debug!(
                host = target,
                lan_man = %info.native_lan_man,
                domain = %info.primary_domain,
                guest = info.guest,
                signing = info.signing,
                "logged in"
            );
            if !info.native_os.is_empty() {
                reporter.report(ProbeEvent::ServerOs {
                    target: target.to_string(),
                    os: info.native_os,
                });
            }
        }
        Err(ProbeError::Auth(status)) => {
            let reason = status.to_string();
            reporter.report(ProbeEvent::LoginFailed {
                target: target.to_string(),
                reason: reason.clone(),
            });
            if let Some(os) = session.server_os() {
                reporter.report(ProbeEvent::ServerOs {
                    target: target.to_string(),
                    os: os.to_string(),
                });
            }
            return ProbeOutcome::LoginFailed(reason);
        }
        Err(e) => return connection_failed(reporter, target, e),
    }

    let tree = match session.tree_connect(IPC_SHARE).await {
        Ok(tree) => tree,
        Err(e) => return connection_failed(reporter, target, e),
    };

    match oracle::probe(session, tree).await {
        Ok(PatchStatus::Patched) => {
            reporter.report(ProbeEvent::Patched {
                target: target.to_string(),
            });
            return ProbeOutcome::Patched;
        }
        Ok(PatchStatus::NotPatched) => reporter.report(ProbeEvent::NotPatched {
            target: target.to_string(),
        }),
        Err(e) => return connection_failed(reporter, target, e),
    }

    let swept = pipes::probe_all_pipes(session, tree, PIPES, |result| {
        reporter.report(ProbeEvent::Pipe {
            target: target.to_string(),
            pipe: result.pipe,
            outcome: result.outcome.clone(),
        })
    })
    .await;

    match swept {
        Ok(results) => ProbeOutcome::NotPatched(results),
        Err(e) => connection_failed(reporter, target, e),
    }
}
