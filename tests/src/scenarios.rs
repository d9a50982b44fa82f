#![cfg(test)]
use mscheck_common::config::Config;
use mscheck_core::pipes::PipeResult;
use mscheck_core::{Engine, PipeOutcome, ProbeEvent, ProbeOutcome};
use mscheck_protocols::NtStatus;
use mscheck_protocols::dcerpc::RejectReason;

use crate::support::{Bind, FakeConnector, Host, Recorder, targets};

const WIN7: &str = "Windows 7 Professional 7601 Service Pack 1";

fn outcomes(results: &[PipeResult]) -> Vec<(&'static str, PipeOutcome)> {
    results
        .iter()
        .map(|r| (r.pipe, r.outcome.clone()))
        .collect()
}

/// Insufficient server resources on the oracle leads to the pipe sweep.
#[tokio::test]
async fn unpatched_host_enumerates_pipes() {
    let connector = FakeConnector::new(vec![Host::vulnerable("10.0.0.5")]);
    let journal = connector.journal.clone();
    let mut engine = Engine::new(Config::default(), connector, Recorder::default());

    let summary = engine
        .run(targets(&["10.0.0.5"]), std::future::pending())
        .await
        .unwrap();

    assert_eq!(summary.not_patched(), 1);
    let report = &summary.reports[0];
    assert_eq!(report.server_os.as_deref(), Some(WIN7));
    let ProbeOutcome::NotPatched(results) = &report.outcome else {
        panic!("expected NotPatched, got {:?}", report.outcome);
    };
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.outcome == PipeOutcome::Bound64));

    let events = &engine.reporter().events;
    assert_eq!(
        events[..4],
        [
            ProbeEvent::Connecting {
                target: "10.0.0.5".into()
            },
            ProbeEvent::ServerOs {
                target: "10.0.0.5".into(),
                os: WIN7.into()
            },
            ProbeEvent::NotPatched {
                target: "10.0.0.5".into()
            },
            ProbeEvent::Pipe {
                target: "10.0.0.5".into(),
                pipe: "browser",
                outcome: PipeOutcome::Bound64
            },
        ]
    );
    assert_eq!(events.len(), 3 + 5);

    assert!(journal.has_prefix("tree IPC$"));
    assert_eq!(journal.count("close 10.0.0.5"), 1);
}

/// A success status on the oracle means the host is patched and no pipe is touched.
#[tokio::test]
async fn patched_host_skips_pipes() {
    let connector = FakeConnector::new(vec![Host::patched("10.0.0.6")]);
    let journal = connector.journal.clone();
    let mut engine = Engine::new(Config::default(), connector, Recorder::default());

    let summary = engine
        .run(targets(&["10.0.0.6"]), std::future::pending())
        .await
        .unwrap();

    assert_eq!(summary.reports[0].outcome, ProbeOutcome::Patched);
    assert_eq!(summary.patched(), 1);
    assert!(!journal.has_prefix("pipe "));
    assert_eq!(journal.count("close 10.0.0.6"), 1);
    assert_eq!(
        engine.reporter().events.last(),
        Some(&ProbeEvent::Patched {
            target: "10.0.0.6".into()
        })
    );
}

#[tokio::test]
async fn every_status_but_insuff_resources_is_patched() {
    for status in [
        NtStatus::SUCCESS,
        NtStatus::ACCESS_DENIED,
        NtStatus::INVALID_HANDLE,
        NtStatus::INSUFFICIENT_RESOURCES,
        NtStatus(0xC000_0206),
    ] {
        let host = Host {
            oracle: status,
            ..Host::vulnerable("h")
        };
        let mut engine = Engine::new(
            Config::default(),
            FakeConnector::new(vec![host]),
            Recorder::default(),
        );
        let summary = engine
            .run(targets(&["h"]), std::future::pending())
            .await
            .unwrap();
        assert_eq!(summary.reports[0].outcome, ProbeOutcome::Patched, "{status}");
    }
}

/// Bad credentials stop the target but the OS banner is still surfaced.
#[tokio::test]
async fn login_failure_reports_os_and_moves_on() {
    let locked = Host {
        login: Err(NtStatus::LOGON_FAILURE),
        ..Host::vulnerable("dc01")
    };
    let connector = FakeConnector::new(vec![locked, Host::patched("fs01")]);
    let journal = connector.journal.clone();
    let mut engine = Engine::new(Config::default(), connector, Recorder::default());

    let summary = engine
        .run(targets(&["dc01", "fs01"]), std::future::pending())
        .await
        .unwrap();

    assert_eq!(
        summary.reports[0].outcome,
        ProbeOutcome::LoginFailed("STATUS_LOGON_FAILURE".into())
    );
    assert_eq!(summary.reports[1].outcome, ProbeOutcome::Patched);

    let recorder = engine.reporter();
    assert_eq!(
        recorder.for_target("dc01"),
        [
            &ProbeEvent::Connecting {
                target: "dc01".into()
            },
            &ProbeEvent::LoginFailed {
                target: "dc01".into(),
                reason: "STATUS_LOGON_FAILURE".into()
            },
            &ProbeEvent::ServerOs {
                target: "dc01".into(),
                os: WIN7.into()
            },
        ]
    );

    assert!(!journal.has_prefix("oracle dc01"));
    assert!(!journal.has_prefix("tree IPC$ dc01"));
    assert_eq!(journal.count("close dc01"), 1);
}

/// samr only speaks 32-bit NDR while netlogon accepts NDR64.
#[tokio::test]
async fn mixed_bitness_is_classified_per_pipe() {
    let host = Host::vulnerable("10.0.0.7")
        .pipe("samr", Bind::Reject(RejectReason::TRANSFER_SYNTAXES_NOT_SUPPORTED))
        .pipe("netlogon", Bind::Accept);
    let mut engine = Engine::new(
        Config::default(),
        FakeConnector::new(vec![host]),
        Recorder::default(),
    );

    let summary = engine
        .run(targets(&["10.0.0.7"]), std::future::pending())
        .await
        .unwrap();

    let ProbeOutcome::NotPatched(results) = &summary.reports[0].outcome else {
        panic!("expected NotPatched");
    };
    let results = outcomes(results);
    assert!(results.contains(&("samr", PipeOutcome::Bound32)));
    assert!(results.contains(&("netlogon", PipeOutcome::Bound64)));
}

/// Every pipe failing differently still yields five results in catalog order.
#[tokio::test]
async fn five_outcomes_in_order_when_every_bind_fails() {
    let host = Host::vulnerable("10.0.0.8")
        .pipe("browser", Bind::Denied(NtStatus::OBJECT_NAME_NOT_FOUND))
        .pipe("spoolss", Bind::Fault(0x1C01_0003))
        .pipe("netlogon", Bind::Nak(RejectReason::LOCAL_LIMIT_EXCEEDED))
        .pipe("lsarpc", Bind::Garbage)
        .pipe("samr", Bind::Reject(RejectReason::ABSTRACT_SYNTAX_NOT_SUPPORTED));
    let connector = FakeConnector::new(vec![host]);
    let journal = connector.journal.clone();
    let mut engine = Engine::new(Config::default(), connector, Recorder::default());

    let summary = engine
        .run(targets(&["10.0.0.8"]), std::future::pending())
        .await
        .unwrap();

    let ProbeOutcome::NotPatched(results) = &summary.reports[0].outcome else {
        panic!("expected NotPatched");
    };
    let names: Vec<_> = results.iter().map(|r| r.pipe).collect();
    assert_eq!(names, ["browser", "spoolss", "netlogon", "lsarpc", "samr"]);

    assert_eq!(
        results[0].outcome,
        PipeOutcome::AccessDenied("STATUS_OBJECT_NAME_NOT_FOUND".into())
    );
    assert_eq!(
        results[1].outcome,
        PipeOutcome::BoundOtherSyntax("DCERPC fault: nca_s_unk_if".into())
    );
    assert_eq!(
        results[2].outcome,
        PipeOutcome::BoundOtherSyntax("Bind context rejected: local_limit_exceeded".into())
    );
    assert!(matches!(results[3].outcome, PipeOutcome::BoundOtherSyntax(_)));
    assert_eq!(
        results[4].outcome,
        PipeOutcome::BoundOtherSyntax(
            "Bind context 1 rejected: provider_rejection; abstract_syntax_not_supported".into()
        )
    );

    // the denied pipe was never opened, the rest were all closed
    assert!(!journal.has_prefix("close_pipe browser"));
    for pipe in ["spoolss", "netlogon", "lsarpc", "samr"] {
        assert_eq!(journal.count(&format!("close_pipe {pipe} 10.0.0.8")), 1);
    }
}
