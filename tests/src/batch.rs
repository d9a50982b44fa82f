#![cfg(test)]
use std::time::Duration;

use mscheck_common::config::Config;
use mscheck_core::{Engine, ProbeError, ProbeEvent, ProbeOutcome};

use crate::support::{FakeConnector, Host, Recorder, targets};

/// A dead host in the middle of a batch does not touch its neighbours.
#[tokio::test]
async fn failed_connection_is_isolated() {
    let connector = FakeConnector::new(vec![
        Host::vulnerable("a"),
        Host::unreachable("b"),
        Host::patched("c"),
    ]);
    let journal = connector.journal.clone();
    let mut engine = Engine::new(Config::default(), connector, Recorder::default());

    let summary = engine
        .run(targets(&["a", "b", "c"]), std::future::pending())
        .await
        .unwrap();

    assert_eq!(summary.total(), 3);
    assert!(matches!(summary.reports[0].outcome, ProbeOutcome::NotPatched(_)));
    assert!(matches!(
        summary.reports[1].outcome,
        ProbeOutcome::ConnectionFailed(_)
    ));
    assert_eq!(summary.reports[2].outcome, ProbeOutcome::Patched);
    assert_eq!(summary.failed(), 1);

    assert_eq!(journal.count("close a"), 1);
    assert_eq!(journal.count("close c"), 1);
    assert_eq!(journal.count("close b"), 0);

    let b_events = engine.reporter().for_target("b");
    assert_eq!(b_events.len(), 2);
    assert!(matches!(b_events[1], ProbeEvent::ConnectionFailed { .. }));
}

/// Targets are strictly sequential and each session is closed before the next opens.
#[tokio::test]
async fn sessions_close_before_next_target() {
    let connector = FakeConnector::new(vec![Host::patched("x"), Host::vulnerable("y")]);
    let journal = connector.journal.clone();
    let mut engine = Engine::new(Config::default(), connector, Recorder::default());

    engine
        .run(targets(&["x", "y"]), std::future::pending())
        .await
        .unwrap();

    let entries = journal.entries();
    let close_x = entries.iter().position(|e| e == "close x").unwrap();
    let open_y = entries.iter().position(|e| e == "open y").unwrap();
    assert!(close_x < open_y);
    assert_eq!(entries.last().map(String::as_str), Some("close y"));
}

/// An interrupt closes the open session and halts the batch.
#[tokio::test]
async fn interrupt_stops_everything() {
    let stuck = Host {
        hang: true,
        ..Host::vulnerable("a")
    };
    let connector = FakeConnector::new(vec![stuck, Host::vulnerable("b")]);
    let journal = connector.journal.clone();
    let mut engine = Engine::new(Config::default(), connector, Recorder::default());

    let result = engine
        .run(
            targets(&["a", "b"]),
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;

    assert!(matches!(result, Err(ProbeError::Interrupted)));
    assert_eq!(journal.count("close a"), 1);
    assert_eq!(journal.count("open b"), 0);
    assert_eq!(
        engine.into_reporter().events.last(),
        Some(&ProbeEvent::Interrupted { target: "a".into() })
    );
}

#[tokio::test]
async fn empty_batch_is_a_clean_run() {
    let mut engine = Engine::new(
        Config::default(),
        FakeConnector::new(Vec::new()),
        Recorder::default(),
    );
    let summary = engine
        .run(Vec::<String>::new(), std::future::pending())
        .await
        .unwrap();
    assert_eq!(summary.total(), 0);
    assert!(engine.reporter().events.is_empty());
}
