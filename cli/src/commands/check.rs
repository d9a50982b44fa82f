use colored::*;
use mscheck_common::config::Config;
use mscheck_common::network::range::TargetCollection;
use mscheck_common::warn;
use mscheck_core::connection::TcpConnector;
use mscheck_core::{BatchSummary, Engine, ProbeError, ProbeOutcome};

use crate::terminal::reporter::ConsoleReporter;
use crate::terminal::{colors, print, spinner};

/// Resolves on Ctrl-C. If no handler can be installed the batch just runs to the end.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Checks every target in order. `Ok(None)` means the run was interrupted.
pub async fn check(cfg: Config, targets: TargetCollection) -> anyhow::Result<Option<BatchSummary>> {
    if targets.is_empty() {
        warn!("No targets to check");
        return Ok(Some(BatchSummary::default()));
    }

    print::header("checking targets");
    print::aligned_line("Targets", targets.len().to_string());
    print::aligned_line("Port", cfg.port.to_string());
    print::aligned_line("Timeout", format!("{}s", cfg.timeout.as_secs()));
    print::aligned_line(
        "Login",
        if cfg.credentials.is_anonymous() {
            "anonymous".to_string()
        } else {
            cfg.credentials.username.clone()
        },
    );
    print::fat_separator();

    let connector = TcpConnector::from_config(&cfg);
    let mut engine = Engine::new(cfg, connector, ConsoleReporter::new());
    let result = engine.run(targets, ctrl_c()).await;
    spinner::finish();

    match result {
        Ok(summary) => {
            print_summary(&summary);
            Ok(Some(summary))
        }
        Err(ProbeError::Interrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn print_summary(summary: &BatchSummary) {
    print::header("summary");
    print::aligned_line("Checked", summary.total().to_string());
    print::aligned_line(
        "Not patched",
        summary.not_patched().to_string().color(colors::PRIMARY).bold(),
    );
    print::aligned_line("Patched", summary.patched().to_string());
    print::aligned_line("Unreachable", summary.failed().to_string());

    if summary.not_patched() == 0 {
        print::centerln(&"no vulnerable hosts found".color(colors::SEPARATOR).to_string());
    }

    for report in &summary.reports {
        if let ProbeOutcome::NotPatched(pipes) = &report.outcome {
            let open = pipes.iter().filter(|p| p.outcome.is_reachable()).count();
            print::aligned_line(
                &report.target,
                format!("{open}/{} pipes", pipes.len()).color(colors::ACCENT),
            );
        }
    }
    print::fat_separator();
}
