//! Turns probe events into the status lines shown while a batch runs.

use colored::*;
use mscheck_common::{error, info, success};
use mscheck_core::{ProbeEvent, Reporter};

use crate::terminal::{colors, spinner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Info,
    Success,
    Failure,
}

#[derive(Default)]
pub struct ConsoleReporter {
    done: usize,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn render(event: &ProbeEvent) -> Vec<(Tone, String)> {
    match event {
        ProbeEvent::Connecting { target } => vec![(
            Tone::Info,
            format!("Attempting to connect to: {}", target.color(colors::TARGET)),
        )],
        ProbeEvent::ServerOs { os, .. } => vec![(
            Tone::Info,
            format!("Found target OS: {}", os.color(colors::OS_BANNER)),
        )],
        ProbeEvent::LoginFailed { reason, .. } => vec![(
            Tone::Failure,
            format!("Login failed, got error: {}", reason.red()),
        )],
        ProbeEvent::ConnectionFailed { target, reason } => vec![(
            Tone::Failure,
            format!("Connection failed to: {} ({})", target.red(), reason),
        )],
        ProbeEvent::Patched { target } => {
            vec![(Tone::Failure, format!("{} IS PATCHED!", target.red()))]
        }
        ProbeEvent::NotPatched { target } => vec![
            (Tone::Success, format!("{} IS NOT PATCHED!", target.green())),
            (Tone::Info, "Looking for the named pipes...".to_string()),
        ],
        ProbeEvent::Pipe { pipe, outcome, .. } if outcome.is_reachable() => vec![(
            Tone::Success,
            format!("{}: {}", pipe.color(colors::PIPE_NAME), outcome),
        )],
        ProbeEvent::Pipe { pipe, outcome, .. } => vec![(
            Tone::Failure,
            format!("{}: {}", pipe.red(), outcome.to_string().red()),
        )],
        ProbeEvent::Interrupted { .. } => vec![(
            Tone::Failure,
            "Keyboard interrupt received..".to_string(),
        )],
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: ProbeEvent) {
        if let ProbeEvent::Connecting { target } = &event {
            spinner::report_target_progress(target, self.done);
            self.done += 1;
        }

        for (tone, line) in render(&event) {
            match tone {
                Tone::Info => info!("{line}"),
                Tone::Success => success!("{line}"),
                Tone::Failure => error!("{line}"),
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
