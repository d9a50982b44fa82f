use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::terminal::colors;

static SPINNER: OnceLock<ProgressBar> = OnceLock::new();

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

pub fn get_spinner() -> &'static ProgressBar {
    SPINNER.get_or_init(init_spinner)
}

fn init_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_strings(TICKS));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn report_target_progress(target: &str, done: usize) {
    get_spinner().set_message(format!(
        "Checking {} ({} done)",
        target.color(colors::TARGET).bold(),
        done.to_string().green()
    ));
}

pub fn finish() {
    if let Some(pb) = SPINNER.get() {
        pb.finish_and_clear();
    }
}

/// Log sink that keeps lines from tearing through the spinner.
///
/// Output goes to stdout even when the spinner is hidden.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match SPINNER.get() {
            Some(pb) if !pb.is_finished() => pb.suspend(|| io::stdout().lock().write_all(buf))?,
            _ => io::stdout().lock().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
