use std::fmt;

use colored::*;
use mscheck_common::log::SUCCESS_TARGET;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;

use crate::terminal::print::PRINT_TARGET;
use crate::terminal::spinner::SpinnerWriter;

pub struct MscheckFormatter;

/// Pulls `raw_msg` out of a print event so it is written without a symbol.
#[derive(Default)]
struct RawMessage(Option<String>);

impl Visit for RawMessage {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "raw_msg" {
            self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "raw_msg" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

fn symbol(level: &Level, target: &str) -> ColoredString {
    if target == SUCCESS_TARGET {
        return "[+]".green().bold();
    }
    match *level {
        Level::TRACE => "[ ]".dimmed(),
        Level::DEBUG => "[?]".blue(),
        Level::INFO => "[*]".bright_blue().bold(),
        Level::WARN => "[!]".yellow().bold(),
        Level::ERROR => "[-]".red().bold(),
    }
}

impl<S, N> FormatEvent<S, N> for MscheckFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        if meta.target() == PRINT_TARGET {
            let mut raw = RawMessage::default();
            event.record(&mut raw);
            return writeln!(writer, "{}", raw.0.unwrap_or_default());
        }

        write!(writer, "{} ", symbol(meta.level(), meta.target()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "info,mscheck=debug,mscheck_core=debug,mscheck_protocols=debug",
        _ => "trace",
    }
}

/// `RUST_LOG` wins over `-v` when it is set.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(MscheckFormatter)
        .with_writer(|| SpinnerWriter)
        .init();
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
