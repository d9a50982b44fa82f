mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, check};
use mscheck_common::error;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    if !console::Term::stdout().is_term() {
        colored::control::set_override(false);
    }
    logging::init_logging(commands.verbose);
    print::banner();

    let targets = match commands.targets() {
        Ok(targets) => targets,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    match check::check(commands.config(), targets).await {
        Ok(Some(_)) => ExitCode::SUCCESS,
        Ok(None) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
