pub mod check;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, ArgGroup, Parser};
use mscheck_common::config::{Config, Credentials, DEFAULT_PORT};
use mscheck_common::network::range::TargetCollection;
use mscheck_common::network::target::{self, Target};

#[derive(Parser)]
#[command(name = "mscheck", version)]
#[command(about = "MS17-010 checker and named pipe enumerator.")]
#[command(after_help = "Example: mscheck -t 192.168.0.1-100")]
#[command(group(
    ArgGroup::new("targets")
        .required(true)
        .args(["target", "target_file"]),
))]
pub struct CommandLine {
    /// Username to authenticate with
    #[arg(short, long, value_name = "USER")]
    pub user: Option<String>,

    /// Password for the specified user
    #[arg(short, long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Domain of the specified user
    #[arg(short, long, value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Target to check (IP, host name, range, CIDR or a comma separated list)
    #[arg(short, long, value_name = "TARGET")]
    pub target: Option<Target>,

    /// File with one target expression per line
    #[arg(short = 'f', long, value_name = "FILE")]
    pub target_file: Option<PathBuf>,

    /// Seconds to wait for a connection or a reply
    #[arg(long, value_name = "SECS", default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// SMB port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// A password given without a user is ignored; the login stays anonymous.
    pub fn credentials(&self) -> Credentials {
        match &self.user {
            Some(user) => Credentials::new(user.as_str(), self.password.clone().unwrap_or_default())
                .with_domain(self.domain.clone().unwrap_or_default()),
            None => Credentials::anonymous(),
        }
    }

    pub fn config(&self) -> Config {
        Config {
            credentials: self.credentials(),
            timeout: Duration::from_secs(self.timeout),
            port: self.port,
        }
    }

    pub fn targets(&self) -> anyhow::Result<TargetCollection> {
        match (&self.target, &self.target_file) {
            (Some(target), _) => Ok(target::to_collection(target.clone())),
            (None, Some(path)) => target::from_file(path),
            (None, None) => anyhow::bail!("either --target or --target-file is required"),
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
