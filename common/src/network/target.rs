//! Target expressions given on the command line or in a target file.
//!
//! One expression names a host by address or DNS name, an IPv4 range
//! (`10.0.0.1-40`, `10.0.0.1-10.0.1.7`), a CIDR block (`10.0.0.0/28`), or a
//! comma separated mix of those. Expansion into host strings is lazy so a
//! `/8` does not sit in memory.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;

use crate::network::range::{self, Ipv4Range, TargetCollection};
use crate::success;

/// One parsed target expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Host { target_addr: IpAddr },
    /// Resolved by the connector when the session is opened.
    Name { hostname: String },
    Range { ipv4_range: Ipv4Range },
    Multi { targets: Vec<Target> },
}

impl FromStr for Target {
    type Err = String;

    /// Forms are tried from most to least specific; a string that is
    /// neither an address, a range nor a CIDR block must be a valid host name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.contains(',') {
            return parse_commas(s).map_err(|e| e.to_string());
        }

        if let Some(target) = parse_host(s) {
            return Ok(target);
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_cidr_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_hostname(s) {
            return Ok(target);
        }

        Err(format!("invalid target: {s}"))
    }
}

fn collect_into(target: Target, collection: &mut TargetCollection) {
    match target {
        Target::Host { target_addr } => collection.add_single(target_addr.to_string()),
        Target::Name { hostname } => collection.add_single(hostname),
        Target::Range { ipv4_range } => collection.add_range(ipv4_range),
        Target::Multi { targets } => targets
            .into_iter()
            .for_each(|target| collect_into(target, collection)),
    }
}

/// Converts a single target into a lazily expanded collection.
pub fn to_collection(target: Target) -> TargetCollection {
    let mut collection = TargetCollection::new();
    collect_into(target, &mut collection);

    match collection.len() {
        1 => success!("1 target queued"),
        n => success!("{n} targets queued"),
    }

    collection
}

/// Reads target expressions from `path`, one per line.
///
/// Blank lines and lines starting with `#` are skipped. A malformed line
/// fails the whole file with its line number.
pub fn from_file(path: &Path) -> anyhow::Result<TargetCollection> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read target file {}", path.display()))?;
    let target = parse_lines(&content)?;
    Ok(to_collection(target))
}

fn parse_lines(content: &str) -> anyhow::Result<Target> {
    let mut targets = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let target = Target::from_str(line)
            .map_err(|e| anyhow::anyhow!("line {}: {}", idx + 1, e))?;
        targets.push(target);
    }

    Ok(Target::Multi { targets })
}

/// "10.0.0.5, dc01, 10.0.1.0/30". Empty items are ignored.
pub fn parse_commas(s: &str) -> anyhow::Result<Target> {
    let targets = s
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            Target::from_str(item).map_err(|e| anyhow::anyhow!("bad list item '{item}': {e}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Target::Multi { targets })
}

fn parse_host(s: &str) -> Option<Target> {
    let target_addr = s.parse::<IpAddr>().ok()?;
    Some(Target::Host { target_addr })
}

/// Parses "10.0.0.1-10.0.0.40" or the abbreviated "10.0.0.1-40".
///
/// Anything whose left side is not an IPv4 address is not a range and is left
/// for the host name parser (e.g. "file-server").
fn parse_ip_range(s: &str) -> Result<Option<Target>, String> {
    let Some((start, end)) = s.split_once('-') else {
        return Ok(None);
    };
    let Ok(start_addr) = start.parse::<Ipv4Addr>() else {
        return Ok(None);
    };

    let end_addr = range_end(start_addr, end)?;
    Ok(Some(Target::Range {
        ipv4_range: Ipv4Range::new(start_addr, end_addr),
    }))
}

/// The end of a range is either a full address or the trailing octets of
/// one, borrowing the leading octets from the start address.
fn range_end(start: Ipv4Addr, end: &str) -> Result<Ipv4Addr, String> {
    if let Ok(addr) = end.parse::<Ipv4Addr>() {
        return Ok(addr);
    }

    let tail = end
        .split('.')
        .map(str::parse::<u8>)
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| format!("invalid range end '{end}': {e}"))?;
    if tail.len() > 3 {
        return Err(format!("invalid range end '{end}': too many octets"));
    }

    let mut octets = start.octets();
    octets[4 - tail.len()..].copy_from_slice(&tail);
    Ok(Ipv4Addr::from(octets))
}

fn parse_cidr_range(s: &str) -> Result<Option<Target>, String> {
    let Some((network, prefix)) = s.split_once('/') else {
        return Ok(None);
    };

    let network: Ipv4Addr = network
        .parse()
        .map_err(|e| format!("bad CIDR network '{network}': {e}"))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|e| format!("bad CIDR prefix '{prefix}': {e}"))?;

    range::cidr_range(network, prefix)
        .map(|ipv4_range| Some(Target::Range { ipv4_range }))
        .map_err(|e| e.to_string())
}

/// Accepts RFC 1123 style names. The last label must not be all digits,
/// which keeps typos such as "10.0.0.256" from being treated as names.
fn parse_hostname(s: &str) -> Option<Target> {
    if s.is_empty() || s.len() > 253 {
        return None;
    }

    let labels: Vec<&str> = s.trim_end_matches('.').split('.').collect();
    let valid_labels = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let last_is_numeric = labels
        .last()
        .is_some_and(|label| label.chars().all(|c| c.is_ascii_digit()));

    if !valid_labels || last_is_numeric {
        return None;
    }

    Some(Target::Name {
        hostname: s.to_string(),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
