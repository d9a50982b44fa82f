use std::net::Ipv4Addr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// Yields every address from start to end inclusive. A reversed range is empty.
    pub fn to_iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }

    pub fn len(&self) -> usize {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if end < start {
            0
        } else {
            (end - start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = pnet::ipnetwork::Ipv4Network::new(ip, prefix)?;
    let start = network.network();
    let end = network.broadcast();

    Ok(Ipv4Range::new(start, end))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Single(String),
    Range(Ipv4Range),
}

/// An ordered set of scan targets that expands lazily.
///
/// Ranges are stored as bounds and only turned into host strings while
/// iterating, so a `/8` costs two addresses of memory until it is walked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetCollection {
    entries: Vec<Entry>,
}

impl TargetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_single(&mut self, host: impl Into<String>) {
        self.entries.push(Entry::Single(host.into()));
    }

    pub fn add_range(&mut self, range: Ipv4Range) {
        self.entries.push(Entry::Range(range));
    }

    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                Entry::Single(_) => 1,
                Entry::Range(range) => range.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().flat_map(|entry| -> Box<dyn Iterator<Item = String>> {
            match entry {
                Entry::Single(host) => Box::new(std::iter::once(host.clone())),
                Entry::Range(range) => Box::new(range.to_iter().map(|ip| ip.to_string())),
            }
        })
    }
}

impl IntoIterator for TargetCollection {
    type Item = String;
    type IntoIter = Box<dyn Iterator<Item = String> + Send>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.entries.into_iter().flat_map(
            |entry| -> Box<dyn Iterator<Item = String> + Send> {
                match entry {
                    Entry::Single(host) => Box::new(std::iter::once(host)),
                    Entry::Range(range) => Box::new(range.to_iter().map(|ip| ip.to_string())),
                }
            },
        ))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_covers_network_and_broadcast() {
        let range = cidr_range(Ipv4Addr::new(10, 0, 0, 77), 30).unwrap();
        assert_eq!(range.start_addr, Ipv4Addr::new(10, 0, 0, 76));
        assert_eq!(range.end_addr, Ipv4Addr::new(10, 0, 0, 79));
        assert_eq!(range.len(), 4);
    }

    #[test]
    fn reversed_range_is_empty() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 9), Ipv4Addr::new(10, 0, 0, 1));
        assert!(range.is_empty());
        assert_eq!(range.to_iter().count(), 0);
    }

    #[test]
    fn collection_preserves_insertion_order() {
        let mut collection = TargetCollection::new();
        collection.add_single("fileserver.corp");
        collection.add_range(Ipv4Range::new(
            Ipv4Addr::new(192, 168, 1, 254),
            Ipv4Addr::new(192, 168, 2, 1),
        ));
        collection.add_single("10.0.0.1");

        let hosts: Vec<String> = collection.iter().collect();
        assert_eq!(
            hosts,
            vec![
                "fileserver.corp",
                "192.168.1.254",
                "192.168.1.255",
                "192.168.2.0",
                "192.168.2.1",
                "10.0.0.1",
            ]
        );
        assert_eq!(collection.len(), 6);
    }
}
