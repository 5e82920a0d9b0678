use super::trie::DomainTrie;
use dnsrelay_application::ports::HostTable;
use dnsrelay_domain::{HostEntry, MAX_DOMAIN_LEN};
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Static `IP DOMAIN` table read from a hosts-style file.
#[derive(Default)]
pub struct HostFile {
    entries: DomainTrie<HostEntry>,
}

impl HostFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `path`. A file that cannot be read yields an empty table.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let table = Self::parse(&contents);
                info!(
                    path = %path.display(),
                    entries = table.len(),
                    "Loaded host file"
                );
                table
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to open host file");
                Self::new()
            }
        }
    }

    /// One `IP DOMAIN` pair per line; blank lines and `#` comments are skipped.
    pub fn parse(contents: &str) -> Self {
        let mut table = Self::new();

        for (number, line) in contents.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(ip), Some(domain)) = (fields.next(), fields.next()) else {
                warn!(line = number + 1, "Host line without a domain");
                continue;
            };
            let Ok(ip) = ip.parse::<Ipv4Addr>() else {
                warn!(line = number + 1, ip, "Host line with invalid IPv4 address");
                continue;
            };

            table.add(domain, HostEntry::from_ip(ip), number + 1);
        }
        table
    }

    fn add(&mut self, domain: &str, entry: HostEntry, line: usize) {
        let domain = domain.strip_suffix('.').unwrap_or(domain);
        // Host replies carry the name as an `Answer`, which caps its length.
        if domain.len() > MAX_DOMAIN_LEN {
            warn!(
                domain,
                line,
                max = MAX_DOMAIN_LEN,
                "Host record skipped, domain name too long"
            );
            return;
        }
        match self.entries.insert(domain, entry) {
            Ok(Some(_)) => {
                warn!(domain, line, "Host record already exists, the older one is replaced");
            }
            Ok(None) => debug!(domain, ?entry, "Added host record"),
            Err(e) => warn!(domain, line, error = %e, "Host record skipped"),
        }
    }
}

impl HostTable for HostFile {
    fn lookup(&self, domain: &str) -> Option<HostEntry> {
        self.entries.find(domain).copied()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
