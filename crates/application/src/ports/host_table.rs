use dnsrelay_domain::HostEntry;

/// Static name table consulted before the cache (A queries only).
pub trait HostTable: Send + Sync {
    fn lookup(&self, domain: &str) -> Option<HostEntry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
