use dnsrelay_domain::DnsQuery;

/// Port for the record cache as seen by query handling.
pub trait DnsCachePort: Send + Sync {
    /// A complete reply to `query` built only from fresh cached records.
    /// `None` means the query has to be forwarded.
    fn answer_from_cache(&self, query: &DnsQuery) -> Option<Vec<u8>>;

    /// Stores the A / AAAA / CNAME answers of an upstream reply and returns
    /// how many were stored.
    fn absorb_reply(&self, reply: &[u8]) -> usize;
}
